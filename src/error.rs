use thiserror::Error;

#[derive(Error, Debug)]
pub enum VocalsError {
    #[error("Ring buffer allocation failed ({0} samples)")]
    Allocation(usize),

    #[error("Ring buffer capacity must be positive")]
    InvalidCapacity,

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio stream error: {0}")]
    AudioStream(String),

    #[error("Invalid track index: {0}")]
    InvalidTrack(usize),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Nothing selected")]
    NothingSelected,

    #[error("Invalid take index: {0}")]
    InvalidTake(usize),

    #[error("Invalid note name: {0}")]
    InvalidNote(String),

    #[error("WAV file error: {0}")]
    Wav(String),

    #[error("Sample rate mismatch: expected {expected} Hz, got {actual} Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },

    #[error("Channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: u16, actual: u16 },

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VocalsError>;
