pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod multitrack;
pub mod pitch;
pub mod recorder;
pub mod tone;
pub mod wav;

pub use audio::RingBuffer;
pub use config::{AudioConfig, Config, ReferencePitch};
pub use error::{Result, VocalsError};
pub use multitrack::{MultiTrackRecorder, TakeOptions};
pub use recorder::{RecordOptions, record_to_file};
