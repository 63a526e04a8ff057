pub mod buffer;
pub mod capture;
pub mod playback;

pub use buffer::RingBuffer;
pub use capture::{AudioCapture, list_input_devices};
pub use playback::{AudioPlayback, list_output_devices, play_blocking};
