use std::sync::Arc;

use audio_thread_priority::RtPriorityHandle;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;

use super::RingBuffer;
use crate::config::AudioConfig;
use crate::error::{Result, VocalsError};

/// Microphone capture feeding the shared hand-off buffer.
///
/// The stream callback is the producer side of the ring buffer: every block
/// of interleaved f32 samples is pushed under the lock, and a short write is
/// reported as overflow rather than treated as an error. The consumer drains
/// the same buffer from its own thread.
pub struct AudioCapture {
    stream: cpal::Stream,
    _rt_handle: Option<RtPriorityHandle>,
}

impl AudioCapture {
    /// Start capturing into `buffer`, optionally on a device whose
    /// description matches `device_name`.
    pub fn new(
        config: &AudioConfig,
        buffer: Arc<Mutex<RingBuffer>>,
        device_name: Option<&str>,
    ) -> Result<Self> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => find_input_device(&host, name)?,
            None => host
                .default_input_device()
                .ok_or_else(|| VocalsError::AudioDevice("No input device found".into()))?,
        };

        match device.description() {
            Ok(desc) => log::info!("Input device: {:?}", desc),
            Err(_) => log::info!("Input device: Unknown"),
        }

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size as u32),
        };

        // Build input stream with callback
        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let written = buffer.lock().push(data);
                    if written < data.len() {
                        log::warn!(
                            "Buffer overflow: dropped {} of {} samples",
                            data.len() - written,
                            data.len()
                        );
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| VocalsError::AudioStream(format!("{}", e)))?;

        // Attempt to promote to real-time priority
        let rt_handle = audio_thread_priority::promote_current_thread_to_real_time(
            config.buffer_size as u32,
            config.sample_rate,
        );

        let rt_handle = match rt_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Could not set real-time priority: {}", e);
                None
            }
        };

        stream
            .play()
            .map_err(|e| VocalsError::AudioStream(format!("{}", e)))?;

        Ok(Self {
            stream,
            _rt_handle: rt_handle,
        })
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        let _ = self.stream.pause();
    }
}

fn find_input_device(host: &cpal::Host, name: &str) -> Result<cpal::Device> {
    let needle = name.to_lowercase();
    let devices = host
        .input_devices()
        .map_err(|e| VocalsError::AudioDevice(format!("{}", e)))?;

    for device in devices {
        if let Ok(desc) = device.description() {
            if format!("{:?}", desc).to_lowercase().contains(&needle) {
                return Ok(device);
            }
        }
    }

    Err(VocalsError::AudioDevice(format!(
        "No input device matching '{}'",
        name
    )))
}

/// Descriptions of all available input devices.
pub fn list_input_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| VocalsError::AudioDevice(format!("{}", e)))?;

    Ok(devices
        .map(|device| match device.description() {
            Ok(desc) => format!("{:?}", desc),
            Err(_) => "Unknown".to_string(),
        })
        .collect())
}
