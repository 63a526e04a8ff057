use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, bounded};

use crate::error::{Result, VocalsError};

/// A playing output stream over a fixed sample vector.
///
/// The callback hands samples to the device in order, zero-fills once the
/// vector is exhausted, and signals completion exactly once. Dropping the
/// handle pauses the stream, so an abandoned playback goes quiet instead of
/// looping silence forever.
pub struct AudioPlayback {
    stream: cpal::Stream,
    done_rx: Receiver<()>,
    duration: Duration,
}

impl AudioPlayback {
    /// Start playing `samples` (interleaved if `channels > 1`) on the
    /// default output device.
    pub fn start(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| VocalsError::AudioDevice("No output device found".into()))?;

        match device.description() {
            Ok(desc) => log::debug!("Output device: {:?}", desc),
            Err(_) => log::debug!("Output device: Unknown"),
        }

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let total = samples.len();
        let frames_per_sec = sample_rate as f32 * channels.max(1) as f32;
        let duration = Duration::from_secs_f32(total as f32 / frames_per_sec);

        let (done_tx, done_rx) = bounded(1);
        let mut position = 0usize;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for sample in data.iter_mut() {
                        *sample = if position < total {
                            let value = samples[position];
                            position += 1;
                            value
                        } else {
                            0.0
                        };
                    }
                    if position >= total {
                        let _ = done_tx.try_send(());
                    }
                },
                |err| log::error!("Audio output error: {}", err),
                None,
            )
            .map_err(|e| VocalsError::AudioStream(format!("{}", e)))?;

        stream
            .play()
            .map_err(|e| VocalsError::AudioStream(format!("{}", e)))?;

        Ok(Self {
            stream,
            done_rx,
            duration,
        })
    }

    /// Block until every sample has been handed to the device.
    pub fn wait(&self) {
        // Bounded wait in case the device stalls mid-stream.
        let limit = self.duration + Duration::from_secs(2);
        if self.done_rx.recv_timeout(limit).is_err() {
            log::warn!("Playback did not complete within {:?}", limit);
        }
        // The final hardware buffer is still draining when the callback
        // signals; give it a moment before tearing the stream down.
        std::thread::sleep(Duration::from_millis(50));
    }
}

impl Drop for AudioPlayback {
    fn drop(&mut self) {
        let _ = self.stream.pause();
    }
}

/// Play a sample vector to completion on the default output device.
pub fn play_blocking(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<()> {
    if samples.is_empty() {
        return Ok(());
    }
    let playback = AudioPlayback::start(samples, sample_rate, channels)?;
    playback.wait();
    Ok(())
}

/// Descriptions of all available output devices.
pub fn list_output_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|e| VocalsError::AudioDevice(format!("{}", e)))?;

    Ok(devices
        .map(|device| match device.description() {
            Ok(desc) => format!("{:?}", desc),
            Err(_) => "Unknown".to_string(),
        })
        .collect())
}
