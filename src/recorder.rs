use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rolling_stats::Stats;

use crate::audio::{AudioCapture, RingBuffer};
use crate::config::AudioConfig;
use crate::error::Result;
use crate::pitch;
use crate::tone;
use crate::wav::save_wav;

/// How often the consumer loop drains the hand-off buffer. Far below the
/// one-second buffer capacity, so a scheduling hiccup does not overflow it.
const DRAIN_INTERVAL: Duration = Duration::from_millis(20);

/// Options for a one-shot take.
#[derive(Debug, Clone)]
pub struct RecordOptions {
    /// Take length in seconds
    pub duration: f32,
    /// Countdown in seconds before recording starts
    pub countdown: u32,
    /// Play a metronome click at this tempo while recording
    pub metronome_bpm: Option<u32>,
    /// Play a reference tone at this frequency before recording
    pub reference_freq: Option<f32>,
    /// Print the detected pitch range after the take
    pub show_range: bool,
    /// Substring match against input device descriptions
    pub device: Option<String>,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            duration: 5.0,
            countdown: 0,
            metronome_bpm: None,
            reference_freq: None,
            show_range: false,
            device: None,
        }
    }
}

/// Record from the microphone and save the take as a 16-bit PCM WAV file.
///
/// The capture callback pushes into a one-second ring buffer; this function
/// is the consumer, draining it until the duration elapses and once more
/// after the stream stops.
pub fn record_to_file<P: AsRef<Path>>(
    path: P,
    options: &RecordOptions,
    audio: &AudioConfig,
) -> Result<()> {
    if options.countdown > 0 {
        tone::countdown(options.countdown, audio.sample_rate)?;
    }

    if let Some(freq) = options.reference_freq {
        tone::beep(freq, audio.sample_rate, tone::BEEP_SECS)?;
    }

    let buffer = Arc::new(Mutex::new(RingBuffer::new(audio.ring_capacity())?));
    let capture = AudioCapture::new(audio, Arc::clone(&buffer), options.device.as_deref())?;

    let metronome = options
        .metronome_bpm
        .map(|bpm| Metronome::start(bpm, audio.sample_rate));

    let chunk = audio.buffer_size * audio.channels as usize;
    let deadline = Instant::now() + Duration::from_secs_f32(options.duration);
    let mut recorded = Vec::new();

    while Instant::now() < deadline {
        thread::sleep(DRAIN_INTERVAL);
        recorded.extend(buffer.lock().pop(chunk));
    }

    drop(capture);

    // The callback may have landed more samples between the last drain and
    // the stream pausing.
    loop {
        let tail = buffer.lock().pop(chunk);
        if tail.is_empty() {
            break;
        }
        recorded.extend(tail);
    }

    if let Some(metronome) = metronome {
        metronome.stop();
    }

    log::info!(
        "Recorded {} samples ({:.2}s)",
        recorded.len(),
        recorded.len() as f32 / audio.ring_capacity() as f32
    );

    save_wav(&path, &recorded, audio.sample_rate, audio.channels)?;

    let mut levels: Stats<f32> = Stats::new();
    for &sample in &recorded {
        levels.update(sample.abs());
    }
    if levels.count > 0 {
        log::info!("Peak level: {:.3}, mean level: {:.3}", levels.max, levels.mean);
    }

    if options.show_range && !recorded.is_empty() {
        if let Some((low, high)) = pitch::pitch_range(&recorded, audio.sample_rate) {
            println!(
                "Pitch range: {:.1} Hz - {:.1} Hz ({} - {})",
                low,
                high,
                pitch::freq_to_note(low),
                pitch::freq_to_note(high)
            );
        }
    }

    Ok(())
}

/// Background click track running for the life of a take.
struct Metronome {
    stop: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

impl Metronome {
    fn start(bpm: u32, sample_rate: u32) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let interval = Duration::from_secs_f32(60.0 / bpm.max(1) as f32);
            while !flag.load(Ordering::Relaxed) {
                if let Err(e) = tone::beep(tone::CLICK_FREQ_HZ, sample_rate, tone::CLICK_SECS) {
                    log::warn!("Metronome click failed: {}", e);
                    break;
                }
                thread::sleep(interval);
            }
        });

        Self { stop, handle }
    }

    fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.handle.join();
    }
}
