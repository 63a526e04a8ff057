use std::f32::consts::PI;
use std::thread;
use std::time::Duration;

use crate::audio::play_blocking;
use crate::error::Result;

/// Default beep length in seconds.
pub const BEEP_SECS: f32 = 0.2;

/// Metronome click frequency in Hz.
pub const CLICK_FREQ_HZ: f32 = 880.0;

/// Metronome click length in seconds.
pub const CLICK_SECS: f32 = 0.05;

/// Synthesize a sine tone of `frequency` Hz lasting `duration` seconds.
pub fn sine(frequency: f32, sample_rate: u32, duration: f32) -> Vec<f32> {
    let count = (sample_rate as f32 * duration) as usize;
    (0..count)
        .map(|i| (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// A single metronome click.
pub fn click(sample_rate: u32) -> Vec<f32> {
    sine(CLICK_FREQ_HZ, sample_rate, CLICK_SECS)
}

/// Play a short beep of `frequency` Hz and block until it finishes.
pub fn beep(frequency: f32, sample_rate: u32, duration: f32) -> Result<()> {
    play_blocking(sine(frequency, sample_rate, duration), sample_rate, 1)
}

/// Count down to a take: one printed number and beep per second, pitch
/// alternating 880/660 Hz.
pub fn countdown(seconds: u32, sample_rate: u32) -> Result<()> {
    for i in (1..=seconds).rev() {
        println!("{}", i);
        let freq = if (seconds - i) % 2 == 0 { 880.0 } else { 660.0 };
        beep(freq, sample_rate, BEEP_SECS)?;
        thread::sleep(Duration::from_secs(1));
    }
    Ok(())
}

/// Frequencies of a warmup scale: `steps` ascending semitones from
/// `start_freq`, then back down when `up_down` is set.
pub fn warmup_frequencies(start_freq: f32, steps: usize, up_down: bool) -> Vec<f32> {
    let mut freqs: Vec<f32> = (0..steps)
        .map(|i| start_freq * 2f32.powf(i as f32 / 12.0))
        .collect();

    if up_down && steps > 1 {
        let descent: Vec<f32> = freqs[..steps - 1].iter().rev().copied().collect();
        freqs.extend(descent);
    }

    freqs
}

/// Play a warmup scale to help singers get ready.
pub fn play_warmup(
    start_freq: f32,
    steps: usize,
    duration: f32,
    up_down: bool,
    sample_rate: u32,
) -> Result<()> {
    for freq in warmup_frequencies(start_freq, steps, up_down) {
        beep(freq, sample_rate, duration)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_length_and_range() {
        let tone = sine(440.0, 44100, 0.5);
        assert_eq!(tone.len(), 22050);
        assert!(tone.iter().all(|s| s.abs() <= 1.0));
        assert_eq!(tone[0], 0.0);
    }

    #[test]
    fn test_warmup_frequencies_up_down() {
        let freqs = warmup_frequencies(100.0, 3, true);
        let semitone = 2f32.powf(1.0 / 12.0);
        let expected = [
            100.0,
            100.0 * semitone,
            100.0 * semitone * semitone,
            100.0 * semitone,
            100.0,
        ];

        assert_eq!(freqs.len(), expected.len());
        for (freq, want) in freqs.iter().zip(expected) {
            assert!((freq - want).abs() < 0.001, "expected {}, got {}", want, freq);
        }
    }

    #[test]
    fn test_warmup_frequencies_ascending_only() {
        let freqs = warmup_frequencies(220.0, 4, false);
        assert_eq!(freqs.len(), 4);
        assert!(freqs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_click_is_short() {
        let c = click(44100);
        assert_eq!(c.len(), (44100.0 * CLICK_SECS) as usize);
    }
}
