use rolling_stats::Stats;

use crate::constants::{
    INTERPOLATION_EPSILON, MAX_PITCH_HZ, MIN_PITCH_HZ, SILENCE_RMS_THRESHOLD, VOICED_THRESHOLD,
};
use crate::error::{Result, VocalsError};

/// Note names for the twelve semitones, sharps on output.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Analysis window length in seconds for `pitch_range`.
/// 128 ms holds several periods of the lowest searchable pitch.
const WINDOW_SECS: f32 = 0.128;

/// Estimate the fundamental frequency of a block of samples
///
/// Normalized autocorrelation over the vocal range (50-1500 Hz) with
/// parabolic interpolation around the best lag for sub-sample accuracy.
///
/// Returns `None` for blocks that are silent, too short to cover the lag
/// window, or whose best correlation peak is too weak to call voiced.
///
/// # Arguments
/// * `samples` - Mono audio block
/// * `sample_rate` - Sample rate in Hz
pub fn estimate_pitch(samples: &[f32], sample_rate: u32) -> Option<f32> {
    let sr = sample_rate as f32;
    let min_lag = (sr / MAX_PITCH_HZ).floor().max(1.0) as usize;
    let max_lag = (sr / MIN_PITCH_HZ).ceil() as usize;

    if samples.len() < max_lag + 2 {
        return None;
    }

    let energy: f32 = samples.iter().map(|s| s * s).sum();
    let rms = (energy / samples.len() as f32).sqrt();
    if rms < SILENCE_RMS_THRESHOLD {
        return None;
    }

    // Autocorrelation out to one lag past the search window so the
    // interpolation below always has both neighbors.
    let upper = max_lag + 1;
    let mut corr = vec![0.0f32; upper + 1];
    for (lag, c) in corr.iter_mut().enumerate() {
        let mut sum = 0.0;
        for i in 0..samples.len() - lag {
            sum += samples[i] * samples[i + lag];
        }
        *c = sum;
    }

    let mut best_lag = 0;
    let mut best = 0.0;
    for lag in min_lag..=max_lag {
        if corr[lag] > best {
            best = corr[lag];
            best_lag = lag;
        }
    }

    if best_lag == 0 || best / corr[0] < VOICED_THRESHOLD {
        return None;
    }

    // Parabolic fit through the peak and its neighbors refines the period
    // below one sample of error.
    let c0 = corr[best_lag - 1];
    let c1 = corr[best_lag];
    let c2 = corr[best_lag + 1];
    let denominator = c0 - 2.0 * c1 + c2;
    let delta = if denominator.abs() > INTERPOLATION_EPSILON {
        (0.5 * (c0 - c2) / denominator).clamp(-0.5, 0.5)
    } else {
        0.0
    };

    let period = best_lag as f32 + delta;
    Some(sr / period)
}

/// Lowest and highest voiced pitch found across a recording
///
/// Sweeps half-overlapping windows through the samples, estimating each one
/// and accumulating the extremes. Returns `None` when no window is voiced.
pub fn pitch_range(samples: &[f32], sample_rate: u32) -> Option<(f32, f32)> {
    let window = ((sample_rate as f32 * WINDOW_SECS) as usize).max(2);
    let hop = (window / 2).max(1);

    let mut stats: Stats<f32> = Stats::new();
    let mut start = 0;
    while start + window <= samples.len() {
        if let Some(freq) = estimate_pitch(&samples[start..start + window], sample_rate) {
            stats.update(freq);
        }
        start += hop;
    }

    // Short recordings may not fill a single window; fall back to one
    // whole-buffer estimate.
    if stats.count == 0 {
        let freq = estimate_pitch(samples, sample_rate)?;
        return Some((freq, freq));
    }

    Some((stats.min, stats.max))
}

/// Convert a note name to its frequency in Hz
///
/// Accepts names like `A4`, `C#3`, or `Bb2`. A4 is 440 Hz, equal
/// temperament.
pub fn note_to_freq(name: &str) -> Result<f32> {
    let s = name.trim();
    let mut chars = s.chars();
    let letter = chars
        .next()
        .ok_or_else(|| VocalsError::InvalidNote(name.to_string()))?;

    let base = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(VocalsError::InvalidNote(name.to_string())),
    };

    let rest: String = chars.collect();
    let (accidental, octave_str) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest.as_str()),
    };

    let octave: i32 = octave_str
        .parse()
        .map_err(|_| VocalsError::InvalidNote(name.to_string()))?;

    let midi = (octave + 1) * 12 + base + accidental;
    Ok(440.0 * 2f32.powf((midi - 69) as f32 / 12.0))
}

/// Name of the note nearest to a frequency, e.g. `440.0` -> `"A4"`
pub fn freq_to_note(freq: f32) -> String {
    let midi = (69.0 + 12.0 * (freq / 440.0).log2()).round() as i32;
    let name = NOTE_NAMES[midi.rem_euclid(12) as usize];
    let octave = midi.div_euclid(12) - 1;
    format!("{}{}", name, octave)
}
