use std::f32::consts::PI;

use approx::assert_relative_eq;

use vocals::pitch::{estimate_pitch, freq_to_note, note_to_freq, pitch_range};

fn sine(freq: f32, sample_rate: u32, count: usize) -> Vec<f32> {
    (0..count)
        .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

#[test]
fn test_estimate_pitch_of_sine() {
    let sample_rate = 8000;
    let tone = sine(440.0, sample_rate, sample_rate as usize);

    let pitch = estimate_pitch(&tone, sample_rate).expect("tone should be voiced");
    assert_relative_eq!(pitch, 440.0, max_relative = 0.02);
}

#[test]
fn test_estimate_pitch_low_voice() {
    let sample_rate = 44100;
    let tone = sine(110.0, sample_rate, 8192);

    let pitch = estimate_pitch(&tone, sample_rate).expect("tone should be voiced");
    assert_relative_eq!(pitch, 110.0, max_relative = 0.02);
}

#[test]
fn test_pitch_range_spans_low_and_high() {
    let sample_rate = 8000;
    let half = (sample_rate / 2) as usize;
    let mut samples = sine(220.0, sample_rate, half);
    samples.extend(sine(660.0, sample_rate, half));

    let (low, high) = pitch_range(&samples, sample_rate).expect("signal should be voiced");
    assert_relative_eq!(low, 220.0, max_relative = 0.05);
    assert_relative_eq!(high, 660.0, max_relative = 0.05);
}

#[test]
fn test_pitch_range_of_silence_is_none() {
    let silence = vec![0.0f32; 16000];
    assert!(pitch_range(&silence, 8000).is_none());
}

#[test]
fn test_note_to_freq() {
    assert_relative_eq!(note_to_freq("A4").unwrap(), 440.0, max_relative = 0.001);
    assert_relative_eq!(note_to_freq("C4").unwrap(), 261.63, max_relative = 0.01);
}

#[test]
fn test_freq_to_note() {
    assert_eq!(freq_to_note(440.0), "A4");
    assert_eq!(freq_to_note(261.63), "C4");
}

#[test]
fn test_note_round_trip() {
    for name in ["C2", "G3", "A4", "D#5"] {
        let freq = note_to_freq(name).unwrap();
        assert_eq!(freq_to_note(freq), name);
    }
}
