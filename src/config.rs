//! Configuration for the vocals toolkit.
//!
//! Defaults suit voice work: mono capture at 44.1 kHz with a one-second
//! hand-off buffer. A `vocals.toml` file can override the
//! `[audio]` table:
//!
//! ```toml
//! [audio]
//! sample_rate = 48000
//! channels = 1
//! buffer_size = 1024
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VocalsError};
use crate::pitch::note_to_freq;

/// Reference pitch specification
///
/// Can be specified as a frequency in Hz or as a note name, so singers can
/// ask for "A4" without knowing it is 440 Hz.
///
/// # Parsing formats
/// - `440` - frequency in Hz (no suffix)
/// - `440hz` or `440Hz` - frequency in Hz (explicit)
/// - `A4`, `C#3`, `Bb2` - note name, A4 = 440 Hz equal temperament
///
/// # Example
/// ```
/// use vocals::config::ReferencePitch;
///
/// let pitch: ReferencePitch = "A4".parse().unwrap();
/// assert!((pitch.as_hz() - 440.0).abs() < 0.01);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReferencePitch(f32);

impl ReferencePitch {
    /// Create from frequency in Hz
    pub fn from_hz(hz: f32) -> Self {
        Self(hz)
    }

    /// Get frequency in Hz
    pub fn as_hz(&self) -> f32 {
        self.0
    }
}

impl fmt::Display for ReferencePitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}hz", self.0)
    }
}

impl FromStr for ReferencePitch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        // Note names start with a letter; everything else is a frequency.
        if s.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            return note_to_freq(s).map(Self).map_err(|e| e.to_string());
        }

        let num = s
            .strip_suffix("hz")
            .or_else(|| s.strip_suffix("Hz"))
            .or_else(|| s.strip_suffix("HZ"))
            .unwrap_or(s);

        let hz: f32 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid reference pitch: {}", s))?;
        if hz <= 0.0 {
            return Err("reference pitch must be positive".to_string());
        }
        Ok(Self::from_hz(hz))
    }
}

/// Audio input/output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of capture channels; multichannel input is stored interleaved
    pub channels: u16,
    /// Requested hardware buffer size in frames
    pub buffer_size: usize,
}

impl AudioConfig {
    /// Hand-off ring buffer capacity: one second of interleaved audio.
    pub fn ring_capacity(&self) -> usize {
        self.sample_rate as usize * self.channels as usize
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            buffer_size: 1024,
        }
    }
}

/// Top-level configuration, optionally loaded from a TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| VocalsError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        toml::from_str(&text).map_err(|e| VocalsError::Config(format!("{}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_pitch_from_hz() {
        let pitch: ReferencePitch = "440".parse().unwrap();
        assert!((pitch.as_hz() - 440.0).abs() < 0.001);
    }

    #[test]
    fn test_reference_pitch_from_hz_explicit() {
        let pitch: ReferencePitch = "440hz".parse().unwrap();
        assert!((pitch.as_hz() - 440.0).abs() < 0.001);

        let pitch: ReferencePitch = "440Hz".parse().unwrap();
        assert!((pitch.as_hz() - 440.0).abs() < 0.001);
    }

    #[test]
    fn test_reference_pitch_from_note() {
        let pitch: ReferencePitch = "A4".parse().unwrap();
        assert!((pitch.as_hz() - 440.0).abs() < 0.01);

        let pitch: ReferencePitch = "C4".parse().unwrap();
        assert!((pitch.as_hz() - 261.63).abs() < 0.01);
    }

    #[test]
    fn test_reference_pitch_invalid() {
        assert!("H9".parse::<ReferencePitch>().is_err());
        assert!("-100hz".parse::<ReferencePitch>().is_err());
        assert!("0".parse::<ReferencePitch>().is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [audio]
            sample_rate = 48000
            "#,
        )
        .unwrap();
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.audio.channels, 1);
        assert_eq!(config.audio.ring_capacity(), 48000);
    }
}
