//! Numeric constants for pitch detection and sample encoding
//!
//! These constants define thresholds used by the pitch estimator and the
//! WAV encoder to keep results stable on real vocal recordings.

/// Lowest fundamental frequency the pitch estimator will search for.
/// Below typical bass vocal range; also bounds the autocorrelation lag window.
pub const MIN_PITCH_HZ: f32 = 50.0;

/// Highest fundamental frequency the pitch estimator will search for.
/// Covers soprano range with headroom for overtones-free synthetic tones.
pub const MAX_PITCH_HZ: f32 = 1500.0;

/// Minimum normalized autocorrelation peak for a block to count as voiced.
/// Blocks below this are treated as noise or silence and yield no estimate.
pub const VOICED_THRESHOLD: f32 = 0.25;

/// Minimum RMS level for a block to be considered at all.
/// Quieter blocks are skipped before any correlation work is done.
pub const SILENCE_RMS_THRESHOLD: f32 = 1e-4;

/// Epsilon for preventing division by zero in parabolic peak interpolation.
pub const INTERPOLATION_EPSILON: f32 = 1e-10;

/// Scale factor between [-1, 1] float samples and 16-bit PCM.
pub const PCM_SCALE: f32 = 32767.0;
