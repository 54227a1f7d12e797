use std::f64::consts::TAU;

use crate::core::constants::SAMPLE_RATE;

/// Convert a time in seconds to a sample index, truncating towards zero.
/// Seconds are the source of truth for all input times; the sample index
/// is the quantised rendering position.
#[inline]
pub fn seconds_to_samples(time_seconds: f64) -> u64 {
    (time_seconds * SAMPLE_RATE as f64).floor() as u64
}

#[inline]
pub fn samples_to_seconds(time_samples: u64) -> f64 {
    time_samples as f64 / SAMPLE_RATE as f64
}

/// Convert a frequency in Hz to radians per sample.
#[inline]
pub fn normalize_frequency(frequency_hz: f64) -> f64 {
    frequency_hz * TAU / SAMPLE_RATE as f64
}
