//! Closed-form cycle-accumulator maths.
//!
//! The cycle accumulator is the non-wrapping integral of instantaneous
//! angular frequency, in radians, from the start of a partial. Within one
//! envelope stage the frequency is a linear ramp, so the accumulator is a
//! quadratic in sample time and can be evaluated exactly at any point.

/// Accumulator value `n` samples after a point with accumulator `c0`,
/// frequency `f0` (rad/sample) and frequency rate `f_rate` (rad/sample²):
/// `c0 + f0·n + ½·f_rate·n²`.
#[inline]
pub fn compute_cycle_accumulator(c0: f64, f0: f64, f_rate: f64, n: u64) -> f64 {
    let n = n as f64;
    0.5 * f_rate * n * n + f0 * n + c0
}

/// Accumulator at the end of a stage whose endpoint frequencies are both
/// known exactly. The mean-frequency form `c0 + f0·n + (f1−f0)·n/2` avoids
/// the rounding drift of going through the rate.
#[inline]
pub fn compute_cycle_accumulator_to_exact_end(c0: f64, f0: f64, f1: f64, n: u64) -> f64 {
    let n = n as f64;
    c0 + f0 * n + (f1 - f0) * n / 2.0
}

/// The frequency rate that makes the accumulator hit `c1` exactly `n`
/// samples after a point with accumulator `c0` and frequency `f0`:
/// `2·(c1 − c0 − f0·n)/n²`.
#[inline]
pub fn compute_frequency_rate(c0: f64, f0: f64, c1: f64, n: u64) -> f64 {
    let n = n as f64;
    2.0 * (c1 - c0 - f0 * n) / (n * n)
}
