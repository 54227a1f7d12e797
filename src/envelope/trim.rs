//! Envelope trimmer: reconciles a ragged `(levels, times)` pair with the
//! partial duration defined by the phase coordinates.
//!
//! Upstream descriptions allow redundant trailing times or levels and
//! envelopes that are shorter or longer than the partial. After trimming,
//! `levels.len() == times.len() + 1` and `sum(times)` equals the target
//! duration.

use crate::error::{Error, Result};

/// Relative tolerance when comparing cumulative segment times with the
/// target duration. Cumulative sums of user-supplied times rarely hit the
/// duration bit-exactly.
const RELATIVE_TOLERANCE: f64 = 1e-12;

pub fn trim_envelope(levels: &mut Vec<f64>, times: &mut Vec<f64>, end_seconds: f64) -> Result<()> {
    if levels.is_empty() {
        return Err(Error::InconsistentEnvelope(
            "cannot trim an envelope with no levels".into(),
        ));
    }
    if end_seconds <= 0.0 {
        return Err(Error::InconsistentEnvelope(format!(
            "target duration {end_seconds} is not positive"
        )));
    }

    // Redundant trailing times: the times define the gaps between levels,
    // so at most levels.len() - 1 of them are meaningful.
    while times.len() >= levels.len() {
        times.pop();
    }
    // Redundant trailing levels.
    while levels.len() > times.len() + 1 {
        levels.pop();
    }
    debug_assert_eq!(levels.len(), times.len() + 1);

    let tolerance = RELATIVE_TOLERANCE * end_seconds;
    let mut total: f64 = times.iter().sum();

    if (total - end_seconds).abs() <= tolerance {
        // Already a fit. Comparing with a tolerance instead of bitwise
        // equality keeps cumulative rounding in user input from growing a
        // spurious sub-sample segment, and leaving the envelope untouched
        // makes trimming idempotent.
        return Ok(());
    }

    if total < end_seconds {
        // Constant extension to the end of the partial.
        times.push(end_seconds - total);
        levels.push(*levels.last().expect("validated non-empty"));
        return Ok(());
    }

    // The envelope overshoots the partial: drop whole segments that start
    // past the end, then shorten the last remaining segment and replace its
    // terminal level by the interpolated value at the cut.
    while total - times.last().expect("non-empty by construction") > end_seconds + tolerance {
        total -= times.pop().expect("checked above");
        levels.pop();
        if times.is_empty() {
            return Err(Error::InconsistentEnvelope(format!(
                "no envelope segment reaches the duration {end_seconds}"
            )));
        }
    }

    let last_time = *times.last().expect("non-empty after the drop loop");
    let segment_start = total - last_time;
    let remaining = end_seconds - segment_start;
    let level_end = *levels.last().expect("matches times");
    let level_start = levels[levels.len() - 2];
    let interpolated = level_start + (level_end - level_start) * (remaining / last_time);

    *times.last_mut().expect("non-empty") = remaining;
    *levels.last_mut().expect("non-empty") = interpolated;

    debug_assert_eq!(levels.len(), times.len() + 1);
    Ok(())
}
