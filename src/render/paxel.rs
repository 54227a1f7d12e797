//! Paxel renderer: expands one paxel's fused points into PCM samples.

use crate::core::constants::{MAX_SAMPLE_PAXEL_INT, SamplePaxelInt, SAMPLES_PER_PAXEL};
use crate::core::cycle::compute_cycle_accumulator;
use crate::envelope::physical::PhysicalEnvelopePoint;

/// Render one paxel from its local fused points.
///
/// Each fused point opens an interval that runs to the next point (the
/// last interval runs to the end of the paxel); within an interval the
/// amplitude is a linear ramp and the accumulator a closed-form quadratic,
/// so every sample is computed directly from the interval's opening point.
/// Every local sample in [0, paxel size) is assigned exactly once and the
/// output depends only on the input points.
pub fn render_paxel(points: &[PhysicalEnvelopePoint]) -> Vec<SamplePaxelInt> {
    let mut out = vec![0 as SamplePaxelInt; SAMPLES_PER_PAXEL as usize];
    if points.is_empty() {
        return out;
    }
    debug_assert_eq!(points[0].time_samples, 0);

    for (i, current) in points.iter().enumerate() {
        let fill_to = points
            .get(i + 1)
            .map_or(SAMPLES_PER_PAXEL, |next| next.time_samples);

        for sample in current.time_samples..fill_to {
            let n = sample - current.time_samples;
            let amplitude = current.amplitude + current.amplitude_rate * n as f64;
            let accumulator = compute_cycle_accumulator(
                current.cycle_accumulator,
                current.frequency,
                current.frequency_rate,
                n,
            );
            out[sample as usize] =
                (accumulator.sin() * amplitude * MAX_SAMPLE_PAXEL_INT as f64).round()
                    as SamplePaxelInt;
        }
    }

    out
}
