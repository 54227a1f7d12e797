//! Physical coordinate model: per-parameter coordinates in sample time and
//! the fused envelope point consumed by the paxel renderer.
//!
//! Times are in samples relative to the partial start, frequencies in
//! radians per sample, and the cycle accumulator in non-wrapping radians.

use crate::core::cycle::compute_cycle_accumulator;

/// Amplitude at a sample position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalAmplitudeCoordinate {
    pub amplitude: f64,
    pub time_samples: u64,
}

/// Normalised frequency at a sample position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalFrequencyCoordinate {
    /// Radians per sample.
    pub frequency: f64,
    pub time_samples: u64,
}

/// Phase target at a sample position; `None` means natural phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalPhaseCoordinate {
    pub phase: Option<f64>,
    pub time_samples: u64,
}

/// Per-sample linear amplitude slope between two coordinates.
#[inline]
pub fn amplitude_rate(a: &PhysicalAmplitudeCoordinate, b: &PhysicalAmplitudeCoordinate) -> f64 {
    (b.amplitude - a.amplitude) / (b.time_samples - a.time_samples) as f64
}

/// Per-sample linear frequency slope between two coordinates.
#[inline]
pub fn frequency_rate(a: &PhysicalFrequencyCoordinate, b: &PhysicalFrequencyCoordinate) -> f64 {
    (b.frequency - a.frequency) / (b.time_samples - a.time_samples) as f64
}

/// One fully-determined point of the fused physical envelope.
///
/// The rates are valid for the interval *beginning* at this point and are
/// recomputed at every point, so each inter-point interval can be expanded
/// to samples without looking at any other point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalEnvelopePoint {
    pub time_samples: u64,
    /// Accumulated phase in radians since partial start, non-wrapping.
    pub cycle_accumulator: f64,
    pub frequency: f64,
    pub frequency_rate: f64,
    pub amplitude: f64,
    pub amplitude_rate: f64,
}

impl PhysicalEnvelopePoint {
    /// A silent, frequency-less point used to pad paxels outside the
    /// partial's own extent.
    pub fn silent(time_samples: u64) -> Self {
        Self {
            time_samples,
            cycle_accumulator: 0.0,
            frequency: 0.0,
            frequency_rate: 0.0,
            amplitude: 0.0,
            amplitude_rate: 0.0,
        }
    }
}

/// Create the point lying between `a` and `b` at `time_samples`.
///
/// Amplitude and frequency are interpolated linearly; the accumulator is
/// integrated forward from `a` so it stays consistent with `a`'s rates.
pub fn interpolate(
    a: &PhysicalEnvelopePoint,
    b: &PhysicalEnvelopePoint,
    time_samples: u64,
) -> PhysicalEnvelopePoint {
    debug_assert!(a.time_samples <= time_samples);
    debug_assert!(time_samples <= b.time_samples);

    let ratio =
        (time_samples - a.time_samples) as f64 / (b.time_samples - a.time_samples) as f64;

    PhysicalEnvelopePoint {
        time_samples,
        cycle_accumulator: compute_cycle_accumulator(
            a.cycle_accumulator,
            a.frequency,
            a.frequency_rate,
            time_samples - a.time_samples,
        ),
        frequency: a.frequency + ratio * (b.frequency - a.frequency),
        frequency_rate: a.frequency_rate,
        amplitude: a.amplitude + ratio * (b.amplitude - a.amplitude),
        amplitude_rate: a.amplitude_rate,
    }
}

/// The physical form of one partial, sliced onto the paxel grid.
///
/// Each inner vector holds the fused points of one paxel with sample
/// indices local to that paxel, so paxels can be rendered independently
/// and in parallel. `first_paxel_index` places the first paxel on the
/// absolute grid of the piece. The sample fractions describe how much of
/// the first and last samples the partial actually covers; they are
/// exposed for sub-sample alignment between partials but not yet applied
/// as amplitude weights.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalPartialEnvelope {
    pub paxels: Vec<Vec<PhysicalEnvelopePoint>>,
    pub first_paxel_index: u64,
    pub first_sample_fraction: f64,
    pub last_sample_fraction: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timebase::normalize_frequency;

    #[test]
    fn interpolate_midpoint() {
        let a = PhysicalEnvelopePoint {
            time_samples: 0,
            cycle_accumulator: 0.0,
            frequency: normalize_frequency(1000.0),
            frequency_rate: 0.0,
            amplitude: 0.2,
            amplitude_rate: 0.6 / 1000.0,
        };
        let b = PhysicalEnvelopePoint {
            time_samples: 1000,
            cycle_accumulator: 0.0, // not used by interpolate
            frequency: normalize_frequency(2000.0),
            frequency_rate: 0.0,
            amplitude: 0.8,
            amplitude_rate: 0.0,
        };
        let mid = interpolate(&a, &b, 500);
        assert_eq!(mid.time_samples, 500);
        assert!((mid.amplitude - 0.5).abs() < 1e-12);
        assert!((mid.frequency - normalize_frequency(1500.0)).abs() < 1e-12);
        // Rates carry over from the earlier point.
        assert_eq!(mid.frequency_rate, a.frequency_rate);
        assert_eq!(mid.amplitude_rate, a.amplitude_rate);
        // Accumulator is integrated forward with a's rate (zero here).
        assert!((mid.cycle_accumulator - a.frequency * 500.0).abs() < 1e-9);
    }

    #[test]
    fn interpolate_at_the_endpoints() {
        let a = PhysicalEnvelopePoint::silent(10);
        let b = PhysicalEnvelopePoint {
            time_samples: 20,
            cycle_accumulator: 1.0,
            frequency: 0.1,
            frequency_rate: 0.0,
            amplitude: 1.0,
            amplitude_rate: 0.0,
        };
        let at_a = interpolate(&a, &b, 10);
        assert_eq!(at_a.amplitude, 0.0);
        let at_b = interpolate(&a, &b, 20);
        assert_eq!(at_b.amplitude, 1.0);
    }
}
