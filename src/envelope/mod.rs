//! Logical envelope model: the composer-facing description of a partial.
//!
//! An envelope is a piecewise-linear trajectory given as levels and the
//! times (in seconds) between them. Phase coordinates are target values,
//! not an envelope: they pin the accumulated phase at specific moments and
//! also define where the partial begins and ends. All types here are
//! immutable after construction; constructors validate invariants and fail
//! fast with a domain error.

use std::f64::consts::TAU;

use tracing::warn;

use crate::core::constants::{MAX_AUDIO_FREQUENCY_HZ, MIN_AUDIO_FREQUENCY_HZ};
use crate::core::timebase::seconds_to_samples;
use crate::error::{Error, Result};

pub mod generator;
pub mod physical;
pub mod trim;

/// Curve shape of one envelope segment. Parsed and carried for
/// compatibility with upstream descriptions; only `Lin` renders, the other
/// shapes are reserved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnvelopeCurve {
    Lin,
    Exp,
    Sine,
    Welch,
    Step,
    Numeric(f64),
}

/// A generic piecewise-linear envelope.
///
/// `times` may be ragged relative to `levels` (extra trailing entries on
/// either side); the trimmer reconciles them against the phase-defined
/// duration before rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub levels: Vec<f64>,
    pub times_seconds: Vec<f64>,
    pub times_samples: Vec<u64>,
    pub curves: Vec<EnvelopeCurve>,
}

impl Envelope {
    pub fn new(levels: Vec<f64>, times: Vec<f64>, curves: Vec<EnvelopeCurve>) -> Result<Self> {
        if levels.is_empty() {
            return Err(Error::invariant("levels", "an envelope needs at least one level"));
        }
        if let Some(bad) = levels.iter().find(|l| !l.is_finite()) {
            return Err(Error::invariant("levels", format!("non-finite level {bad}")));
        }
        if let Some(bad) = times.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(Error::invariant("times", format!("illegal segment time {bad}")));
        }

        let times_samples = times.iter().map(|&t| seconds_to_samples(t)).collect();
        Ok(Self {
            levels,
            times_seconds: times,
            times_samples,
            curves,
        })
    }

}

/// Envelope for the frequency of a partial, levels in Hz.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyEnvelope {
    pub envelope: Envelope,
}

impl FrequencyEnvelope {
    pub fn new(levels: Vec<f64>, times: Vec<f64>, curves: Vec<EnvelopeCurve>) -> Result<Self> {
        let envelope = Envelope::new(levels, times, curves)?;
        if let Some(bad) = envelope.levels.iter().find(|l| **l <= 0.0) {
            return Err(Error::invariant(
                "frequency_envelope.levels",
                format!("frequency must be strictly positive, got {bad}"),
            ));
        }
        for level in &envelope.levels {
            if !(MIN_AUDIO_FREQUENCY_HZ..=MAX_AUDIO_FREQUENCY_HZ).contains(level) {
                warn!(frequency_hz = level, "frequency outside the audio range");
            }
        }
        Ok(Self { envelope })
    }
}

/// Envelope for the amplitude of a partial, levels in [-1, 1]. Negative
/// levels correspond to phase inversion.
#[derive(Clone, Debug, PartialEq)]
pub struct AmplitudeEnvelope {
    pub envelope: Envelope,
}

impl AmplitudeEnvelope {
    pub fn new(levels: Vec<f64>, times: Vec<f64>, curves: Vec<EnvelopeCurve>) -> Result<Self> {
        let envelope = Envelope::new(levels, times, curves)?;
        if let Some(bad) = envelope.levels.iter().find(|l| !(-1.0..=1.0).contains(*l)) {
            return Err(Error::invariant(
                "amplitude_envelope.levels",
                format!("amplitude must lie in [-1, 1], got {bad}"),
            ));
        }
        Ok(Self { envelope })
    }
}

/// A moment in a partial where phase is pinned.
///
/// A *controlled* coordinate carries a target phase in [0, 2π] that the
/// accumulator must hit (modulo 2π) at that time. A *natural* coordinate
/// (`phase == None`) means "whatever phase the partial reaches here" and
/// serves as an anchor from which no phase control is wanted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseCoordinate {
    pub time_seconds: f64,
    pub time_samples: u64,
    pub phase: Option<f64>,
}

impl PhaseCoordinate {
    pub fn controlled(time_seconds: f64, phase: f64) -> Result<Self> {
        if !time_seconds.is_finite() || time_seconds < 0.0 {
            return Err(Error::invariant(
                "phase_coordinates.times",
                format!("illegal coordinate time {time_seconds}"),
            ));
        }
        if !phase.is_finite() || !(0.0..=TAU).contains(&phase) {
            return Err(Error::invariant(
                "phase_coordinates.phases",
                format!("phase {phase} at time {time_seconds} is outside [0, 2π]"),
            ));
        }
        Ok(Self {
            time_seconds,
            time_samples: seconds_to_samples(time_seconds),
            phase: Some(phase),
        })
    }

    pub fn natural(time_seconds: f64) -> Result<Self> {
        if !time_seconds.is_finite() || time_seconds <= 0.0 {
            return Err(Error::invariant(
                "phase_coordinates.times",
                format!("natural phase is not allowed at time {time_seconds}"),
            ));
        }
        Ok(Self {
            time_seconds,
            time_samples: seconds_to_samples(time_seconds),
            phase: None,
        })
    }

    #[inline]
    pub fn is_natural(&self) -> bool {
        self.phase.is_none()
    }
}

/// All phase coordinates of a partial, in time order. The first coordinate
/// must sit at t = 0 with a defined phase; the last coordinate defines the
/// end of the partial.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseCoordinates {
    pub coordinates: Vec<PhaseCoordinate>,
}

impl PhaseCoordinates {
    pub fn new(coordinates: Vec<PhaseCoordinate>) -> Result<Self> {
        if coordinates.len() < 2 {
            return Err(Error::invariant(
                "phase_coordinates",
                "at least start and end phase coordinates are required",
            ));
        }
        let first = &coordinates[0];
        if first.time_seconds != 0.0 {
            return Err(Error::invariant(
                "phase_coordinates.times",
                format!("first coordinate must be at time 0, got {}", first.time_seconds),
            ));
        }
        if first.is_natural() {
            return Err(Error::invariant(
                "phase_coordinates.phases",
                "first coordinate must carry a defined phase",
            ));
        }
        for pair in coordinates.windows(2) {
            if pair[1].time_seconds <= pair[0].time_seconds {
                return Err(Error::invariant(
                    "phase_coordinates.times",
                    format!(
                        "coordinate times must be strictly ascending ({} then {})",
                        pair[0].time_seconds, pair[1].time_seconds
                    ),
                ));
            }
            // Sub-sample spacing would leave a zero-length compensation
            // interval, which has no meaningful phase distribution.
            if pair[1].time_samples <= pair[0].time_samples {
                return Err(Error::invariant(
                    "phase_coordinates.times",
                    format!(
                        "coordinates at {}s and {}s land on the same sample",
                        pair[0].time_seconds, pair[1].time_seconds
                    ),
                ));
            }
        }
        Ok(Self { coordinates })
    }

    /// End of the partial in seconds, defined by the last coordinate.
    #[inline]
    pub fn end_seconds(&self) -> f64 {
        self.coordinates.last().expect("validated non-empty").time_seconds
    }

    /// End of the partial in samples relative to the partial start.
    #[inline]
    pub fn end_samples(&self) -> u64 {
        self.coordinates.last().expect("validated non-empty").time_samples
    }
}

/// The complete logical description of one partial.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialEnvelopes {
    pub amplitude_envelope: AmplitudeEnvelope,
    pub frequency_envelope: FrequencyEnvelope,
    pub phase_coordinates: PhaseCoordinates,
}

impl PartialEnvelopes {
    pub fn new(
        amplitude_envelope: AmplitudeEnvelope,
        frequency_envelope: FrequencyEnvelope,
        phase_coordinates: PhaseCoordinates,
    ) -> Self {
        // The three parts validate themselves on construction.
        Self {
            amplitude_envelope,
            frequency_envelope,
            phase_coordinates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_rejects_empty_levels() {
        assert!(Envelope::new(Vec::new(), Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn envelope_rejects_negative_times() {
        assert!(Envelope::new(vec![1.0, 0.5], vec![-1.0], Vec::new()).is_err());
    }

    #[test]
    fn envelope_allows_ragged_times() {
        // Extra trailing times are legal; the trimmer removes them later.
        let env = Envelope::new(vec![1.0], vec![0.5, 0.25], Vec::new()).unwrap();
        assert_eq!(env.times_samples, vec![48_000, 24_000]);
    }

    #[test]
    fn frequency_envelope_rejects_non_positive_levels() {
        assert!(FrequencyEnvelope::new(vec![440.0, 0.0], vec![1.0], Vec::new()).is_err());
        assert!(FrequencyEnvelope::new(vec![-440.0], Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn amplitude_envelope_rejects_out_of_range_levels() {
        assert!(AmplitudeEnvelope::new(vec![1.5], Vec::new(), Vec::new()).is_err());
        assert!(AmplitudeEnvelope::new(vec![-0.5, 0.5], vec![1.0], Vec::new()).is_ok());
    }

    #[test]
    fn phase_coordinate_validation() {
        assert!(PhaseCoordinate::controlled(0.0, 0.0).is_ok());
        assert!(PhaseCoordinate::controlled(0.0, TAU).is_ok());
        assert!(PhaseCoordinate::controlled(0.0, TAU + 0.1).is_err());
        assert!(PhaseCoordinate::controlled(-1.0, 0.0).is_err());
        assert!(PhaseCoordinate::natural(0.0).is_err());
        assert!(PhaseCoordinate::natural(1.0).is_ok());
    }

    #[test]
    fn coordinates_must_start_controlled_at_zero() {
        let natural_first = vec![
            PhaseCoordinate::natural(1.0).unwrap(),
            PhaseCoordinate::natural(2.0).unwrap(),
        ];
        assert!(PhaseCoordinates::new(natural_first).is_err());

        let late_first = vec![
            PhaseCoordinate::controlled(0.5, 0.0).unwrap(),
            PhaseCoordinate::natural(2.0).unwrap(),
        ];
        assert!(PhaseCoordinates::new(late_first).is_err());
    }

    #[test]
    fn coordinates_must_ascend() {
        let out_of_order = vec![
            PhaseCoordinate::controlled(0.0, 0.0).unwrap(),
            PhaseCoordinate::natural(2.0).unwrap(),
            PhaseCoordinate::natural(1.0).unwrap(),
        ];
        assert!(PhaseCoordinates::new(out_of_order).is_err());
    }

    #[test]
    fn coordinates_on_the_same_sample_are_rejected() {
        let too_close = vec![
            PhaseCoordinate::controlled(0.0, 0.0).unwrap(),
            PhaseCoordinate::natural(1e-7).unwrap(),
            PhaseCoordinate::natural(1.0).unwrap(),
        ];
        assert!(PhaseCoordinates::new(too_close).is_err());
    }

    #[test]
    fn end_of_partial_comes_from_the_last_coordinate() {
        let coords = PhaseCoordinates::new(vec![
            PhaseCoordinate::controlled(0.0, 0.0).unwrap(),
            PhaseCoordinate::natural(5.5).unwrap(),
        ])
        .unwrap();
        assert_eq!(coords.end_seconds(), 5.5);
        assert_eq!(coords.end_samples(), 528_000);
    }
}
