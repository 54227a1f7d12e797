//! Audio-fragment ingestion: the YAML description of a group of partials.
//!
//! Schema, mirroring the upstream composition format:
//!
//! ```yaml
//! audio_fragment:
//!   start_time: 0.0
//!   labels: [drone]
//!   partials:
//!     - partial:
//!         labels: [fundamental]
//!         frequency_envelope: {levels: [440.0], times: []}
//!         amplitude_envelope: {levels: [0.5], times: []}
//!         phase_coordinates:  {times: [0.0, 2.0], phases: [0.0, null]}
//! ```
//!
//! A `null` phase denotes natural phase. Curve entries are the tokens
//! `lin`, `exp`, `sine`, `welch`, `step` or a raw curvature number; they
//! are carried through but only linear segments render.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::envelope::{
    AmplitudeEnvelope, EnvelopeCurve, FrequencyEnvelope, PartialEnvelopes, PhaseCoordinate,
    PhaseCoordinates,
};
use crate::error::{Error, Result};
use crate::render::labels::Labels;

/// One partial of a fragment: its envelopes plus descriptive labels.
#[derive(Clone, Debug)]
pub struct FragmentPartial {
    pub labels: Labels,
    pub envelopes: PartialEnvelopes,
}

/// A validated audio fragment: a group of partials starting together at
/// `start_time` seconds within the piece.
#[derive(Clone, Debug)]
pub struct AudioFragment {
    pub start_time: f64,
    pub labels: Labels,
    pub partials: Vec<FragmentPartial>,
}

impl AudioFragment {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let file: FragmentFile = serde_yaml::from_str(text)?;
        file.audio_fragment.validate()
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            Error::invariant("audio_fragment", format!("cannot read {}: {err}", path.display()))
        })?;
        let fragment = Self::from_yaml_str(&text)?;
        debug!(
            path = %path.display(),
            partials = fragment.partials.len(),
            "loaded audio fragment"
        );
        Ok(fragment)
    }
}

#[derive(Debug, Deserialize)]
struct FragmentFile {
    audio_fragment: FragmentNode,
}

#[derive(Debug, Deserialize)]
struct FragmentNode {
    #[serde(default)]
    start_time: f64,
    #[serde(default)]
    labels: Vec<String>,
    partials: Vec<PartialEntry>,
}

#[derive(Debug, Deserialize)]
struct PartialEntry {
    partial: PartialNode,
}

#[derive(Debug, Deserialize)]
struct PartialNode {
    #[serde(default)]
    labels: Vec<String>,
    frequency_envelope: EnvelopeNode,
    amplitude_envelope: EnvelopeNode,
    phase_coordinates: PhaseNode,
}

#[derive(Debug, Deserialize)]
struct EnvelopeNode {
    levels: Vec<f64>,
    #[serde(default)]
    times: Vec<f64>,
    #[serde(default)]
    curves: Vec<CurveToken>,
}

#[derive(Debug, Deserialize)]
struct PhaseNode {
    times: Vec<f64>,
    phases: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CurveToken {
    Name(String),
    Value(f64),
}

impl CurveToken {
    fn resolve(&self) -> Result<EnvelopeCurve> {
        match self {
            Self::Value(v) => Ok(EnvelopeCurve::Numeric(*v)),
            Self::Name(name) => match name.as_str() {
                "lin" => Ok(EnvelopeCurve::Lin),
                "exp" => Ok(EnvelopeCurve::Exp),
                "sine" => Ok(EnvelopeCurve::Sine),
                "welch" => Ok(EnvelopeCurve::Welch),
                "step" => Ok(EnvelopeCurve::Step),
                other => Err(Error::invariant(
                    "curves",
                    format!("unknown envelope curve type \"{other}\""),
                )),
            },
        }
    }
}

impl EnvelopeNode {
    fn resolve_curves(&self) -> Result<Vec<EnvelopeCurve>> {
        self.curves.iter().map(CurveToken::resolve).collect()
    }
}

impl FragmentNode {
    fn validate(self) -> Result<AudioFragment> {
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            return Err(Error::invariant(
                "start_time",
                format!("illegal fragment start time {}", self.start_time),
            ));
        }
        let labels = Labels::new(self.labels)?;

        let mut partials = Vec::with_capacity(self.partials.len());
        for entry in self.partials {
            let node = entry.partial;

            let frequency_envelope = FrequencyEnvelope::new(
                node.frequency_envelope.levels.clone(),
                node.frequency_envelope.times.clone(),
                node.frequency_envelope.resolve_curves()?,
            )?;
            let amplitude_envelope = AmplitudeEnvelope::new(
                node.amplitude_envelope.levels.clone(),
                node.amplitude_envelope.times.clone(),
                node.amplitude_envelope.resolve_curves()?,
            )?;

            if node.phase_coordinates.times.len() != node.phase_coordinates.phases.len() {
                return Err(Error::invariant(
                    "phase_coordinates",
                    format!(
                        "times ({}) and phases ({}) must have the same length",
                        node.phase_coordinates.times.len(),
                        node.phase_coordinates.phases.len()
                    ),
                ));
            }
            let coordinates = node
                .phase_coordinates
                .times
                .iter()
                .zip(node.phase_coordinates.phases.iter())
                .map(|(&time, phase)| match phase {
                    Some(value) => PhaseCoordinate::controlled(time, *value),
                    None => PhaseCoordinate::natural(time),
                })
                .collect::<Result<Vec<_>>>()?;
            let phase_coordinates = PhaseCoordinates::new(coordinates)?;

            partials.push(FragmentPartial {
                labels: Labels::new(node.labels)?,
                envelopes: PartialEnvelopes::new(
                    amplitude_envelope,
                    frequency_envelope,
                    phase_coordinates,
                ),
            });
        }

        Ok(AudioFragment {
            start_time: self.start_time,
            labels,
            partials,
        })
    }
}
