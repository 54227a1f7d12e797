//! Partial renderer: drives one partial through the physical envelope
//! pipeline and renders all of its paxels.

use rayon::prelude::*;
use tracing::debug;

use crate::core::constants::{SamplePaxelInt, SAMPLES_PER_PAXEL};
use crate::envelope::generator::PhysicalEnvelopeGenerator;
use crate::envelope::physical::PhysicalPartialEnvelope;
use crate::envelope::PartialEnvelopes;
use crate::error::Result;
use crate::render::labels::Labels;
use crate::render::paxel::render_paxel;

/// Owns the physical form of one partial and renders it to samples.
pub struct PartialGenerator {
    physical: PhysicalPartialEnvelope,
    labels: Labels,
}

impl PartialGenerator {
    /// Convert `envelopes` into physical form, placing the partial at
    /// `start_time_seconds` within the piece.
    pub fn new(
        envelopes: &PartialEnvelopes,
        labels: Labels,
        start_time_seconds: f64,
    ) -> Result<Self> {
        let physical = PhysicalEnvelopeGenerator::generate(envelopes, start_time_seconds)?;
        Ok(Self { physical, labels })
    }

    /// Render the whole partial as one contiguous buffer of 24-bit
    /// samples, paxels in parallel. The buffer covers the partial's grid
    /// span, so its length is a whole number of paxels.
    pub fn render(&self) -> Vec<SamplePaxelInt> {
        let rendered: Vec<Vec<SamplePaxelInt>> = self
            .physical
            .paxels
            .par_iter()
            .map(|points| render_paxel(points))
            .collect();

        let mut samples = Vec::with_capacity(rendered.len() * SAMPLES_PER_PAXEL as usize);
        for paxel in rendered {
            samples.extend_from_slice(&paxel);
        }

        debug!(
            labels = %self.labels,
            paxels = self.physical.paxels.len(),
            samples = samples.len(),
            "rendered partial"
        );
        samples
    }

    pub fn physical(&self) -> &PhysicalPartialEnvelope {
        &self.physical
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{
        AmplitudeEnvelope, FrequencyEnvelope, PhaseCoordinate, PhaseCoordinates,
    };

    fn one_second_tone() -> PartialEnvelopes {
        PartialEnvelopes::new(
            AmplitudeEnvelope::new(vec![0.4], Vec::new(), Vec::new()).unwrap(),
            FrequencyEnvelope::new(vec![1000.0], Vec::new(), Vec::new()).unwrap(),
            PhaseCoordinates::new(vec![
                PhaseCoordinate::controlled(0.0, 0.0).unwrap(),
                PhaseCoordinate::natural(1.0).unwrap(),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn buffer_length_is_a_whole_number_of_paxels() {
        let generator =
            PartialGenerator::new(&one_second_tone(), Labels::default(), 0.0).unwrap();
        let samples = generator.render();
        assert_eq!(samples.len(), SAMPLES_PER_PAXEL as usize);
    }

    #[test]
    fn parallel_rendering_is_deterministic() {
        let generator =
            PartialGenerator::new(&one_second_tone(), Labels::default(), 0.0).unwrap();
        assert_eq!(generator.render(), generator.render());
    }

    #[test]
    fn labels_are_forwarded() {
        let labels = Labels::new(["fundamental"]).unwrap();
        let generator = PartialGenerator::new(&one_second_tone(), labels, 0.0).unwrap();
        assert!(generator.labels().contains("fundamental"));
    }
}
