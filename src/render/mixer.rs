//! Multi-partial mixer: sums per-partial sample streams into one bundle.

use rayon::prelude::*;
use tracing::debug;

use crate::core::constants::{SamplePaxelBundleInt, SamplePaxelInt};
use crate::render::labels::Labels;
use crate::render::partial::PartialGenerator;

/// Attenuation shift that keeps the sum of `partial_count` full-scale
/// 24-bit partials inside the 24-bit range: `ceil(log2(n))` bits.
fn auto_normalize_shift(partial_count: usize) -> u32 {
    if partial_count <= 1 {
        0
    } else {
        partial_count.next_power_of_two().trailing_zeros()
    }
}

/// Sum per-partial buffers sample-wise into a 32-bit bundle buffer of the
/// longest input's length. With `auto_normalize`, every partial is
/// attenuated by `ceil(log2(n))` bits before summation. Summation wraps,
/// so the mix commutes and associates; the mixer itself never fails.
pub fn mix(buffers: &[Vec<SamplePaxelInt>], auto_normalize: bool) -> Vec<SamplePaxelBundleInt> {
    let length = buffers.iter().map(Vec::len).max().unwrap_or(0);
    let shift = if auto_normalize {
        auto_normalize_shift(buffers.len())
    } else {
        0
    };

    let mut out = vec![0 as SamplePaxelBundleInt; length];
    for buffer in buffers {
        for (mixed, &sample) in out.iter_mut().zip(buffer.iter()) {
            *mixed = mixed.wrapping_add(sample >> shift);
        }
    }

    debug!(
        partials = buffers.len(),
        samples = length,
        shift,
        "mixed partial bundle"
    );
    out
}

/// A group of partials rendered together, with group-level labels.
pub struct MultiPartialGenerator {
    partials: Vec<PartialGenerator>,
    labels: Labels,
    auto_normalize: bool,
}

impl MultiPartialGenerator {
    pub fn new(partials: Vec<PartialGenerator>, labels: Labels, auto_normalize: bool) -> Self {
        Self {
            partials,
            labels,
            auto_normalize,
        }
    }

    /// Render every partial independently (in parallel) and mix.
    pub fn render(&self) -> Vec<SamplePaxelBundleInt> {
        let buffers: Vec<Vec<SamplePaxelInt>> = self
            .partials
            .par_iter()
            .map(|partial| partial.render())
            .collect();
        mix(&buffers, self.auto_normalize)
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn partial_count(&self) -> usize {
        self.partials.len()
    }
}
