//! Physical envelope generator: fuses the amplitude envelope, frequency
//! envelope and phase coordinates of a partial into one ordered list of
//! physical points, applies phase-coherence compensation, and slices the
//! result onto the paxel grid.
//!
//! The fuse walks the three coordinate sequences with one iterator each,
//! always advancing to the nearest upcoming breakpoint, so every envelope
//! breakpoint and phase coordinate becomes a fused point and every fused
//! point carries the exact rates for the interval it opens. Phase
//! compensation then shifts the cycle accumulator towards each controlled
//! target, spreading the shift linearly across the intervening points and
//! rewriting the per-interval frequency rates so accumulator and rates
//! stay mutually consistent. Amplitude and frequency values are never
//! touched by compensation.

use tracing::debug;

use crate::core::constants::{SAMPLES_PER_PAXEL, SAMPLE_RATE};
use crate::core::cycle::{
    compute_cycle_accumulator, compute_cycle_accumulator_to_exact_end, compute_frequency_rate,
};
use crate::core::phase::coherence_compensation;
use crate::core::timebase::{normalize_frequency, seconds_to_samples};
use crate::envelope::physical::{
    amplitude_rate, frequency_rate, interpolate, PhysicalAmplitudeCoordinate,
    PhysicalEnvelopePoint, PhysicalFrequencyCoordinate, PhysicalPartialEnvelope,
    PhysicalPhaseCoordinate,
};
use crate::envelope::trim::trim_envelope;
use crate::envelope::PartialEnvelopes;
use crate::error::{Error, Result};

/// The fused physical envelope of one partial on its own timeline
/// (sample 0 is the partial start), before grid placement.
#[derive(Clone, Debug, PartialEq)]
pub struct FusedEnvelope {
    /// Fused points, strictly ascending in sample time. The first point is
    /// at sample 0, the last at the partial's end sample.
    pub points: Vec<PhysicalEnvelopePoint>,
    /// Indices into `points`, one per input phase coordinate, in order.
    pub phase_anchors: Vec<usize>,
}

/// Converts the logical description of a partial into physical form.
pub struct PhysicalEnvelopeGenerator {
    amplitude_coords: Vec<PhysicalAmplitudeCoordinate>,
    frequency_coords: Vec<PhysicalFrequencyCoordinate>,
    phase_coords: Vec<PhysicalPhaseCoordinate>,
    end_sample: u64,
}

impl PhysicalEnvelopeGenerator {
    /// Fuse the three envelopes of `partial` into a single physical
    /// envelope with phase compensation applied.
    pub fn fuse(partial: &PartialEnvelopes) -> Result<FusedEnvelope> {
        let generator = Self::prepare(partial)?;
        let mut fused = generator.sweep();
        generator.compensate_phase(&mut fused);

        debug!(
            points = fused.points.len(),
            anchors = fused.phase_anchors.len(),
            end_sample = generator.end_sample,
            "fused physical envelope"
        );
        Ok(fused)
    }

    /// Full conversion: fuse, then slice onto the paxel grid with the
    /// partial placed at `start_time_seconds` in the piece.
    pub fn generate(
        partial: &PartialEnvelopes,
        start_time_seconds: f64,
    ) -> Result<PhysicalPartialEnvelope> {
        if !start_time_seconds.is_finite() || start_time_seconds < 0.0 {
            return Err(Error::invariant(
                "start_time",
                format!("illegal partial start time {start_time_seconds}"),
            ));
        }
        let fused = Self::fuse(partial)?;
        Ok(slice_onto_grid(
            fused,
            start_time_seconds,
            partial.phase_coordinates.end_seconds(),
        ))
    }

    fn prepare(partial: &PartialEnvelopes) -> Result<Self> {
        let end_seconds = partial.phase_coordinates.end_seconds();
        let end_sample = partial.phase_coordinates.end_samples();

        let mut amplitude_levels = partial.amplitude_envelope.envelope.levels.clone();
        let mut amplitude_times = partial.amplitude_envelope.envelope.times_seconds.clone();
        trim_envelope(&mut amplitude_levels, &mut amplitude_times, end_seconds)?;

        let mut frequency_levels = partial.frequency_envelope.envelope.levels.clone();
        let mut frequency_times = partial.frequency_envelope.envelope.times_seconds.clone();
        trim_envelope(&mut frequency_levels, &mut frequency_times, end_seconds)?;

        let amplitude_coords = breakpoint_samples(&amplitude_times, end_sample)
            .into_iter()
            .zip(amplitude_levels.iter())
            .map(|(time_samples, &amplitude)| PhysicalAmplitudeCoordinate {
                amplitude,
                time_samples,
            })
            .collect::<Vec<_>>();
        let amplitude_coords = dedup_coords(amplitude_coords, |c| c.time_samples);

        let frequency_coords = breakpoint_samples(&frequency_times, end_sample)
            .into_iter()
            .zip(frequency_levels.iter())
            .map(|(time_samples, &hz)| PhysicalFrequencyCoordinate {
                frequency: normalize_frequency(hz),
                time_samples,
            })
            .collect::<Vec<_>>();
        let frequency_coords = dedup_coords(frequency_coords, |c| c.time_samples);

        let phase_coords = partial
            .phase_coordinates
            .coordinates
            .iter()
            .map(|c| PhysicalPhaseCoordinate {
                phase: c.phase,
                time_samples: c.time_samples,
            })
            .collect();

        Ok(Self {
            amplitude_coords,
            frequency_coords,
            phase_coords,
            end_sample,
        })
    }

    /// One pass over the three coordinate sequences, emitting a fused
    /// point at every breakpoint of any of them.
    fn sweep(&self) -> FusedEnvelope {
        let amp = self.amplitude_coords.as_slice();
        let freq = self.frequency_coords.as_slice();
        let phase = self.phase_coords.as_slice();

        let amp_rate_from = |i: usize| {
            if i + 1 < amp.len() {
                amplitude_rate(&amp[i], &amp[i + 1])
            } else {
                0.0
            }
        };
        let freq_rate_from = |i: usize| {
            if i + 1 < freq.len() {
                frequency_rate(&freq[i], &freq[i + 1])
            } else {
                0.0
            }
        };

        let mut points = Vec::with_capacity(amp.len() + freq.len() + phase.len());
        let mut anchors = Vec::with_capacity(phase.len());

        let mut ai = 0;
        let mut fi = 0;
        let mut current_amp_rate = amp_rate_from(0);
        let mut current_freq_rate = freq_rate_from(0);
        // Accumulator snapshot at the most recent frequency breakpoint;
        // integrating each fused point from the snapshot rather than from
        // its predecessor keeps rounding from accumulating point-to-point.
        let mut last_freq_accumulator = 0.0;

        points.push(PhysicalEnvelopePoint {
            time_samples: 0,
            cycle_accumulator: 0.0,
            frequency: freq[0].frequency,
            frequency_rate: current_freq_rate,
            amplitude: amp[0].amplitude,
            amplitude_rate: current_amp_rate,
        });
        anchors.push(0);
        let mut pi = 1;

        loop {
            let next_amp = amp.get(ai + 1).map_or(u64::MAX, |c| c.time_samples);
            let next_freq = freq.get(fi + 1).map_or(u64::MAX, |c| c.time_samples);
            let next_phase = phase[pi].time_samples;
            let next = next_amp.min(next_freq).min(next_phase);

            let mut amplitude =
                amp[ai].amplitude + current_amp_rate * (next - amp[ai].time_samples) as f64;
            let samples_since_freq = next - freq[fi].time_samples;
            let mut frequency_now =
                freq[fi].frequency + current_freq_rate * samples_since_freq as f64;
            let mut accumulator = compute_cycle_accumulator(
                last_freq_accumulator,
                freq[fi].frequency,
                current_freq_rate,
                samples_since_freq,
            );

            if next == next_freq {
                // At a frequency breakpoint both endpoint frequencies are
                // known exactly; the mean-frequency form avoids drift.
                accumulator = compute_cycle_accumulator_to_exact_end(
                    last_freq_accumulator,
                    freq[fi].frequency,
                    freq[fi + 1].frequency,
                    samples_since_freq,
                );
                fi += 1;
                frequency_now = freq[fi].frequency;
                current_freq_rate = freq_rate_from(fi);
                last_freq_accumulator = accumulator;
            }
            if next == next_amp {
                ai += 1;
                amplitude = amp[ai].amplitude;
                current_amp_rate = amp_rate_from(ai);
            }

            points.push(PhysicalEnvelopePoint {
                time_samples: next,
                cycle_accumulator: accumulator,
                frequency: frequency_now,
                frequency_rate: current_freq_rate,
                amplitude,
                amplitude_rate: current_amp_rate,
            });
            if next == next_phase {
                anchors.push(points.len() - 1);
                pi += 1;
            }
            if next == self.end_sample {
                break;
            }
        }

        debug_assert_eq!(anchors.len(), phase.len());
        debug_assert_eq!(*anchors.last().expect("at least two"), points.len() - 1);
        FusedEnvelope {
            points,
            phase_anchors: anchors,
        }
    }

    /// Walk the phase anchors and shift the accumulator so every
    /// controlled coordinate is hit exactly, without discontinuities.
    fn compensate_phase(&self, fused: &mut FusedEnvelope) {
        let points = &mut fused.points;
        let anchors = &fused.phase_anchors;
        let mut cumulative_shift = 0.0;

        // A non-zero starting phase pre-loads the accumulator.
        if let Some(p0) = self.phase_coords[0].phase {
            if p0 != 0.0 {
                cumulative_shift = p0;
                points[anchors[0]].cycle_accumulator = p0;
            }
        }

        for (k, window) in anchors.windows(2).enumerate() {
            let (anchor_prev, anchor_curr) = (window[0], window[1]);
            let delta = match self.phase_coords[k + 1].phase {
                None => 0.0,
                Some(target) => coherence_compensation(
                    points[anchor_curr].cycle_accumulator + cumulative_shift,
                    target,
                ),
            };

            if cumulative_shift != 0.0 || delta != 0.0 {
                let span =
                    (points[anchor_curr].time_samples - points[anchor_prev].time_samples) as f64;
                let anchor_prev_time = points[anchor_prev].time_samples;
                for idx in (anchor_prev + 1)..=anchor_curr {
                    let fraction =
                        (points[idx].time_samples - anchor_prev_time) as f64 / span;
                    points[idx].cycle_accumulator += cumulative_shift + delta * fraction;
                    // The interval before this point now spans a different
                    // amount of phase; rewrite its rate so rendering the
                    // interval forward still lands on the new accumulator.
                    let previous = points[idx - 1];
                    points[idx - 1].frequency_rate = compute_frequency_rate(
                        previous.cycle_accumulator,
                        previous.frequency,
                        points[idx].cycle_accumulator,
                        points[idx].time_samples - previous.time_samples,
                    );
                }
            }
            cumulative_shift += delta;
        }
    }
}

/// Sample positions of envelope breakpoints given the per-segment times.
/// The first breakpoint is at sample 0 and the last is pinned to the
/// partial's end sample; interior breakpoints are clamped to the end.
fn breakpoint_samples(times: &[f64], end_sample: u64) -> Vec<u64> {
    let mut samples = Vec::with_capacity(times.len() + 1);
    samples.push(0);
    let mut cumulative = 0.0;
    for (i, t) in times.iter().enumerate() {
        cumulative += t;
        let sample = if i == times.len() - 1 {
            end_sample
        } else {
            seconds_to_samples(cumulative).min(end_sample)
        };
        samples.push(sample);
    }
    samples
}

/// Collapse coordinates that land on the same sample, keeping the later
/// one, so every interval between consecutive coordinates has a non-zero
/// length and finite rates.
fn dedup_coords<C>(coords: Vec<C>, time: impl Fn(&C) -> u64) -> Vec<C> {
    let mut out: Vec<C> = Vec::with_capacity(coords.len());
    for coord in coords {
        match out.last() {
            Some(last) if time(last) == time(&coord) => {
                *out.last_mut().expect("just matched") = coord;
            }
            _ => out.push(coord),
        }
    }
    out
}

/// Place a fused envelope at `start_time_seconds` and slice it onto the
/// paxel grid. Every paxel's point list starts at local sample 0 and can
/// be rendered independently.
fn slice_onto_grid(
    fused: FusedEnvelope,
    start_time_seconds: f64,
    duration_seconds: f64,
) -> PhysicalPartialEnvelope {
    const PAXEL: u64 = SAMPLES_PER_PAXEL;

    let start_sample = seconds_to_samples(start_time_seconds);
    let end_sample = start_sample + fused.points.last().expect("non-empty").time_samples;

    let first_paxel_index = start_sample / PAXEL;
    let grid_offset = start_sample - first_paxel_index * PAXEL;
    let last_paxel_index = if end_sample % PAXEL == 0 {
        end_sample / PAXEL - 1
    } else {
        end_sample / PAXEL
    };

    // Absolute-time working list, padded with silence where the paxel grid
    // extends beyond the partial itself.
    let mut absolute = Vec::with_capacity(fused.points.len() + 2);
    if grid_offset > 0 {
        absolute.push(PhysicalEnvelopePoint::silent(first_paxel_index * PAXEL));
    }
    absolute.extend(fused.points.into_iter().map(|mut p| {
        p.time_samples += start_sample;
        p
    }));
    if end_sample % PAXEL != 0 {
        absolute.push(PhysicalEnvelopePoint::silent(end_sample + 1));
    }

    let mut paxels = Vec::with_capacity((last_paxel_index - first_paxel_index + 1) as usize);
    let mut i = 0;
    for k in first_paxel_index..=last_paxel_index {
        let window_start = k * PAXEL;
        let window_end = window_start + PAXEL;
        let mut local = Vec::new();

        if absolute[i].time_samples > window_start {
            // The partial crosses this paxel boundary between two fused
            // points; synthesise the boundary point so the paxel is
            // self-contained.
            debug_assert!(i > 0);
            let boundary = interpolate(&absolute[i - 1], &absolute[i], window_start);
            local.push(to_local(boundary, window_start));
        }
        while i < absolute.len() && absolute[i].time_samples < window_end {
            local.push(to_local(absolute[i], window_start));
            i += 1;
        }
        paxels.push(local);
    }

    let start_position = start_time_seconds * SAMPLE_RATE as f64;
    let end_position = (start_time_seconds + duration_seconds) * SAMPLE_RATE as f64;

    PhysicalPartialEnvelope {
        paxels,
        first_paxel_index,
        first_sample_fraction: 1.0 - start_position.fract(),
        last_sample_fraction: end_position.fract(),
    }
}

fn to_local(mut point: PhysicalEnvelopePoint, window_start: u64) -> PhysicalEnvelopePoint {
    point.time_samples -= window_start;
    point
}
