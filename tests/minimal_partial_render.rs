use paxon::core::constants::{MAX_SAMPLE_PAXEL_INT, SAMPLES_PER_PAXEL};
use paxon::envelope::{
    AmplitudeEnvelope, FrequencyEnvelope, PartialEnvelopes, PhaseCoordinate, PhaseCoordinates,
};
use paxon::render::{Labels, PartialGenerator};

fn minimal_partial() -> PartialEnvelopes {
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
fn one_second_tone_renders_one_paxel() {
    let generator = PartialGenerator::new(&minimal_partial(), Labels::default(), 0.0).unwrap();
    assert_eq!(generator.physical().first_paxel_index, 0);

    let samples = generator.render();
    assert_eq!(samples.len(), SAMPLES_PER_PAXEL as usize);
}

#[test]
fn waveform_matches_the_analytic_sine() {
    let generator = PartialGenerator::new(&minimal_partial(), Labels::default(), 0.0).unwrap();
    let samples = generator.render();

    // Starts on the controlled zero phase.
    assert_eq!(samples[0], 0);

    // 1000 Hz at 96 kHz has a 96-sample cycle: the quarter-cycle sample
    // carries the full envelope amplitude.
    let peak = (0.4 * MAX_SAMPLE_PAXEL_INT as f64).round() as i32;
    assert_eq!(samples[24], peak);

    // A quarter of a second is exactly 250 cycles, back at phase zero.
    assert!(samples[24_000].abs() <= 1, "got {}", samples[24_000]);

    // Every complete cycle starts near zero again.
    for cycle in 0..1000 {
        let s = samples[cycle * 96];
        assert!(s.abs() <= 2, "cycle {cycle} starts at {s}");
    }
}

#[test]
fn amplitude_envelope_bounds_the_waveform() {
    let generator = PartialGenerator::new(&minimal_partial(), Labels::default(), 0.0).unwrap();
    let samples = generator.render();
    let bound = (0.4 * MAX_SAMPLE_PAXEL_INT as f64).round() as i32;
    assert!(samples.iter().all(|s| s.abs() <= bound));
    // And the bound is actually reached.
    assert!(samples.iter().any(|s| s.abs() == bound));
}
