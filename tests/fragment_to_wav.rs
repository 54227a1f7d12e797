use std::fs;
use std::path::PathBuf;

use paxon::audio::{AudioSampleType, WavFileWriter};
use paxon::fragment::AudioFragment;
use paxon::render::{Labels, MultiPartialGenerator, PartialGenerator};

const FRAGMENT: &str = r#"
audio_fragment:
  start_time: 0.0
  labels: [chord]
  partials:
    - partial:
        labels: [root]
        frequency_envelope:
          levels: [220.0]
        amplitude_envelope:
          levels: [0.5]
        phase_coordinates:
          times: [0.0, 1.0]
          phases: [0.0, null]
    - partial:
        labels: [fifth]
        frequency_envelope:
          levels: [330.0, 440.0]
          times: [0.5]
          curves: [lin]
        amplitude_envelope:
          levels: [0.5, 0.0]
          times: [1.0]
        phase_coordinates:
          times: [0.0, 1.0]
          phases: [1.5707963267948966, null]
"#;

fn unique_path(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!(
        "paxon_fragment_test_{}_{}",
        name,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    p
}

fn render_fragment(text: &str) -> (AudioFragment, Vec<i32>) {
    let fragment = AudioFragment::from_yaml_str(text).unwrap();
    let partials = fragment
        .partials
        .iter()
        .map(|p| PartialGenerator::new(&p.envelopes, p.labels.clone(), fragment.start_time).unwrap())
        .collect();
    let group = MultiPartialGenerator::new(partials, fragment.labels.clone(), true);
    let samples = group.render();
    (fragment, samples)
}

#[test]
fn fragment_renders_and_writes_a_wav_file() {
    let (fragment, samples) = render_fragment(FRAGMENT);
    assert!(fragment.labels.contains("chord"));
    assert_eq!(samples.len(), 96_000);

    let path = unique_path("chord.wav");
    let writer = WavFileWriter::new(96_000, 1).unwrap();
    writer
        .write_int(&path, &samples, AudioSampleType::PaxelBundleInt)
        .unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    assert_eq!(
        u32::from_le_bytes(bytes[40..44].try_into().unwrap()),
        samples.len() as u32 * 4
    );
    assert_eq!(bytes.len(), 44 + samples.len() * 4);

    let _ = fs::remove_file(&path);
}

#[test]
fn starting_phase_from_the_fragment_shapes_the_waveform() {
    let (fragment, _) = render_fragment(FRAGMENT);
    // The second partial starts at π/2: its first rendered sample is at
    // the positive peak of the sine.
    let fifth = &fragment.partials[1];
    let generator =
        PartialGenerator::new(&fifth.envelopes, Labels::default(), 0.0).unwrap();
    let samples = generator.render();
    let expected = (0.5 * 0x7F_FFFF as f64).round() as i32;
    assert!((samples[0] - expected).abs() <= 1, "got {}", samples[0]);
}

#[test]
fn fragment_group_respects_start_time_placement() {
    let text = FRAGMENT.replace("start_time: 0.0", "start_time: 1.25");
    let fragment = AudioFragment::from_yaml_str(&text).unwrap();
    let partial = &fragment.partials[0];
    let generator =
        PartialGenerator::new(&partial.envelopes, partial.labels.clone(), fragment.start_time)
            .unwrap();
    assert_eq!(generator.physical().first_paxel_index, 1);
    // 1.25 s .. 2.25 s covers paxels 1 and 2, with a silent lead-in.
    let samples = generator.render();
    assert_eq!(samples.len(), 2 * 96_000);
    assert!(samples[..24_000].iter().all(|&s| s == 0));
    assert!(samples[24_000..48_000].iter().any(|&s| s != 0));
}
