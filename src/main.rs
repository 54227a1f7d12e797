use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use paxon::audio::{AudioSampleType, WavFileWriter};
use paxon::cli::Args;
use paxon::config::AppConfig;
use paxon::envelope::{
    AmplitudeEnvelope, FrequencyEnvelope, PartialEnvelopes, PhaseCoordinate, PhaseCoordinates,
};
use paxon::fragment::AudioFragment;
use paxon::render::{Labels, MultiPartialGenerator, PartialGenerator};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AppConfig::load_or_default(&args.config);
    let sample_rate = args.samplerate.unwrap_or(config.output.sample_rate);

    let generator = match &args.fragment_path {
        Some(path) => fragment_generator(path, config.output.auto_normalize)
            .with_context(|| format!("loading fragment {path}"))?,
        None => quick_tone_generator(&args, config.output.auto_normalize)?,
    };

    info!(partials = generator.partial_count(), "rendering");
    let samples = generator.render();

    let writer = WavFileWriter::new(sample_rate, config.output.channels)?;
    writer
        .write_int(&args.output, &samples, AudioSampleType::PaxelBundleInt)
        .with_context(|| format!("writing {}", args.output))?;

    info!(output = %args.output, samples = samples.len(), "done");
    Ok(())
}

fn fragment_generator(path: &str, auto_normalize: bool) -> Result<MultiPartialGenerator> {
    let fragment = AudioFragment::from_yaml_file(path)?;
    let mut partials = Vec::with_capacity(fragment.partials.len());
    for partial in &fragment.partials {
        partials.push(PartialGenerator::new(
            &partial.envelopes,
            partial.labels.clone(),
            fragment.start_time,
        )?);
    }
    Ok(MultiPartialGenerator::new(
        partials,
        fragment.labels.clone(),
        auto_normalize,
    ))
}

/// A constant tone from the `-f/-a/-d` flags, for quick listening tests.
fn quick_tone_generator(args: &Args, auto_normalize: bool) -> Result<MultiPartialGenerator> {
    let envelopes = PartialEnvelopes::new(
        AmplitudeEnvelope::new(vec![args.amplitude], Vec::new(), Vec::new())?,
        FrequencyEnvelope::new(vec![args.frequency], Vec::new(), Vec::new())?,
        PhaseCoordinates::new(vec![
            PhaseCoordinate::controlled(0.0, 0.0)?,
            PhaseCoordinate::natural(args.duration)?,
        ])?,
    );
    let partial = PartialGenerator::new(&envelopes, Labels::new(["quick-tone"])?, 0.0)?;
    Ok(MultiPartialGenerator::new(
        vec![partial],
        Labels::default(),
        auto_normalize,
    ))
}
