use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Audio fragment description (.yaml) to render
    #[arg(value_name = "FRAGMENT_PATH")]
    pub fragment_path: Option<String>,

    /// Frequency in Hz for a quick single-tone render (ignored with a fragment)
    #[arg(short, long, default_value_t = 440.0)]
    pub frequency: f64,

    /// Amplitude in [0.0, 1.0] for a quick single-tone render
    #[arg(short, long, default_value_t = 0.5)]
    pub amplitude: f64,

    /// Duration in seconds for a quick single-tone render
    #[arg(short, long, default_value_t = 2.0)]
    pub duration: f64,

    /// Output WAV file
    #[arg(short, long, default_value = "output.wav")]
    pub output: String,

    /// Sample rate declared in the WAV header (overrides config)
    #[arg(short = 's', long)]
    pub samplerate: Option<u32>,

    /// Path to config TOML
    #[arg(long, default_value = "paxon.toml")]
    pub config: String,
}
