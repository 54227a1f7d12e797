use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::constants::SAMPLE_RATE;

/// Output-side settings: how rendered buffers are written, not how they
/// are computed. The synthesis grid itself is a compile-time constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Sample rate declared in the WAV header.
    #[serde(default = "OutputConfig::default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "OutputConfig::default_channels")]
    pub channels: u16,
    /// Attenuate each partial by ceil(log2(n)) bits before summation.
    #[serde(default = "OutputConfig::default_auto_normalize")]
    pub auto_normalize: bool,
}

impl OutputConfig {
    fn default_sample_rate() -> u32 {
        SAMPLE_RATE
    }
    fn default_channels() -> u16 {
        1
    }
    fn default_auto_normalize() -> bool {
        true
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_rate: Self::default_sample_rate(),
            channels: Self::default_channels(),
            auto_normalize: Self::default_auto_normalize(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// Read the config file if it exists; otherwise write the defaults
    /// there and return them. A malformed file falls back to defaults with
    /// a diagnostic instead of aborting the render.
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        eprintln!("Failed to parse config {path}: {err}. Using defaults.");
                    }
                },
                Err(err) => {
                    eprintln!("Failed to read config {path}: {err}. Using defaults.");
                }
            }
            return Self::default();
        }

        let default_cfg = Self::default();
        match toml::to_string_pretty(&default_cfg) {
            Ok(text) => {
                if let Err(err) = fs::write(path_obj, text) {
                    eprintln!("Failed to write default config to {path}: {err}");
                }
            }
            Err(err) => {
                eprintln!("Failed to serialize default config: {err}");
            }
        }
        default_cfg
    }
}
