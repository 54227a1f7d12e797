//! WAV file writer for rendered sample buffers.
//!
//! Produces canonical RIFF/WAVE PCM via `hound`: 16-byte fmt chunk,
//! audio format 1, little-endian data. 24-bit samples are written as the
//! three low-order bytes of their i32 value.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use crate::audio::sample::AudioSampleType;
use crate::core::constants::{SamplePaxelBundleInt, SamplePaxelFp};
use crate::error::{Error, Result};

/// Writes mono or multi-channel PCM files at a configured sample rate.
#[derive(Clone, Copy, Debug)]
pub struct WavFileWriter {
    sample_rate: u32,
    channels: u16,
}

impl WavFileWriter {
    pub fn new(sample_rate: u32, channels: u16) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::invariant("sample_rate", "sample rate must be positive"));
        }
        if channels == 0 {
            return Err(Error::invariant("channels", "at least one channel is required"));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Write an integer buffer with the interpretation given by
    /// `sample_type`. `Scaled` applies the ÷4 bundle attenuation while
    /// writing; `PaxelFp` and `FullRange` have no integer data path.
    pub fn write_int(
        &self,
        path: impl AsRef<Path>,
        samples: &[SamplePaxelBundleInt],
        sample_type: AudioSampleType,
    ) -> Result<()> {
        let path = path.as_ref();
        match sample_type {
            AudioSampleType::PaxelInt | AudioSampleType::PaxelBundleInt => {
                self.write_samples(path, sample_type, samples.iter().copied())
            }
            AudioSampleType::Scaled => {
                self.write_samples(path, sample_type, samples.iter().map(|&s| s / 4))
            }
            AudioSampleType::PaxelFp | AudioSampleType::FullRange => {
                Err(Error::UnsupportedSampleType(sample_type))
            }
        }
    }

    /// Write an FP32 buffer.
    pub fn write_fp(&self, path: impl AsRef<Path>, samples: &[SamplePaxelFp]) -> Result<()> {
        self.write_samples(path.as_ref(), AudioSampleType::PaxelFp, samples.iter().copied())
    }

    fn write_samples<S>(
        &self,
        path: &Path,
        sample_type: AudioSampleType,
        samples: impl ExactSizeIterator<Item = S>,
    ) -> Result<()>
    where
        S: hound::Sample + Copy,
    {
        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: sample_type.bit_depth(),
            sample_format: match sample_type {
                AudioSampleType::PaxelFp => SampleFormat::Float,
                _ => SampleFormat::Int,
            },
        };
        let io_error = |source| Error::Io {
            path: path.display().to_string(),
            source,
        };

        let sample_count = samples.len();
        let mut writer = WavWriter::create(path, spec).map_err(io_error)?;
        for sample in samples {
            writer.write_sample(sample).map_err(io_error)?;
        }
        // The writer's file handle is released on drop even when
        // finalization fails.
        writer.finalize().map_err(io_error)?;

        info!(
            path = %path.display(),
            samples = sample_count,
            bits = sample_type.bit_depth(),
            "wrote wav file"
        );
        Ok(())
    }
}
