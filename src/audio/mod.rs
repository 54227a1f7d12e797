//! Audio output boundary: PCM sample-type metadata and the WAV writer.

pub mod sample;
pub mod writer;

pub use sample::AudioSampleType;
pub use writer::WavFileWriter;
