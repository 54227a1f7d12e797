//! Paxel-based additive synthesis.
//!
//! A partial is described logically by an amplitude envelope, a frequency
//! envelope and a set of phase coordinates. The envelope generator fuses
//! the three into a single physical envelope whose cycle accumulator hits
//! every controlled phase target exactly, then slices it onto a grid of
//! fixed-size paxels that render independently. Rendered partials are
//! summed into composite signals and written as PCM WAV files.

pub mod audio;
pub mod cli;
pub mod config;
pub mod core;
pub mod envelope;
pub mod error;
pub mod fragment;
pub mod render;

pub use error::{Error, Result};
