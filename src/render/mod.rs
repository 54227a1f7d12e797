//! Rendering layer: expands physical envelopes into PCM samples.
//!
//! A partial renders paxel by paxel, each paxel independently; a group of
//! partials renders partial by partial and mixes by summation. Every
//! render is a pure function of its inputs, so both levels parallelise
//! freely.

pub mod labels;
pub mod mixer;
pub mod partial;
pub mod paxel;

pub use labels::Labels;
pub use mixer::{mix, MultiPartialGenerator};
pub use partial::PartialGenerator;
