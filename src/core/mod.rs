//! Numeric foundations shared by the whole pipeline: application
//! constants, phase arithmetic, time-base conversion and the closed-form
//! cycle-accumulator maths.

pub mod constants;
pub mod cycle;
pub mod phase;
pub mod timebase;
