//! Utility types for VCD.
//!
//! This module contains fundamental types used throughout the library:
//! - [`FrameIntervals`] / [`FrameInterval`] - Frame range algebra
//! - [`Error`] / [`Result`] - Error handling

mod error;
mod frame_intervals;

pub use error::*;
pub use frame_intervals::*;
