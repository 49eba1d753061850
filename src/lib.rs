//! Facial expression labelling for live video.
//!
//! Each frame runs through face detection, 68-point landmark prediction,
//! a handful of geometric action-unit ratios, and a fixed-priority choice
//! between Happiness, Surprise, Anger and Neutral.

pub mod config;
pub mod error;
pub mod helper;
pub mod modules;
pub mod pipeline;
pub mod utils;

pub use error::{Error, Result};
