//! Two populations with hidden values drift into place through noisy
//! pairwise comparisons.
//!
//! [`engine::Simulation`] owns the state and runs one tick at a time,
//! [`driver::Driver`] repeats ticks on a cadence and [`render`] holds the
//! consumers of the per-tick [`engine::Frame`].

pub mod config;
pub mod driver;
pub mod engine;
pub mod model;
pub mod render;
pub mod rule;
pub mod sampler;
