//! Small standalone helpers shared across the supply pipeline.

pub mod jitter;

pub use jitter::{generate_jitter_ms, generate_jitter_percent};
