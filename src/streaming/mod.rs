//! Endless-travel streaming: reference position and coordinate folding

pub mod wrap;

pub use wrap::{wrap, StreamerConfig, WorldStreamer};
