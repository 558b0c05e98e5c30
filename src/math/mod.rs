//! Scalar interpolation and periodic arithmetic

pub mod interp;

pub use interp::{Lerp, approach, circular_distance, positive_mod, smoothstep};
