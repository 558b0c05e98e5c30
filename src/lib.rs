//! Driftscape - an endless procedural landscape core
//!
//! Terrain, biomes, world wrapping, pooled effects and a terrain-following
//! camera, advanced one frame at a time by [`scene::SceneManager`].

pub mod core;
pub mod math;
pub mod terrain;
pub mod streaming;
pub mod effects;
pub mod scene;
