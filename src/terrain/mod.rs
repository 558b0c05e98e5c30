//! Procedural terrain: noise primitives, elevation, biomes and the sampled grid

pub mod noise;
pub use noise::{NoiseField, coerce_seed, parse_seed};

pub mod generator;
pub use generator::{HeightSampler, TerrainHeightField, TerrainParams};

pub mod biome;
pub use biome::{Biome, BiomeClassifier, BiomeConfig, BiomeSample, TerrainModifier};

pub mod grid;
pub use grid::HeightGrid;
