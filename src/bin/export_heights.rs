//! Height export binary - samples terrain and biomes around the origin.
//!
//! Usage: cargo run --release --bin export_heights -- [OPTIONS]
//!
//! Options:
//!   --seed <SEED>        World seed (default: 12345)
//!   --size <METERS>      Side length of the sampled square (default: 640)
//!   --resolution <N>     Samples per side (default: 129)
//!   --z <METERS>         World Z of the square's centre (default: 0)
//!   --config <PATH>      World config JSON for terrain and biome tuning
//!   --out <PATH>         Output file (default: heights.json)

use std::path::PathBuf;
use std::time::Instant;

use serde_json::json;

use driftscape::core::logging;
use driftscape::core::types::Result;
use driftscape::scene::WorldConfig;
use driftscape::terrain::{parse_seed, HeightGrid, TerrainHeightField};

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        log::error!("Export failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let config = match parse_str_arg(args, "--config") {
        Some(path) => WorldConfig::load(&PathBuf::from(path))?,
        None => WorldConfig::default(),
    };
    let seed = parse_str_arg(args, "--seed")
        .map(|s| parse_seed(&s))
        .or(config.seed)
        .unwrap_or(driftscape::terrain::noise::DEFAULT_SEED);
    let size = parse_f32_arg(args, "--size").unwrap_or(640.0);
    let resolution = parse_usize_arg(args, "--resolution").unwrap_or(129);
    let center_z = parse_f32_arg(args, "--z").unwrap_or(0.0);
    let out = PathBuf::from(parse_str_arg(args, "--out").unwrap_or_else(|| "heights.json".to_string()));

    log::info!(
        "Exporting {}x{} samples over {}m around z={} (seed {})",
        resolution, resolution, size, center_z, seed
    );
    let start = Instant::now();

    let mut terrain = TerrainHeightField::new(config.terrain.clone(), config.biomes.clone());
    terrain.reseed(seed);

    let center = glam::Vec3::new(0.0, 0.0, center_z);
    let mut grid = HeightGrid::new(resolution, size);
    grid.refresh(&terrain, center);

    let n = grid.resolution();
    let mut biomes = Vec::with_capacity(n * n);
    let mut blends = Vec::with_capacity(n * n);
    for iz in 0..n {
        for ix in 0..n {
            let (lx, lz) = grid.local_xz(ix, iz);
            let sample = terrain.biomes().biome_at(center.x + lx, center.z + lz);
            biomes.push(sample.index);
            blends.push(sample.blend);
        }
    }

    let (min_height, max_height) = grid.bounds();
    let names: Vec<&str> = terrain.biomes().config().biomes.iter().map(|b| b.name.as_str()).collect();
    let document = json!({
        "seed": seed,
        "size": size,
        "resolution": n,
        "center": [center.x, center.z],
        "min_height": min_height,
        "max_height": max_height,
        "biome_names": names,
        "heights": grid.heights(),
        "biomes": biomes,
        "blends": blends,
    });

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&out, serde_json::to_string(&document)?)?;

    log::info!(
        "Wrote {} ({:.1}..{:.1}m) in {:.2}s",
        out.display(),
        min_height,
        max_height,
        start.elapsed().as_secs_f32()
    );
    Ok(())
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
