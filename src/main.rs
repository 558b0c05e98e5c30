//! Driftscape - headless traversal
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   World config JSON (default: built-in)
//!   --seed <SEED>     World seed; unparseable values fall back to a generated seed
//!   --frames <N>      Frames to simulate (default: 600)
//!   --dt <SECONDS>    Fixed frame step (default: 1/60)
//!   --pulse           Drive the audio response with a synthetic beat
//!
//! Prints a JSON summary of the final frame to stdout.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

use driftscape::core::audio::AudioEnvelope;
use driftscape::core::logging;
use driftscape::core::time::FrameClock;
use driftscape::core::types::Result;
use driftscape::scene::{EntityKind, SceneManager, SceneStats, WorldConfig};
use driftscape::terrain::parse_seed;

#[derive(Serialize)]
struct RunSummary {
    frames: u64,
    simulated_seconds: f32,
    wall_ms: u128,
    #[serde(flatten)]
    stats: SceneStats,
    entities: BTreeMap<String, usize>,
    camera: [f32; 3],
}

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let mut config = match parse_path_arg(args, "--config") {
        Some(path) => WorldConfig::load(&path)?,
        None => WorldConfig::default(),
    };
    if let Some(raw) = parse_str_arg(args, "--seed") {
        config.seed = Some(parse_seed(&raw));
    }
    let frames = parse_u64_arg(args, "--frames").unwrap_or(600);
    let dt = parse_f32_arg(args, "--dt").unwrap_or(1.0 / 60.0);
    let pulse = args.iter().any(|a| a == "--pulse");

    let mut scene = SceneManager::new(config)?;
    log::info!(
        "Driftscape: seed={}, frames={}, dt={:.4}s{}",
        scene.seed(),
        frames,
        dt,
        if pulse { ", audio pulse" } else { "" }
    );

    // Fixed-step clock; the clamp still applies to oversized --dt values
    let mut clock = FrameClock::new(0.1);
    let step = Duration::from_secs_f32(dt.max(0.0).min(1.0));
    let frames_per_report = ((1.0 / dt.max(1e-4)).round() as u64).max(1);
    let start = Instant::now();

    for _ in 0..frames {
        let mut input = clock.advance(step);
        if pulse {
            input = input.with_audio(synthetic_beat(input.elapsed));
        }
        scene.update(&input);

        if clock.frame_count() % frames_per_report == 0 {
            let stats = scene.stats();
            log::info!(
                "t={:.1}s dist={:.0} biome={} ({:.2}) decorations={} effects={} cam_y={:.1}",
                clock.elapsed_secs(),
                stats.distance,
                stats.biome,
                stats.biome_blend,
                stats.visible_decorations,
                stats.active_effects,
                stats.camera_height,
            );
        }
    }

    let mut entities = BTreeMap::new();
    for view in scene.entity_views() {
        let key = match view.kind {
            EntityKind::Decoration(kind) => format!("{:?}", kind).to_lowercase(),
            EntityKind::ShootingStar => "shooting_star".to_string(),
            EntityKind::Lightning => "lightning".to_string(),
            EntityKind::LightPillar => "light_pillar".to_string(),
        };
        *entities.entry(key).or_insert(0) += 1;
    }

    let pose = scene.camera_pose();
    let summary = RunSummary {
        frames: clock.frame_count(),
        simulated_seconds: clock.elapsed_secs(),
        wall_ms: start.elapsed().as_millis(),
        stats: scene.stats(),
        entities,
        camera: pose.position.to_array(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Two-beat kick with a slower shimmer on the high band.
fn synthetic_beat(t: f32) -> AudioEnvelope {
    let kick = (1.0 - (t * 2.0).fract()).powi(3);
    let mid = 0.5 + 0.5 * (t * 0.7).sin();
    let high = 0.5 + 0.5 * (t * 3.1).sin();
    AudioEnvelope::new(kick, mid * 0.6, high * 0.8)
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_path_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    parse_str_arg(args, flag).map(PathBuf::from)
}
