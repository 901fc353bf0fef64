//! Collision demo
//!
//! Runs the side-scrolling scene headless for a fixed number of steps and
//! logs collision onsets and culling statistics.
//!
//! Usage: `collision_demo [config.toml|config.ron] [steps] [seed]`

mod scene;

use scene::{Scene, SceneError};
use spatial_engine::foundation::logging;
use spatial_engine::prelude::*;

const DEFAULT_STEPS: u32 = 1800;
const DEFAULT_SEED: u64 = 0x5EED;
const STEP_SECONDS: f32 = 1.0 / 60.0;

fn load_config(path: Option<&str>) -> Result<SpatialConfig, ConfigError> {
    match path {
        Some(path) => {
            log::info!("Loading settings from {path}");
            SpatialConfig::load_validated(path)
        }
        None => {
            log::info!("Using default settings");
            Ok(SpatialConfig::default())
        }
    }
}

fn run(config: &SpatialConfig, steps: u32, seed: u64) -> Result<(), SceneError> {
    let mut scene = Scene::new(config, seed)?;

    for step in 0..steps {
        scene.step(STEP_SECONDS)?;
        if step % 600 == 599 {
            let stats = scene.stats();
            log::info!(
                "Step {}: {} columns passed, {} hits, {} pickups",
                stats.steps, stats.columns_passed, stats.obstacle_hits, stats.pickups
            );
        }
    }

    let stats = scene.stats();
    log::info!(
        "Finished {} steps: {} obstacle hits, {} pickups, peak {} visible objects",
        stats.steps, stats.obstacle_hits, stats.pickups, stats.peak_visible
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    log::info!("Starting collision demo");

    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1).map(String::as_str))?;
    let steps = args.get(2).map(|value| value.parse()).transpose()?.unwrap_or(DEFAULT_STEPS);
    let seed = args.get(3).map(|value| value.parse()).transpose()?.unwrap_or(DEFAULT_SEED);

    if let Err(e) = run(&config, steps, seed) {
        log::error!("Demo failed: {e}");
        return Err(e.into());
    }
    Ok(())
}
