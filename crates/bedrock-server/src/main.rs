mod config;
mod simulation;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bedrock_behavior_pack::BehaviorRegistry;
use config::ServerConfig;
use simulation::Simulation;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "server.toml".into());
    let config = match ServerConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Bedrock behavior runtime v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "World: difficulty {:?}, dimension {:?}, biome {}",
        config.world.difficulty, config.world.dimension, config.world.biome
    );

    // Load behavior packs
    let packs_dir = PathBuf::from(&config.packs.directory);
    let behavior_packs = bedrock_behavior_pack::load_all_packs(&packs_dir);
    for pack in &behavior_packs {
        info!(
            "Behavior pack {}: {} entities, {} spawn rules",
            pack.manifest.header.name,
            pack.entities.len(),
            pack.spawn_rules.len()
        );
    }
    let registry = Arc::new(BehaviorRegistry::from_packs(&behavior_packs));
    if registry.is_empty() {
        warn!("No entity definitions loaded from {}", packs_dir.display());
    }
    info!(
        "Registered {} entity definitions, {} spawn rule sets",
        registry.entity_count(),
        registry.all_spawn_rules().count()
    );

    let mut sim = Simulation::new(registry, &config);
    let max_ticks = config.simulation.max_ticks;
    let mut tick_interval =
        tokio::time::interval(Duration::from_millis(config.simulation.tick_rate_ms.max(1)));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                sim.game_tick();
                if max_ticks > 0 && sim.current_tick() >= max_ticks {
                    info!("Reached {max_ticks} ticks");
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    let stats = sim.stats();
    info!(
        "Stopped after {} ticks: {} spawned, {} transformed, {} died, {} alive",
        sim.current_tick(),
        stats.spawned,
        stats.transformed,
        stats.died,
        sim.mob_count()
    );
}
