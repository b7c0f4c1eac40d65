//! Headless tick driver: owns the game world and reports what happens in it.

use std::sync::Arc;

use bedrock_behavior_pack::{BehaviorRegistry, Identifier};
use bedrock_game::{GameEvent, GameWorld, SiteConditions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::{NaturalSpawnSection, ServerConfig};

/// Totals reported at shutdown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimulationStats {
    pub spawned: u64,
    pub died: u64,
    pub transformed: u64,
    pub removed: u64,
}

pub struct Simulation {
    game_world: GameWorld,
    natural: Option<(NaturalSpawnSection, SiteConditions)>,
    rng: StdRng,
    stats: SimulationStats,
}

impl Simulation {
    pub fn new(registry: Arc<BehaviorRegistry>, config: &ServerConfig) -> Self {
        let mut game_world = GameWorld::new(
            registry,
            config.runtime,
            config.world.clone(),
            1,
        );
        let rng = match config.simulation.seed {
            Some(seed) => {
                game_world = game_world.with_seed(seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };

        let natural = config
            .simulation
            .natural
            .clone()
            .filter(|n| n.interval > 0)
            .map(|n| {
                let block_below = Identifier::parse(&n.block_below).unwrap_or_else(|| {
                    warn!("Invalid block_below {:?}, using grass", n.block_below);
                    SiteConditions::default().block_below
                });
                let conditions = SiteConditions {
                    light_level: n.light_level.min(15),
                    is_water: n.is_water,
                    sky_visible: n.sky_visible,
                    block_below,
                };
                (n, conditions)
            });

        let mut simulation = Self {
            game_world,
            natural,
            rng,
            stats: SimulationStats::default(),
        };
        for spawn in &config.simulation.spawn {
            let [x, y, z] = spawn.position;
            if simulation.game_world.spawn_mob(&spawn.identifier, x, y, z).is_none() {
                warn!("Cannot spawn {}: no entity definition loaded", spawn.identifier);
            }
        }
        simulation.process_game_events();
        simulation
    }

    pub fn current_tick(&self) -> u64 {
        self.game_world.current_tick()
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    pub fn mob_count(&mut self) -> usize {
        self.game_world.mob_count()
    }

    pub fn game_tick(&mut self) {
        self.game_world.tick();
        self.tick_natural_spawning();
        self.process_game_events();
    }

    fn tick_natural_spawning(&mut self) {
        let Some((section, conditions)) = &self.natural else {
            return;
        };
        if self.game_world.current_tick() % section.interval != 0 {
            return;
        }
        if self.game_world.mob_count() >= section.mob_cap {
            return;
        }
        let [x, y, z] = section.position;
        self.game_world
            .spawn_natural(conditions, (x, y, z), &mut self.rng);
    }

    fn process_game_events(&mut self) {
        let events = self.game_world.drain_events();
        for event in events {
            match event {
                GameEvent::MobSpawned {
                    runtime_id,
                    mob_type,
                    position,
                    health,
                    ..
                } => {
                    self.stats.spawned += 1;
                    info!(
                        "Spawned {mob_type} (runtime id {runtime_id}) at {position:?} with {health} hp"
                    );
                }
                GameEvent::MobMoved {
                    runtime_id,
                    position,
                    ..
                } => {
                    debug!("Mob {runtime_id} moved to {position:?}");
                }
                GameEvent::MobHurt {
                    runtime_id,
                    new_health,
                    ..
                } => {
                    debug!("Mob {runtime_id} hurt, health now {new_health}");
                }
                GameEvent::MobDied { runtime_id, .. } => {
                    self.stats.died += 1;
                    info!("Mob {runtime_id} died");
                }
                GameEvent::EntityRemoved { unique_id } => {
                    self.stats.removed += 1;
                    debug!("Entity {unique_id} removed");
                }
                GameEvent::MobEquipped {
                    runtime_id,
                    slot,
                    item,
                } => {
                    debug!("Mob {runtime_id} equipped {item} in {slot:?}");
                }
                GameEvent::MobIgnited {
                    runtime_id,
                    seconds,
                } => {
                    debug!("Mob {runtime_id} set on fire for {seconds}s");
                }
                GameEvent::MobTransformed {
                    from_unique_id,
                    to_unique_id,
                    identifier,
                } => {
                    self.stats.transformed += 1;
                    info!("Entity {from_unique_id} transformed into {identifier} ({to_unique_id})");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpawnSection;
    use bedrock_behavior_pack::EntityDefinition;

    fn registry() -> Arc<BehaviorRegistry> {
        let mut registry = BehaviorRegistry::new();
        for json in [
            r#"{ "minecraft:entity": { "description": { "identifier": "minecraft:cow" },
                 "components": { "minecraft:movement": { "value": 0.25 } } } }"#,
            r#"{ "minecraft:entity": { "description": { "identifier": "test:pupa" },
                 "components": { "minecraft:transformation": {
                    "into": "minecraft:cow", "delay": 0.5 } } } }"#,
        ] {
            registry.insert_entity(EntityDefinition::parse_json(json).unwrap());
        }
        Arc::new(registry)
    }

    fn config(spawn: &[&str]) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.simulation.seed = Some(1);
        config.simulation.spawn = spawn
            .iter()
            .map(|id| SpawnSection {
                identifier: id.to_string(),
                position: [0.0, 4.0, 0.0],
            })
            .collect();
        config
    }

    #[test]
    fn configured_spawns_are_created() {
        let mut sim = Simulation::new(registry(), &config(&["minecraft:cow", "minecraft:ghast"]));
        assert_eq!(sim.mob_count(), 1);
        assert_eq!(sim.stats().spawned, 1);
        assert_eq!(sim.current_tick(), 0);
    }

    #[test]
    fn transformations_are_counted() {
        let mut sim = Simulation::new(registry(), &config(&["test:pupa"]));
        for _ in 0..10 {
            sim.game_tick();
        }
        let stats = sim.stats();
        assert_eq!(stats.transformed, 1);
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.spawned, 2);
        assert_eq!(sim.mob_count(), 1);
    }
}
