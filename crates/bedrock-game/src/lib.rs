//! Game-side integration of data-driven entities: a bevy_ecs world whose
//! mobs are driven by behavior pack runtimes.

pub mod components;
pub mod environment;
pub mod game_world;
pub mod host;
pub mod spawning;

pub use environment::{SiteConditions, SpawnLocation, WorldClock, WorldSettings};
pub use game_world::{DamageCause, GameEvent, GameWorld, MobSnapshot};
