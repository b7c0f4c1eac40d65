//! Bedrock behavior pack document model.
//!
//! Parses manifests, entity definitions (components, component groups and
//! event trees) and spawn rules, and provides a loader that scans a pack
//! directory plus a registry that resolves identifiers across packs.

pub mod biome;
pub mod components;
pub mod entity;
pub mod error;
pub mod event;
pub mod filter;
pub mod identifier;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod spawn_rules;
pub mod world;

pub use components::{merge, ComponentSet};
pub use entity::EntityDefinition;
pub use error::PackError;
pub use event::{EventAction, EventNode};
pub use filter::{Filter, FilterTest, Operator};
pub use identifier::Identifier;
pub use loader::{load_all_packs, load_behavior_pack, LoadedBehaviorPack};
pub use registry::BehaviorRegistry;
pub use spawn_rules::{MobCategory, SpawnRules, SpawnSite};
pub use world::{Difficulty, Dimension};
