//! World-level state the behavior runtime queries: difficulty, dimension,
//! biome and the day cycle.

use bedrock_behavior_pack::{Difficulty, Dimension, Identifier, SpawnSite};
use bevy_ecs::prelude::*;
use serde::Deserialize;

/// Ticks in a full day/night cycle.
pub const DEFAULT_DAY_LENGTH: u64 = 24_000;

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub difficulty: Difficulty,
    pub dimension: Dimension,
    pub biome: String,
    /// Time of day at tick 0.
    pub start_time: u64,
    pub day_length: u64,
    pub raining: bool,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            dimension: Dimension::Overworld,
            biome: "minecraft:plains".into(),
            start_time: 0,
            day_length: DEFAULT_DAY_LENGTH,
            raining: false,
        }
    }
}

impl WorldSettings {
    pub fn biome_id(&self) -> Option<Identifier> {
        Identifier::parse(&self.biome)
    }
}

/// Current time of day in ticks.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct WorldClock {
    pub time: u64,
}

impl WorldClock {
    pub fn new(start_time: u64) -> Self {
        Self { time: start_time }
    }

    pub fn advance(&mut self) {
        self.time = self.time.wrapping_add(1);
    }

    /// The first half of each cycle is day.
    pub fn is_day(&self, day_length: u64) -> bool {
        let length = day_length.max(2);
        self.time % length < length / 2
    }
}

/// Block-level state at a candidate spawn position.
#[derive(Debug, Clone)]
pub struct SiteConditions {
    pub light_level: u8,
    pub is_water: bool,
    pub sky_visible: bool,
    pub block_below: Identifier,
}

impl Default for SiteConditions {
    fn default() -> Self {
        Self {
            light_level: 15,
            is_water: false,
            sky_visible: true,
            block_below: Identifier::new("minecraft", "grass"),
        }
    }
}

/// A candidate spawn position: world settings plus the caller's block state.
#[derive(Debug, Clone, Copy)]
pub struct SpawnLocation<'a> {
    pub settings: &'a WorldSettings,
    pub conditions: &'a SiteConditions,
}

impl SpawnSite for SpawnLocation<'_> {
    fn difficulty(&self) -> Option<Difficulty> {
        Some(self.settings.difficulty)
    }

    fn light_level(&self) -> u8 {
        self.conditions.light_level
    }

    fn is_water(&self) -> bool {
        self.conditions.is_water
    }

    fn is_sky_visible(&self) -> bool {
        self.conditions.sky_visible
    }

    fn block_below(&self) -> Identifier {
        self.conditions.block_below.clone()
    }

    fn biome(&self) -> Option<Identifier> {
        self.settings.biome_id()
    }
}
