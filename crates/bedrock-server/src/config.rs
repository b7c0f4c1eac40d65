use bedrock_entity::RuntimeLimits;
use bedrock_game::WorldSettings;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub packs: PacksSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub runtime: RuntimeLimits,
    #[serde(default)]
    pub world: WorldSettings,
    #[serde(default)]
    pub simulation: SimulationSection,
}

#[derive(Debug, Deserialize)]
pub struct PacksSection {
    #[serde(default = "default_packs_directory")]
    pub directory: String,
}

fn default_packs_directory() -> String {
    "packs".into()
}

impl Default for PacksSection {
    fn default() -> Self {
        Self {
            directory: default_packs_directory(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SimulationSection {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    /// Stop after this many ticks. 0 = run until Ctrl+C.
    #[serde(default)]
    pub max_ticks: u64,
    pub seed: Option<u64>,
    /// Entities spawned before the first tick.
    #[serde(default)]
    pub spawn: Vec<SpawnSection>,
    pub natural: Option<NaturalSpawnSection>,
}

fn default_tick_rate_ms() -> u64 {
    50
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            max_ticks: 0,
            seed: None,
            spawn: Vec::new(),
            natural: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpawnSection {
    pub identifier: String,
    #[serde(default = "default_spawn_position")]
    pub position: [f32; 3],
}

fn default_spawn_position() -> [f32; 3] {
    [0.0, 4.0, 0.0]
}

/// Periodic spawn-rule driven spawning at a fixed site.
#[derive(Debug, Clone, Deserialize)]
pub struct NaturalSpawnSection {
    /// Ticks between attempts. 0 disables natural spawning.
    #[serde(default = "default_natural_interval")]
    pub interval: u64,
    #[serde(default = "default_spawn_position")]
    pub position: [f32; 3],
    #[serde(default = "default_light_level")]
    pub light_level: u8,
    #[serde(default)]
    pub is_water: bool,
    #[serde(default = "default_true")]
    pub sky_visible: bool,
    #[serde(default = "default_block_below")]
    pub block_below: String,
    /// Natural spawning stops once this many mobs are alive.
    #[serde(default = "default_mob_cap")]
    pub mob_cap: usize,
}

fn default_natural_interval() -> u64 {
    400
}

fn default_light_level() -> u8 {
    15
}

fn default_true() -> bool {
    true
}

fn default_block_below() -> String {
    "minecraft:grass".into()
}

fn default_mob_cap() -> usize {
    20
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
