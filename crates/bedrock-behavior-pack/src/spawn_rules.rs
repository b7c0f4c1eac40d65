//! Spawn rules (spawn_rules/*.json) and their placement checks.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::biome;
use crate::error::PackError;
use crate::filter::{Filter, Operator};
use crate::identifier::{self, Identifier};
use crate::world::Difficulty;

#[derive(Debug, Clone, Deserialize)]
pub struct SpawnRulesFile {
    #[serde(default)]
    pub format_version: Option<Value>,
    #[serde(rename = "minecraft:spawn_rules")]
    pub spawn_rules: SpawnRules,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpawnRules {
    pub description: SpawnRulesDescription,
    #[serde(default)]
    pub conditions: Vec<SpawnCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpawnRulesDescription {
    pub identifier: String,
    pub population_control: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpawnCondition {
    #[serde(rename = "minecraft:spawns_on_surface")]
    pub spawns_on_surface: Option<Value>,
    #[serde(rename = "minecraft:spawns_underground")]
    pub spawns_underground: Option<Value>,
    #[serde(rename = "minecraft:spawns_underwater")]
    pub spawns_underwater: Option<Value>,
    #[serde(
        rename = "minecraft:spawns_on_block_filter",
        default,
        deserialize_with = "string_or_list"
    )]
    pub spawns_on_block_filter: Vec<String>,
    #[serde(
        rename = "minecraft:spawns_on_block_prevented_filter",
        default,
        deserialize_with = "string_or_list"
    )]
    pub spawns_on_block_prevented_filter: Vec<String>,
    #[serde(rename = "minecraft:permute_type", default)]
    pub permute_type: Vec<PermuteEntry>,
    #[serde(rename = "minecraft:brightness_filter")]
    pub brightness_filter: Option<BrightnessFilter>,
    #[serde(rename = "minecraft:difficulty_filter")]
    pub difficulty_filter: Option<DifficultyFilter>,
    #[serde(rename = "minecraft:weight")]
    pub weight: Option<SpawnWeight>,
    #[serde(rename = "minecraft:herd")]
    pub herd: Option<Herd>,
    #[serde(rename = "minecraft:density_limit")]
    pub density_limit: Option<DensityLimit>,
    #[serde(rename = "minecraft:biome_filter")]
    pub biome_filter: Option<Filter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermuteEntry {
    pub weight: Option<u32>,
    pub entity_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrightnessFilter {
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub adjust_for_weather: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DifficultyFilter {
    pub min: Option<String>,
    pub max: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpawnWeight {
    pub default: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Herd {
    pub min_size: Option<u32>,
    pub max_size: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DensityLimit {
    pub surface: Option<u32>,
    pub underground: Option<u32>,
}

fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => vec![s],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    })
}

/// Population pool a spawn rule draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MobCategory {
    Creature,
    Monster,
    Ambient,
    WaterCreature,
    WaterAmbient,
    UndergroundWaterCreature,
    Axolotls,
    Misc,
}

impl MobCategory {
    pub fn from_population_control(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Creature;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "monster" | "hostile" => Self::Monster,
            "ambient" => Self::Ambient,
            "water_animal" | "water_creature" => Self::WaterCreature,
            "water_ambient" => Self::WaterAmbient,
            "underground_water_creature" => Self::UndergroundWaterCreature,
            "axolotl" | "axolotls" => Self::Axolotls,
            "misc" => Self::Misc,
            _ => Self::Creature,
        }
    }
}

/// World state at a candidate spawn position.
pub trait SpawnSite {
    /// `None` when the world's difficulty is not one of the four known levels.
    fn difficulty(&self) -> Option<Difficulty>;
    fn light_level(&self) -> u8;
    fn is_water(&self) -> bool;
    fn is_sky_visible(&self) -> bool;
    /// Identifier of the block under the position.
    fn block_below(&self) -> Identifier;
    fn biome(&self) -> Option<Identifier>;
}

/// One resolved spawn registration.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnEntry {
    pub identifier: String,
    pub category: MobCategory,
    pub weight: u32,
    pub min_herd: u32,
    pub max_herd: u32,
}

impl SpawnRulesFile {
    pub fn parse_json(json: &str) -> Result<Self, PackError> {
        serde_json::from_str(json).map_err(PackError::json("spawn rules"))
    }
}

impl SpawnRules {
    pub fn identifier(&self) -> String {
        identifier::normalize(&self.description.identifier)
    }

    pub fn category(&self) -> MobCategory {
        MobCategory::from_population_control(self.description.population_control.as_deref())
    }

    /// Any condition matches; a rule without conditions always matches.
    pub fn matches(&self, site: &dyn SpawnSite) -> bool {
        self.conditions.is_empty() || self.conditions.iter().any(|c| c.matches(site))
    }

    /// Spawn registrations implied by every condition with a positive weight.
    pub fn entries(&self) -> Vec<SpawnEntry> {
        let own = self.identifier();
        let category = self.category();
        self.conditions
            .iter()
            .filter(|c| c.base_weight() > 0)
            .flat_map(|c| {
                let (min_herd, max_herd) = c.herd_size();
                c.targets(&own)
                    .into_iter()
                    .map(move |(identifier, weight)| SpawnEntry {
                        identifier,
                        category,
                        weight,
                        min_herd,
                        max_herd,
                    })
            })
            .collect()
    }
}

impl SpawnCondition {
    pub fn base_weight(&self) -> u32 {
        self.weight.as_ref().and_then(|w| w.default).unwrap_or(0)
    }

    /// `(min, max)` group size with `min >= 1` and `max >= min`.
    pub fn herd_size(&self) -> (u32, u32) {
        let herd = self.herd.as_ref();
        let min = herd.and_then(|h| h.min_size).unwrap_or(1).max(1);
        let max = herd.and_then(|h| h.max_size).unwrap_or(min).max(min);
        (min, max)
    }

    /// Entity ids and weights this condition spawns. Permuted types split the
    /// base weight proportionally, each keeping at least 1.
    pub fn targets(&self, own_identifier: &str) -> Vec<(String, u32)> {
        let base = self.base_weight();
        let permute: Vec<(String, u32)> = self
            .permute_type
            .iter()
            .filter_map(|entry| {
                let weight = entry.weight.filter(|w| *w > 0)?;
                let raw = entry.entity_type.as_deref()?;
                let (id, _) = identifier::split_spawn_event(raw);
                let id = Identifier::parse(id)?;
                Some((id.to_string(), weight))
            })
            .collect();
        if permute.is_empty() {
            return vec![(own_identifier.to_string(), base)];
        }

        let total: u64 = permute.iter().map(|(_, w)| u64::from(*w)).sum::<u64>().max(1);
        permute
            .into_iter()
            .map(|(id, w)| {
                let scaled = (u64::from(base) * u64::from(w) / total).max(1);
                (id, u32::try_from(scaled).unwrap_or(u32::MAX))
            })
            .collect()
    }

    pub fn matches(&self, site: &dyn SpawnSite) -> bool {
        self.matches_difficulty(site)
            && self.matches_brightness(site)
            && self.matches_location(site)
            && self.matches_blocks(site)
            && self.matches_biome(site)
    }

    fn matches_difficulty(&self, site: &dyn SpawnSite) -> bool {
        let (Some(filter), Some(current)) = (&self.difficulty_filter, site.difficulty()) else {
            return true;
        };
        let rank = |raw: &Option<String>, fallback: u8| -> u8 {
            raw.as_deref()
                .and_then(Difficulty::parse)
                .map(Difficulty::rank)
                .unwrap_or(fallback)
        };
        let min = rank(&filter.min, Difficulty::Peaceful.rank());
        let max = rank(&filter.max, Difficulty::Hard.rank());
        (min..=max).contains(&current.rank())
    }

    fn matches_brightness(&self, site: &dyn SpawnSite) -> bool {
        let Some(filter) = &self.brightness_filter else {
            return true;
        };
        let light = f32::from(site.light_level());
        light >= filter.min.unwrap_or(0.0) && light <= filter.max.unwrap_or(15.0)
    }

    fn matches_location(&self, site: &dyn SpawnSite) -> bool {
        if self.spawns_underwater.is_some() && !site.is_water() {
            return false;
        }
        match (
            self.spawns_on_surface.is_some(),
            self.spawns_underground.is_some(),
        ) {
            (true, false) => site.is_sky_visible(),
            (false, true) => !site.is_sky_visible(),
            _ => true,
        }
    }

    fn matches_blocks(&self, site: &dyn SpawnSite) -> bool {
        if self.spawns_on_block_filter.is_empty() && self.spawns_on_block_prevented_filter.is_empty() {
            return true;
        }
        let below = site.block_below();
        let allowed = self.spawns_on_block_filter.is_empty()
            || self
                .spawns_on_block_filter
                .iter()
                .any(|raw| block_matches(raw, &below));
        allowed
            && !self
                .spawns_on_block_prevented_filter
                .iter()
                .any(|raw| block_matches(raw, &below))
    }

    fn matches_biome(&self, site: &dyn SpawnSite) -> bool {
        match (&self.biome_filter, site.biome()) {
            (Some(filter), Some(biome)) => biome_filter_matches(filter, &biome),
            _ => true,
        }
    }
}

/// `raw` names the full id, the bare path, or another namespace with the same path.
fn block_matches(raw: &str, block: &Identifier) -> bool {
    let raw = raw.trim().to_ascii_lowercase();
    match raw.split_once(':') {
        Some((_, path)) => raw == block.to_string() || path == block.path(),
        None => raw == block.path(),
    }
}

/// Evaluate a biome filter. Tests other than `is_biome` and `has_biome_tag`
/// cannot be answered for a biome alone and pass.
pub fn biome_filter_matches(filter: &Filter, biome: &Identifier) -> bool {
    match filter {
        Filter::AllOf(children) => children.iter().all(|c| biome_filter_matches(c, biome)),
        Filter::AnyOf(children) => children.iter().any(|c| biome_filter_matches(c, biome)),
        Filter::NoneOf(children) => !children.iter().any(|c| biome_filter_matches(c, biome)),
        Filter::Leaf(test) => {
            let Some(value) = test.value.as_ref().and_then(Value::as_str) else {
                return true;
            };
            let matched = match test.test.as_str() {
                "is_biome" => biome::matches_id(biome, value),
                "has_biome_tag" => biome::matches_tag(biome, value),
                _ => return true,
            };
            match test.operator {
                Operator::NotEqual => !matched,
                _ => matched,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Site {
        difficulty: Option<Difficulty>,
        light: u8,
        water: bool,
        sky: bool,
        below: &'static str,
        biome: Option<&'static str>,
    }

    impl Default for Site {
        fn default() -> Self {
            Site {
                difficulty: Some(Difficulty::Normal),
                light: 15,
                water: false,
                sky: true,
                below: "minecraft:grass_block",
                biome: Some("minecraft:plains"),
            }
        }
    }

    impl SpawnSite for Site {
        fn difficulty(&self) -> Option<Difficulty> {
            self.difficulty
        }
        fn light_level(&self) -> u8 {
            self.light
        }
        fn is_water(&self) -> bool {
            self.water
        }
        fn is_sky_visible(&self) -> bool {
            self.sky
        }
        fn block_below(&self) -> Identifier {
            Identifier::parse(self.below).unwrap()
        }
        fn biome(&self) -> Option<Identifier> {
            self.biome.and_then(Identifier::parse)
        }
    }

    const ZOMBIE_RULES: &str = r#"{
        "format_version": "1.8.0",
        "minecraft:spawn_rules": {
            "description": { "identifier": "minecraft:zombie", "population_control": "monster" },
            "conditions": [
                {
                    "minecraft:spawns_on_surface": {},
                    "minecraft:spawns_underground": {},
                    "minecraft:brightness_filter": { "min": 0, "max": 7, "adjust_for_weather": true },
                    "minecraft:difficulty_filter": { "min": "easy", "max": "hard" },
                    "minecraft:weight": { "default": 100 },
                    "minecraft:herd": { "min_size": 2, "max_size": 4 },
                    "minecraft:permute_type": [
                        { "weight": 95 },
                        { "weight": 5, "entity_type": "minecraft:zombie_villager_v2" }
                    ],
                    "minecraft:biome_filter": { "test": "has_biome_tag", "value": "monster" }
                }
            ]
        }
    }"#;

    fn zombie() -> SpawnRules {
        SpawnRulesFile::parse_json(ZOMBIE_RULES).unwrap().spawn_rules
    }

    #[test]
    fn parse_and_categorize() {
        let rules = zombie();
        assert_eq!(rules.identifier(), "minecraft:zombie");
        assert_eq!(rules.category(), MobCategory::Monster);
        assert_eq!(rules.conditions.len(), 1);
        assert_eq!(rules.conditions[0].herd_size(), (2, 4));
    }

    #[test]
    fn population_control_mapping() {
        use MobCategory::*;
        assert_eq!(MobCategory::from_population_control(None), Creature);
        assert_eq!(MobCategory::from_population_control(Some("animal")), Creature);
        assert_eq!(MobCategory::from_population_control(Some("Hostile")), Monster);
        assert_eq!(MobCategory::from_population_control(Some("water_animal")), WaterCreature);
        assert_eq!(MobCategory::from_population_control(Some("axolotl")), Axolotls);
        assert_eq!(
            MobCategory::from_population_control(Some("underground_water_creature")),
            UndergroundWaterCreature
        );
    }

    #[test]
    fn condition_checks() {
        let rules = zombie();
        let dark = Site {
            light: 3,
            ..Site::default()
        };
        assert!(rules.matches(&dark));
        assert!(!rules.matches(&Site::default()));
        assert!(!rules.matches(&Site {
            difficulty: Some(Difficulty::Peaceful),
            ..dark
        }));
        assert!(rules.matches(&Site {
            light: 3,
            difficulty: None,
            ..Site::default()
        }));
        assert!(!rules.matches(&Site {
            light: 3,
            biome: Some("minecraft:nether_wastes"),
            ..Site::default()
        }));
        assert!(rules.matches(&Site {
            light: 3,
            biome: None,
            ..Site::default()
        }));
    }

    #[test]
    fn surface_and_underwater_flags() {
        let cond = SpawnCondition {
            spawns_on_surface: Some(Value::Object(Default::default())),
            ..SpawnCondition::default()
        };
        assert!(cond.matches(&Site::default()));
        assert!(!cond.matches(&Site {
            sky: false,
            ..Site::default()
        }));

        let cond = SpawnCondition {
            spawns_underwater: Some(Value::Object(Default::default())),
            ..SpawnCondition::default()
        };
        assert!(!cond.matches(&Site::default()));
        assert!(cond.matches(&Site {
            water: true,
            ..Site::default()
        }));
    }

    #[test]
    fn block_filters() {
        let cond = SpawnCondition {
            spawns_on_block_filter: vec!["grass_block".into(), "minecraft:sand".into()],
            spawns_on_block_prevented_filter: vec!["custom:sand".into()],
            ..SpawnCondition::default()
        };
        assert!(cond.matches(&Site::default()));
        assert!(!cond.matches(&Site {
            below: "minecraft:stone",
            ..Site::default()
        }));
        assert!(!cond.matches(&Site {
            below: "minecraft:sand",
            ..Site::default()
        }));
    }

    #[test]
    fn block_filter_accepts_single_string() {
        let json = r#"{ "minecraft:spawns_on_block_filter": "minecraft:stone" }"#;
        let cond: SpawnCondition = serde_json::from_str(json).unwrap();
        assert_eq!(cond.spawns_on_block_filter, vec!["minecraft:stone"]);
    }

    #[test]
    fn permute_targets_split_weight() {
        let rules = zombie();
        let targets = rules.conditions[0].targets("minecraft:zombie");
        assert_eq!(targets, vec![("minecraft:zombie_villager_v2".to_string(), 100)]);

        let entries = rules.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, MobCategory::Monster);
        assert_eq!((entries[0].min_herd, entries[0].max_herd), (2, 4));
    }

    #[test]
    fn permute_weights_keep_at_least_one() {
        let cond = SpawnCondition {
            weight: Some(SpawnWeight { default: Some(3) }),
            permute_type: vec![
                PermuteEntry {
                    weight: Some(99),
                    entity_type: Some("husk".into()),
                },
                PermuteEntry {
                    weight: Some(1),
                    entity_type: Some("stray<minecraft:spawn_event>".into()),
                },
            ],
            ..SpawnCondition::default()
        };
        assert_eq!(
            cond.targets("minecraft:zombie"),
            vec![
                ("minecraft:husk".to_string(), 2),
                ("minecraft:stray".to_string(), 1)
            ]
        );
    }

    #[test]
    fn no_permute_uses_own_identifier() {
        let cond = SpawnCondition {
            weight: Some(SpawnWeight { default: Some(8) }),
            ..SpawnCondition::default()
        };
        assert_eq!(cond.targets("custom:slug"), vec![("custom:slug".to_string(), 8)]);
    }

    #[test]
    fn zero_weight_conditions_register_nothing() {
        let json = r#"{
            "minecraft:spawn_rules": {
                "description": { "identifier": "custom:slug" },
                "conditions": [ { "minecraft:weight": { "default": 0 } }, {} ]
            }
        }"#;
        let rules = SpawnRulesFile::parse_json(json).unwrap().spawn_rules;
        assert!(rules.entries().is_empty());
        assert_eq!(rules.category(), MobCategory::Creature);
    }

    #[test]
    fn biome_filter_tree() {
        let filter = Filter::from_value(&serde_json::json!({
            "any_of": [
                { "test": "is_biome", "value": "desert" },
                { "all_of": [
                    { "test": "has_biome_tag", "value": "ocean" },
                    { "test": "has_biome_tag", "operator": "!=", "value": "deep" }
                ]}
            ]
        }));
        let id = |s| Identifier::parse(s).unwrap();
        assert!(biome_filter_matches(&filter, &id("minecraft:desert")));
        assert!(biome_filter_matches(&filter, &id("minecraft:warm_ocean")));
        assert!(!biome_filter_matches(&filter, &id("minecraft:deep_ocean")));
        assert!(!biome_filter_matches(&filter, &id("minecraft:plains")));
    }
}
