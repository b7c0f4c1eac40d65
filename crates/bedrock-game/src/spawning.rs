//! Natural spawning from spawn rules.

use bedrock_behavior_pack::spawn_rules::SpawnEntry;
use bedrock_behavior_pack::{BehaviorRegistry, SpawnSite};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::debug;

use crate::environment::{SiteConditions, SpawnLocation, WorldSettings};
use crate::game_world::{Behaviors, GameWorld};

/// Spawn registrations whose rules match `site` and whose entity is loaded.
/// Rules are visited in identifier order so results are stable.
pub fn spawn_candidates(registry: &BehaviorRegistry, site: &dyn SpawnSite) -> Vec<SpawnEntry> {
    let mut rules: Vec<_> = registry.all_spawn_rules().collect();
    rules.sort_by_key(|r| r.identifier());
    rules
        .into_iter()
        .filter(|r| r.matches(site))
        .flat_map(|r| r.entries())
        .filter(|e| registry.entity(&e.identifier).is_some())
        .collect()
}

/// Pick one entry by weight.
pub fn choose_entry<'a, R: Rng + ?Sized>(entries: &'a [SpawnEntry], rng: &mut R) -> Option<&'a SpawnEntry> {
    let dist = WeightedIndex::new(entries.iter().map(|e| e.weight)).ok()?;
    entries.get(dist.sample(rng))
}

pub fn herd_size<R: Rng + ?Sized>(entry: &SpawnEntry, rng: &mut R) -> u32 {
    let min = entry.min_herd.max(1);
    rng.gen_range(min..=entry.max_herd.max(min))
}

impl GameWorld {
    /// Spawn one herd chosen from the rules that match `conditions` at
    /// `position`. Returns `(unique_id, runtime_id)` for every spawned entity.
    pub fn spawn_natural<R: Rng + ?Sized>(
        &mut self,
        conditions: &SiteConditions,
        position: (f32, f32, f32),
        rng: &mut R,
    ) -> Vec<(i64, u64)> {
        let settings: WorldSettings = self.settings().clone();
        let site = SpawnLocation {
            settings: &settings,
            conditions,
        };
        let registry = self.world.resource::<Behaviors>().registry.clone();
        let candidates = spawn_candidates(&registry, &site);
        let Some(entry) = choose_entry(&candidates, rng) else {
            debug!("No spawn rule matches at {position:?}");
            return Vec::new();
        };
        let count = herd_size(entry, rng);
        debug!(count, "Natural spawn of {}", entry.identifier);
        (0..count)
            .filter_map(|_| self.spawn_mob(&entry.identifier, position.0, position.1, position.2))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bedrock_behavior_pack::spawn_rules::SpawnRulesFile;
    use bedrock_behavior_pack::{Difficulty, EntityDefinition, Identifier};
    use bedrock_entity::RuntimeLimits;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn entity(id: &str) -> EntityDefinition {
        EntityDefinition::parse_json(&format!(
            r#"{{ "minecraft:entity": {{ "description": {{ "identifier": "{id}" }}, "components": {{}} }} }}"#
        ))
        .unwrap()
    }

    fn rules(json: &str) -> bedrock_behavior_pack::SpawnRules {
        SpawnRulesFile::parse_json(json).unwrap().spawn_rules
    }

    fn registry() -> BehaviorRegistry {
        let mut registry = BehaviorRegistry::new();
        registry.insert_entity(entity("minecraft:zombie"));
        registry.insert_entity(entity("minecraft:cow"));
        registry.insert_spawn_rules(rules(
            r#"{ "minecraft:spawn_rules": {
                "description": { "identifier": "minecraft:zombie", "population_control": "monster" },
                "conditions": [ {
                    "minecraft:brightness_filter": { "min": 0, "max": 7 },
                    "minecraft:difficulty_filter": { "min": "easy", "max": "hard" },
                    "minecraft:weight": { "default": 100 },
                    "minecraft:herd": { "min_size": 2, "max_size": 4 }
                } ] } }"#,
        ));
        registry.insert_spawn_rules(rules(
            r#"{ "minecraft:spawn_rules": {
                "description": { "identifier": "minecraft:cow", "population_control": "animal" },
                "conditions": [ {
                    "minecraft:brightness_filter": { "min": 7, "max": 15 },
                    "minecraft:weight": { "default": 8 }
                } ] } }"#,
        ));
        registry.insert_spawn_rules(rules(
            r#"{ "minecraft:spawn_rules": {
                "description": { "identifier": "minecraft:ghost" },
                "conditions": [ { "minecraft:weight": { "default": 50 } } ] } }"#,
        ));
        registry
    }

    fn site(settings: &WorldSettings, light: u8) -> (WorldSettings, SiteConditions) {
        (
            settings.clone(),
            SiteConditions {
                light_level: light,
                ..SiteConditions::default()
            },
        )
    }

    #[test]
    fn candidates_follow_light_level() {
        let registry = registry();
        let (settings, dark) = site(&WorldSettings::default(), 0);
        let ids: Vec<String> = spawn_candidates(
            &registry,
            &SpawnLocation {
                settings: &settings,
                conditions: &dark,
            },
        )
        .into_iter()
        .map(|e| e.identifier)
        .collect();
        assert_eq!(ids, vec!["minecraft:zombie".to_string()]);

        let (settings, bright) = site(&WorldSettings::default(), 15);
        let ids: Vec<String> = spawn_candidates(
            &registry,
            &SpawnLocation {
                settings: &settings,
                conditions: &bright,
            },
        )
        .into_iter()
        .map(|e| e.identifier)
        .collect();
        assert_eq!(ids, vec!["minecraft:cow".to_string()]);
    }

    #[test]
    fn peaceful_blocks_monsters() {
        let registry = registry();
        let peaceful = WorldSettings {
            difficulty: Difficulty::Peaceful,
            ..WorldSettings::default()
        };
        let (settings, dark) = site(&peaceful, 0);
        let candidates = spawn_candidates(
            &registry,
            &SpawnLocation {
                settings: &settings,
                conditions: &dark,
            },
        );
        assert!(candidates.is_empty());
    }

    #[test]
    fn weighted_choice_and_herd() {
        let mut rng = StdRng::seed_from_u64(7);
        let entries = vec![
            SpawnEntry {
                identifier: "minecraft:a".into(),
                category: bedrock_behavior_pack::MobCategory::Creature,
                weight: 0,
                min_herd: 1,
                max_herd: 1,
            },
            SpawnEntry {
                identifier: "minecraft:b".into(),
                category: bedrock_behavior_pack::MobCategory::Creature,
                weight: 5,
                min_herd: 2,
                max_herd: 3,
            },
        ];
        for _ in 0..20 {
            let entry = choose_entry(&entries, &mut rng).unwrap();
            assert_eq!(entry.identifier, "minecraft:b");
            assert!((2..=3).contains(&herd_size(entry, &mut rng)));
        }
        assert!(choose_entry(&[], &mut rng).is_none());
    }

    #[test]
    fn natural_spawn_creates_a_herd() {
        let mut world = GameWorld::new(
            Arc::new(registry()),
            RuntimeLimits::default(),
            WorldSettings::default(),
            1,
        );
        let mut rng = StdRng::seed_from_u64(3);
        let dark = SiteConditions {
            light_level: 0,
            block_below: Identifier::new("minecraft", "stone"),
            ..SiteConditions::default()
        };
        let spawned = world.spawn_natural(&dark, (0.0, 4.0, 0.0), &mut rng);
        assert!((2..=4).contains(&spawned.len()));
        assert!(world.all_mobs().iter().all(|m| m.mob_type == "minecraft:zombie"));
    }
}
