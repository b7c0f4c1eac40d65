//! Read-only lookup of entity definitions and spawn rules across packs.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::entity::EntityDefinition;
use crate::identifier;
use crate::loader::LoadedBehaviorPack;
use crate::spawn_rules::SpawnRules;

#[derive(Debug, Clone, Default)]
pub struct BehaviorRegistry {
    entities: HashMap<String, Arc<EntityDefinition>>,
    spawn_rules: HashMap<String, Arc<SpawnRules>>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold packs in order; later packs override identifiers from earlier ones.
    pub fn from_packs(packs: &[LoadedBehaviorPack]) -> Self {
        let mut registry = Self::new();
        for pack in packs {
            for entity in &pack.entities {
                registry.insert_entity(entity.clone());
            }
            for rules in &pack.spawn_rules {
                registry.insert_spawn_rules(rules.clone());
            }
        }
        registry
    }

    pub fn insert_entity(&mut self, definition: EntityDefinition) {
        let id = identifier::normalize(&definition.identifier);
        if self.entities.contains_key(&id) {
            debug!("Overriding entity definition {id}");
        }
        self.entities.insert(id, Arc::new(definition));
    }

    pub fn insert_spawn_rules(&mut self, rules: SpawnRules) {
        self.spawn_rules.insert(rules.identifier(), Arc::new(rules));
    }

    /// Look up by identifier; a bare path gets the `minecraft` namespace.
    pub fn entity(&self, id: &str) -> Option<Arc<EntityDefinition>> {
        self.entities.get(&identifier::normalize(id)).cloned()
    }

    pub fn spawn_rules(&self, id: &str) -> Option<Arc<SpawnRules>> {
        self.spawn_rules.get(&identifier::normalize(id)).cloned()
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn all_spawn_rules(&self) -> impl Iterator<Item = &Arc<SpawnRules>> {
        self.spawn_rules.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
