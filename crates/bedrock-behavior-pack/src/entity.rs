//! Bedrock entity documents (entities/*.json).

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::components::ComponentSet;
use crate::error::PackError;
use crate::event::EventNode;
use crate::identifier;

/// Raw entity file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityFile {
    #[serde(default)]
    pub format_version: Option<Value>,
    #[serde(rename = "minecraft:entity")]
    pub entity: RawEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEntity {
    pub description: EntityDescription,
    #[serde(default)]
    pub components: Map<String, Value>,
    #[serde(default)]
    pub component_groups: Map<String, Value>,
    #[serde(default)]
    pub events: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityDescription {
    pub identifier: String,
    #[serde(default)]
    pub is_spawnable: bool,
    #[serde(default)]
    pub is_summonable: bool,
    #[serde(default)]
    pub is_experimental: bool,
}

/// Immutable, shareable definition of one entity type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityDefinition {
    /// Normalized `namespace:path`.
    pub identifier: String,
    pub is_spawnable: bool,
    pub is_summonable: bool,
    pub is_experimental: bool,
    pub components: ComponentSet,
    pub component_groups: HashMap<String, ComponentSet>,
    pub events: HashMap<String, EventNode>,
}

impl EntityFile {
    pub fn parse_json(json: &str) -> Result<Self, PackError> {
        serde_json::from_str(json).map_err(PackError::json("entity"))
    }

    pub fn into_definition(self) -> EntityDefinition {
        let raw = self.entity;
        let identifier = identifier::normalize(&raw.description.identifier);

        let components = ComponentSet::from_map(&raw.components, &identifier);

        let component_groups = raw
            .component_groups
            .iter()
            .map(|(name, group)| {
                let owner = format!("{identifier}#{name}");
                let set = match group.as_object() {
                    Some(obj) => ComponentSet::from_map(obj, &owner),
                    None => ComponentSet::default(),
                };
                (name.clone(), set)
            })
            .collect();

        let events = raw
            .events
            .iter()
            .map(|(name, node)| (name.clone(), EventNode::from_value(node)))
            .collect();

        EntityDefinition {
            identifier,
            is_spawnable: raw.description.is_spawnable,
            is_summonable: raw.description.is_summonable,
            is_experimental: raw.description.is_experimental,
            components,
            component_groups,
            events,
        }
    }
}

impl EntityDefinition {
    pub fn parse_json(json: &str) -> Result<Self, PackError> {
        EntityFile::parse_json(json).map(EntityFile::into_definition)
    }

    pub fn group(&self, name: &str) -> Option<&ComponentSet> {
        self.component_groups.get(name)
    }

    pub fn event(&self, name: &str) -> Option<&EventNode> {
        self.events.get(name)
    }
}
