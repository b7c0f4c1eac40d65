//! Event trees (`events`, sensor triggers, timer `time_down_event`).

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::filter::Filter;

#[derive(Debug, Clone, PartialEq)]
pub enum EventNode {
    /// Children walked in order, each independently guarded.
    Sequence(Vec<EventNode>),
    Action(Box<EventAction>),
}

/// One event object. Every facet is optional and all present facets run once
/// the guard passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventAction {
    pub filters: Option<Filter>,
    /// Event name to enqueue.
    pub event: Option<String>,
    /// Newer `trigger` facet: walked as a nested action.
    pub trigger: Option<Box<EventAction>>,
    pub add: Vec<String>,
    pub remove: Vec<String>,
    pub sequence: Vec<EventNode>,
    pub randomize: Vec<EventNode>,
    /// Weight when this node is a `randomize` entry.
    pub weight: Option<f64>,
}

impl EventNode {
    pub fn empty() -> Self {
        EventNode::Action(Box::default())
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => EventNode::Sequence(items.iter().map(Self::from_value).collect()),
            Value::Object(obj) => EventNode::Action(Box::new(EventAction::from_object(obj))),
            other => {
                warn!("Ignoring event node that is neither object nor list: {other}");
                EventNode::empty()
            }
        }
    }

    /// Weight for weighted-random selection. Defaults to 1.
    pub fn weight(&self) -> f64 {
        match self {
            EventNode::Action(action) => action.weight.unwrap_or(1.0),
            EventNode::Sequence(_) => 1.0,
        }
    }
}

impl EventAction {
    fn from_object(obj: &Map<String, Value>) -> Self {
        let nodes = |key: &str| -> Vec<EventNode> {
            match obj.get(key) {
                Some(Value::Array(items)) => items.iter().map(EventNode::from_value).collect(),
                Some(other) => vec![EventNode::from_value(other)],
                None => Vec::new(),
            }
        };

        Self {
            filters: obj.get("filters").map(Filter::from_value),
            event: obj
                .get("event")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from),
            trigger: obj.get("trigger").and_then(parse_trigger).map(Box::new),
            add: group_names(obj.get("add")),
            remove: group_names(obj.get("remove")),
            sequence: nodes("sequence"),
            randomize: nodes("randomize"),
            weight: obj.get("weight").and_then(Value::as_f64),
        }
    }
}

fn parse_trigger(value: &Value) -> Option<EventAction> {
    match value {
        Value::String(event) if !event.trim().is_empty() => Some(EventAction {
            event: Some(event.trim().to_string()),
            ..EventAction::default()
        }),
        Value::Object(obj) => Some(EventAction::from_object(obj)),
        _ => None,
    }
}

/// `{ "component_groups": "a" }` or `{ "component_groups": ["a", "b"] }`.
fn group_names(value: Option<&Value>) -> Vec<String> {
    match value.and_then(|v| v.get("component_groups")) {
        Some(Value::String(name)) => vec![name.clone()],
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

impl<'de> Deserialize<'de> for EventNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(EventNode::from_value(&value))
    }
}
