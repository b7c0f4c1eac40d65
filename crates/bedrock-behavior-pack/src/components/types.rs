//! Typed component shapes.
//!
//! Every field is optional so that an empty `{}` still marks the component as
//! present. Numeric fields accept integers or floats.

use bedrock_molang::Variables;
use serde::Deserialize;
use serde_json::Value;

use crate::event::EventNode;

/// A component whose presence is the only signal. Holds the raw JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Marker(pub Value);

impl Marker {
    /// `false` and `{ "value": false }` switch a marker off.
    pub fn is_enabled(&self) -> bool {
        match &self.0 {
            Value::Bool(b) => *b,
            Value::Object(obj) => obj.get("value").and_then(Value::as_bool) != Some(false),
            _ => true,
        }
    }
}

/// A number, a `[min, max]` list or a `{ range_min, range_max }` object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RangedNumber {
    Fixed(f64),
    List(Vec<f64>),
    Range {
        range_min: Option<f64>,
        range_max: Option<f64>,
    },
}

impl RangedNumber {
    /// Collapse to a single value: lists average, ranges take the midpoint.
    pub fn resolve(&self) -> Option<f64> {
        match self {
            RangedNumber::Fixed(n) => Some(*n),
            RangedNumber::List(values) if values.is_empty() => None,
            RangedNumber::List(values) => Some(values.iter().sum::<f64>() / values.len() as f64),
            RangedNumber::Range {
                range_min,
                range_max,
            } => match (range_min, range_max) {
                (Some(min), Some(max)) => Some((min + max) / 2.0),
                (Some(v), None) | (None, Some(v)) => Some(*v),
                (None, None) => None,
            },
        }
    }
}

/// A literal number or a Molang expression string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrExpr {
    Number(f64),
    Expr(String),
}

impl NumberOrExpr {
    pub fn resolve(&self, vars: &Variables) -> Option<f64> {
        match self {
            NumberOrExpr::Number(n) => Some(*n),
            NumberOrExpr::Expr(src) => bedrock_molang::evaluate(src, vars),
        }
    }
}

/// An integer given directly or as `{ "value": n }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    Direct(f64),
    Wrapped { value: Option<f64> },
}

impl IndexValue {
    pub fn index(&self) -> Option<i64> {
        match self {
            IndexValue::Direct(n) => Some(n.round() as i64),
            IndexValue::Wrapped { value } => value.map(|n| n.round() as i64),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Physics {
    pub has_collision: Option<bool>,
    pub has_gravity: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Scale {
    pub value: Option<NumberOrExpr>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TypeFamily {
    #[serde(default)]
    pub family: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Movement {
    pub value: Option<f32>,
    pub max: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MovementBasic {
    pub max_turn: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KnockbackResistance {
    pub value: Option<f32>,
    pub max: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Navigation {
    pub can_walk: Option<bool>,
    pub can_swim: Option<bool>,
    pub can_float: Option<bool>,
    pub is_amphibious: Option<bool>,
    pub can_path_over_water: Option<bool>,
    pub can_open_doors: Option<bool>,
    pub can_pass_doors: Option<bool>,
    pub avoid_water: Option<bool>,
    pub avoid_sun: Option<bool>,
}

impl Navigation {
    /// Any form of water travel is enabled.
    pub fn allows_water(&self) -> bool {
        [
            self.can_swim,
            self.can_float,
            self.is_amphibious,
            self.can_path_over_water,
        ]
        .into_iter()
        .any(|flag| flag == Some(true))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Attack {
    pub damage: Option<RangedNumber>,
    pub effect_name: Option<String>,
    pub effect_duration: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Shooter {
    pub def: Option<String>,
    pub power: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RangedAttackBehavior {
    pub priority: Option<u32>,
    pub speed_multiplier: Option<f32>,
    pub attack_interval_min: Option<f32>,
    pub attack_interval_max: Option<f32>,
    pub attack_radius: Option<f32>,
    pub burst_shots: Option<u32>,
    pub burst_interval: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Equipment {
    pub table: Option<String>,
    pub slot_drop_chance: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EquipItem {
    pub can_wear_armor: Option<bool>,
    #[serde(default)]
    pub excluded_items: Vec<ExcludedItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExcludedItem {
    pub item: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Equippable {
    #[serde(default)]
    pub slots: Vec<EquippableSlot>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EquippableSlot {
    pub slot: Option<u32>,
    pub item: Option<String>,
    #[serde(default)]
    pub accepted_items: Vec<String>,
    pub interact_text: Option<String>,
    pub on_equip: Option<Value>,
    pub on_unequip: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Loot {
    pub table: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Boss {
    pub hud_range: Option<u32>,
    pub name: Option<String>,
    pub should_darken_sky: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Teleport {
    pub dark_teleport_chance: Option<f32>,
    pub light_teleport_chance: Option<f32>,
    pub target_teleport_chance: Option<f32>,
    pub max_random_teleport_time: Option<f32>,
    pub min_random_teleport_time: Option<f32>,
    pub random_teleport_cube: Option<Vec<f32>>,
    pub random_teleports: Option<bool>,
    pub target_distance: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CollisionBox {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AddRider {
    pub entity_type: Option<String>,
    #[serde(default)]
    pub riders: Vec<Rider>,
    pub spawn_event: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Rider {
    pub entity_type: Option<String>,
    pub spawn_event: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EnvironmentSensor {
    /// One node or a list; a list parses as a sequence.
    pub triggers: Option<EventNode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimerTime {
    Seconds(f64),
    Text(String),
    Range(Vec<f64>),
}

impl TimerTime {
    /// `(min, max)` seconds. A fixed time has `min == max`.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            TimerTime::Seconds(s) => Some((*s, *s)),
            TimerTime::Text(text) => text.trim().parse::<f64>().ok().map(|s| (s, s)),
            TimerTime::Range(values) => match values.as_slice() {
                [] => None,
                [only] => Some((*only, *only)),
                [a, b, ..] => Some((a.min(*b), a.max(*b))),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Timer {
    pub time: Option<TimerTime>,
    #[serde(default)]
    pub looping: bool,
    pub time_down_event: Option<EventNode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TransformDelay {
    Seconds(f64),
    Detailed { value: Option<f64> },
}

impl TransformDelay {
    pub fn seconds(&self) -> f64 {
        match self {
            TransformDelay::Seconds(s) => *s,
            TransformDelay::Detailed { value } => value.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Transformation {
    pub into: Option<String>,
    pub delay: Option<TransformDelay>,
    pub drop_equipment: Option<bool>,
}

impl Transformation {
    pub fn delay_seconds(&self) -> f64 {
        self.delay.as_ref().map(TransformDelay::seconds).unwrap_or(0.0)
    }

    pub fn drops_equipment(&self) -> bool {
        self.drop_equipment.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Health {
    pub value: Option<RangedNumber>,
    pub max: Option<f32>,
    pub min: Option<f32>,
}

impl Health {
    /// `max` when given, else the resolved `value`.
    pub fn max_health(&self) -> Option<f32> {
        self.max
            .or_else(|| self.value.as_ref().and_then(RangedNumber::resolve).map(|v| v as f32))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Rideable {
    pub seat_count: Option<u32>,
    #[serde(default)]
    pub family_types: Vec<String>,
    pub interact_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Pushable {
    pub is_pushable: Option<bool>,
    pub is_pushable_by_piston: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse<T: serde::de::DeserializeOwned>(v: Value) -> T {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn attack_damage_forms() {
        let a: Attack = parse(json!({ "damage": 4 }));
        assert_eq!(a.damage.unwrap().resolve(), Some(4.0));
        let a: Attack = parse(json!({ "damage": [2, 6] }));
        assert_eq!(a.damage.unwrap().resolve(), Some(4.0));
        let a: Attack = parse(json!({ "damage": { "range_min": 3, "range_max": 5 } }));
        assert_eq!(a.damage.unwrap().resolve(), Some(4.0));
        let a: Attack = parse(json!({ "damage": { "range_max": 7 } }));
        assert_eq!(a.damage.unwrap().resolve(), Some(7.0));
        let a: Attack = parse(json!({ "damage": [] }));
        assert_eq!(a.damage.unwrap().resolve(), None);
    }

    #[test]
    fn timer_time_forms() {
        let t: Timer = parse(json!({ "time": 2.5 }));
        assert_eq!(t.time.unwrap().bounds(), Some((2.5, 2.5)));
        assert!(!t.looping);
        let t: Timer = parse(json!({ "time": "3", "looping": true }));
        assert_eq!(t.time.unwrap().bounds(), Some((3.0, 3.0)));
        assert!(t.looping);
        let t: Timer = parse(json!({ "time": [6, 2] }));
        assert_eq!(t.time.unwrap().bounds(), Some((2.0, 6.0)));
        let t: Timer = parse(json!({ "time": "soon" }));
        assert_eq!(t.time.unwrap().bounds(), None);
    }

    #[test]
    fn transformation_defaults() {
        let t: Transformation = parse(json!({ "into": "minecraft:drowned" }));
        assert!(t.drops_equipment());
        assert_eq!(t.delay_seconds(), 0.0);
        let t: Transformation = parse(json!({
            "into": "minecraft:husk", "delay": { "value": 15 }, "drop_equipment": false
        }));
        assert!(!t.drops_equipment());
        assert_eq!(t.delay_seconds(), 15.0);
    }

    #[test]
    fn marker_switches() {
        assert!(Marker(json!({})).is_enabled());
        assert!(Marker(json!(true)).is_enabled());
        assert!(!Marker(json!(false)).is_enabled());
        assert!(!Marker(json!({ "value": false })).is_enabled());
    }

    #[test]
    fn index_value_forms() {
        let v: IndexValue = parse(json!(3));
        assert_eq!(v.index(), Some(3));
        let v: IndexValue = parse(json!({ "value": 2 }));
        assert_eq!(v.index(), Some(2));
        let v: IndexValue = parse(json!({}));
        assert_eq!(v.index(), None);
    }

    #[test]
    fn health_max_falls_back_to_value() {
        let h: Health = parse(json!({ "value": 20 }));
        assert_eq!(h.max_health(), Some(20.0));
        let h: Health = parse(json!({ "value": 10, "max": 30 }));
        assert_eq!(h.max_health(), Some(30.0));
    }

    #[test]
    fn scale_expression() {
        let s: Scale = parse(json!({ "value": "query.is_baby ? 0.5 : 1.0" }));
        let vars = Variables::new().with_boolean("query.is_baby", true);
        assert_eq!(s.value.unwrap().resolve(&vars), Some(0.5));
    }

    #[test]
    fn navigation_water_modes() {
        let n: Navigation = parse(json!({ "can_walk": true }));
        assert!(!n.allows_water());
        let n: Navigation = parse(json!({ "is_amphibious": true }));
        assert!(n.allows_water());
    }
}
