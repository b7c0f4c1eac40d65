//! Component sets and the shallow group merge.

pub mod types;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

pub use types::*;

fn parse_component<T: DeserializeOwned>(owner: &str, name: &str, raw: &Value) -> Option<T> {
    match serde_json::from_value(raw.clone()) {
        Ok(component) => Some(component),
        Err(e) => {
            warn!("{owner}: ignoring malformed {name}: {e}");
            None
        }
    }
}

macro_rules! component_set {
    ($($key:literal => $field:ident: $ty:ty,)*) => {
        /// The effective or partial component record of an entity.
        ///
        /// Typed components are independently optional; everything else a pack
        /// names lands in `other`, keyed by its full component name.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct ComponentSet {
            $(pub $field: Option<$ty>,)*
            pub other: BTreeMap<String, Value>,
        }

        impl ComponentSet {
            /// Names of the typed components.
            pub const KNOWN: &'static [&'static str] = &[$($key),*];

            /// Build from a `components` object. `owner` prefixes diagnostics.
            pub fn from_map(components: &Map<String, Value>, owner: &str) -> Self {
                let mut set = Self::default();
                for (name, raw) in components {
                    if raw.is_null() {
                        continue;
                    }
                    match name.as_str() {
                        $($key => set.$field = parse_component(owner, name, raw),)*
                        _ => {
                            set.other.insert(name.clone(), raw.clone());
                        }
                    }
                }
                set
            }

            /// Copy of `self` with every component `overlay` defines replaced wholesale.
            pub fn merged_with(&self, overlay: &ComponentSet) -> ComponentSet {
                let mut merged = self.clone();
                $(
                    if overlay.$field.is_some() {
                        merged.$field = overlay.$field.clone();
                    }
                )*
                for (name, raw) in &overlay.other {
                    merged.other.insert(name.clone(), raw.clone());
                }
                merged
            }

            /// Whether the named component is present (`minecraft:` may be omitted).
            pub fn has(&self, name: &str) -> bool {
                let name = name.trim().to_ascii_lowercase();
                let name = if name.contains(':') {
                    name
                } else {
                    format!("minecraft:{name}")
                };
                match name.as_str() {
                    $($key => self.$field.is_some(),)*
                    _ => self.other.contains_key(&name),
                }
            }

            /// Names of every present component.
            pub fn names(&self) -> Vec<&str> {
                let mut names = Vec::new();
                $(
                    if self.$field.is_some() {
                        names.push($key);
                    }
                )*
                names.extend(self.other.keys().map(String::as_str));
                names
            }

            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())* && self.other.is_empty()
            }
        }
    };
}

component_set! {
    "minecraft:physics" => physics: Physics,
    "minecraft:scale" => scale: Scale,
    "minecraft:type_family" => type_family: TypeFamily,
    "minecraft:movement" => movement: Movement,
    "minecraft:movement.generic" => movement_generic: Marker,
    "minecraft:underwater_movement" => underwater_movement: Movement,
    "minecraft:movement.basic" => movement_basic: MovementBasic,
    "minecraft:can_fly" => can_fly: Marker,
    "minecraft:knockback_resistance" => knockback_resistance: KnockbackResistance,
    "minecraft:navigation.walk" => navigation_walk: Navigation,
    "minecraft:navigation.generic" => navigation_generic: Navigation,
    "minecraft:attack" => attack: Attack,
    "minecraft:shooter" => shooter: Shooter,
    "minecraft:behavior.ranged_attack" => ranged_attack: RangedAttackBehavior,
    "minecraft:burns_in_daylight" => burns_in_daylight: Marker,
    "minecraft:equipment" => equipment: Equipment,
    "minecraft:equip_item" => equip_item: EquipItem,
    "minecraft:equippable" => equippable: Equippable,
    "minecraft:loot" => loot: Loot,
    "minecraft:boss" => boss: Boss,
    "minecraft:teleport" => teleport: Teleport,
    "minecraft:collision_box" => collision_box: CollisionBox,
    "minecraft:addrider" => addrider: AddRider,
    "minecraft:can_climb" => can_climb: Marker,
    "minecraft:can_join_raid" => can_join_raid: Marker,
    "minecraft:shareables" => shareables: Marker,
    "minecraft:environment_sensor" => environment_sensor: EnvironmentSensor,
    "minecraft:timer" => timer: Timer,
    "minecraft:transformation" => transformation: Transformation,
    "minecraft:is_baby" => is_baby: Marker,
    "minecraft:is_ignited" => is_ignited: Marker,
    "minecraft:is_saddled" => is_saddled: Marker,
    "minecraft:is_sheared" => is_sheared: Marker,
    "minecraft:is_tamed" => is_tamed: Marker,
    "minecraft:is_illager_captain" => is_illager_captain: Marker,
    "minecraft:variant" => variant: IndexValue,
    "minecraft:mark_variant" => mark_variant: IndexValue,
    "minecraft:skin_id" => skin_id: IndexValue,
    "minecraft:health" => health: Health,
    "minecraft:rideable" => rideable: Rideable,
    "minecraft:is_immobile" => is_immobile: Marker,
    "minecraft:pushable" => pushable: Pushable,
}

impl ComponentSet {
    /// `navigation.walk`, falling back to `navigation.generic`.
    pub fn navigation(&self) -> Option<&Navigation> {
        self.navigation_walk
            .as_ref()
            .or(self.navigation_generic.as_ref())
    }

    /// Lowercased `type_family` entries.
    pub fn families(&self) -> Vec<String> {
        self.type_family
            .as_ref()
            .map(|tf| tf.family.iter().map(|f| f.trim().to_ascii_lowercase()).collect())
            .unwrap_or_default()
    }

    pub fn immobile(&self) -> bool {
        self.is_immobile.as_ref().is_some_and(Marker::is_enabled)
    }

    pub fn baby(&self) -> bool {
        self.is_baby.as_ref().is_some_and(Marker::is_enabled)
    }

    /// Resolved `attack.damage`, clamped at zero.
    pub fn attack_damage(&self) -> Option<f32> {
        self.attack
            .as_ref()
            .and_then(|a| a.damage.as_ref())
            .and_then(RangedNumber::resolve)
            .map(|d| d.max(0.0) as f32)
    }

    /// Names of `minecraft:behavior.*` components without the prefix.
    pub fn behaviors(&self) -> Vec<&str> {
        self.names()
            .into_iter()
            .filter_map(|name| name.strip_prefix("minecraft:behavior."))
            .collect()
    }
}

/// Fold `overlays` onto `base` in order; later overlays win per component.
pub fn merge<'a>(
    base: &ComponentSet,
    overlays: impl IntoIterator<Item = &'a ComponentSet>,
) -> ComponentSet {
    overlays
        .into_iter()
        .fold(base.clone(), |acc, overlay| acc.merged_with(overlay))
}
