//! Host settings derived from the active component set.

use bedrock_behavior_pack::ComponentSet;
use bedrock_molang::Variables;

/// Attack damage for entities without `minecraft:attack`.
pub const DEFAULT_ATTACK_DAMAGE: f32 = 2.0;

/// Attribute values to push to the host. `None` leaves the host's value alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EntityAttributes {
    pub max_health: Option<f32>,
    pub knockback_resistance: Option<f32>,
    pub movement_speed: Option<f32>,
    pub attack_damage: Option<f32>,
}

impl EntityAttributes {
    pub fn from_components(components: &ComponentSet) -> Self {
        Self {
            max_health: components.health.as_ref().and_then(|h| h.max_health()),
            knockback_resistance: components.knockback_resistance.as_ref().and_then(|k| k.value),
            movement_speed: components.movement.as_ref().and_then(|m| m.value),
            attack_damage: components.attack_damage(),
        }
    }

    /// Spawn-time attributes: like [`Self::from_components`], with the default
    /// attack damage filled in.
    pub fn base(components: &ComponentSet) -> Self {
        let mut attributes = Self::from_components(components);
        attributes.attack_damage.get_or_insert(DEFAULT_ATTACK_DAMAGE);
        attributes
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationSettings {
    pub can_swim: bool,
    pub can_open_doors: Option<bool>,
    pub can_pass_doors: Option<bool>,
    pub avoid_water: Option<bool>,
    pub avoid_sun: Option<bool>,
}

impl NavigationSettings {
    /// `None` when neither navigation component is active.
    pub fn from_components(components: &ComponentSet) -> Option<Self> {
        let nav = components.navigation()?;
        Some(Self {
            can_swim: nav.allows_water(),
            can_open_doors: nav.can_open_doors,
            can_pass_doors: nav.can_pass_doors,
            avoid_water: nav.avoid_water,
            avoid_sun: nav.avoid_sun,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsFlags {
    pub no_gravity: bool,
    pub collidable: bool,
    pub pushable: bool,
    pub pushable_by_piston: bool,
}

impl Default for PhysicsFlags {
    fn default() -> Self {
        Self {
            no_gravity: false,
            collidable: true,
            pushable: true,
            pushable_by_piston: true,
        }
    }
}

impl PhysicsFlags {
    pub fn from_components(components: &ComponentSet) -> Self {
        let physics = components.physics.as_ref();
        let pushable = components.pushable.as_ref();
        Self {
            no_gravity: components.can_fly.is_some()
                || physics.and_then(|p| p.has_gravity) == Some(false),
            collidable: physics.and_then(|p| p.has_collision) != Some(false),
            pushable: pushable.and_then(|p| p.is_pushable) != Some(false),
            pushable_by_piston: pushable.and_then(|p| p.is_pushable_by_piston) != Some(false),
        }
    }
}

/// Resolved `minecraft:scale`, 1.0 when absent or unparsable.
pub fn scale(components: &ComponentSet, vars: &Variables) -> f32 {
    components
        .scale
        .as_ref()
        .and_then(|s| s.value.as_ref())
        .and_then(|v| v.resolve(vars))
        .map(|v| v as f32)
        .unwrap_or(1.0)
}

/// Collision box `(width, height)` after scaling. Defaults to 0.6 x 1.8.
pub fn dimensions(components: &ComponentSet, scale: f32) -> (f32, f32) {
    let bb = components.collision_box.as_ref();
    let width = bb.and_then(|b| b.width).unwrap_or(0.6);
    let height = bb.and_then(|b| b.height).unwrap_or(1.8);
    (width * scale, height * scale)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Apply this (possibly reduced) amount.
    Apply(f32),
    Reject,
}

/// With `health.min` set, damage never takes health below the minimum and
/// out-of-world damage is rejected.
pub fn damage_floor(
    components: &ComponentSet,
    current_health: f32,
    amount: f32,
    out_of_world: bool,
) -> DamageOutcome {
    let Some(min) = components.health.as_ref().and_then(|h| h.min) else {
        return DamageOutcome::Apply(amount);
    };
    if out_of_world {
        return DamageOutcome::Reject;
    }
    let headroom = (current_health - min).max(0.0);
    DamageOutcome::Apply(amount.min(headroom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(v: serde_json::Value) -> ComponentSet {
        ComponentSet::from_map(v.as_object().unwrap(), "test")
    }

    #[test]
    fn attributes() {
        let c = set(json!({
            "minecraft:health": { "value": 10, "max": 24 },
            "minecraft:movement": { "value": 0.3 },
            "minecraft:knockback_resistance": { "value": 0.5 },
            "minecraft:attack": { "damage": [-4, 2] }
        }));
        let a = EntityAttributes::from_components(&c);
        assert_eq!(a.max_health, Some(24.0));
        assert_eq!(a.movement_speed, Some(0.3));
        assert_eq!(a.knockback_resistance, Some(0.5));
        assert_eq!(a.attack_damage, Some(0.0));
    }

    #[test]
    fn base_attributes_default_attack() {
        let a = EntityAttributes::base(&ComponentSet::default());
        assert_eq!(a.attack_damage, Some(DEFAULT_ATTACK_DAMAGE));
        assert_eq!(a.max_health, None);
        assert_eq!(EntityAttributes::from_components(&ComponentSet::default()).attack_damage, None);
    }

    #[test]
    fn navigation() {
        assert!(NavigationSettings::from_components(&ComponentSet::default()).is_none());
        let c = set(json!({
            "minecraft:navigation.generic": { "can_path_over_water": true, "can_open_doors": true }
        }));
        let nav = NavigationSettings::from_components(&c).unwrap();
        assert!(nav.can_swim);
        assert_eq!(nav.can_open_doors, Some(true));
        assert_eq!(nav.can_pass_doors, None);
    }

    #[test]
    fn physics_flags() {
        assert_eq!(PhysicsFlags::from_components(&ComponentSet::default()), PhysicsFlags::default());
        let c = set(json!({
            "minecraft:can_fly": {},
            "minecraft:physics": { "has_collision": false },
            "minecraft:pushable": { "is_pushable": false }
        }));
        let p = PhysicsFlags::from_components(&c);
        assert!(p.no_gravity);
        assert!(!p.collidable);
        assert!(!p.pushable);
        assert!(p.pushable_by_piston);

        let c = set(json!({ "minecraft:physics": { "has_gravity": false } }));
        assert!(PhysicsFlags::from_components(&c).no_gravity);
    }

    #[test]
    fn scale_and_dimensions() {
        let vars = Variables::new().with_boolean("query.is_baby", true);
        assert_eq!(scale(&ComponentSet::default(), &vars), 1.0);
        let c = set(json!({
            "minecraft:scale": { "value": "query.is_baby ? 0.5 : 1" },
            "minecraft:collision_box": { "width": 1.0, "height": 2.0 }
        }));
        let s = scale(&c, &vars);
        assert_eq!(s, 0.5);
        assert_eq!(dimensions(&c, s), (0.5, 1.0));
        let broken = set(json!({ "minecraft:scale": { "value": "1 +" } }));
        assert_eq!(scale(&broken, &vars), 1.0);
    }

    #[test]
    fn damage_floor_clamps() {
        let c = set(json!({ "minecraft:health": { "value": 20, "min": 1 } }));
        assert_eq!(damage_floor(&c, 10.0, 4.0, false), DamageOutcome::Apply(4.0));
        assert_eq!(damage_floor(&c, 3.0, 10.0, false), DamageOutcome::Apply(2.0));
        assert_eq!(damage_floor(&c, 1.0, 10.0, false), DamageOutcome::Apply(0.0));
        assert_eq!(damage_floor(&c, 10.0, 4.0, true), DamageOutcome::Reject);
        let plain = ComponentSet::default();
        assert_eq!(damage_floor(&plain, 3.0, 10.0, true), DamageOutcome::Apply(10.0));
    }
}
