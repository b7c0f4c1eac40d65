//! ECS components for data-driven entities.

use bevy_ecs::prelude::*;
use bedrock_entity::{EntityRuntime, EquipmentSlot, GoalBundle, NavigationSettings, PhysicsFlags};

/// Network identity for an entity.
#[derive(Component, Debug, Clone)]
pub struct EntityId {
    pub unique_id: i64,
    pub runtime_id: u64,
}

/// Position in the world.
#[derive(Component, Debug, Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Rotation angles in degrees.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
}

/// Velocity vector.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Health points.
#[derive(Component, Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

/// Whether the entity is standing on the ground.
#[derive(Component, Debug, Clone, Copy)]
pub struct OnGround(pub bool);

/// Blocks fallen since last touching the ground.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct FallDistance(pub f32);

/// Axis-aligned bounding box dimensions.
#[derive(Component, Debug, Clone, Copy)]
pub struct BoundingBox {
    pub width: f32,
    pub height: f32,
}

/// The Bedrock identifier, e.g. `"minecraft:zombie"`.
#[derive(Component, Debug, Clone)]
pub struct MobType(pub String);

#[derive(Component, Debug, Clone, Copy)]
pub struct AttackDamage(pub f32);

/// Base movement speed in blocks/tick.
#[derive(Component, Debug, Clone, Copy)]
pub struct MovementSpeed(pub f32);

#[derive(Component, Debug, Clone, Copy)]
pub struct KnockbackResistance(pub f32);

/// Tick when this entity last took damage (invulnerability frames).
#[derive(Component, Debug, Clone, Copy)]
pub struct LastDamageTick(pub Option<u64>);

#[derive(Component, Debug, Clone)]
pub struct CustomName {
    pub name: String,
    pub visible: bool,
}

/// Items held or worn, one per slot.
#[derive(Component, Debug, Clone, Default)]
pub struct Equipment(pub Vec<(EquipmentSlot, String)>);

impl Equipment {
    pub fn get(&self, slot: EquipmentSlot) -> Option<&str> {
        self.0
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, item)| item.as_str())
    }

    pub fn set(&mut self, slot: EquipmentSlot, item: &str) {
        self.0.retain(|(s, _)| *s != slot);
        self.0.push((slot, item.to_string()));
    }
}

/// Fluid contact for the current tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct WaterState {
    pub in_water: bool,
    pub underwater: bool,
}

/// Whether the sky is visible from the entity's position. Assumed when absent.
#[derive(Component, Debug, Clone, Copy)]
pub struct SkyExposure(pub bool);

/// Ticks of fire left.
#[derive(Component, Debug, Clone, Copy)]
pub struct Burning {
    pub remaining_ticks: u32,
}

/// Navigation capabilities pushed by the behavior runtime.
#[derive(Component, Debug, Clone, Copy)]
pub struct Navigation(pub NavigationSettings);

/// Physics flags pushed by the behavior runtime.
#[derive(Component, Debug, Clone, Copy)]
pub struct Physics(pub PhysicsFlags);

/// AI goals chosen on the entity's first tick.
#[derive(Component, Debug, Clone)]
pub struct InstalledGoals(pub GoalBundle);

/// The behavior pack runtime driving this entity.
#[derive(Component, Debug)]
pub struct Behavior(pub EntityRuntime);

/// Marker: this entity is a mob (non-player).
#[derive(Component, Debug)]
pub struct Mob;

/// Marker: this entity is dead (pending cleanup).
#[derive(Component, Debug)]
pub struct Dead;
