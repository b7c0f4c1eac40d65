//! [`EntityHost`] backed by one ECS entity.

use bedrock_behavior_pack::{Difficulty, Dimension, Identifier};
use bedrock_entity::{
    EntityAttributes, EntityHost, EntitySnapshot, EquipmentSlot, GoalBundle, NavigationSettings,
    PhysicsFlags,
};
use bevy_ecs::prelude::*;
use tracing::debug;

use crate::components::*;
use crate::environment::{WorldClock, WorldSettings};
use crate::game_world::{self, GameEvent, OutgoingEvents};

/// Adapts an entity and its world to the behavior runtime. The entity's
/// [`Behavior`] component is detached while the host is in use.
pub struct EcsHost<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> EcsHost<'w> {
    pub fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    fn ids(&self) -> Option<EntityId> {
        self.world.get::<EntityId>(self.entity).cloned()
    }

    fn emit(&mut self, event: GameEvent) {
        self.world.resource_mut::<OutgoingEvents>().events.push(event);
    }

    fn water(&self) -> WaterState {
        self.world
            .get::<WaterState>(self.entity)
            .copied()
            .unwrap_or_default()
    }
}

impl EntityHost for EcsHost<'_> {
    fn is_underwater(&self) -> bool {
        self.water().underwater
    }

    fn is_in_water(&self) -> bool {
        let water = self.water();
        water.in_water || water.underwater
    }

    fn is_wet(&self) -> bool {
        self.is_in_water() || (self.world.resource::<WorldSettings>().raining && self.is_sky_visible())
    }

    fn is_on_fire(&self) -> bool {
        self.world
            .get::<Burning>(self.entity)
            .is_some_and(|b| b.remaining_ticks > 0)
    }

    fn custom_name(&self) -> Option<String> {
        self.world
            .get::<CustomName>(self.entity)
            .map(|n| n.name.clone())
    }

    fn dimension(&self) -> Dimension {
        self.world.resource::<WorldSettings>().dimension
    }

    fn difficulty(&self) -> Difficulty {
        self.world.resource::<WorldSettings>().difficulty
    }

    fn is_day(&self) -> bool {
        let day_length = self.world.resource::<WorldSettings>().day_length;
        self.world.resource::<WorldClock>().is_day(day_length)
    }

    fn is_sky_visible(&self) -> bool {
        self.world
            .get::<SkyExposure>(self.entity)
            .map_or(true, |s| s.0)
    }

    fn biome(&self) -> Option<Identifier> {
        self.world.resource::<WorldSettings>().biome_id()
    }

    fn health(&self) -> f32 {
        self.world
            .get::<Health>(self.entity)
            .map_or(0.0, |h| h.current)
    }

    fn apply_attributes(&mut self, attributes: &EntityAttributes) {
        let mut entity = self.world.entity_mut(self.entity);
        if let Some(max) = attributes.max_health {
            if let Some(mut health) = entity.get_mut::<Health>() {
                health.max = max;
                health.current = health.current.min(max);
            }
        }
        if let Some(speed) = attributes.movement_speed {
            entity.insert(MovementSpeed(speed));
        }
        if let Some(resistance) = attributes.knockback_resistance {
            entity.insert(KnockbackResistance(resistance));
        }
        if let Some(damage) = attributes.attack_damage {
            entity.insert(AttackDamage(damage));
        }
    }

    fn apply_navigation(&mut self, navigation: &NavigationSettings) {
        self.world
            .entity_mut(self.entity)
            .insert(Navigation(*navigation));
    }

    fn apply_physics(&mut self, physics: &PhysicsFlags) {
        self.world.entity_mut(self.entity).insert(Physics(*physics));
    }

    fn main_hand_empty(&self) -> bool {
        self.world
            .get::<Equipment>(self.entity)
            .map_or(true, |e| e.get(EquipmentSlot::MainHand).is_none())
    }

    fn equip(&mut self, slot: EquipmentSlot, item: &str) {
        if let Some(mut equipment) = self.world.get_mut::<Equipment>(self.entity) {
            equipment.set(slot, item);
        } else {
            let mut equipment = Equipment::default();
            equipment.set(slot, item);
            self.world.entity_mut(self.entity).insert(equipment);
        }
        if let Some(ids) = self.ids() {
            self.emit(GameEvent::MobEquipped {
                runtime_id: ids.runtime_id,
                slot,
                item: item.to_string(),
            });
        }
    }

    fn set_on_fire(&mut self, seconds: u32) {
        let ticks = seconds.saturating_mul(20);
        let remaining = self
            .world
            .get::<Burning>(self.entity)
            .map_or(0, |b| b.remaining_ticks);
        if remaining >= ticks {
            return;
        }
        self.world.entity_mut(self.entity).insert(Burning {
            remaining_ticks: ticks,
        });
        if remaining == 0 {
            if let Some(ids) = self.ids() {
                self.emit(GameEvent::MobIgnited {
                    runtime_id: ids.runtime_id,
                    seconds,
                });
            }
        }
    }

    fn reset_fall_distance(&mut self) {
        self.world
            .entity_mut(self.entity)
            .insert(FallDistance(0.0));
    }

    fn install_goals(&mut self, goals: &GoalBundle) {
        self.world
            .entity_mut(self.entity)
            .insert(InstalledGoals(goals.clone()));
    }

    fn snapshot(&self) -> EntitySnapshot {
        let position = self
            .world
            .get::<Position>(self.entity)
            .map_or([0.0; 3], |p| [f64::from(p.x), f64::from(p.y), f64::from(p.z)]);
        let rotation = self
            .world
            .get::<Rotation>(self.entity)
            .map_or([0.0; 2], |r| [r.yaw, r.pitch]);
        let velocity = self
            .world
            .get::<Velocity>(self.entity)
            .map_or([0.0; 3], |v| [f64::from(v.x), f64::from(v.y), f64::from(v.z)]);
        let name = self.world.get::<CustomName>(self.entity);
        EntitySnapshot {
            position,
            rotation,
            velocity,
            custom_name: name.map(|n| n.name.clone()),
            custom_name_visible: name.is_some_and(|n| n.visible),
            equipment: self
                .world
                .get::<Equipment>(self.entity)
                .map(|e| e.0.clone())
                .unwrap_or_default(),
        }
    }

    fn spawn_entity(
        &mut self,
        identifier: &str,
        snapshot: &EntitySnapshot,
        spawn_event: Option<&str>,
    ) -> bool {
        let position = (
            snapshot.position[0] as f32,
            snapshot.position[1] as f32,
            snapshot.position[2] as f32,
        );
        let Some((spawned, unique_id, _)) = game_world::spawn_data_driven(self.world, identifier, position)
        else {
            return false;
        };

        let mut entity = self.world.entity_mut(spawned);
        entity.insert((
            Rotation {
                yaw: snapshot.rotation[0],
                pitch: snapshot.rotation[1],
                head_yaw: snapshot.rotation[0],
            },
            Velocity {
                x: snapshot.velocity[0] as f32,
                y: snapshot.velocity[1] as f32,
                z: snapshot.velocity[2] as f32,
            },
            Equipment(snapshot.equipment.clone()),
        ));
        if let Some(name) = &snapshot.custom_name {
            entity.insert(CustomName {
                name: name.clone(),
                visible: snapshot.custom_name_visible,
            });
        }
        if let Some(event) = spawn_event {
            if let Some(mut behavior) = entity.get_mut::<Behavior>() {
                behavior.0.enqueue_event(event);
            }
        }

        if let Some(ids) = self.ids() {
            debug!(from = ids.unique_id, to = unique_id, "Entity transformed into {identifier}");
            self.emit(GameEvent::MobTransformed {
                from_unique_id: ids.unique_id,
                to_unique_id: unique_id,
                identifier: identifier.to_string(),
            });
        }
        true
    }

    fn despawn(&mut self) {
        if let Some(ids) = self.ids() {
            self.emit(GameEvent::EntityRemoved {
                unique_id: ids.unique_id,
            });
        }
        self.world.despawn(self.entity);
    }
}
