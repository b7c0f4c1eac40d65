//! ECS game world: bevy_ecs World, data-driven entity management, tick systems, and event bus.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use bedrock_behavior_pack::components::RangedNumber;
use bedrock_behavior_pack::{identifier, BehaviorRegistry};
use bedrock_entity::settings::{self, DamageOutcome, DEFAULT_ATTACK_DAMAGE};
use bedrock_entity::{
    EntityAttributes, EntityRuntime, EquipmentSlot, GoalBundle, RuntimeLimits, RuntimeStats,
    TickOutcome,
};
use bedrock_molang::Variables;
use bevy_ecs::prelude::*;
use tracing::debug;

use crate::components::*;
use crate::environment::{WorldClock, WorldSettings};
use crate::host::EcsHost;

/// Max health for definitions without `minecraft:health`.
pub const DEFAULT_MAX_HEALTH: f32 = 20.0;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Outgoing events queued by ECS operations for whoever drives the world.
#[derive(Resource, Default)]
pub struct OutgoingEvents {
    pub events: Vec<GameEvent>,
}

/// Global tick counter (incremented every 50 ms).
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

/// Thread-safe entity ID allocator.
#[derive(Resource)]
pub struct EntityIdAllocator {
    next: AtomicI64,
}

impl EntityIdAllocator {
    pub fn new(start: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
        }
    }

    /// Allocate the next unique entity ID.
    pub fn allocate(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Current value (next ID that will be allocated).
    pub fn current(&self) -> i64 {
        self.next.load(Ordering::Relaxed)
    }
}

/// Loaded definitions and the runtime settings for new entities.
#[derive(Resource, Clone)]
pub struct Behaviors {
    pub registry: Arc<BehaviorRegistry>,
    pub limits: RuntimeLimits,
    /// Seeds every runtime (mixed with its entity ID) when set.
    pub seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// Game events
// ---------------------------------------------------------------------------

/// Snapshot of a mob for reporting.
#[derive(Debug, Clone)]
pub struct MobSnapshot {
    pub unique_id: i64,
    pub runtime_id: u64,
    pub mob_type: String,
    pub position: (f32, f32, f32),
    pub pitch: f32,
    pub yaw: f32,
    pub head_yaw: f32,
    pub health: f32,
    pub max_health: f32,
    pub bb_width: f32,
    pub bb_height: f32,
}

/// Events produced by the game world.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    MobSpawned {
        runtime_id: u64,
        unique_id: i64,
        mob_type: String,
        position: (f32, f32, f32),
        health: f32,
        max_health: f32,
        bb_width: f32,
        bb_height: f32,
    },
    MobMoved {
        runtime_id: u64,
        position: (f32, f32, f32),
        pitch: f32,
        yaw: f32,
        head_yaw: f32,
        on_ground: bool,
    },
    MobHurt {
        runtime_id: u64,
        new_health: f32,
        tick: u64,
    },
    MobDied {
        runtime_id: u64,
        unique_id: i64,
    },
    /// An entity was removed (despawn or transformation).
    EntityRemoved {
        unique_id: i64,
    },
    MobEquipped {
        runtime_id: u64,
        slot: EquipmentSlot,
        item: String,
    },
    MobIgnited {
        runtime_id: u64,
        seconds: u32,
    },
    /// A replacement entity was spawned; the original is removed separately.
    MobTransformed {
        from_unique_id: i64,
        to_unique_id: i64,
        identifier: String,
    },
}

/// What dealt damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageCause {
    Attack,
    Fire,
    OutOfWorld,
}

// ---------------------------------------------------------------------------
// GameWorld
// ---------------------------------------------------------------------------

/// The ECS game world.
pub struct GameWorld {
    pub world: World,
}

impl GameWorld {
    pub fn new(
        registry: Arc<BehaviorRegistry>,
        limits: RuntimeLimits,
        settings: WorldSettings,
        starting_entity_id: i64,
    ) -> Self {
        let mut world = World::new();
        world.insert_resource(OutgoingEvents::default());
        world.insert_resource(TickCounter::default());
        world.insert_resource(EntityIdAllocator::new(starting_entity_id));
        world.insert_resource(WorldClock::new(settings.start_time));
        world.insert_resource(settings);
        world.insert_resource(Behaviors {
            registry,
            limits,
            seed: None,
        });
        Self { world }
    }

    /// Make every runtime's randomness reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.world.resource_mut::<Behaviors>().seed = Some(seed);
        self
    }

    /// Run one game tick: behaviors, fire, gravity, movement collection, dead cleanup.
    pub fn tick(&mut self) {
        self.world.resource_mut::<TickCounter>().0 += 1;
        self.world.resource_mut::<WorldClock>().advance();
        system_behavior_tick(&mut self.world);
        system_burning(&mut self.world);
        system_mob_gravity(&mut self.world);
        system_collect_mob_moves(&mut self.world);
        system_cleanup_dead(&mut self.world);
    }

    /// Drain all pending outgoing events.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.world.resource_mut::<OutgoingEvents>().events)
    }

    pub fn current_tick(&self) -> u64 {
        self.world.resource::<TickCounter>().0
    }

    pub fn settings(&self) -> &WorldSettings {
        self.world.resource::<WorldSettings>()
    }

    /// Spawn a data-driven entity. Returns `(unique_id, runtime_id)` or `None`
    /// if no definition is registered for `identifier`.
    pub fn spawn_mob(&mut self, identifier: &str, x: f32, y: f32, z: f32) -> Option<(i64, u64)> {
        spawn_data_driven(&mut self.world, identifier, (x, y, z))
            .map(|(_, unique_id, runtime_id)| (unique_id, runtime_id))
    }

    /// Queue an event on a mob's behavior runtime.
    pub fn fire_event(&mut self, runtime_id: u64, event: &str) -> bool {
        let Some(entity) = self.find_mob_entity(runtime_id) else {
            return false;
        };
        match self.world.get_mut::<Behavior>(entity) {
            Some(mut behavior) => {
                behavior.0.enqueue_event(event);
                true
            }
            None => false,
        }
    }

    /// Deal damage to a mob. Returns remaining health, or `None` if the damage
    /// was blocked or the mob was not found.
    pub fn damage_mob(&mut self, runtime_id: u64, damage: f32, cause: DamageCause) -> Option<f32> {
        let target = self.find_mob_entity(runtime_id)?;
        let tick = self.current_tick();

        // Invulnerability check (10 ticks)
        if cause == DamageCause::Attack {
            if let Some(last) = self.world.get::<LastDamageTick>(target).and_then(|l| l.0) {
                if tick.saturating_sub(last) < 10 {
                    return None;
                }
            }
        }

        let new_health = apply_damage(&mut self.world, target, damage, cause)?;
        if cause == DamageCause::Attack {
            if let Some(mut ldt) = self.world.get_mut::<LastDamageTick>(target) {
                ldt.0 = Some(tick);
            }
        }
        Some(new_health)
    }

    /// Set whether a mob is in or under water.
    pub fn set_water_state(&mut self, runtime_id: u64, in_water: bool, underwater: bool) {
        if let Some(entity) = self.find_mob_entity(runtime_id) {
            self.world.entity_mut(entity).insert(WaterState {
                in_water,
                underwater,
            });
        }
    }

    pub fn set_sky_exposure(&mut self, runtime_id: u64, visible: bool) {
        if let Some(entity) = self.find_mob_entity(runtime_id) {
            self.world.entity_mut(entity).insert(SkyExposure(visible));
        }
    }

    pub fn set_custom_name(&mut self, runtime_id: u64, name: &str, visible: bool) {
        if let Some(entity) = self.find_mob_entity(runtime_id) {
            self.world.entity_mut(entity).insert(CustomName {
                name: name.to_string(),
                visible,
            });
        }
    }

    pub fn equip(&mut self, runtime_id: u64, slot: EquipmentSlot, item: &str) {
        if let Some(entity) = self.find_mob_entity(runtime_id) {
            if let Some(mut equipment) = self.world.get_mut::<Equipment>(entity) {
                equipment.set(slot, item);
            }
        }
    }

    /// Get a mob's position by runtime_id.
    pub fn mob_position(&mut self, runtime_id: u64) -> Option<(f32, f32, f32)> {
        let entity = self.find_mob_entity(runtime_id)?;
        self.world.get::<Position>(entity).map(|p| (p.x, p.y, p.z))
    }

    /// Remove a mob by runtime_id. Returns `true` if found and removed.
    pub fn remove_mob(&mut self, runtime_id: u64) -> bool {
        let Some(entity) = self.find_mob_entity(runtime_id) else {
            return false;
        };
        let unique_id = self
            .world
            .get::<EntityId>(entity)
            .map(|e| e.unique_id)
            .unwrap_or(0);
        self.world
            .resource_mut::<OutgoingEvents>()
            .events
            .push(GameEvent::EntityRemoved { unique_id });
        self.world.despawn(entity);
        true
    }

    /// Get snapshots of all alive mobs.
    pub fn all_mobs(&mut self) -> Vec<MobSnapshot> {
        let mut query = self.world.query_filtered::<(
            &EntityId,
            &Position,
            &Rotation,
            &Health,
            &MobType,
            &BoundingBox,
        ), (With<Mob>, Without<Dead>)>();
        query
            .iter(&self.world)
            .map(|(eid, pos, rot, health, mob_type, bb)| MobSnapshot {
                unique_id: eid.unique_id,
                runtime_id: eid.runtime_id,
                mob_type: mob_type.0.clone(),
                position: (pos.x, pos.y, pos.z),
                pitch: rot.pitch,
                yaw: rot.yaw,
                head_yaw: rot.head_yaw,
                health: health.current,
                max_health: health.max,
                bb_width: bb.width,
                bb_height: bb.height,
            })
            .collect()
    }

    /// Active component groups of a mob's behavior runtime.
    pub fn active_groups(&mut self, runtime_id: u64) -> Option<Vec<String>> {
        let entity = self.find_mob_entity(runtime_id)?;
        self.world
            .get::<Behavior>(entity)
            .map(|b| b.0.active_groups().to_vec())
    }

    pub fn behavior_stats(&mut self, runtime_id: u64) -> Option<RuntimeStats> {
        let entity = self.find_mob_entity(runtime_id)?;
        self.world.get::<Behavior>(entity).map(|b| b.0.stats())
    }

    pub fn installed_goals(&mut self, runtime_id: u64) -> Option<GoalBundle> {
        let entity = self.find_mob_entity(runtime_id)?;
        self.world
            .get::<InstalledGoals>(entity)
            .map(|g| g.0.clone())
    }

    pub fn mob_count(&mut self) -> usize {
        self.world
            .query_filtered::<(), (With<Mob>, Without<Dead>)>()
            .iter(&self.world)
            .count()
    }

    /// Find a mob entity by runtime_id.
    pub fn find_mob_entity(&mut self, runtime_id: u64) -> Option<Entity> {
        let mut query = self
            .world
            .query_filtered::<(Entity, &EntityId), With<Mob>>();
        query
            .iter(&self.world)
            .find(|(_, eid)| eid.runtime_id == runtime_id)
            .map(|(entity, _)| entity)
    }
}

/// Spawn a data-driven entity from the registry. Returns the ECS entity and
/// its `(unique_id, runtime_id)`.
pub fn spawn_data_driven(
    world: &mut World,
    identifier: &str,
    position: (f32, f32, f32),
) -> Option<(Entity, i64, u64)> {
    let behaviors = world.resource::<Behaviors>();
    let definition = behaviors.registry.entity(identifier)?;
    let (limits, seed) = (behaviors.limits, behaviors.seed);
    let unique_id = world.resource::<EntityIdAllocator>().allocate();
    let runtime_id = unique_id as u64;

    let components = &definition.components;
    let attributes = EntityAttributes::base(components);
    let max_health = attributes.max_health.unwrap_or(DEFAULT_MAX_HEALTH);
    let health = components
        .health
        .as_ref()
        .and_then(|h| h.value.as_ref())
        .and_then(RangedNumber::resolve)
        .map_or(max_health, |v| (v as f32).min(max_health));
    let vars = Variables::new().with_boolean("query.is_baby", components.baby());
    let (bb_width, bb_height) = settings::dimensions(components, settings::scale(components, &vars));

    let mut runtime = EntityRuntime::new(Arc::clone(&definition), limits);
    if let Some(seed) = seed {
        runtime = runtime.with_rng(seed ^ runtime_id);
    }

    let mob_type = identifier::normalize(&definition.identifier);
    let entity = world
        .spawn((
            (
                EntityId {
                    unique_id,
                    runtime_id,
                },
                Position {
                    x: position.0,
                    y: position.1,
                    z: position.2,
                },
                Rotation::default(),
                Velocity::default(),
                OnGround(false),
                FallDistance(0.0),
            ),
            (
                Health {
                    current: health,
                    max: max_health,
                },
                BoundingBox {
                    width: bb_width,
                    height: bb_height,
                },
                MobType(mob_type.clone()),
                AttackDamage(attributes.attack_damage.unwrap_or(DEFAULT_ATTACK_DAMAGE)),
                MovementSpeed(attributes.movement_speed.unwrap_or(0.0)),
                KnockbackResistance(attributes.knockback_resistance.unwrap_or(0.0)),
                LastDamageTick(None),
            ),
            Equipment::default(),
            Mob,
            Behavior(runtime),
        ))
        .id();

    debug!(unique_id, "Spawned {mob_type}");
    world
        .resource_mut::<OutgoingEvents>()
        .events
        .push(GameEvent::MobSpawned {
            runtime_id,
            unique_id,
            mob_type,
            position,
            health,
            max_health,
            bb_width,
            bb_height,
        });
    Some((entity, unique_id, runtime_id))
}

/// Apply damage after the behavior's health floor. Returns the new health,
/// or `None` when the damage was rejected.
fn apply_damage(world: &mut World, target: Entity, damage: f32, cause: DamageCause) -> Option<f32> {
    let current = world.get::<Health>(target)?.current;
    let damage = match world.get::<Behavior>(target) {
        Some(behavior) => match settings::damage_floor(
            behavior.0.active_components(),
            current,
            damage,
            cause == DamageCause::OutOfWorld,
        ) {
            DamageOutcome::Apply(amount) => amount,
            DamageOutcome::Reject => return None,
        },
        None => damage,
    };

    let new_health = {
        let mut health = world.get_mut::<Health>(target)?;
        health.current = (health.current - damage).max(0.0);
        health.current
    };

    let eid = world.get::<EntityId>(target)?.clone();
    let tick = world.resource::<TickCounter>().0;
    if new_health <= 0.0 {
        world
            .resource_mut::<OutgoingEvents>()
            .events
            .push(GameEvent::MobDied {
                runtime_id: eid.runtime_id,
                unique_id: eid.unique_id,
            });
        world.entity_mut(target).insert(Dead);
    } else {
        world
            .resource_mut::<OutgoingEvents>()
            .events
            .push(GameEvent::MobHurt {
                runtime_id: eid.runtime_id,
                new_health,
                tick,
            });
    }
    Some(new_health)
}

// ---------------------------------------------------------------------------
// Systems (manual, called by GameWorld::tick)
// ---------------------------------------------------------------------------

/// Tick every behavior runtime. The [`Behavior`] component is detached while
/// its runtime runs so the host can borrow the world.
fn system_behavior_tick(world: &mut World) {
    let entities: Vec<Entity> = world
        .query_filtered::<Entity, (With<Behavior>, Without<Dead>)>()
        .iter(world)
        .collect();

    for entity in entities {
        let Some(mut behavior) = world.entity_mut(entity).take::<Behavior>() else {
            continue;
        };
        let (outcome, dimensions) = {
            let mut host = EcsHost::new(world, entity);
            let outcome = behavior.0.tick(&mut host);
            (outcome, behavior.0.dimensions(&host))
        };
        if outcome == TickOutcome::Transformed || world.get::<EntityId>(entity).is_none() {
            continue;
        }
        let (width, height) = dimensions;
        world
            .entity_mut(entity)
            .insert((behavior, BoundingBox { width, height }));
    }
}

/// Count down fire, dealing one point of damage every second. Water puts it out.
fn system_burning(world: &mut World) {
    let tick = world.resource::<TickCounter>().0;
    let burning: Vec<(Entity, u32, bool)> = world
        .query_filtered::<(Entity, &Burning, Option<&WaterState>), Without<Dead>>()
        .iter(world)
        .map(|(e, b, w)| (e, b.remaining_ticks, w.is_some_and(|w| w.in_water || w.underwater)))
        .collect();

    for (entity, remaining, wet) in burning {
        if wet {
            world.entity_mut(entity).remove::<Burning>();
            continue;
        }
        if tick % 20 == 0 {
            apply_damage(world, entity, 1.0, DamageCause::Fire);
        }
        if remaining <= 1 {
            world.entity_mut(entity).remove::<Burning>();
        } else {
            world.entity_mut(entity).insert(Burning {
                remaining_ticks: remaining - 1,
            });
        }
    }
}

/// Apply gravity to mobs not on the ground.
fn system_mob_gravity(world: &mut World) {
    const GRAVITY: f32 = 0.08;
    const FLAT_FLOOR_Y: f32 = 4.0; // feet position on flat world

    let mut query = world.query_filtered::<(
        &mut Position,
        &mut Velocity,
        &mut OnGround,
        &mut FallDistance,
        Option<&Physics>,
    ), (With<Mob>, Without<Dead>)>();

    for (mut pos, mut vel, mut on_ground, mut fall, physics) in query.iter_mut(world) {
        if !physics.is_some_and(|p| p.0.no_gravity) {
            vel.y -= GRAVITY;
            vel.y *= 0.98; // air drag
        }

        let before = pos.y;
        pos.x += vel.x;
        pos.y += vel.y;
        pos.z += vel.z;

        // Horizontal drag
        vel.x *= 0.91;
        vel.z *= 0.91;

        // Simple floor collision (flat world)
        if pos.y <= FLAT_FLOOR_Y {
            pos.y = FLAT_FLOOR_Y;
            vel.y = 0.0;
            on_ground.0 = true;
            fall.0 = 0.0;
        } else {
            on_ground.0 = false;
            if pos.y < before {
                fall.0 += before - pos.y;
            }
        }
    }
}

/// Collect position changes and emit MobMoved events.
fn system_collect_mob_moves(world: &mut World) {
    let mut query = world
        .query_filtered::<(&EntityId, &Position, &Rotation, &Velocity, &OnGround), (With<Mob>, Without<Dead>)>();

    let moves: Vec<GameEvent> = query
        .iter(world)
        .filter(|(_, _, _, vel, _)| vel.x.abs() > 0.001 || vel.y.abs() > 0.001 || vel.z.abs() > 0.001)
        .map(|(eid, pos, rot, _, on_ground)| GameEvent::MobMoved {
            runtime_id: eid.runtime_id,
            position: (pos.x, pos.y, pos.z),
            pitch: rot.pitch,
            yaw: rot.yaw,
            head_yaw: rot.head_yaw,
            on_ground: on_ground.0,
        })
        .collect();

    world.resource_mut::<OutgoingEvents>().events.extend(moves);
}

/// Remove dead entities after their death events have been emitted.
fn system_cleanup_dead(world: &mut World) {
    let dead_entities: Vec<Entity> = world
        .query_filtered::<Entity, With<Dead>>()
        .iter(world)
        .collect();
    for entity in dead_entities {
        world.despawn(entity);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
