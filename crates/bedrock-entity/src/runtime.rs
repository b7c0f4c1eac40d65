//! Per-entity runtime: owns the event queue, active groups and schedulers of
//! one live entity and advances them once per game tick.

use std::sync::Arc;

use bedrock_behavior_pack::components::Marker;
use bedrock_behavior_pack::{ComponentSet, EntityDefinition};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::debug;

use crate::classify::{self, Classification};
use crate::events::EventEngine;
use crate::filter::FilterContext;
use crate::host::{EntityHost, EquipmentSlot};
use crate::sensor;
use crate::settings::{self, DamageOutcome, EntityAttributes, NavigationSettings, PhysicsFlags};
use crate::timer::{self, TimerScheduler};
use crate::transformation::{self, TransformationScheduler};

/// Events fired on the first tick, in order.
pub const SPAWN_EVENTS: [&str; 2] = ["minecraft:entity_spawned", "entity_spawned"];

/// How long daylight sets a burning entity alight.
pub const DAYLIGHT_BURN_SECONDS: u32 = 8;

const DEFAULT_RANGED_WEAPON: &str = "minecraft:bow";

/// Event budgets per drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeLimits {
    /// Budget for the spawn events on the first tick.
    pub spawn_event_budget: usize,
    /// Budget for every later tick.
    pub tick_event_budget: usize,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        Self {
            spawn_event_budget: 64,
            tick_event_budget: 128,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub ticks: u64,
    pub processed_events: u64,
    pub dropped_events: u64,
    pub recomputes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The entity was replaced and despawned; stop ticking it.
    Transformed,
}

#[derive(Debug)]
pub struct EntityRuntime {
    definition: Arc<EntityDefinition>,
    limits: RuntimeLimits,
    rng: StdRng,
    initialized: bool,
    events: EventEngine,
    active: ComponentSet,
    timers: TimerScheduler,
    transformation: TransformationScheduler,
    classification: Option<Classification>,
    stats: RuntimeStats,
}

impl EntityRuntime {
    pub fn new(definition: Arc<EntityDefinition>, limits: RuntimeLimits) -> Self {
        let active = definition.components.clone();
        Self {
            definition,
            limits,
            rng: StdRng::from_entropy(),
            initialized: false,
            events: EventEngine::new(),
            active,
            timers: TimerScheduler::new(),
            transformation: TransformationScheduler::new(),
            classification: None,
            stats: RuntimeStats::default(),
        }
    }

    /// Replace the random source with a seeded one.
    pub fn with_rng(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Advance one game tick.
    pub fn tick(&mut self, host: &mut dyn EntityHost) -> TickOutcome {
        self.stats.ticks += 1;
        if !self.initialized {
            self.initialize(host);
        }

        let definition = Arc::clone(&self.definition);
        let groups = self.events.active_groups().to_vec();
        {
            let ctx = FilterContext::new(&*host, &self.active);
            for trigger in sensor::sensor_triggers(&definition, &groups) {
                self.events.walk(trigger, &ctx, &mut self.rng);
            }
            let visible = timer::visible_timers(&definition, &groups);
            for node in self.timers.tick(&visible, &mut self.rng) {
                self.events.walk(&node, &ctx, &mut self.rng);
            }
        }

        if self.drain(&*host, self.limits.tick_event_budget) {
            self.push_settings(host);
        }

        if let Some(pending) = self.transformation.tick(self.active.transformation.as_ref()) {
            if transformation::perform(&pending, host) {
                return TickOutcome::Transformed;
            }
        }

        self.burn_in_daylight(host);
        if self.active.can_fly.is_some() {
            host.reset_fall_distance();
        }

        if self.classification.is_none() {
            let classification = classify::classify(&self.definition.identifier, &self.active);
            let goals = classify::goal_bundle(&classification, &self.active);
            debug!(
                entity = %self.definition.identifier,
                hostile = classification.hostile,
                mobile = classification.mobile,
                goals = goals.goals.len(),
                "Installing goals"
            );
            host.install_goals(&goals);
            self.classification = Some(classification);
        }
        TickOutcome::Continue
    }

    fn initialize(&mut self, host: &mut dyn EntityHost) {
        self.initialized = true;
        for event in SPAWN_EVENTS {
            self.events.enqueue(event);
        }
        self.drain(&*host, self.limits.spawn_event_budget);

        host.apply_attributes(&EntityAttributes::base(&self.active));
        if let Some(navigation) = NavigationSettings::from_components(&self.active) {
            host.apply_navigation(&navigation);
        }
        host.apply_physics(&PhysicsFlags::from_components(&self.active));
        self.equip_defaults(host);
    }

    /// Drain the event queue. Returns whether the active set was recomputed.
    fn drain(&mut self, host: &dyn EntityHost, budget: usize) -> bool {
        let definition = Arc::clone(&self.definition);
        let ctx = FilterContext::new(host, &self.active);
        self.events.drain(&definition, budget, &ctx, &mut self.rng);
        self.stats.processed_events = self.events.processed();
        self.stats.dropped_events = self.events.dropped();

        if !self.events.take_dirty() {
            return false;
        }
        self.active = self.events.active_components(&definition);
        self.stats.recomputes += 1;
        debug!(
            entity = %definition.identifier,
            groups = ?self.events.active_groups(),
            "Recomputed active components"
        );
        true
    }

    fn push_settings(&self, host: &mut dyn EntityHost) {
        host.apply_attributes(&EntityAttributes::from_components(&self.active));
        if let Some(navigation) = NavigationSettings::from_components(&self.active) {
            host.apply_navigation(&navigation);
        }
        host.apply_physics(&PhysicsFlags::from_components(&self.active));
        self.equip_defaults(host);
    }

    fn equip_defaults(&self, host: &mut dyn EntityHost) {
        if self.active.ranged_attack.is_some() && host.main_hand_empty() {
            host.equip(EquipmentSlot::MainHand, DEFAULT_RANGED_WEAPON);
        }
    }

    fn burn_in_daylight(&self, host: &mut dyn EntityHost) {
        let burns = self
            .active
            .burns_in_daylight
            .as_ref()
            .is_some_and(Marker::is_enabled);
        if burns
            && host.is_day()
            && !host.is_wet()
            && !host.is_in_water()
            && !host.is_underwater()
            && host.is_sky_visible()
        {
            host.set_on_fire(DAYLIGHT_BURN_SECONDS);
        }
    }

    /// Queue an event raised by the host, such as an interaction.
    pub fn enqueue_event(&mut self, name: &str) {
        self.events.enqueue(name);
    }

    pub fn definition(&self) -> &Arc<EntityDefinition> {
        &self.definition
    }

    pub fn identifier(&self) -> &str {
        &self.definition.identifier
    }

    pub fn active_components(&self) -> &ComponentSet {
        &self.active
    }

    pub fn active_groups(&self) -> &[String] {
        self.events.active_groups()
    }

    pub fn has_pending_transformation(&self) -> bool {
        self.transformation.pending().is_some()
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    pub fn stats(&self) -> RuntimeStats {
        self.stats
    }

    /// Set once the first tick has run.
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Resolved `minecraft:scale` for the live entity.
    pub fn scale(&self, host: &dyn EntityHost) -> f32 {
        let vars = FilterContext::new(host, &self.active).variables();
        settings::scale(&self.active, &vars)
    }

    /// Scaled collision box `(width, height)`.
    pub fn dimensions(&self, host: &dyn EntityHost) -> (f32, f32) {
        settings::dimensions(&self.active, self.scale(host))
    }

    /// Apply the `health.min` floor to incoming damage.
    pub fn damage(&self, host: &dyn EntityHost, amount: f32, out_of_world: bool) -> DamageOutcome {
        settings::damage_floor(&self.active, host.health(), amount, out_of_world)
    }
}
