//! `minecraft:transformation`: replace the entity with another after a delay.

use bedrock_behavior_pack::components::Transformation;
use bedrock_behavior_pack::identifier::{self, Identifier};
use tracing::{info, warn};

use crate::host::EntityHost;
use crate::timer::TICKS_PER_SECOND;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransformation {
    /// Namespaced target identifier.
    pub target: String,
    pub spawn_event: Option<String>,
    pub remaining: u32,
    pub drop_equipment: bool,
}

impl PendingTransformation {
    /// `None` when `into` is missing or not a valid identifier.
    pub fn from_component(component: &Transformation) -> Option<Self> {
        let into = component.into.as_deref()?;
        let (id, spawn_event) = identifier::split_spawn_event(into);
        let target = Identifier::parse(id)?;
        let delay = (component.delay_seconds() * TICKS_PER_SECOND).floor();
        let remaining = if delay.is_finite() && delay >= 1.0 {
            delay.min(f64::from(u32::MAX)) as u32
        } else {
            1
        };
        Some(Self {
            target: target.to_string(),
            spawn_event: spawn_event.map(String::from),
            remaining,
            drop_equipment: component.drops_equipment(),
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct TransformationScheduler {
    pending: Option<PendingTransformation>,
    /// Set after warning about an unusable component, until it goes away.
    rejected: bool,
}

impl TransformationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick against the active `transformation` component.
    /// Returns the transformation once its countdown reaches zero.
    pub fn tick(&mut self, component: Option<&Transformation>) -> Option<PendingTransformation> {
        let Some(component) = component else {
            self.pending = None;
            self.rejected = false;
            return None;
        };
        if self.pending.is_none() && !self.rejected {
            self.pending = PendingTransformation::from_component(component);
            if self.pending.is_none() {
                warn!("Ignoring transformation with invalid target {:?}", component.into);
                self.rejected = true;
            }
        }

        let pending = self.pending.as_mut()?;
        pending.remaining = pending.remaining.saturating_sub(1);
        if pending.remaining == 0 {
            self.pending.take()
        } else {
            None
        }
    }

    pub fn pending(&self) -> Option<&PendingTransformation> {
        self.pending.as_ref()
    }
}

/// Spawn the replacement and despawn the original. When the host cannot
/// spawn the target the original is kept and `false` is returned.
pub fn perform(pending: &PendingTransformation, host: &mut dyn EntityHost) -> bool {
    let mut snapshot = host.snapshot();
    if pending.drop_equipment {
        snapshot.equipment.clear();
    }
    if !host.spawn_entity(&pending.target, &snapshot, pending.spawn_event.as_deref()) {
        warn!("Cannot spawn transformation target {}", pending.target);
        return false;
    }
    host.despawn();
    info!("Transformed into {}", pending.target);
    true
}
