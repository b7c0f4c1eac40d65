//! Runtime for data-driven entities.
//!
//! An [`EntityRuntime`] interprets one entity's behavior pack definition:
//! it dispatches events, tracks the active component groups, runs timers,
//! environment sensors and transformations, and pushes the derived settings
//! and AI goals to the game through an [`EntityHost`].

pub mod classify;
pub mod events;
pub mod filter;
pub mod host;
pub mod runtime;
pub mod sensor;
pub mod settings;
pub mod timer;
pub mod transformation;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{Classification, Goal, GoalBundle, GoalType, PrioritizedGoal, TargetKind};
pub use filter::FilterContext;
pub use host::{EntityHost, EntitySnapshot, EquipmentSlot};
pub use runtime::{EntityRuntime, RuntimeLimits, RuntimeStats, TickOutcome};
pub use settings::{DamageOutcome, EntityAttributes, NavigationSettings, PhysicsFlags};
