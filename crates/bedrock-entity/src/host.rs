//! The adapter between an entity runtime and the game that hosts it.

use bedrock_behavior_pack::{Difficulty, Dimension, Identifier};

use crate::classify::GoalBundle;
use crate::settings::{EntityAttributes, NavigationSettings, PhysicsFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EquipmentSlot {
    MainHand,
    OffHand,
    Head,
    Chest,
    Legs,
    Feet,
}

/// State carried over from an entity to its transformation target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitySnapshot {
    pub position: [f64; 3],
    /// Yaw and pitch in degrees.
    pub rotation: [f32; 2],
    pub velocity: [f64; 3],
    pub custom_name: Option<String>,
    pub custom_name_visible: bool,
    pub equipment: Vec<(EquipmentSlot, String)>,
}

/// Everything the runtime reads from or does to the live entity.
///
/// Queries describe the ticking entity and the world around it. Side effects
/// are applied immediately by the host.
pub trait EntityHost {
    // === World queries ===

    fn is_underwater(&self) -> bool;
    fn is_in_water(&self) -> bool;
    /// Touching water or standing in rain.
    fn is_wet(&self) -> bool;
    fn is_on_fire(&self) -> bool;
    fn custom_name(&self) -> Option<String>;
    fn dimension(&self) -> Dimension;
    fn difficulty(&self) -> Difficulty;
    fn is_day(&self) -> bool;
    fn is_sky_visible(&self) -> bool;
    fn biome(&self) -> Option<Identifier>;
    fn health(&self) -> f32;

    // === Side effects ===

    fn apply_attributes(&mut self, attributes: &EntityAttributes);
    fn apply_navigation(&mut self, navigation: &NavigationSettings);
    fn apply_physics(&mut self, physics: &PhysicsFlags);
    fn main_hand_empty(&self) -> bool;
    fn equip(&mut self, slot: EquipmentSlot, item: &str);
    fn set_on_fire(&mut self, seconds: u32);
    fn reset_fall_distance(&mut self);
    fn install_goals(&mut self, goals: &GoalBundle);

    // === Transformation ===

    fn snapshot(&self) -> EntitySnapshot;
    /// Spawn `identifier` from `snapshot`, then fire `spawn_event` on it.
    /// Returns `false` when the host does not know the identifier.
    fn spawn_entity(
        &mut self,
        identifier: &str,
        snapshot: &EntitySnapshot,
        spawn_event: Option<&str>,
    ) -> bool;
    fn despawn(&mut self);
}
