//! In-memory [`EntityHost`] that records every side effect.

use bedrock_behavior_pack::{Difficulty, Dimension, Identifier};

use crate::classify::GoalBundle;
use crate::host::{EntityHost, EntitySnapshot, EquipmentSlot};
use crate::settings::{EntityAttributes, NavigationSettings, PhysicsFlags};

#[derive(Debug, Clone)]
pub struct MockHost {
    pub underwater: bool,
    pub in_water: bool,
    pub wet: bool,
    pub on_fire: bool,
    pub custom_name: Option<String>,
    pub dimension: Dimension,
    pub difficulty: Difficulty,
    pub day: bool,
    pub sky_visible: bool,
    pub biome: Option<Identifier>,
    pub health: f32,
    pub position: [f64; 3],
    pub equipment: Vec<(EquipmentSlot, String)>,
    pub can_spawn: bool,

    pub attributes: Vec<EntityAttributes>,
    pub navigation: Vec<NavigationSettings>,
    pub physics: Vec<PhysicsFlags>,
    pub equipped: Vec<(EquipmentSlot, String)>,
    pub fire_seconds: Option<u32>,
    pub fall_resets: u32,
    pub goals: Vec<GoalBundle>,
    pub spawned: Vec<(String, EntitySnapshot, Option<String>)>,
    pub despawned: bool,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            underwater: false,
            in_water: false,
            wet: false,
            on_fire: false,
            custom_name: None,
            dimension: Dimension::Overworld,
            difficulty: Difficulty::Normal,
            day: true,
            sky_visible: true,
            biome: Identifier::parse("minecraft:plains"),
            health: 20.0,
            position: [0.5, 64.0, 0.5],
            equipment: Vec::new(),
            can_spawn: true,
            attributes: Vec::new(),
            navigation: Vec::new(),
            physics: Vec::new(),
            equipped: Vec::new(),
            fire_seconds: None,
            fall_resets: 0,
            goals: Vec::new(),
            spawned: Vec::new(),
            despawned: false,
        }
    }
}

impl EntityHost for MockHost {
    fn is_underwater(&self) -> bool {
        self.underwater
    }

    fn is_in_water(&self) -> bool {
        self.in_water
    }

    fn is_wet(&self) -> bool {
        self.wet
    }

    fn is_on_fire(&self) -> bool {
        self.on_fire
    }

    fn custom_name(&self) -> Option<String> {
        self.custom_name.clone()
    }

    fn dimension(&self) -> Dimension {
        self.dimension
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn is_day(&self) -> bool {
        self.day
    }

    fn is_sky_visible(&self) -> bool {
        self.sky_visible
    }

    fn biome(&self) -> Option<Identifier> {
        self.biome.clone()
    }

    fn health(&self) -> f32 {
        self.health
    }

    fn apply_attributes(&mut self, attributes: &EntityAttributes) {
        self.attributes.push(*attributes);
    }

    fn apply_navigation(&mut self, navigation: &NavigationSettings) {
        self.navigation.push(*navigation);
    }

    fn apply_physics(&mut self, physics: &PhysicsFlags) {
        self.physics.push(*physics);
    }

    fn main_hand_empty(&self) -> bool {
        !self
            .equipment
            .iter()
            .any(|(slot, _)| *slot == EquipmentSlot::MainHand)
    }

    fn equip(&mut self, slot: EquipmentSlot, item: &str) {
        self.equipment.retain(|(s, _)| *s != slot);
        self.equipment.push((slot, item.to_string()));
        self.equipped.push((slot, item.to_string()));
    }

    fn set_on_fire(&mut self, seconds: u32) {
        self.on_fire = true;
        self.fire_seconds = Some(seconds);
    }

    fn reset_fall_distance(&mut self) {
        self.fall_resets += 1;
    }

    fn install_goals(&mut self, goals: &GoalBundle) {
        self.goals.push(goals.clone());
    }

    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            position: self.position,
            rotation: [90.0, 0.0],
            velocity: [0.0; 3],
            custom_name: self.custom_name.clone(),
            custom_name_visible: self.custom_name.is_some(),
            equipment: self.equipment.clone(),
        }
    }

    fn spawn_entity(
        &mut self,
        identifier: &str,
        snapshot: &EntitySnapshot,
        spawn_event: Option<&str>,
    ) -> bool {
        if !self.can_spawn {
            return false;
        }
        self.spawned.push((
            identifier.to_string(),
            snapshot.clone(),
            spawn_event.map(String::from),
        ));
        true
    }

    fn despawn(&mut self) {
        self.despawned = true;
    }
}
