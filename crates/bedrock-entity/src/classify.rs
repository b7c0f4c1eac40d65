//! One-shot AI goal selection from the active component set.
//!
//! Entities are classified once, on their first tick, into a fixed set of
//! prioritized goals that the host's goal scheduler runs. Later component
//! changes do not reclassify.

use bedrock_behavior_pack::components::RangedAttackBehavior;
use bedrock_behavior_pack::{ComponentSet, Identifier};

use crate::settings::DEFAULT_ATTACK_DAMAGE;

const HOSTILE_FAMILIES: &[&str] = &[
    "monster", "hostile", "undead", "illager", "raider", "piglin", "zombie", "skeleton",
    "creeper", "spider", "blaze", "ghast", "wither", "witch",
];

const PASSIVE_FAMILIES: &[&str] = &["animal", "villager", "tame", "tamable"];

const HOSTILE_NAMES: &[&str] = &[
    "zombie", "skeleton", "creeper", "spider", "illager", "pillager", "vindicator", "evoker",
    "witch", "wither", "blaze", "ghast", "ravager", "piglin", "warthen",
];

/// What kind of output a goal produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalType {
    /// Controls movement (only one active at a time).
    Movement,
    /// Non-movement (e.g., look at player). Multiple can co-exist.
    Passive,
    /// Target selector (picks who to attack). Only one active at a time.
    TargetSelector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Player,
    Villager,
    IronGolem,
}

/// Resolved `behavior.ranged_attack` parameters. Intervals are in ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangedAttackParams {
    pub speed: f64,
    pub attack_radius: f32,
    pub interval_min: u32,
    pub interval_max: u32,
    pub power: f32,
    pub burst_shots: u32,
    pub projectile_damage: f32,
}

impl RangedAttackParams {
    pub fn resolve(behavior: &RangedAttackBehavior, components: &ComponentSet) -> Self {
        let interval_min = behavior
            .attack_interval_min
            .map(seconds_to_ticks)
            .unwrap_or(20)
            .max(1);
        let interval_max = behavior
            .attack_interval_max
            .map(seconds_to_ticks)
            .unwrap_or(interval_min)
            .max(interval_min);
        Self {
            speed: behavior
                .speed_multiplier
                .map(|s| f64::from(s).max(0.1))
                .unwrap_or(1.0),
            attack_radius: behavior.attack_radius.map(|r| r.max(1.0)).unwrap_or(12.0),
            interval_min,
            interval_max,
            power: components
                .shooter
                .as_ref()
                .and_then(|s| s.power)
                .unwrap_or(1.6),
            burst_shots: behavior.burst_shots.unwrap_or(1).max(1),
            projectile_damage: components.attack_damage().unwrap_or(DEFAULT_ATTACK_DAMAGE),
        }
    }
}

fn seconds_to_ticks(seconds: f32) -> u32 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 20.0).round() as u32
    } else {
        0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Goal {
    Float,
    WanderAroundFar { speed: f64 },
    LookAtPlayer { range: f32 },
    LookAround,
    RangedAttack(RangedAttackParams),
    MeleeAttack { speed: f64 },
    Revenge,
    NearestAttackable { target: TargetKind, must_see: bool },
}

impl Goal {
    pub fn goal_type(&self) -> GoalType {
        match self {
            Goal::Float | Goal::WanderAroundFar { .. } => GoalType::Movement,
            Goal::LookAtPlayer { .. } | Goal::LookAround => GoalType::Passive,
            Goal::RangedAttack(_) | Goal::MeleeAttack { .. } => GoalType::Movement,
            Goal::Revenge | Goal::NearestAttackable { .. } => GoalType::TargetSelector,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrioritizedGoal {
    /// Lower runs first.
    pub priority: u32,
    pub goal: Goal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalBundle {
    pub goals: Vec<PrioritizedGoal>,
}

impl GoalBundle {
    fn push(&mut self, priority: u32, goal: Goal) {
        self.goals.push(PrioritizedGoal { priority, goal });
    }

    pub fn contains(&self, pred: impl Fn(&Goal) -> bool) -> bool {
        self.goals.iter().any(|g| pred(&g.goal))
    }

    /// Goals of one type, highest priority first.
    pub fn of_type(&self, goal_type: GoalType) -> Vec<&PrioritizedGoal> {
        let mut goals: Vec<_> = self
            .goals
            .iter()
            .filter(|g| g.goal.goal_type() == goal_type)
            .collect();
        goals.sort_by_key(|g| g.priority);
        goals
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub should_float: bool,
    pub mobile: bool,
    pub hostile: bool,
    pub uses_ranged: bool,
    pub should_melee: bool,
    pub move_speed: f64,
}

pub fn classify(identifier: &str, components: &ComponentSet) -> Classification {
    let should_float = components.navigation().map_or(true, |nav| nav.allows_water());
    let mobile = is_mobile(components);
    let hostile = is_hostile(identifier, components);
    let uses_ranged = components.ranged_attack.is_some() && components.shooter.is_some();
    Classification {
        should_float,
        mobile,
        hostile,
        uses_ranged,
        should_melee: hostile && components.ranged_attack.is_none(),
        move_speed: components
            .movement
            .as_ref()
            .and_then(|m| m.value)
            .map(|v| f64::from(v).max(0.1))
            .unwrap_or(1.0),
    }
}

fn is_mobile(components: &ComponentSet) -> bool {
    if components.immobile() {
        return false;
    }
    let nav = components.navigation();
    let can_fly = components.can_fly.is_some();
    let has_mobility = components.movement.is_some()
        || components.underwater_movement.is_some()
        || components.movement_basic.is_some()
        || components.movement_generic.is_some()
        || nav.is_some()
        || can_fly;
    if !has_mobility {
        return false;
    }
    if components
        .movement
        .as_ref()
        .and_then(|m| m.value)
        .is_some_and(|speed| speed <= 0.0)
    {
        return false;
    }
    match nav {
        Some(nav) if nav.can_walk == Some(false) && !nav.allows_water() && !can_fly => false,
        _ => true,
    }
}

fn is_hostile(identifier: &str, components: &ComponentSet) -> bool {
    let families = components.families();
    if families.iter().any(|f| HOSTILE_FAMILIES.contains(&f.as_str())) {
        return true;
    }
    if families.iter().any(|f| PASSIVE_FAMILIES.contains(&f.as_str())) {
        return false;
    }
    let path = Identifier::parse(identifier)
        .map(|id| id.path().to_string())
        .unwrap_or_else(|| identifier.to_ascii_lowercase());
    HOSTILE_NAMES.iter().any(|name| path.contains(name))
}

/// Goals for a classified entity.
pub fn goal_bundle(classification: &Classification, components: &ComponentSet) -> GoalBundle {
    let mut bundle = GoalBundle::default();
    if classification.should_float {
        bundle.push(0, Goal::Float);
    }
    if !classification.mobile {
        return bundle;
    }

    let speed = classification.move_speed;
    bundle.push(5, Goal::WanderAroundFar { speed });
    bundle.push(6, Goal::LookAtPlayer { range: 8.0 });
    bundle.push(7, Goal::LookAround);

    if let (Some(ranged), true) = (&components.ranged_attack, classification.uses_ranged) {
        bundle.push(
            ranged.priority.unwrap_or(2),
            Goal::RangedAttack(RangedAttackParams::resolve(ranged, components)),
        );
    }

    if classification.hostile {
        if classification.should_melee {
            bundle.push(2, Goal::MeleeAttack { speed: speed.max(1.0) });
        }
        bundle.push(1, Goal::Revenge);
        let targets = [
            (2, TargetKind::Player, true),
            (3, TargetKind::Villager, false),
            (4, TargetKind::IronGolem, true),
        ];
        for (priority, target, must_see) in targets {
            bundle.push(priority, Goal::NearestAttackable { target, must_see });
        }
    }
    bundle
}
