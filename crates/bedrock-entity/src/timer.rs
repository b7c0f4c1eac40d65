//! `minecraft:timer` countdowns.

use std::collections::BTreeMap;

use bedrock_behavior_pack::components::Timer;
use bedrock_behavior_pack::{EntityDefinition, EventNode};
use rand::Rng;
use tracing::debug;

/// Ticks per second of game time.
pub const TICKS_PER_SECOND: f64 = 20.0;

/// Where a timer comes from. Group names are unique within a definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerKey {
    Base,
    Group(String),
}

/// Timers visible for the given active groups: the definition's own timer
/// plus one per active group that declares one.
pub fn visible_timers<'a>(
    definition: &'a EntityDefinition,
    groups: &[String],
) -> Vec<(TimerKey, &'a Timer)> {
    let base = definition
        .components
        .timer
        .as_ref()
        .map(|timer| (TimerKey::Base, timer));
    let grouped = groups.iter().filter_map(|name| {
        definition
            .group(name)
            .and_then(|group| group.timer.as_ref())
            .map(|timer| (TimerKey::Group(name.clone()), timer))
    });
    base.into_iter().chain(grouped).collect()
}

#[derive(Debug, Clone)]
struct RuntimeTimer {
    remaining: u32,
    config: Timer,
}

#[derive(Debug, Default, Clone)]
pub struct TimerScheduler {
    running: BTreeMap<TimerKey, RuntimeTimer>,
    /// Finished one-shots and zero-length timers. They stay quiet until their
    /// key disappears or their configuration changes.
    dormant: BTreeMap<TimerKey, Timer>,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile against `visible`, advance every timer by one tick and return
    /// the `time_down_event` of each timer that expired.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        visible: &[(TimerKey, &Timer)],
        rng: &mut R,
    ) -> Vec<EventNode> {
        let is_visible = |key: &TimerKey| visible.iter().any(|(k, _)| k == key);
        self.running.retain(|key, _| is_visible(key));
        self.dormant.retain(|key, _| is_visible(key));

        for (key, timer) in visible {
            let current = self
                .running
                .get(key)
                .map(|rt| &rt.config)
                .or_else(|| self.dormant.get(key));
            if current.is_some_and(|c| same_schedule(c, timer)) {
                continue;
            }
            self.dormant.remove(key);
            match period_ticks(timer, rng) {
                Some(period) if period > 0 => {
                    debug!(?key, period, "Starting timer");
                    self.running.insert(
                        key.clone(),
                        RuntimeTimer {
                            remaining: period,
                            config: (*timer).clone(),
                        },
                    );
                }
                _ => {
                    debug!(?key, "Ignoring timer without a positive duration");
                    self.running.remove(key);
                    self.dormant.insert(key.clone(), (*timer).clone());
                }
            }
        }

        let mut fired = Vec::new();
        let mut finished = Vec::new();
        for (key, timer) in self.running.iter_mut() {
            timer.remaining = timer.remaining.saturating_sub(1);
            if timer.remaining > 0 {
                continue;
            }
            if let Some(event) = &timer.config.time_down_event {
                fired.push(event.clone());
            }
            let next = if timer.config.looping {
                period_ticks(&timer.config, rng).filter(|p| *p > 0)
            } else {
                None
            };
            match next {
                Some(period) => timer.remaining = period,
                None => finished.push(key.clone()),
            }
        }
        for key in finished {
            if let Some(timer) = self.running.remove(&key) {
                self.dormant.insert(key, timer.config);
            }
        }
        fired
    }

    /// Number of timers currently counting down.
    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}

fn same_schedule(a: &Timer, b: &Timer) -> bool {
    a.time == b.time && a.looping == b.looping
}

/// Longest period a timer can count down.
const MAX_TIMER_SECONDS: f64 = u32::MAX as f64 / TICKS_PER_SECOND;

/// Roll a period in ticks. `None` when the timer has no usable `time`.
/// Bounds are clamped to `[0, MAX_TIMER_SECONDS]` before rolling.
fn period_ticks<R: Rng + ?Sized>(timer: &Timer, rng: &mut R) -> Option<u32> {
    let (min, max) = timer.time.as_ref()?.bounds()?;
    let (min, max) = (
        min.clamp(0.0, MAX_TIMER_SECONDS),
        max.clamp(0.0, MAX_TIMER_SECONDS),
    );
    let seconds = if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    };
    if !seconds.is_finite() || seconds <= 0.0 {
        return Some(0);
    }
    Some((seconds * TICKS_PER_SECOND).floor() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bedrock_behavior_pack::components::TimerTime;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn timer(v: serde_json::Value) -> Timer {
        serde_json::from_value(v).unwrap()
    }

    fn run(scheduler: &mut TimerScheduler, visible: &[(TimerKey, &Timer)], ticks: u32) -> Vec<u32> {
        let mut rng = StdRng::seed_from_u64(3);
        (1..=ticks)
            .filter(|_| !scheduler.tick(visible, &mut rng).is_empty())
            .collect()
    }

    #[test]
    fn looping_timer_fires_every_period() {
        let t = timer(json!({ "time": 1, "looping": true, "time_down_event": { "event": "tock" } }));
        let mut scheduler = TimerScheduler::new();
        let fired = run(&mut scheduler, &[(TimerKey::Base, &t)], 100);
        assert_eq!(fired, vec![20, 40, 60, 80, 100]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn one_shot_fires_once() {
        let t = timer(json!({ "time": 0.5, "time_down_event": { "event": "done" } }));
        let mut scheduler = TimerScheduler::new();
        let fired = run(&mut scheduler, &[(TimerKey::Base, &t)], 60);
        assert_eq!(fired, vec![10]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn hidden_timer_is_dropped_and_restarts_when_visible_again() {
        let t = timer(json!({ "time": 1, "time_down_event": { "event": "x" } }));
        let key = TimerKey::Group("countdown".into());
        let mut scheduler = TimerScheduler::new();
        assert!(run(&mut scheduler, &[(key.clone(), &t)], 15).is_empty());
        assert!(run(&mut scheduler, &[], 1).is_empty());
        assert!(scheduler.is_empty());
        assert_eq!(run(&mut scheduler, &[(key, &t)], 20), vec![20]);
    }

    #[test]
    fn changed_schedule_restarts() {
        let short = timer(json!({ "time": 1 }));
        let long = timer(json!({ "time": 2 }));
        let mut scheduler = TimerScheduler::new();
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10 {
            scheduler.tick(&[(TimerKey::Base, &short)], &mut rng);
        }
        let fired = run(&mut scheduler, &[(TimerKey::Base, &long)], 40);
        assert_eq!(fired, vec![40]);
    }

    #[test]
    fn zero_duration_is_ignored() {
        let t = timer(json!({ "time": 0, "looping": true, "time_down_event": { "event": "x" } }));
        let mut scheduler = TimerScheduler::new();
        assert!(run(&mut scheduler, &[(TimerKey::Base, &t)], 50).is_empty());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn ranged_time_rolls_within_bounds() {
        let t = Timer {
            time: Some(TimerTime::Range(vec![1.0, 2.0])),
            looping: false,
            time_down_event: None,
        };
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let ticks = period_ticks(&t, &mut rng).unwrap();
            assert!((20..=40).contains(&ticks));
        }
    }

    #[test]
    fn extreme_ranges_are_clamped() {
        let mut rng = StdRng::seed_from_u64(9);
        let wide = Timer {
            time: Some(TimerTime::Range(vec![-1.7e308, 1.7e308])),
            looping: true,
            time_down_event: None,
        };
        for _ in 0..20 {
            assert!(period_ticks(&wide, &mut rng).is_some());
        }

        let negative = Timer {
            time: Some(TimerTime::Range(vec![-5.0, -1.0])),
            ..wide.clone()
        };
        assert_eq!(period_ticks(&negative, &mut rng), Some(0));

        let huge = Timer {
            time: Some(TimerTime::Seconds(1e300)),
            ..wide.clone()
        };
        assert_eq!(period_ticks(&huge, &mut rng), Some(u32::MAX));

        let mut scheduler = TimerScheduler::new();
        scheduler.tick(&[(TimerKey::Base, &wide)], &mut rng);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn visible_timers_follow_active_groups() {
        let def = EntityDefinition::parse_json(
            r#"{ "minecraft:entity": {
                "description": { "identifier": "test:mob" },
                "components": { "minecraft:timer": { "time": 5 } },
                "component_groups": {
                    "a": { "minecraft:timer": { "time": 1 } },
                    "b": { "minecraft:movement": { "value": 1 } }
                }
            } }"#,
        )
        .unwrap();
        let keys: Vec<TimerKey> = visible_timers(&def, &["a".into(), "b".into(), "missing".into()])
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![TimerKey::Base, TimerKey::Group("a".into())]);
    }
}
