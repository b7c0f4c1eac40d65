//! Queue-driven interpreter for entity event trees.
//!
//! The set of active component groups is the whole state: events add and
//! remove groups, and may enqueue further events. Draining is bounded so a
//! self-triggering event can never stall a tick.

use std::collections::VecDeque;

use bedrock_behavior_pack::{merge, ComponentSet, EntityDefinition, EventAction, EventNode};
use rand::Rng;
use tracing::{debug, warn};

use crate::filter::{self, FilterContext};

#[derive(Debug, Default, Clone)]
pub struct EventEngine {
    /// Active groups in activation order.
    groups: Vec<String>,
    queue: VecDeque<String>,
    dirty: bool,
    processed: u64,
    dropped: u64,
}

impl EventEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event by name. Blank names are ignored.
    pub fn enqueue(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.queue.push_back(name.to_string());
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Walk an event node. Any events it names are queued, not dispatched.
    pub fn walk<R: Rng + ?Sized>(&mut self, node: &EventNode, ctx: &FilterContext, rng: &mut R) {
        match node {
            EventNode::Sequence(children) => {
                for child in children {
                    self.walk(child, ctx, rng);
                }
            }
            EventNode::Action(action) => self.apply_action(action, ctx, rng),
        }
    }

    fn apply_action<R: Rng + ?Sized>(
        &mut self,
        action: &EventAction,
        ctx: &FilterContext,
        rng: &mut R,
    ) {
        if !filter::matches(action.filters.as_ref(), ctx) {
            return;
        }
        if let Some(event) = &action.event {
            self.enqueue(event);
        }
        if let Some(trigger) = &action.trigger {
            self.apply_action(trigger, ctx, rng);
        }
        for group in &action.remove {
            self.remove_group(group);
        }
        for group in &action.add {
            self.add_group(group);
        }
        for child in &action.sequence {
            self.walk(child, ctx, rng);
        }
        if let Some(choice) = choose_weighted(&action.randomize, rng) {
            self.walk(choice, ctx, rng);
        }
    }

    fn add_group(&mut self, name: &str) {
        if !self.groups.iter().any(|g| g == name) {
            self.groups.push(name.to_string());
            self.dirty = true;
        }
    }

    fn remove_group(&mut self, name: &str) {
        let before = self.groups.len();
        self.groups.retain(|g| g != name);
        if self.groups.len() != before {
            self.dirty = true;
        }
    }

    /// Dispatch up to `max` queued events. Whatever is still queued afterwards
    /// is discarded. Returns the number of events dispatched.
    pub fn drain<R: Rng + ?Sized>(
        &mut self,
        definition: &EntityDefinition,
        max: usize,
        ctx: &FilterContext,
        rng: &mut R,
    ) -> usize {
        let mut dispatched = 0;
        while dispatched < max {
            let Some(name) = self.queue.pop_front() else {
                break;
            };
            dispatched += 1;
            match definition.event(&name) {
                Some(node) => {
                    debug!(entity = %definition.identifier, "Dispatching event {name}");
                    self.walk(node, ctx, rng);
                }
                None => debug!(entity = %definition.identifier, "No event named {name}"),
            }
        }
        self.processed += dispatched as u64;

        if !self.queue.is_empty() {
            let leftover = self.queue.len();
            warn!(
                entity = %definition.identifier,
                "Event queue exceeded {max} events, dropping {leftover}"
            );
            self.queue.clear();
            self.dropped += leftover as u64;
        }
        dispatched
    }

    /// Whether group membership changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn active_groups(&self) -> &[String] {
        &self.groups
    }

    /// Base components with every active group the definition knows about
    /// overlaid in activation order.
    pub fn active_components(&self, definition: &EntityDefinition) -> ComponentSet {
        merge(
            &definition.components,
            self.groups.iter().filter_map(|g| definition.group(g)),
        )
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Weighted pick. Non-positive weights never win; when nothing has weight the
/// first entry is used.
fn choose_weighted<'a, R: Rng + ?Sized>(
    entries: &'a [EventNode],
    rng: &mut R,
) -> Option<&'a EventNode> {
    let first = entries.first()?;
    let total: f64 = entries
        .iter()
        .map(EventNode::weight)
        .filter(|w| *w > 0.0)
        .sum();
    if total <= 0.0 || !total.is_finite() {
        return Some(first);
    }

    let mut roll = rng.gen::<f64>() * total;
    let mut last = first;
    for entry in entries {
        let weight = entry.weight();
        if weight.is_nan() || weight <= 0.0 {
            continue;
        }
        last = entry;
        roll -= weight;
        if roll < 0.0 {
            return Some(entry);
        }
    }
    Some(last)
}
