//! Filter evaluation against the live entity.

use bedrock_behavior_pack::{biome, ComponentSet, Difficulty, Dimension, Filter, FilterTest};
use bedrock_molang::Variables;
use serde_json::Value;
use tracing::debug;

use crate::host::EntityHost;

/// What a filter can see: the host entity and its active components.
pub struct FilterContext<'a> {
    pub host: &'a dyn EntityHost,
    pub components: &'a ComponentSet,
}

impl<'a> FilterContext<'a> {
    pub fn new(host: &'a dyn EntityHost, components: &'a ComponentSet) -> Self {
        Self { host, components }
    }

    /// `query.*` variables for Molang-valued filter values and components.
    pub fn variables(&self) -> Variables {
        let host = self.host;
        let components = self.components;
        let health = f64::from(host.health());
        let max_health = components
            .health
            .as_ref()
            .and_then(|h| h.max_health())
            .map(f64::from)
            .unwrap_or(health);

        let mut vars = Variables::new()
            .with_number("query.health", health)
            .with_number("query.max_health", max_health)
            .with_boolean("query.is_baby", components.baby())
            .with_boolean("query.is_on_fire", host.is_on_fire())
            .with_boolean("query.is_in_water", host.is_in_water())
            .with_boolean("query.is_underwater", host.is_underwater())
            .with_boolean("query.is_daytime", host.is_day());
        let indices = [
            ("query.variant", &components.variant),
            ("query.mark_variant", &components.mark_variant),
            ("query.skin_id", &components.skin_id),
        ];
        for (name, component) in indices {
            if let Some(index) = component.as_ref().and_then(|v| v.index()) {
                vars.set_number(name, index as f64);
            }
        }
        vars
    }
}

/// An absent filter matches.
pub fn matches(filter: Option<&Filter>, ctx: &FilterContext) -> bool {
    filter.map_or(true, |f| evaluate(f, ctx))
}

pub fn evaluate(filter: &Filter, ctx: &FilterContext) -> bool {
    match filter {
        Filter::AllOf(children) => children.iter().all(|c| evaluate(c, ctx)),
        Filter::AnyOf(children) => children.iter().any(|c| evaluate(c, ctx)),
        Filter::NoneOf(children) => !children.iter().any(|c| evaluate(c, ctx)),
        Filter::Leaf(test) => leaf(test, ctx),
    }
}

fn leaf(test: &FilterTest, ctx: &FilterContext) -> bool {
    let host = ctx.host;
    let components = ctx.components;
    match test.test.as_str() {
        "is_underwater" => flag(test, host.is_underwater()),
        "in_water" => flag(test, host.is_in_water()),
        "on_fire" => flag(test, host.is_on_fire()),
        "has_nametag" => flag(test, host.custom_name().is_some()),
        "in_overworld" => flag(test, host.dimension() == Dimension::Overworld),
        "in_nether" => flag(test, host.dimension() == Dimension::Nether),
        "in_end" => flag(test, host.dimension() == Dimension::TheEnd),
        "is_daytime" => flag(test, host.is_day()),
        "is_difficulty" => {
            let Some(expected) = text(test).as_deref().and_then(Difficulty::parse) else {
                return false;
            };
            test.operator
                .compare(host.difficulty().rank(), expected.rank())
        }
        "has_component" => match text(test) {
            Some(name) => test.operator.compare_eq(components.has(&name), true),
            None => false,
        },
        "actor_health" => match number(test, ctx) {
            Some(expected) => test.operator.compare(f64::from(host.health()), expected),
            None => false,
        },
        "is_variant" => index(test, ctx, components.variant.as_ref()),
        "is_mark_variant" => index(test, ctx, components.mark_variant.as_ref()),
        "is_skin_id" => index(test, ctx, components.skin_id.as_ref()),
        "is_biome" => {
            let (Some(expected), Some(biome_id)) = (text(test), host.biome()) else {
                return false;
            };
            let matched = biome::matches_id(&biome_id, &expected)
                || biome_id.to_string().ends_with(&expected);
            test.operator.compare_eq(matched, true)
        }
        "has_biome_tag" => {
            let (Some(tag), Some(biome_id)) = (text(test), host.biome()) else {
                return false;
            };
            test.operator
                .compare_eq(biome::matches_tag(&biome_id, &tag), true)
        }
        "is_family" => match text(test) {
            Some(family) => test
                .operator
                .compare_eq(components.families().contains(&family), true),
            None => false,
        },
        other => {
            debug!("Unknown filter test '{other}'");
            false
        }
    }
}

/// Boolean tests compare against `value`, which defaults to `true`.
fn flag(test: &FilterTest, actual: bool) -> bool {
    let expected = match &test.value {
        None => true,
        Some(Value::Bool(b)) => *b,
        Some(_) => return false,
    };
    test.operator.compare_eq(actual, expected)
}

/// Lowercased string value.
fn text(test: &FilterTest) -> Option<String> {
    test.value
        .as_ref()
        .and_then(Value::as_str)
        .map(|s| s.trim().to_ascii_lowercase())
}

/// Numeric value; strings are evaluated as Molang.
fn number(test: &FilterTest, ctx: &FilterContext) -> Option<f64> {
    match test.value.as_ref()? {
        Value::Number(n) => n.as_f64(),
        Value::String(expr) => bedrock_molang::evaluate(expr, &ctx.variables()),
        _ => None,
    }
}

fn index(
    test: &FilterTest,
    ctx: &FilterContext,
    component: Option<&bedrock_behavior_pack::components::IndexValue>,
) -> bool {
    let (Some(actual), Some(expected)) = (component.and_then(|c| c.index()), number(test, ctx))
    else {
        return false;
    };
    test.operator.compare(actual as f64, expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHost;
    use serde_json::json;

    fn check(filter: serde_json::Value, host: &MockHost, components: &ComponentSet) -> bool {
        let f = Filter::from_value(&filter);
        matches(Some(&f), &FilterContext::new(host, components))
    }

    fn set(v: serde_json::Value) -> ComponentSet {
        ComponentSet::from_map(v.as_object().unwrap(), "test")
    }

    #[test]
    fn empty_combinators() {
        let host = MockHost::default();
        let c = ComponentSet::default();
        assert!(check(json!({ "all_of": [] }), &host, &c));
        assert!(!check(json!({ "any_of": [] }), &host, &c));
        assert!(check(json!({ "none_of": [] }), &host, &c));
        assert!(matches(None, &FilterContext::new(&host, &c)));
    }

    #[test]
    fn unknown_test_fails_closed() {
        let host = MockHost::default();
        let c = ComponentSet::default();
        assert!(!check(json!({ "test": "is_sleeping" }), &host, &c));
        assert!(check(json!({ "none_of": [{ "test": "is_sleeping" }] }), &host, &c));
    }

    #[test]
    fn unknown_combinator_passes() {
        let host = MockHost::default();
        let c = ComponentSet::default();
        assert!(check(json!({ "one_of": [{ "test": "on_fire" }] }), &host, &c));
    }

    #[test]
    fn boolean_tests() {
        let host = MockHost {
            underwater: true,
            on_fire: false,
            custom_name: Some("Bob".into()),
            ..MockHost::default()
        };
        let c = ComponentSet::default();
        assert!(check(json!({ "test": "is_underwater" }), &host, &c));
        assert!(check(json!({ "test": "on_fire", "value": false }), &host, &c));
        assert!(check(json!({ "test": "on_fire", "operator": "!=" }), &host, &c));
        assert!(!check(json!({ "test": "on_fire", "operator": "<" }), &host, &c));
        assert!(!check(json!({ "test": "on_fire", "value": "no" }), &host, &c));
        assert!(check(json!({ "test": "has_nametag" }), &host, &c));
        assert!(check(json!({ "test": "in_overworld" }), &host, &c));
        assert!(check(json!({ "test": "in_nether", "value": false }), &host, &c));
        assert!(check(json!({ "test": "is_daytime" }), &host, &c));
    }

    #[test]
    fn difficulty_ordering() {
        let host = MockHost {
            difficulty: Difficulty::Normal,
            ..MockHost::default()
        };
        let c = ComponentSet::default();
        assert!(check(json!({ "test": "is_difficulty", "value": "normal" }), &host, &c));
        assert!(check(
            json!({ "test": "is_difficulty", "operator": ">=", "value": "easy" }),
            &host,
            &c
        ));
        assert!(!check(
            json!({ "test": "is_difficulty", "operator": ">", "value": "hard" }),
            &host,
            &c
        ));
        assert!(!check(json!({ "test": "is_difficulty", "value": "legendary" }), &host, &c));
        assert!(!check(json!({ "test": "is_difficulty" }), &host, &c));
    }

    #[test]
    fn has_component_reads_active_set() {
        let host = MockHost::default();
        let c = set(json!({ "minecraft:is_baby": {}, "minecraft:behavior.panic": {} }));
        assert!(check(json!({ "test": "has_component", "value": "minecraft:is_baby" }), &host, &c));
        assert!(check(json!({ "test": "has_component", "value": "minecraft:behavior.panic" }), &host, &c));
        assert!(check(
            json!({ "test": "has_component", "operator": "!=", "value": "minecraft:attack" }),
            &host,
            &c
        ));
        assert!(!check(json!({ "test": "has_component", "value": 3 }), &host, &c));
    }

    #[test]
    fn numeric_tests() {
        let host = MockHost {
            health: 6.0,
            ..MockHost::default()
        };
        let c = set(json!({
            "minecraft:variant": { "value": 2 },
            "minecraft:health": { "value": 20 }
        }));
        assert!(check(json!({ "test": "actor_health", "operator": "<", "value": 10 }), &host, &c));
        assert!(check(
            json!({ "test": "actor_health", "operator": "<=", "value": "query.max_health * 0.5" }),
            &host,
            &c
        ));
        assert!(!check(json!({ "test": "actor_health", "value": "6 +" }), &host, &c));
        assert!(check(json!({ "test": "is_variant", "value": 2 }), &host, &c));
        assert!(check(json!({ "test": "is_variant", "operator": ">", "value": 1 }), &host, &c));
        assert!(!check(json!({ "test": "is_mark_variant", "value": 0 }), &host, &c));
        assert!(!check(json!({ "test": "is_variant", "value": true }), &host, &c));
    }

    #[test]
    fn biome_tests() {
        let host = MockHost {
            biome: bedrock_behavior_pack::Identifier::parse("minecraft:frozen_ocean"),
            ..MockHost::default()
        };
        let c = ComponentSet::default();
        assert!(check(json!({ "test": "is_biome", "value": "frozen_ocean" }), &host, &c));
        assert!(check(json!({ "test": "is_biome", "value": "ocean" }), &host, &c));
        assert!(!check(json!({ "test": "is_biome", "value": "plains" }), &host, &c));
        assert!(check(json!({ "test": "has_biome_tag", "value": "ocean" }), &host, &c));
        assert!(check(
            json!({ "test": "has_biome_tag", "operator": "not", "value": "nether" }),
            &host,
            &c
        ));

        let nowhere = MockHost {
            biome: None,
            ..MockHost::default()
        };
        assert!(!check(json!({ "test": "is_biome", "value": "ocean" }), &nowhere, &c));
    }

    #[test]
    fn family_test() {
        let host = MockHost::default();
        let c = set(json!({ "minecraft:type_family": { "family": ["Zombie", "undead"] } }));
        assert!(check(json!({ "test": "is_family", "value": "zombie" }), &host, &c));
        assert!(check(json!({ "test": "is_family", "operator": "!=", "value": "player" }), &host, &c));
        assert!(!check(json!({ "test": "is_family", "value": "animal" }), &host, &c));
    }
}
