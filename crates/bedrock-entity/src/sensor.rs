//! `minecraft:environment_sensor` polling.

use bedrock_behavior_pack::{EntityDefinition, EventNode};

/// Trigger trees of every visible sensor: the definition's own, then one per
/// active group that declares a sensor.
pub fn sensor_triggers<'a>(definition: &'a EntityDefinition, groups: &[String]) -> Vec<&'a EventNode> {
    let base = definition.components.environment_sensor.as_ref();
    let grouped = groups
        .iter()
        .filter_map(|name| definition.group(name))
        .filter_map(|group| group.environment_sensor.as_ref());
    base.into_iter()
        .chain(grouped)
        .filter_map(|sensor| sensor.triggers.as_ref())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_base_and_group_sensors() {
        let def = EntityDefinition::parse_json(
            r#"{ "minecraft:entity": {
                "description": { "identifier": "test:mob" },
                "components": { "minecraft:environment_sensor": {
                    "triggers": { "filters": { "test": "is_underwater" }, "event": "drown" }
                } },
                "component_groups": {
                    "wet": { "minecraft:environment_sensor": { "triggers": [
                        { "filters": { "test": "in_water", "value": false }, "event": "dry" },
                        { "filters": { "test": "on_fire" }, "event": "steam" }
                    ] } },
                    "empty": { "minecraft:environment_sensor": {} }
                }
            } }"#,
        )
        .unwrap();
        assert_eq!(sensor_triggers(&def, &[]).len(), 1);
        let all = sensor_triggers(&def, &["wet".into(), "empty".into()]);
        assert_eq!(all.len(), 2);
        assert!(matches!(all[1], EventNode::Sequence(items) if items.len() == 2));
    }
}
