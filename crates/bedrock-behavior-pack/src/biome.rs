//! Biome id and tag matching.
//!
//! There is no biome tag registry here, so tags are approximated from the
//! biome's identifier path.

use crate::identifier::{Identifier, DEFAULT_NAMESPACE};

/// `value` with a namespace must equal the full id; without one it must equal the path.
pub fn matches_id(biome: &Identifier, value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    if value.contains(':') {
        biome.to_string() == value
    } else {
        biome.path() == value
    }
}

pub fn matches_tag(biome: &Identifier, raw_tag: &str) -> bool {
    let raw_tag = raw_tag.trim().to_ascii_lowercase();
    let tag = raw_tag
        .split_once(':')
        .map(|(_, tag)| tag)
        .unwrap_or(&raw_tag);
    let path = biome.path();
    let vanilla_overworld = biome.namespace() == DEFAULT_NAMESPACE
        && !path.contains("nether")
        && !path.contains("end");

    match tag {
        "overworld" | "overworld_generation" | "monster" => vanilla_overworld,
        "the_end" | "end" => path.contains("end"),
        _ => path.contains(tag),
    }
}
