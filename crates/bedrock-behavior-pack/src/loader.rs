//! Behavior pack loader. Scans a directory and loads every pack in it.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::entity::{EntityDefinition, EntityFile};
use crate::error::PackError;
use crate::manifest::BehaviorPackManifest;
use crate::spawn_rules::{SpawnRules, SpawnRulesFile};

/// A fully loaded behavior pack.
#[derive(Debug, Clone)]
pub struct LoadedBehaviorPack {
    pub path: PathBuf,
    pub manifest: BehaviorPackManifest,
    pub entities: Vec<EntityDefinition>,
    pub spawn_rules: Vec<SpawnRules>,
}

/// Load a single behavior pack from a directory.
pub fn load_behavior_pack(path: &Path) -> Result<LoadedBehaviorPack, PackError> {
    let manifest_path = path.join("manifest.json");
    if !manifest_path.is_file() {
        return Err(PackError::MissingManifest(path.to_path_buf()));
    }
    let manifest_str = std::fs::read_to_string(&manifest_path).map_err(|source| PackError::Io {
        path: manifest_path.clone(),
        source,
    })?;
    let manifest = BehaviorPackManifest::parse(&manifest_str)?;
    if !manifest.has_data_module() {
        warn!(
            "Behavior pack '{}' declares no data module",
            manifest.header.name
        );
    }

    let entities: Vec<EntityDefinition> =
        load_and_parse(path, "entities", EntityFile::parse_json)
            .into_iter()
            .map(EntityFile::into_definition)
            .collect();

    let spawn_rules: Vec<SpawnRules> =
        load_and_parse(path, "spawn_rules", SpawnRulesFile::parse_json)
            .into_iter()
            .map(|f| f.spawn_rules)
            .collect();

    info!(
        "Loaded behavior pack '{}' v{} ({} entities, {} spawn rules)",
        manifest.header.name,
        manifest.version_string(),
        entities.len(),
        spawn_rules.len(),
    );

    Ok(LoadedBehaviorPack {
        path: path.to_path_buf(),
        manifest,
        entities,
        spawn_rules,
    })
}

/// Scan a directory for behavior packs and load all of them, in name order.
pub fn load_all_packs(packs_dir: &Path) -> Vec<LoadedBehaviorPack> {
    let mut packs = Vec::new();

    let mut dirs: Vec<PathBuf> = match std::fs::read_dir(packs_dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir() && p.join("manifest.json").exists())
            .collect(),
        Err(e) => {
            warn!("Cannot read pack directory {}: {e}", packs_dir.display());
            return packs;
        }
    };
    dirs.sort();

    for path in dirs {
        match load_behavior_pack(&path) {
            Ok(pack) => packs.push(pack),
            Err(e) => warn!("Failed to load behavior pack at {}: {e}", path.display()),
        }
    }

    if !packs.is_empty() {
        info!(
            "Loaded {} behavior pack(s) from {}",
            packs.len(),
            packs_dir.display()
        );
    }

    packs
}

/// Parse every `*.json` file under `pack_root/subdir`, recursing into
/// subdirectories. Unreadable or invalid files are logged and skipped.
fn load_and_parse<T>(
    pack_root: &Path,
    subdir: &str,
    parse: impl Fn(&str) -> Result<T, PackError>,
) -> Vec<T> {
    let mut files = Vec::new();
    collect_json_files(&pack_root.join(subdir), &mut files);
    files.sort();

    let mut results = Vec::new();
    for path in files {
        match std::fs::read_to_string(&path) {
            Ok(content) => match parse(&content) {
                Ok(parsed) => results.push(parsed),
                Err(e) => warn!("Failed to parse {}: {e}", path.display()),
            },
            Err(e) => warn!("Failed to read {}: {e}", path.display()),
        }
    }
    results
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_json_files(&path, out);
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            out.push(path);
        }
    }
}
