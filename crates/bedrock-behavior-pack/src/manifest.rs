//! Behavior pack manifest.json parsing.

use serde::Deserialize;

use crate::error::PackError;

#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorPackManifest {
    /// Integer (2) or string ("2") depending on the exporter.
    pub format_version: serde_json::Value,
    pub header: ManifestHeader,
    #[serde(default)]
    pub modules: Vec<ManifestModule>,
    #[serde(default)]
    pub dependencies: Vec<ManifestDependency>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestHeader {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub uuid: String,
    pub version: Vec<u32>,
    #[serde(default)]
    pub min_engine_version: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestModule {
    #[serde(rename = "type")]
    pub module_type: String,
    pub uuid: String,
    pub version: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestDependency {
    /// Absent for script-module dependencies, which name a `module_name` instead.
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub module_name: Option<String>,
}

impl BehaviorPackManifest {
    pub fn parse(json: &str) -> Result<Self, PackError> {
        serde_json::from_str(json).map_err(PackError::json("manifest"))
    }

    pub fn version_string(&self) -> String {
        dotted(&self.header.version)
    }

    pub fn min_engine_version_string(&self) -> Option<String> {
        (!self.header.min_engine_version.is_empty())
            .then(|| dotted(&self.header.min_engine_version))
    }

    /// Whether the pack declares a `data` module, i.e. carries entity documents.
    pub fn has_data_module(&self) -> bool {
        self.modules
            .iter()
            .any(|m| m.module_type.eq_ignore_ascii_case("data"))
    }
}

fn dotted(parts: &[u32]) -> String {
    parts
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(".")
}
