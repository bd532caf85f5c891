// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Model catalogue data shapes: `ModelDefinition` and `LaunchVariant`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// User-facing interface mode. The four built-ins are pre-registered by
/// `crate::interfaces::registry::InterfaceRegistry::with_builtins`; the
/// wrapper stays an open string so third parties can register more without
/// touching this type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceMode(pub String);

impl InterfaceMode {
    pub const CHAT: &'static str = "chat";
    pub const BASE: &'static str = "base";
    pub const EMBEDDING: &'static str = "embedding";
    pub const RERANKER: &'static str = "reranker";

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InterfaceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InterfaceMode {
    fn from(s: &str) -> Self {
        InterfaceMode(s.to_string())
    }
}

/// One of several alternative launch configurations for a model. Variant
/// order in the catalogue is the priority: first declared, first tried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchVariant {
    pub name: String,
    pub required_devices: Vec<String>,
    pub memory_mb: BTreeMap<String, u64>,
    pub launch_script: String,
}

/// A model as declared in the catalogue, keyed externally by its canonical
/// name in `ModelCatalogue::models`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefinition {
    #[serde(default)]
    pub aliases: Vec<String>,
    pub mode: InterfaceMode,
    pub port: u16,
    #[serde(default)]
    pub auto_start: bool,
    pub variants: Vec<LaunchVariant>,
}

/// The full model catalogue as parsed from the external JSON/YAML document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelCatalogue {
    pub models: BTreeMap<String, ModelDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_catalogue() {
        let yaml = r#"
models:
  llama-3-8b:
    aliases: ["llama3", "l3"]
    mode: chat
    port: 9001
    auto_start: true
    variants:
      - name: gpu
        required_devices: [gA]
        memory_mb: { gA: 8000 }
        launch_script: scripts/llama3-gpu.sh
      - name: cpu
        required_devices: []
        memory_mb: {}
        launch_script: scripts/llama3-cpu.sh
"#;
        let cat: ModelCatalogue = serde_yaml::from_str(yaml).unwrap();
        let def = cat.models.get("llama-3-8b").unwrap();
        assert_eq!(def.aliases, vec!["llama3", "l3"]);
        assert_eq!(def.mode.as_str(), "chat");
        assert_eq!(def.variants.len(), 2);
        assert_eq!(def.variants[0].name, "gpu");
    }

    #[test]
    fn parses_json_catalogue() {
        let json = r#"{
            "models": {
                "embed-small": {
                    "aliases": [],
                    "mode": "embedding",
                    "port": 9002,
                    "variants": [
                        {"name": "default", "required_devices": [], "memory_mb": {}, "launch_script": "x.sh"}
                    ]
                }
            }
        }"#;
        let cat: ModelCatalogue = serde_json::from_str(json).unwrap();
        assert!(cat.models.contains_key("embed-small"));
    }
}
