// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config Store: loads the model catalogue, validates referential
//! integrity against the device and interface registries, and exposes
//! read-only lookup by canonical name, alias, and mode. Reload is not
//! supported; config changes take effect on next process start.

use std::collections::HashMap;
use std::path::Path;

use crate::devices::DeviceRegistry;
use crate::interfaces::InterfaceRegistry;

use super::model::{ModelCatalogue, ModelDefinition};
use super::settings::ConfigError;

pub struct ConfigStore {
    catalogue: ModelCatalogue,
    alias_index: HashMap<String, String>,
}

impl ConfigStore {
    /// Parses `path` as YAML or JSON (by extension, defaulting to YAML),
    /// then validates it against the two adapter registries.
    pub fn load(
        path: &Path,
        devices: &DeviceRegistry,
        interfaces: &InterfaceRegistry,
    ) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;

        let catalogue: ModelCatalogue = if path.extension().and_then(|e| e.to_str()) == Some("json") {
            serde_json::from_str(&text)
                .map_err(|e| ConfigError::CatalogueParse(path.display().to_string(), e.to_string()))?
        } else {
            serde_yaml::from_str(&text)
                .map_err(|e| ConfigError::CatalogueParse(path.display().to_string(), e.to_string()))?
        };

        Self::from_catalogue(catalogue, devices, interfaces)
    }

    pub fn from_catalogue(
        catalogue: ModelCatalogue,
        devices: &DeviceRegistry,
        interfaces: &InterfaceRegistry,
    ) -> Result<Self, ConfigError> {
        let mut alias_index = HashMap::new();

        for (canonical, def) in &catalogue.models {
            if !interfaces.contains(def.mode.as_str()) {
                return Err(ConfigError::UnknownMode(canonical.clone(), def.mode.to_string()));
            }

            for variant in &def.variants {
                for device_id in &variant.required_devices {
                    if !devices.contains(device_id) {
                        return Err(ConfigError::UnknownDevice(
                            canonical.clone(),
                            variant.name.clone(),
                            device_id.clone(),
                        ));
                    }
                }
                for device_id in variant.memory_mb.keys() {
                    if !devices.contains(device_id) {
                        return Err(ConfigError::UnknownDevice(
                            canonical.clone(),
                            variant.name.clone(),
                            device_id.clone(),
                        ));
                    }
                }
            }

            // Every model is implicitly addressable by its own canonical name.
            if let Some(existing) = alias_index.insert(canonical.clone(), canonical.clone()) {
                return Err(ConfigError::DuplicateAlias(canonical.clone(), existing, canonical.clone()));
            }

            for alias in &def.aliases {
                if let Some(existing) = alias_index.insert(alias.clone(), canonical.clone()) {
                    return Err(ConfigError::DuplicateAlias(alias.clone(), existing, canonical.clone()));
                }
            }
        }

        Ok(Self { catalogue, alias_index })
    }

    /// Resolves an alias or canonical name to the canonical name.
    pub fn resolve(&self, alias_or_name: &str) -> Option<&str> {
        self.alias_index.get(alias_or_name).map(|s| s.as_str())
    }

    pub fn get(&self, canonical: &str) -> Option<&ModelDefinition> {
        self.catalogue.models.get(canonical)
    }

    pub fn all(&self) -> impl Iterator<Item = (&String, &ModelDefinition)> {
        self.catalogue.models.iter()
    }

    pub fn by_mode<'a>(&'a self, mode: &'a str) -> impl Iterator<Item = (&'a String, &'a ModelDefinition)> {
        self.catalogue.models.iter().filter(move |(_, d)| d.mode.as_str() == mode)
    }

    pub fn auto_start_models(&self) -> impl Iterator<Item = &String> {
        self.catalogue
            .models
            .iter()
            .filter(|(_, d)| d.auto_start)
            .map(|(name, _)| name)
    }

    pub fn canonical_names(&self) -> std::collections::HashSet<&String> {
        self.catalogue.models.keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_catalogue() -> ModelCatalogue {
        serde_yaml::from_str(
            r#"
models:
  llama-3-8b:
    aliases: ["llama3"]
    mode: chat
    port: 9001
    variants:
      - name: gpu
        required_devices: [cpu]
        memory_mb: { cpu: 100 }
        launch_script: x.sh
"#,
        )
        .unwrap()
    }

    #[test]
    fn resolves_alias_and_canonical_name() {
        let devices = DeviceRegistry::with_builtins(Duration::from_secs(1));
        let interfaces = InterfaceRegistry::with_builtins();
        let store = ConfigStore::from_catalogue(sample_catalogue(), &devices, &interfaces).unwrap();
        assert_eq!(store.resolve("llama3"), Some("llama-3-8b"));
        assert_eq!(store.resolve("llama-3-8b"), Some("llama-3-8b"));
        assert_eq!(store.resolve("nonexistent"), None);
    }

    #[test]
    fn rejects_duplicate_alias() {
        let devices = DeviceRegistry::with_builtins(Duration::from_secs(1));
        let interfaces = InterfaceRegistry::with_builtins();
        let mut catalogue = sample_catalogue();
        let mut second = catalogue.models.get("llama-3-8b").unwrap().clone();
        second.aliases = vec!["llama3".to_string()];
        catalogue.models.insert("llama-3-8b-v2".to_string(), second);

        let err = ConfigStore::from_catalogue(catalogue, &devices, &interfaces).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateAlias(..)));
    }

    #[test]
    fn rejects_unregistered_device() {
        let devices = DeviceRegistry::new(Duration::from_secs(1));
        let interfaces = InterfaceRegistry::with_builtins();
        let err = ConfigStore::from_catalogue(sample_catalogue(), &devices, &interfaces).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDevice(..)));
    }

    #[test]
    fn rejects_unregistered_mode() {
        let devices = DeviceRegistry::with_builtins(Duration::from_secs(1));
        let interfaces = InterfaceRegistry::new();
        let err = ConfigStore::from_catalogue(sample_catalogue(), &devices, &interfaces).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMode(..)));
    }
}
