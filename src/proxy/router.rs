// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Resolves an inbound request's model name to a canonical catalogue entry
//! and checks that the request path is one the model's mode actually
//! serves, before anything is started or forwarded.

use crate::config::ConfigStore;
use crate::error::GatewayError;
use crate::interfaces::InterfaceRegistry;

pub struct RouteTarget {
    pub canonical: String,
    pub mode: String,
    pub port: u16,
}

pub fn resolve(
    config: &ConfigStore,
    interfaces: &InterfaceRegistry,
    model_name: &str,
    path: &str,
) -> Result<RouteTarget, GatewayError> {
    let canonical = config
        .resolve(model_name)
        .ok_or_else(|| GatewayError::ModelNotFound(model_name.to_string()))?
        .to_string();
    let def = config
        .get(&canonical)
        .ok_or_else(|| GatewayError::ModelNotFound(canonical.clone()))?;

    let outcome = interfaces.validate(def.mode.as_str(), path, &canonical);
    if !outcome.ok {
        return Err(GatewayError::ModeMismatch(
            outcome.reason.unwrap_or_else(|| format!("{canonical} does not serve {path}")),
        ));
    }

    Ok(RouteTarget { canonical, mode: def.mode.as_str().to_string(), port: def.port })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::DeviceRegistry;
    use std::time::Duration;

    fn sample_store() -> ConfigStore {
        let catalogue = serde_yaml::from_str(
            r#"
models:
  llama-3-8b:
    aliases: ["llama3"]
    mode: chat
    port: 9001
    variants:
      - name: cpu
        required_devices: []
        memory_mb: {}
        launch_script: x.sh
"#,
        )
        .unwrap();
        let devices = DeviceRegistry::with_builtins(Duration::from_secs(1));
        let interfaces = InterfaceRegistry::with_builtins();
        ConfigStore::from_catalogue(catalogue, &devices, &interfaces).unwrap()
    }

    #[test]
    fn resolves_alias_and_validates_path() {
        let store = sample_store();
        let interfaces = InterfaceRegistry::with_builtins();
        let target = resolve(&store, &interfaces, "llama3", "v1/chat/completions").unwrap();
        assert_eq!(target.canonical, "llama-3-8b");
        assert_eq!(target.port, 9001);
    }

    #[test]
    fn rejects_path_for_the_wrong_mode() {
        let store = sample_store();
        let interfaces = InterfaceRegistry::with_builtins();
        let err = resolve(&store, &interfaces, "llama3", "v1/embeddings").unwrap_err();
        assert!(matches!(err, GatewayError::ModeMismatch(_)));
    }

    #[test]
    fn unknown_model_is_not_found() {
        let store = sample_store();
        let interfaces = InterfaceRegistry::with_builtins();
        let err = resolve(&store, &interfaces, "nope", "v1/chat/completions").unwrap_err();
        assert!(matches!(err, GatewayError::ModelNotFound(_)));
    }
}
