// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Compile-time interface adapter registry, mirroring `devices::registry`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use super::adapter::{HealthOutcome, InterfaceAdapter, ValidationOutcome};
use super::{base::BaseAdapter, chat::ChatAdapter, embedding::EmbeddingAdapter, reranker::RerankerAdapter};

pub struct InterfaceRegistry {
    adapters: HashMap<String, Arc<dyn InterfaceAdapter>>,
}

impl InterfaceRegistry {
    pub fn new() -> Self {
        Self { adapters: HashMap::new() }
    }

    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register(Arc::new(ChatAdapter));
        reg.register(Arc::new(BaseAdapter));
        reg.register(Arc::new(EmbeddingAdapter));
        reg.register(Arc::new(RerankerAdapter));
        reg
    }

    pub fn register(&mut self, adapter: Arc<dyn InterfaceAdapter>) {
        self.adapters.insert(adapter.mode().to_string(), adapter);
    }

    pub fn contains(&self, mode: &str) -> bool {
        self.adapters.contains_key(mode)
    }

    pub fn get(&self, mode: &str) -> Option<Arc<dyn InterfaceAdapter>> {
        self.adapters.get(mode).cloned()
    }

    pub fn endpoints(&self, mode: &str) -> HashSet<&'static str> {
        self.adapters
            .get(mode)
            .map(|a| a.endpoints())
            .unwrap_or_default()
    }

    pub async fn health(
        &self,
        mode: &str,
        port: u16,
        started_at: std::time::Instant,
        timeout: Duration,
    ) -> HealthOutcome {
        match self.adapters.get(mode) {
            Some(a) => a.health(port, started_at, timeout).await,
            None => HealthOutcome::fail(format!("no interface adapter registered for mode {mode}")),
        }
    }

    pub fn validate(&self, mode: &str, path: &str, model_name: &str) -> ValidationOutcome {
        match self.adapters.get(mode) {
            Some(a) => a.validate(path, model_name),
            None => ValidationOutcome::fail(format!("no interface adapter registered for mode {mode}")),
        }
    }
}

impl Default for InterfaceRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_the_four_modes() {
        let reg = InterfaceRegistry::with_builtins();
        assert!(reg.contains("chat"));
        assert!(reg.contains("base"));
        assert!(reg.contains("embedding"));
        assert!(reg.contains("reranker"));
    }

    #[test]
    fn validate_rejects_wrong_path_for_mode() {
        let reg = InterfaceRegistry::with_builtins();
        let outcome = reg.validate("chat", "v1/embeddings", "m1");
        assert!(!outcome.ok);
    }

    #[test]
    fn validate_accepts_correct_path_for_mode() {
        let reg = InterfaceRegistry::with_builtins();
        let outcome = reg.validate("chat", "v1/chat/completions", "m1");
        assert!(outcome.ok);
    }
}
