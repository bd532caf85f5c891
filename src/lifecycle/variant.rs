// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Deterministic variant selection: the first variant (in catalogue order)
//! whose required devices are all online wins. No scoring, no randomness.

use std::collections::HashSet;

use crate::config::LaunchVariant;

pub fn select_variant<'a>(variants: &'a [LaunchVariant], online_devices: &HashSet<String>) -> Option<&'a LaunchVariant> {
    variants
        .iter()
        .find(|variant| variant.required_devices.iter().all(|d| online_devices.contains(d)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(name: &str, devices: &[&str]) -> LaunchVariant {
        LaunchVariant {
            name: name.to_string(),
            required_devices: devices.iter().map(|s| s.to_string()).collect(),
            memory_mb: Default::default(),
            launch_script: format!("/bin/launch-{name}.sh"),
        }
    }

    #[test]
    fn first_satisfiable_variant_wins() {
        let variants = vec![variant("gpu", &["gpu0"]), variant("cpu", &[])];
        let online: HashSet<String> = HashSet::new();
        let chosen = select_variant(&variants, &online).unwrap();
        assert_eq!(chosen.name, "cpu");
    }

    #[test]
    fn earlier_variant_preferred_when_both_satisfiable() {
        let variants = vec![variant("gpu", &["gpu0"]), variant("cpu", &[])];
        let online: HashSet<String> = ["gpu0".to_string()].into_iter().collect();
        let chosen = select_variant(&variants, &online).unwrap();
        assert_eq!(chosen.name, "gpu");
    }

    #[test]
    fn no_variant_satisfiable_returns_none() {
        let variants = vec![variant("gpu", &["gpu0"])];
        let online: HashSet<String> = HashSet::new();
        assert!(select_variant(&variants, &online).is_none());
    }

    #[test]
    fn selection_is_deterministic_across_calls() {
        let variants = vec![variant("a", &["gpu0"]), variant("b", &["gpu0"]), variant("c", &[])];
        let online: HashSet<String> = ["gpu0".to_string()].into_iter().collect();
        let first = select_variant(&variants, &online).unwrap().name.clone();
        let second = select_variant(&variants, &online).unwrap().name.clone();
        assert_eq!(first, second);
        assert_eq!(first, "a");
    }
}
