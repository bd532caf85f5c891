// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Orphan detection: models with recorded accounting data that the
//! catalogue no longer mentions. Still-catalogued models are protected
//! from deletion through this path.

use std::collections::HashSet;

use super::db::{AccountingError, AccountingStore};

#[derive(Debug, thiserror::Error)]
pub enum OrphanError {
    #[error(transparent)]
    Accounting(#[from] AccountingError),
    #[error("{0} is still present in the catalogue and cannot be dropped as an orphan")]
    StillCatalogued(String),
}

pub fn list_orphans(store: &AccountingStore, catalogued: &HashSet<&String>) -> Result<Vec<String>, OrphanError> {
    let known = store.all_known_models()?;
    Ok(known
        .into_keys()
        .filter(|name| !catalogued.contains(name))
        .collect())
}

pub fn drop_orphan(store: &AccountingStore, catalogued: &HashSet<&String>, model: &str) -> Result<(), OrphanError> {
    if catalogued.contains(&model.to_string()) {
        return Err(OrphanError::StillCatalogued(model.to_string()));
    }
    store.drop_model_data(model)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogued_model_is_not_an_orphan() {
        let store = AccountingStore::open_in_memory().unwrap();
        store.ensure_model("m1").unwrap();
        let name = "m1".to_string();
        let catalogued: HashSet<&String> = [&name].into_iter().collect();
        let orphans = list_orphans(&store, &catalogued).unwrap();
        assert!(orphans.is_empty());
    }

    #[test]
    fn uncatalogued_model_with_data_is_an_orphan() {
        let store = AccountingStore::open_in_memory().unwrap();
        store.ensure_model("ghost").unwrap();
        let catalogued: HashSet<&String> = HashSet::new();
        let orphans = list_orphans(&store, &catalogued).unwrap();
        assert_eq!(orphans, vec!["ghost".to_string()]);
    }

    #[test]
    fn dropping_a_still_catalogued_model_is_rejected() {
        let store = AccountingStore::open_in_memory().unwrap();
        store.ensure_model("m1").unwrap();
        let name = "m1".to_string();
        let catalogued: HashSet<&String> = [&name].into_iter().collect();
        let err = drop_orphan(&store, &catalogued, "m1").unwrap_err();
        assert!(matches!(err, OrphanError::StillCatalogued(_)));
    }

    #[test]
    fn dropping_an_orphan_succeeds() {
        let store = AccountingStore::open_in_memory().unwrap();
        store.ensure_model("ghost").unwrap();
        let catalogued: HashSet<&String> = HashSet::new();
        drop_orphan(&store, &catalogued, "ghost").unwrap();
        assert!(store.all_known_models().unwrap().is_empty());
    }
}
