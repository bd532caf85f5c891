// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config Store: model catalogue and program settings.

pub mod model;
pub mod settings;
pub mod store;

pub use model::{InterfaceMode, LaunchVariant, ModelCatalogue, ModelDefinition};
pub use settings::{ConfigError, ProgramSettings};
pub use store::ConfigStore;
