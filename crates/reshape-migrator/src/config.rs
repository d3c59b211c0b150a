//! Migrator configuration.

use std::{collections::HashMap, time::Duration};

use reshape_core::{catalog::Catalog, kind::TypeKind};
use serde::Deserialize;

/// Runtime options for a [`crate::Migrator`], deserialisable from the
/// `[migrator]` table of the binary's config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MigratorConfig {
  /// Create a registered collection that does not exist yet.
  pub create_collections: bool,
  /// Persist one log document per applied change.
  pub save_migration_log: bool,
  /// How long `run_migrations` waits for all collections.
  pub timeout_secs:       u64,
  /// Per-kind default value overrides, merged over the builtin catalog.
  pub defaults:           HashMap<TypeKind, serde_json::Value>,
}

impl Default for MigratorConfig {
  fn default() -> Self {
    Self {
      create_collections: true,
      save_migration_log: true,
      timeout_secs:       10,
      defaults:           HashMap::new(),
    }
  }
}

impl MigratorConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  /// Build the immutable default-value catalog.
  pub fn catalog(&self) -> Catalog {
    Catalog::with_overrides(
      self
        .defaults
        .iter()
        .map(|(kind, value)| (*kind, value.clone())),
    )
  }
}
