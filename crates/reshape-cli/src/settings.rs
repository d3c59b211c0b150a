//! The `reshape` configuration file.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use reshape_core::schema::RecordSchema;
use reshape_migrator::MigratorConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
  /// Path to the SQLite database file.
  #[serde(default = "default_database")]
  pub database: PathBuf,
  #[serde(default)]
  pub migrator: MigratorConfig,
  /// `[[schemas]]` entries, registered in file order.
  #[serde(default)]
  pub schemas:  Vec<CollectionSchema>,
}

/// One collection and the record schema its documents follow.
#[derive(Debug, Deserialize)]
pub struct CollectionSchema {
  pub collection: String,
  pub schema:     RecordSchema,
}

fn default_database() -> PathBuf { PathBuf::from("reshape.db") }

impl Settings {
  /// Layer `path` (optional) under `RESHAPE_*` environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("RESHAPE"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn schema(&self, collection: &str) -> Option<&RecordSchema> {
    self
      .schemas
      .iter()
      .find(|s| s.collection == collection)
      .map(|s| &s.schema)
  }
}
