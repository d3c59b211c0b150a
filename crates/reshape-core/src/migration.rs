//! Migration log entries — the durable audit trail of applied changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, document::Document};

/// What happened to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
  /// The field was not in the stored layout.
  Added,
  /// The field existed with a different kind.
  Updated,
  Removed,
}

/// One field-level change applied to one collection. Never batched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationLogEntry {
  pub collection: String,
  pub message:    String,
  pub created_at: DateTime<Utc>,
}

impl MigrationLogEntry {
  pub fn new(collection: &str, path: &str, change: Change) -> Self {
    let message = match change {
      Change::Added => format!("field '{path}' added to collection '{collection}'"),
      Change::Updated => {
        format!("field type of '{path}' updated in collection '{collection}'")
      }
      Change::Removed => {
        format!("field '{path}' removed from collection '{collection}'")
      }
    };
    Self {
      collection: collection.to_owned(),
      message,
      created_at: Utc::now(),
    }
  }

  pub fn to_document(&self) -> Result<Document> {
    match serde_json::to_value(self)? {
      serde_json::Value::Object(map) => Ok(map),
      other => Err(Error::Malformed(format!("log entry encoded as {other}"))),
    }
  }
}
