//! Error types for `reshape-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("schema for collection {0:?} is not a record type")]
  NotARecord(String),

  #[error("unknown field kind: {0:?}")]
  UnknownKind(String),

  #[error("no default value configured for kind {0:?}")]
  NoDefault(crate::kind::TypeKind),

  /// A path could not be applied to a document, e.g. `$[]` over a field
  /// that is not an array.
  #[error("cannot apply path {path:?}: {reason}")]
  Path { path: String, reason: &'static str },

  #[error("malformed document: {0}")]
  Malformed(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
