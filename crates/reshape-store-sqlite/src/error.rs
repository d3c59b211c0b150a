//! Error type for `reshape-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] reshape_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("collection already exists: {0}")]
  CollectionExists(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
