//! Error type for `reshape-migrator`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] reshape_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The collection does not exist and auto-creation is disabled.
  #[error("collection does not exist: {0}")]
  CollectionMissing(String),

  /// No layout snapshot to update for the collection.
  #[error("no stored layout for collection {0:?}")]
  LayoutMissing(String),
}

impl Error {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
