//! The `DocumentStore` trait.
//!
//! Implemented by storage backends (e.g. `reshape-store-sqlite`). The
//! migrator depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::document::{Document, Filter, Sort, Update};

/// Name of the collection holding migration log entries.
pub const MIGRATION_LOG_COLLECTION: &str = "migrations";

/// Name of the collection holding one layout snapshot per collection.
pub const LAYOUT_COLLECTION: &str = "migrations_collections_fields";

/// Abstraction over a document database.
///
/// A single handle is shared by every reconciliation task, so
/// implementations must tolerate concurrent independent calls. All methods
/// return `Send` futures so the trait works in multi-threaded runtimes.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn list_collection_names(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Create an empty collection. Fails if it already exists.
  fn create_collection<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// The first document matching `filter`, in natural order or the order
  /// given by `sort`. `None` when nothing matches.
  fn find_one<'a>(
    &'a self,
    collection: &'a str,
    filter: &'a Filter,
    sort: Option<Sort>,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Apply `update` to every matching document. Returns how many changed.
  fn update_many<'a>(
    &'a self,
    collection: &'a str,
    filter: &'a Filter,
    update: &'a Update,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  fn insert_one<'a>(
    &'a self,
    collection: &'a str,
    document: Document,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Apply `update` to the first matching document. Returns how many
  /// changed (0 or 1).
  fn update_one<'a>(
    &'a self,
    collection: &'a str,
    filter: &'a Filter,
    update: &'a Update,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;
}
