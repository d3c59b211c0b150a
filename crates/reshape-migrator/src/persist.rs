//! Reading and writing layout snapshots and migration log entries through a
//! [`DocumentStore`].

use chrono::Utc;
use reshape_core::{
  document::{Filter, Update},
  layout::{FieldStore, LayoutSnapshot},
  migration::MigrationLogEntry,
  store::{DocumentStore, LAYOUT_COLLECTION, MIGRATION_LOG_COLLECTION},
};

use crate::{Error, Result};

fn layout_filter(collection: &str) -> Filter { Filter::eq("collection", collection) }

/// The stored layout of `collection`, or `None` on first sight.
pub async fn load_layout<S: DocumentStore>(
  store: &S,
  collection: &str,
) -> Result<Option<LayoutSnapshot>> {
  let filter = layout_filter(collection);
  let doc = store
    .find_one(LAYOUT_COLLECTION, &filter, None)
    .await
    .map_err(Error::store)?;

  Ok(doc.map(LayoutSnapshot::from_document).transpose()?)
}

/// Persist a brand-new layout snapshot.
pub async fn insert_layout<S: DocumentStore>(
  store: &S,
  snapshot: &LayoutSnapshot,
) -> Result<()> {
  store
    .insert_one(LAYOUT_COLLECTION, snapshot.to_document()?)
    .await
    .map_err(Error::store)
}

/// Overwrite the fields of an existing snapshot and stamp `updated_at`.
pub async fn save_layout<S: DocumentStore>(
  store: &S,
  collection: &str,
  fields: &FieldStore,
) -> Result<()> {
  let encode = |v: serde_json::Result<serde_json::Value>| {
    v.map_err(reshape_core::Error::from)
  };
  let update = Update::Set(vec![
    ("fields".to_owned(), encode(serde_json::to_value(fields))?),
    ("updated_at".to_owned(), encode(serde_json::to_value(Utc::now()))?),
  ]);
  let filter = layout_filter(collection);

  let changed = store
    .update_one(LAYOUT_COLLECTION, &filter, &update)
    .await
    .map_err(Error::store)?;

  // `updated_at` always changes, so zero means there was nothing to update.
  if changed == 0 {
    return Err(Error::LayoutMissing(collection.to_owned()));
  }
  Ok(())
}

/// Append one entry to the migration log collection.
pub async fn append_log<S: DocumentStore>(
  store: &S,
  entry: &MigrationLogEntry,
) -> Result<()> {
  store
    .insert_one(MIGRATION_LOG_COLLECTION, entry.to_document()?)
    .await
    .map_err(Error::store)
}
