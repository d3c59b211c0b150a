//! Plan executor: a [`DiffResult`] → collection-wide store mutations.
//!
//! Every operation is a filterless `update_many`, so it applies uniformly to
//! all documents and is idempotent. Fields are applied one at a time; a
//! failure skips only that field, and there is no transaction spanning the
//! plan. The layout is persisted once, after every field has been tried.

use std::collections::HashSet;

use reshape_core::{
  ARRAY_MARKER,
  catalog::Catalog,
  diff::DiffResult,
  document::{Filter, Update},
  layout::{FieldDescriptor, FieldStore},
  migration::{Change, MigrationLogEntry},
  store::DocumentStore,
};
use serde_json::Value;

use crate::{Result, persist};

/// The outcome of applying a plan to one collection.
#[derive(Debug, Clone)]
pub struct Applied {
  /// The layout after every successful change, as persisted.
  pub layout:  FieldStore,
  /// One entry per applied field-level change, in application order.
  pub entries: Vec<MigrationLogEntry>,
  /// Fields that were skipped or failed.
  pub skipped: Vec<String>,
}

/// Applies diffs to a single collection.
pub struct Executor<'a, S> {
  store:      &'a S,
  catalog:    &'a Catalog,
  collection: &'a str,
  save_log:   bool,
}

impl<'a, S: DocumentStore> Executor<'a, S> {
  pub fn new(
    store: &'a S,
    catalog: &'a Catalog,
    collection: &'a str,
    save_log: bool,
  ) -> Self {
    Self { store, catalog, collection, save_log }
  }

  /// Apply `diff` on top of `layout` and persist the resulting layout.
  ///
  /// Adds run in ascending path depth so a parent is always set before any
  /// of its children. The saved layout lists committed paths in `declared`
  /// order, followed by stored paths the schema no longer names. Only a
  /// failure to persist the layout is returned as an error.
  pub async fn apply(
    &self,
    diff: &DiffResult,
    mut layout: FieldStore,
    declared: &[FieldDescriptor],
  ) -> Result<Applied> {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();
    let mut materialized = HashSet::new();

    let mut adds = diff.to_add.descriptors();
    adds.sort_by_key(FieldDescriptor::depth);

    for field in adds {
      let default = match self.catalog.default_for(field.kind) {
        Ok(v) => v,
        Err(e) => {
          tracing::warn!(
            "Skipping field '{}' in collection '{}': {e}",
            field.path,
            self.collection
          );
          skipped.push(field.path);
          continue;
        }
      };

      if !self
        .materialize_parents(&field.path, &layout, &mut materialized)
        .await
      {
        skipped.push(field.path);
        continue;
      }

      let change = if layout.contains(&field.path) {
        Change::Updated
      } else {
        Change::Added
      };
      if let Err(e) = self.set(&field.path, default).await {
        tracing::warn!(
          "Error setting field '{}' in collection '{}': {e}",
          field.path,
          self.collection
        );
        skipped.push(field.path);
        continue;
      }

      layout.insert(field.path.clone(), field.kind);
      entries.push(self.record(&field.path, change).await);
    }

    for path in &diff.to_remove {
      let update = Update::unset(path.clone());
      if let Err(e) = self
        .store
        .update_many(self.collection, &Filter::all(), &update)
        .await
      {
        tracing::warn!(
          "Error removing field '{path}' from collection '{}': {e}",
          self.collection
        );
        skipped.push(path.clone());
        continue;
      }

      layout.remove(path);
      entries.push(self.record(path, Change::Removed).await);
    }

    layout.reorder(declared.iter().map(|d| d.path.as_str()));
    persist::save_layout(self.store, self.collection, &layout).await?;

    Ok(Applied { layout, entries, skipped })
  }

  async fn set(&self, path: &str, value: Value) -> Result<u64, S::Error> {
    let update = Update::set(path, value);
    self
      .store
      .update_many(self.collection, &Filter::all(), &update)
      .await
  }

  /// Ensure every array enclosing `path` exists before a per-element set.
  ///
  /// An enclosing array is the prefix before each `$[]` marker. Arrays that
  /// are already in the layout, or were materialised earlier in this run,
  /// are left alone. Returns false if one could not be created.
  async fn materialize_parents(
    &self,
    path: &str,
    layout: &FieldStore,
    materialized: &mut HashSet<String>,
  ) -> bool {
    let marker = format!(".{ARRAY_MARKER}");
    for (idx, _) in path.match_indices(&marker) {
      let parent = &path[..idx];
      if layout.contains(parent) || materialized.contains(parent) {
        continue;
      }
      if let Err(e) = self.set(parent, Value::Array(Vec::new())).await {
        tracing::warn!(
          "Error creating array '{parent}' for field '{path}' in collection '{}': {e}",
          self.collection
        );
        return false;
      }
      materialized.insert(parent.to_owned());
    }
    true
  }

  /// Build the log entry for one change, emit it, and persist it if enabled.
  /// A failure to persist does not undo the change.
  async fn record(&self, path: &str, change: Change) -> MigrationLogEntry {
    let entry = MigrationLogEntry::new(self.collection, path, change);
    tracing::info!("{}", entry.message);

    if self.save_log
      && let Err(e) = persist::append_log(self.store, &entry).await
    {
      tracing::warn!(
        "Error saving migration log for collection '{}': {e}",
        self.collection
      );
    }
    entry
  }
}
