//! Layout diff: stored field layout → fields to add, update, and remove.
//!
//! The comparison is purely structural: it never looks at documents. An
//! added field and a field whose kind changed are the same operation for the
//! executor (set the path to the new kind's default), so both land in
//! `to_add`.

use crate::{
  is_identity,
  layout::{FieldDescriptor, FieldStore},
};

/// The result of diffing a stored layout against a freshly walked schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
  /// New or kind-changed fields, in schema order.
  pub to_add:    FieldStore,
  /// Paths no longer declared, in stored order.
  pub to_remove: Vec<String>,
}

impl DiffResult {
  pub fn is_empty(&self) -> bool {
    self.to_add.is_empty() && self.to_remove.is_empty()
  }
}

/// Compute the changes that bring `stored` in line with `current`.
pub fn diff(stored: &FieldStore, current: &[FieldDescriptor]) -> DiffResult {
  let mut to_add = FieldStore::new();
  for d in current {
    if is_identity(&d.path) {
      continue;
    }
    match stored.get(&d.path) {
      Some(kind) if kind == d.kind => {}
      _ => {
        to_add.insert(d.path.clone(), d.kind);
      }
    }
  }

  let declared: FieldStore = current.iter().cloned().collect();
  let to_remove = stored
    .paths()
    .filter(|p| !is_identity(p) && !declared.contains(p))
    .map(str::to_owned)
    .collect();

  DiffResult { to_add, to_remove }
}
