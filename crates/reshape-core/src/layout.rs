//! Field descriptors and the ordered per-collection field layout.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
  Error, Result,
  document::Document,
  kind::TypeKind,
};

// ─── Descriptor ──────────────────────────────────────────────────────────────

/// A dotted field path and its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
  pub path: String,
  pub kind: TypeKind,
}

impl FieldDescriptor {
  pub fn new(path: impl Into<String>, kind: TypeKind) -> Self {
    Self { path: path.into(), kind }
  }

  pub fn depth(&self) -> usize { path_depth(&self.path) }
}

/// Number of segments in a dotted path; `$[]` counts as a segment.
pub fn path_depth(path: &str) -> usize { path.split('.').count() }

// ─── FieldStore ──────────────────────────────────────────────────────────────

/// An insertion-ordered mapping from path to kind.
///
/// `order` and `kinds` always hold the same set of paths. Re-inserting an
/// existing path overwrites its kind in place without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldStore {
  order: Vec<String>,
  kinds: HashMap<String, TypeKind>,
}

impl FieldStore {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { self.order.len() }

  pub fn is_empty(&self) -> bool { self.order.is_empty() }

  pub fn get(&self, path: &str) -> Option<TypeKind> {
    self.kinds.get(path).copied()
  }

  pub fn contains(&self, path: &str) -> bool { self.kinds.contains_key(path) }

  /// Insert or overwrite; returns the previous kind, if any.
  pub fn insert(&mut self, path: impl Into<String>, kind: TypeKind) -> Option<TypeKind> {
    let path = path.into();
    let previous = self.kinds.insert(path.clone(), kind);
    if previous.is_none() {
      self.order.push(path);
    }
    previous
  }

  pub fn remove(&mut self, path: &str) -> Option<TypeKind> {
    let previous = self.kinds.remove(path)?;
    self.order.retain(|p| p != path);
    Some(previous)
  }

  /// Paths and kinds in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, TypeKind)> + '_ {
    self
      .order
      .iter()
      .map(|p| (p.as_str(), self.kinds[p.as_str()]))
  }

  pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
    self.order.iter().map(String::as_str)
  }

  pub fn descriptors(&self) -> Vec<FieldDescriptor> {
    self
      .iter()
      .map(|(path, kind)| FieldDescriptor::new(path, kind))
      .collect()
  }

  /// Move the paths named by `declared` to the front, in that order. Paths
  /// not named keep their relative order after them; names that are not
  /// present are ignored. Kinds are untouched.
  pub fn reorder<'p>(&mut self, declared: impl IntoIterator<Item = &'p str>) {
    let mut order = Vec::with_capacity(self.order.len());
    let mut placed = HashSet::new();
    for path in declared {
      if self.kinds.contains_key(path) && placed.insert(path.to_owned()) {
        order.push(path.to_owned());
      }
    }
    order.extend(self.order.drain(..).filter(|p| !placed.contains(p)));
    self.order = order;
  }
}

impl FromIterator<FieldDescriptor> for FieldStore {
  fn from_iter<I: IntoIterator<Item = FieldDescriptor>>(iter: I) -> Self {
    let mut store = Self::new();
    for d in iter {
      store.insert(d.path, d.kind);
    }
    store
  }
}

// Persisted as an ordered list of `{path, kind}` so order survives any
// backend that does not preserve object key order.
impl Serialize for FieldStore {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(
      self
        .iter()
        .map(|(path, kind)| FieldDescriptor::new(path, kind)),
    )
  }
}

impl<'de> Deserialize<'de> for FieldStore {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let descriptors = Vec::<FieldDescriptor>::deserialize(deserializer)?;
    Ok(descriptors.into_iter().collect())
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The persisted layout document for one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
  pub collection: String,
  pub fields:     FieldStore,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

impl LayoutSnapshot {
  pub fn new(collection: impl Into<String>, fields: FieldStore) -> Self {
    Self {
      collection: collection.into(),
      fields,
      created_at: Utc::now(),
      updated_at: None,
    }
  }

  pub fn to_document(&self) -> Result<Document> {
    match serde_json::to_value(self)? {
      serde_json::Value::Object(map) => Ok(map),
      other => Err(Error::Malformed(format!("layout encoded as {other}"))),
    }
  }

  pub fn from_document(doc: Document) -> Result<Self> {
    Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn sample() -> FieldStore {
    [
      FieldDescriptor::new("name", TypeKind::String),
      FieldDescriptor::new("todos", TypeKind::Sequence),
      FieldDescriptor::new("todos.$[].done", TypeKind::Bool),
      FieldDescriptor::new("age", TypeKind::Int),
    ]
    .into_iter()
    .collect()
  }

  #[test]
  fn insert_overwrite_keeps_position() {
    let mut s = sample();
    assert_eq!(s.insert("todos", TypeKind::Record), Some(TypeKind::Sequence));
    let paths: Vec<_> = s.paths().collect();
    assert_eq!(paths, ["name", "todos", "todos.$[].done", "age"]);
    assert_eq!(s.get("todos"), Some(TypeKind::Record));
  }

  #[test]
  fn remove_keeps_order_and_lookup_in_sync() {
    let mut s = sample();
    assert_eq!(s.remove("todos"), Some(TypeKind::Sequence));
    assert_eq!(s.remove("missing"), None);
    assert!(!s.contains("todos"));
    assert_eq!(s.len(), 3);
    let paths: Vec<_> = s.paths().collect();
    assert_eq!(paths, ["name", "todos.$[].done", "age"]);
  }

  #[test]
  fn reorder_follows_declared_paths_then_keeps_the_rest() {
    let mut s = sample();
    s.reorder(["age", "ghost", "name", "age"]);
    let paths: Vec<_> = s.paths().collect();
    assert_eq!(paths, ["age", "name", "todos", "todos.$[].done"]);
    assert_eq!(s.get("age"), Some(TypeKind::Int));
    assert_eq!(s.len(), 4);
  }

  #[test]
  fn serialises_as_ordered_list() {
    let v = serde_json::to_value(sample()).unwrap();
    assert_eq!(
      v,
      json!([
        { "path": "name", "kind": "string" },
        { "path": "todos", "kind": "sequence" },
        { "path": "todos.$[].done", "kind": "bool" },
        { "path": "age", "kind": "int" },
      ])
    );
  }

  #[test]
  fn snapshot_document_round_trip() {
    let snapshot = LayoutSnapshot::new("users", sample());
    let doc = snapshot.to_document().unwrap();
    assert_eq!(doc["collection"], json!("users"));

    let back = LayoutSnapshot::from_document(doc).unwrap();
    assert_eq!(back.fields.descriptors(), sample().descriptors());
    assert_eq!(back.created_at, snapshot.created_at);
    assert_eq!(back.updated_at, None);
  }

  #[test]
  fn depth_counts_marker_segments() {
    assert_eq!(path_depth("name"), 1);
    assert_eq!(path_depth("todos.$[].name"), 3);
  }
}
