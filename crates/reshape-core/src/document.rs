//! Schemaless documents and the path-addressed operations applied to them.
//!
//! Paths are dot-separated. The [`ARRAY_MARKER`] segment addresses every
//! element of an array: `todos.$[].done` sets `done` inside each element of
//! `todos`. The array itself must already exist for a `set` through the
//! marker to succeed, which is why the plan executor materialises array
//! parents first.

use serde_json::{Map, Value};

use crate::{ARRAY_MARKER, Error, Result};

/// A stored document: a JSON object with key order preserved.
pub type Document = Map<String, Value>;

// ─── Filter ──────────────────────────────────────────────────────────────────

/// A conjunction of equality conditions on dotted paths. The empty filter
/// matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
  conditions: Vec<(String, Value)>,
}

impl Filter {
  pub fn all() -> Self { Self::default() }

  pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
    Self::all().and(path, value)
  }

  pub fn and(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
    self.conditions.push((path.into(), value.into()));
    self
  }

  pub fn is_empty(&self) -> bool { self.conditions.is_empty() }

  pub fn matches(&self, doc: &Document) -> bool {
    self
      .conditions
      .iter()
      .all(|(path, expected)| get_path(doc, path) == Some(expected))
  }
}

/// Natural (insertion) order of documents within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
  /// Oldest first.
  Ascending,
  /// Newest first.
  Descending,
}

/// Look up a plain dotted path (no array marker).
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
  let mut segments = path.split('.');
  let mut current = doc.get(segments.next()?)?;
  for segment in segments {
    current = current.as_object()?.get(segment)?;
  }
  Some(current)
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// A mutation applied to every document a filter selects.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
  /// Set each path to the given value, creating intermediate documents.
  Set(Vec<(String, Value)>),
  /// Remove each path; missing paths are ignored.
  Unset(Vec<String>),
}

impl Update {
  pub fn set(path: impl Into<String>, value: impl Into<Value>) -> Self {
    Self::Set(vec![(path.into(), value.into())])
  }

  pub fn unset(path: impl Into<String>) -> Self { Self::Unset(vec![path.into()]) }

  /// Apply to `doc` in place. Returns whether anything changed.
  ///
  /// On error `doc` may be partially modified; callers discard it.
  pub fn apply(&self, doc: &mut Document) -> Result<bool> {
    let mut root = Value::Object(std::mem::take(doc));
    let outcome = self.apply_to_root(&mut root);
    if let Value::Object(map) = root {
      *doc = map;
    }
    outcome
  }

  fn apply_to_root(&self, root: &mut Value) -> Result<bool> {
    let mut changed = false;
    match self {
      Self::Set(pairs) => {
        for (path, value) in pairs {
          let segments: Vec<&str> = path.split('.').collect();
          changed |= set_in(root, path, &segments, value)?;
        }
      }
      Self::Unset(paths) => {
        for path in paths {
          let segments: Vec<&str> = path.split('.').collect();
          changed |= unset_in(root, &segments);
        }
      }
    }
    Ok(changed)
  }
}

fn set_in(target: &mut Value, path: &str, segments: &[&str], value: &Value) -> Result<bool> {
  let Some((&head, rest)) = segments.split_first() else {
    let changed = *target != *value;
    *target = value.clone();
    return Ok(changed);
  };

  if head == ARRAY_MARKER {
    let Value::Array(items) = target else {
      return Err(Error::Path {
        path:   path.to_owned(),
        reason: "array element update over a non-array value",
      });
    };
    let mut changed = false;
    for item in items {
      changed |= set_in(item, path, rest, value)?;
    }
    return Ok(changed);
  }

  let Value::Object(map) = target else {
    return Err(Error::Path {
      path:   path.to_owned(),
      reason: "cannot create a field inside a non-document value",
    });
  };

  if !map.contains_key(head) {
    if rest.first() == Some(&ARRAY_MARKER) {
      return Err(Error::Path {
        path:   path.to_owned(),
        reason: "array element update requires the array to exist",
      });
    }
    if !rest.is_empty() {
      map.insert(head.to_owned(), Value::Object(Map::new()));
    } else {
      map.insert(head.to_owned(), value.clone());
      return Ok(true);
    }
  }

  let child = map
    .get_mut(head)
    .ok_or_else(|| Error::Malformed(format!("field {head:?} vanished")))?;
  set_in(child, path, rest, value)
}

fn unset_in(target: &mut Value, segments: &[&str]) -> bool {
  let Some((&head, rest)) = segments.split_first() else {
    return false;
  };

  if head == ARRAY_MARKER {
    let Value::Array(items) = target else {
      return false;
    };
    let mut changed = false;
    for item in items {
      changed |= unset_in(item, rest);
    }
    return changed;
  }

  let Value::Object(map) = target else {
    return false;
  };
  if rest.is_empty() {
    return map.shift_remove(head).is_some();
  }
  match map.get_mut(head) {
    Some(child) => unset_in(child, rest),
    None => false,
  }
}
