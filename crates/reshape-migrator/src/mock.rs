//! An in-memory [`DocumentStore`] that records every mutation, for asserting
//! operation order and injecting failures.

use std::{
  collections::{HashMap, HashSet},
  sync::Mutex,
  time::Duration,
};

use reshape_core::{
  document::{Document, Filter, Sort, Update},
  store::DocumentStore,
};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MockError {
  #[error("injected failure on {0:?}")]
  Injected(String),
  #[error("core error: {0}")]
  Core(#[from] reshape_core::Error),
}

/// One recorded `update_many` against a user collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
  Set(String, Value),
  Unset(String),
}

#[derive(Default)]
pub struct MockStore {
  collections: Mutex<HashMap<String, Vec<Document>>>,
  ops:         Mutex<Vec<(String, Op)>>,
  failing:     HashSet<String>,
  broken:      HashSet<String>,
  delays:      HashMap<String, Duration>,
}

impl MockStore {
  pub fn new() -> Self { Self::default() }

  /// Every update touching `path` fails.
  pub fn failing_on(mut self, path: &str) -> Self {
    self.failing.insert(path.to_owned());
    self
  }

  /// Every `find_one` against `collection` fails.
  pub fn failing_reads_on(mut self, collection: &str) -> Self {
    self.broken.insert(collection.to_owned());
    self
  }

  /// Every `update_many` against `collection` sleeps for `delay` first.
  pub fn slow_on(mut self, collection: &str, delay: Duration) -> Self {
    self.delays.insert(collection.to_owned(), delay);
    self
  }

  pub fn with_documents(self, collection: &str, docs: Vec<Value>) -> Self {
    let docs = docs
      .into_iter()
      .map(|v| match v {
        Value::Object(map) => map,
        _ => panic!("not an object"),
      })
      .collect();
    self
      .collections
      .lock()
      .unwrap()
      .insert(collection.to_owned(), docs);
    self
  }

  pub fn ops(&self, collection: &str) -> Vec<Op> {
    self
      .ops
      .lock()
      .unwrap()
      .iter()
      .filter(|(c, _)| c == collection)
      .map(|(_, op)| op.clone())
      .collect()
  }

  pub fn documents(&self, collection: &str) -> Vec<Document> {
    self
      .collections
      .lock()
      .unwrap()
      .get(collection)
      .cloned()
      .unwrap_or_default()
  }

  fn apply(
    &self,
    collection: &str,
    filter: &Filter,
    update: &Update,
    one: bool,
  ) -> Result<u64, MockError> {
    let paths: Vec<&str> = match update {
      Update::Set(pairs) => pairs.iter().map(|(p, _)| p.as_str()).collect(),
      Update::Unset(paths) => paths.iter().map(String::as_str).collect(),
    };
    if let Some(p) = paths.iter().find(|p| self.failing.contains(**p)) {
      return Err(MockError::Injected((*p).to_owned()));
    }

    let mut collections = self.collections.lock().unwrap();
    let docs = collections.entry(collection.to_owned()).or_default();
    let mut staged = docs.clone();
    let mut changed = 0;
    for doc in staged.iter_mut().filter(|d| filter.matches(d)) {
      if update.apply(doc)? {
        changed += 1;
      }
      if one {
        break;
      }
    }
    *docs = staged;

    if !one {
      let mut ops = self.ops.lock().unwrap();
      match update {
        Update::Set(pairs) => {
          for (p, v) in pairs {
            ops.push((collection.to_owned(), Op::Set(p.clone(), v.clone())));
          }
        }
        Update::Unset(paths) => {
          for p in paths {
            ops.push((collection.to_owned(), Op::Unset(p.clone())));
          }
        }
      }
    }
    Ok(changed)
  }
}

impl DocumentStore for MockStore {
  type Error = MockError;

  async fn list_collection_names(&self) -> Result<Vec<String>, MockError> {
    Ok(self.collections.lock().unwrap().keys().cloned().collect())
  }

  async fn create_collection(&self, name: &str) -> Result<(), MockError> {
    self
      .collections
      .lock()
      .unwrap()
      .entry(name.to_owned())
      .or_default();
    Ok(())
  }

  async fn find_one(
    &self,
    collection: &str,
    filter: &Filter,
    sort: Option<Sort>,
  ) -> Result<Option<Document>, MockError> {
    if self.broken.contains(collection) {
      return Err(MockError::Injected(collection.to_owned()));
    }
    let collections = self.collections.lock().unwrap();
    let Some(docs) = collections.get(collection) else {
      return Ok(None);
    };
    let found = match sort {
      Some(Sort::Descending) => docs.iter().rev().find(|d| filter.matches(d)),
      _ => docs.iter().find(|d| filter.matches(d)),
    };
    Ok(found.cloned())
  }

  async fn update_many(
    &self,
    collection: &str,
    filter: &Filter,
    update: &Update,
  ) -> Result<u64, MockError> {
    if let Some(delay) = self.delays.get(collection) {
      tokio::time::sleep(*delay).await;
    }
    self.apply(collection, filter, update, false)
  }

  async fn insert_one(&self, collection: &str, document: Document) -> Result<(), MockError> {
    self
      .collections
      .lock()
      .unwrap()
      .entry(collection.to_owned())
      .or_default()
      .push(document);
    Ok(())
  }

  async fn update_one(
    &self,
    collection: &str,
    filter: &Filter,
    update: &Update,
  ) -> Result<u64, MockError> {
    self.apply(collection, filter, update, true)
  }
}
