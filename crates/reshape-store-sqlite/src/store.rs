//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use reshape_core::{
  document::{Document, Filter, Sort, Update},
  store::DocumentStore,
};

use crate::{
  Error, Result,
  encode::{decode_document, encode_document, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Calls are
/// serialised on the connection thread, so concurrent callers never observe
/// a half-applied update.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// How many matching documents an update may touch.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Reach {
  One,
  Many,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every document of `collection` in natural order.
  pub async fn documents(&self, collection: &str) -> Result<Vec<Document>> {
    let collection = collection.to_owned();

    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT body FROM documents WHERE collection = ?1 ORDER BY doc_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![collection], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    bodies.iter().map(|b| decode_document(b)).collect()
  }

  /// Load, filter, mutate, and write back documents in one transaction. A
  /// failure on any document rolls back the whole call.
  async fn update_matching(
    &self,
    collection: &str,
    filter: &Filter,
    update: &Update,
    reach: Reach,
  ) -> Result<u64> {
    let collection = collection.to_owned();
    let filter     = filter.clone();
    let update     = update.clone();

    let outcome: Result<u64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let rows: Vec<(i64, String)> = {
          let mut stmt = tx.prepare(
            "SELECT doc_id, body FROM documents WHERE collection = ?1 ORDER BY doc_id",
          )?;
          stmt
            .query_map(rusqlite::params![collection], |row| {
              Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut changed = 0u64;
        for (doc_id, body) in rows {
          let mut doc = match decode_document(&body) {
            Ok(doc) => doc,
            Err(e) => return Ok(Err(e)),
          };
          if !filter.matches(&doc) {
            continue;
          }

          match update.apply(&mut doc) {
            Ok(true) => {
              let body = match encode_document(&doc) {
                Ok(body) => body,
                Err(e) => return Ok(Err(e)),
              };
              tx.execute(
                "UPDATE documents SET body = ?1 WHERE doc_id = ?2",
                rusqlite::params![body, doc_id],
              )?;
              changed += 1;
            }
            Ok(false) => {}
            // Dropping `tx` rolls back.
            Err(e) => return Ok(Err(e.into())),
          }

          if reach == Reach::One {
            break;
          }
        }

        tx.commit()?;
        Ok(Ok(changed))
      })
      .await?;

    outcome
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn list_collection_names(&self) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM collections ORDER BY rowid")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }

  async fn create_collection(&self, name: &str) -> Result<()> {
    let name_owned = name.to_owned();
    let at_str     = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
          rusqlite::params![name_owned, at_str],
        )?;
        Ok(n == 1)
      })
      .await?;

    if !inserted {
      return Err(Error::CollectionExists(name.to_owned()));
    }
    Ok(())
  }

  async fn find_one(
    &self,
    collection: &str,
    filter: &Filter,
    sort: Option<Sort>,
  ) -> Result<Option<Document>> {
    let collection = collection.to_owned();
    let sql = match sort.unwrap_or(Sort::Ascending) {
      Sort::Ascending => {
        "SELECT body FROM documents WHERE collection = ?1 ORDER BY doc_id ASC"
      }
      Sort::Descending => {
        "SELECT body FROM documents WHERE collection = ?1 ORDER BY doc_id DESC"
      }
    };

    // Equality filters on JSON paths are evaluated in Rust; an empty filter
    // only needs the first row.
    let first_only = filter.is_empty();
    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(rusqlite::params![collection])?;
        let mut bodies: Vec<String> = Vec::new();
        while let Some(row) = rows.next()? {
          bodies.push(row.get(0)?);
          if first_only {
            break;
          }
        }
        Ok(bodies)
      })
      .await?;

    for body in bodies {
      let doc = decode_document(&body)?;
      if filter.matches(&doc) {
        return Ok(Some(doc));
      }
    }
    Ok(None)
  }

  async fn update_many(
    &self,
    collection: &str,
    filter: &Filter,
    update: &Update,
  ) -> Result<u64> {
    self.update_matching(collection, filter, update, Reach::Many).await
  }

  async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
    let collection = collection.to_owned();
    let body       = encode_document(&document)?;
    let at_str     = encode_dt(Utc::now());

    // Inserting into an unknown collection creates it.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
          rusqlite::params![collection, at_str],
        )?;
        tx.execute(
          "INSERT INTO documents (collection, body) VALUES (?1, ?2)",
          rusqlite::params![collection, body],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_one(
    &self,
    collection: &str,
    filter: &Filter,
    update: &Update,
  ) -> Result<u64> {
    self.update_matching(collection, filter, update, Reach::One).await
  }
}
