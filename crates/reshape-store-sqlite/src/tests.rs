//! Integration tests for `SqliteStore` against an in-memory database.

use reshape_core::{
  document::{Document, Filter, Sort, Update},
  store::DocumentStore,
};
use serde_json::{Value, json};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn doc(v: Value) -> Document {
  match v {
    Value::Object(map) => map,
    _ => panic!("not an object"),
  }
}

async fn seed_users(s: &SqliteStore) {
  s.create_collection("users").await.unwrap();
  s.insert_one("users", doc(json!({ "name": "alice", "age": 31 })))
    .await
    .unwrap();
  s.insert_one("users", doc(json!({ "name": "bob", "age": 27 })))
    .await
    .unwrap();
}

// ─── Collections ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_list_collections() {
  let s = store().await;
  s.create_collection("users").await.unwrap();
  s.create_collection("posts").await.unwrap();

  let names = s.list_collection_names().await.unwrap();
  assert_eq!(names, ["users", "posts"]);
}

#[tokio::test]
async fn create_existing_collection_errors() {
  let s = store().await;
  s.create_collection("users").await.unwrap();
  let err = s.create_collection("users").await.unwrap_err();
  assert!(matches!(err, crate::Error::CollectionExists(ref n) if n == "users"));
}

#[tokio::test]
async fn insert_creates_missing_collection() {
  let s = store().await;
  s.insert_one("migrations", doc(json!({ "message": "hi" })))
    .await
    .unwrap();
  assert_eq!(s.list_collection_names().await.unwrap(), ["migrations"]);
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_one_respects_natural_order() {
  let s = store().await;
  seed_users(&s).await;

  let oldest = s
    .find_one("users", &Filter::all(), Some(Sort::Ascending))
    .await
    .unwrap()
    .unwrap();
  let newest = s
    .find_one("users", &Filter::all(), Some(Sort::Descending))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(oldest["name"], json!("alice"));
  assert_eq!(newest["name"], json!("bob"));
}

#[tokio::test]
async fn find_one_filters_and_reports_absence() {
  let s = store().await;
  seed_users(&s).await;

  let bob = s
    .find_one("users", &Filter::eq("name", "bob"), None)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(bob["age"], json!(27));

  let nobody = s
    .find_one("users", &Filter::eq("name", "carol"), None)
    .await
    .unwrap();
  assert!(nobody.is_none());

  let empty = s
    .find_one("posts", &Filter::all(), Some(Sort::Descending))
    .await
    .unwrap();
  assert!(empty.is_none());
}

// ─── Updates ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_many_sets_and_unsets_everywhere() {
  let s = store().await;
  seed_users(&s).await;

  let set = s
    .update_many("users", &Filter::all(), &Update::set("active", false))
    .await
    .unwrap();
  assert_eq!(set, 2);

  let unset = s
    .update_many("users", &Filter::all(), &Update::unset("age"))
    .await
    .unwrap();
  assert_eq!(unset, 2);

  let docs = s.documents("users").await.unwrap();
  for d in &docs {
    assert_eq!(d["active"], json!(false));
    assert!(!d.contains_key("age"));
  }
}

#[tokio::test]
async fn update_many_counts_only_changed_documents() {
  let s = store().await;
  seed_users(&s).await;

  s.update_many("users", &Filter::all(), &Update::set("active", false))
    .await
    .unwrap();
  let again = s
    .update_many("users", &Filter::all(), &Update::set("active", false))
    .await
    .unwrap();
  assert_eq!(again, 0);
}

#[tokio::test]
async fn failing_update_rolls_back_every_document() {
  let s = store().await;
  s.create_collection("users").await.unwrap();
  s.insert_one("users", doc(json!({ "todos": [{ "name": "a" }] })))
    .await
    .unwrap();
  s.insert_one("users", doc(json!({ "name": "no todos" })))
    .await
    .unwrap();

  let err = s
    .update_many("users", &Filter::all(), &Update::set("todos.$[].done", false))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(reshape_core::Error::Path { .. })));

  let docs = s.documents("users").await.unwrap();
  assert_eq!(docs[0]["todos"], json!([{ "name": "a" }]));
}

#[tokio::test]
async fn update_one_touches_first_match_only() {
  let s = store().await;
  s.insert_one("layouts", doc(json!({ "collection": "users", "v": 1 })))
    .await
    .unwrap();
  s.insert_one("layouts", doc(json!({ "collection": "posts", "v": 1 })))
    .await
    .unwrap();

  let n = s
    .update_one(
      "layouts",
      &Filter::eq("collection", "posts"),
      &Update::set("v", 2),
    )
    .await
    .unwrap();
  assert_eq!(n, 1);

  let docs = s.documents("layouts").await.unwrap();
  assert_eq!(docs[0]["v"], json!(1));
  assert_eq!(docs[1]["v"], json!(2));
}

#[tokio::test]
async fn key_order_survives_storage() {
  let s = store().await;
  s.insert_one("t", doc(json!({ "z": 1, "a": 2, "m": 3 })))
    .await
    .unwrap();
  let docs = s.documents("t").await.unwrap();
  let keys: Vec<_> = docs[0].keys().map(String::as_str).collect();
  assert_eq!(keys, ["z", "a", "m"]);
}

#[tokio::test]
async fn reopening_a_file_keeps_documents() {
  let dir = std::env::temp_dir().join(format!(
    "reshape-sqlite-test-{}",
    std::process::id()
  ));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("store.db");
  let _ = std::fs::remove_file(&path);

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert_one("users", doc(json!({ "name": "alice" })))
      .await
      .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.documents("users").await.unwrap().len(), 1);
  let _ = std::fs::remove_dir_all(&dir);
}
