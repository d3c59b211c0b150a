//! Encoding and decoding between documents and the text stored in SQLite.

use chrono::{DateTime, Utc};
use reshape_core::document::Document;
use serde_json::Value;

use crate::Result;

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn encode_document(doc: &Document) -> Result<String> {
  Ok(serde_json::to_string(doc)?)
}

pub fn decode_document(s: &str) -> Result<Document> {
  match serde_json::from_str(s)? {
    Value::Object(map) => Ok(map),
    other => Err(
      reshape_core::Error::Malformed(format!("stored body is not an object: {other}"))
        .into(),
    ),
  }
}
