//! Declarative record-type descriptions.
//!
//! A record type describes its stored shape as an explicit list of
//! [`FieldDecl`]s, either in code through the [`Record`] trait or in a
//! configuration file (all types here are serde-friendly).

use serde::{Deserialize, Serialize};

use crate::{Error, Result, kind::TypeKind};

// ─── Descriptions ────────────────────────────────────────────────────────────

/// The declared type of a field.
///
/// Serialised externally tagged, e.g. `{"scalar": "string"}`, `"timestamp"`,
/// `{"record": {"name": "Address", "fields": [...]}}`, or
/// `{"sequence": {"scalar": "string"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescription {
  /// A primitive value: string, integer and float widths, bool.
  Scalar(TypeKind),
  /// A timestamp-like record, stored as a single leaf.
  Timestamp,
  /// A nested record.
  Record(RecordSchema),
  /// An array whose elements are described by the inner type.
  Sequence(Box<TypeDescription>),
}

impl TypeDescription {
  pub fn scalar(kind: TypeKind) -> Self { Self::Scalar(kind) }

  pub fn sequence_of(element: TypeDescription) -> Self {
    Self::Sequence(Box::new(element))
  }

  /// Unwrap a top-level schema; anything other than a record is rejected.
  pub fn into_record(self, collection: &str) -> Result<RecordSchema> {
    match self {
      Self::Record(schema) => Ok(schema),
      _ => Err(Error::NotARecord(collection.to_owned())),
    }
  }
}

impl From<RecordSchema> for TypeDescription {
  fn from(schema: RecordSchema) -> Self { Self::Record(schema) }
}

impl From<TypeKind> for TypeDescription {
  fn from(kind: TypeKind) -> Self { Self::Scalar(kind) }
}

/// A record type: a name and its fields in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordSchema {
  pub name:   String,
  #[serde(default)]
  pub fields: Vec<FieldDecl>,
}

/// One declared field of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
  /// The field's declared (source-level) name, e.g. `CreatedAt`.
  pub name: String,
  /// Path metadata: the stored name followed by optional comma-separated
  /// modifiers, e.g. `created_at,omitempty`. `-` excludes the field.
  #[serde(default)]
  pub tag:  Option<String>,
  #[serde(rename = "type")]
  pub ty:   TypeDescription,
}

/// What the path metadata of a field says about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
  /// Stored under this path segment.
  Named(&'a str),
  /// No metadata at all.
  Missing,
  /// Explicitly excluded with `-`.
  Excluded,
}

impl FieldDecl {
  pub fn new(
    name: impl Into<String>,
    tag: impl Into<String>,
    ty: impl Into<TypeDescription>,
  ) -> Self {
    Self { name: name.into(), tag: Some(tag.into()), ty: ty.into() }
  }

  /// Interpret the path metadata. Modifiers after the primary name are
  /// ignored.
  pub fn segment(&self) -> Segment<'_> {
    let Some(tag) = self.tag.as_deref() else {
      return Segment::Missing;
    };
    match tag.split(',').next().map(str::trim) {
      None | Some("") => Segment::Missing,
      Some("-") => Segment::Excluded,
      Some(primary) => Segment::Named(primary),
    }
  }
}

impl RecordSchema {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), fields: Vec::new() }
  }

  /// Builder: append a field carrying path metadata.
  pub fn field(
    mut self,
    name: impl Into<String>,
    tag: impl Into<String>,
    ty: impl Into<TypeDescription>,
  ) -> Self {
    self.fields.push(FieldDecl::new(name, tag, ty));
    self
  }

  /// Builder: append a field with no path metadata.
  pub fn untagged(
    mut self,
    name: impl Into<String>,
    ty: impl Into<TypeDescription>,
  ) -> Self {
    self.fields.push(FieldDecl { name: name.into(), tag: None, ty: ty.into() });
    self
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Implemented by application record types to declare their stored shape.
///
/// ```rust
/// use reshape_core::{kind::TypeKind, schema::{Record, RecordSchema}};
///
/// struct User;
///
/// impl Record for User {
///   fn schema() -> RecordSchema {
///     RecordSchema::new("User")
///       .field("Id", "_id", TypeKind::String)
///       .field("Name", "name", TypeKind::String)
///   }
/// }
/// ```
pub trait Record {
  fn schema() -> RecordSchema;
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn segment_strips_modifiers() {
    let f = FieldDecl::new("Name", "name,omitempty,minsize", TypeKind::String);
    assert_eq!(f.segment(), Segment::Named("name"));
  }

  #[test]
  fn segment_missing_and_excluded() {
    let missing = FieldDecl { name: "X".into(), tag: None, ty: TypeKind::Int.into() };
    let empty = FieldDecl::new("X", "", TypeKind::Int);
    let excluded = FieldDecl::new("X", "-", TypeKind::Int);
    assert_eq!(missing.segment(), Segment::Missing);
    assert_eq!(empty.segment(), Segment::Missing);
    assert_eq!(excluded.segment(), Segment::Excluded);
  }

  #[test]
  fn non_record_description_is_rejected() {
    let err = TypeDescription::scalar(TypeKind::String)
      .into_record("users")
      .unwrap_err();
    assert!(matches!(err, Error::NotARecord(ref c) if c == "users"));
  }

  #[test]
  fn deserialises_nested_description() {
    let raw = json!({
      "name": "User",
      "fields": [
        { "name": "Name", "tag": "name", "type": { "scalar": "string" } },
        { "name": "CreatedAt", "tag": "created_at", "type": "timestamp" },
        { "name": "Cars", "tag": "cars",
          "type": { "sequence": { "scalar": "string" } } },
        { "name": "Address", "tag": "address",
          "type": { "record": { "name": "Address", "fields": [
            { "name": "City", "tag": "city", "type": { "scalar": "string" } }
          ] } } }
      ]
    });
    let schema: RecordSchema = serde_json::from_value(raw).unwrap();

    let expected = RecordSchema::new("User")
      .field("Name", "name", TypeKind::String)
      .field("CreatedAt", "created_at", TypeDescription::Timestamp)
      .field(
        "Cars",
        "cars",
        TypeDescription::sequence_of(TypeKind::String.into()),
      )
      .field(
        "Address",
        "address",
        RecordSchema::new("Address").field("City", "city", TypeKind::String),
      );
    assert_eq!(schema, expected);
  }
}
