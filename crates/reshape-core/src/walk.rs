//! Flattening a record declaration into ordered `(path, kind)` descriptors.
//!
//! Nested records emit a `record` leaf for themselves before their children;
//! sequences of records emit a `sequence` leaf and then describe the element
//! fields under `<path>.$[]`. Removing a nested field wholesale therefore
//! removes its own path as well as every descendant path.

use convert_case::{Case, Casing};

use crate::{
  ARRAY_MARKER, is_identity,
  kind::TypeKind,
  layout::{FieldDescriptor, FieldStore},
  schema::{RecordSchema, Segment, TypeDescription},
};

/// Why a declared field produced no descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// The field carries no path metadata.
  MissingTag,
  /// The field is explicitly excluded.
  Excluded,
}

/// A field the walker ignored, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
  /// Name of the record type declaring the field.
  pub record: String,
  pub field:  String,
  pub reason: SkipReason,
}

/// The full result of a walk.
#[derive(Debug, Clone, Default)]
pub struct Walked {
  pub fields:  FieldStore,
  pub skipped: Vec<SkippedField>,
}

/// Flatten `schema` into descriptors in declaration order, depth-first.
pub fn walk(schema: &RecordSchema) -> Vec<FieldDescriptor> {
  walk_schema(schema).fields.descriptors()
}

/// Like [`walk`], also returning the fields that were skipped.
pub fn walk_schema(schema: &RecordSchema) -> Walked {
  let mut walked = Walked::default();
  walk_into(None, schema, &mut walked);
  walked
}

fn walk_into(prefix: Option<&str>, schema: &RecordSchema, out: &mut Walked) {
  for field in &schema.fields {
    let segment = match field.segment() {
      Segment::Named(s) => s,
      Segment::Missing => {
        out.skipped.push(skipped(schema, &field.name, SkipReason::MissingTag));
        continue;
      }
      Segment::Excluded => {
        out.skipped.push(skipped(schema, &field.name, SkipReason::Excluded));
        continue;
      }
    };
    if is_identity(segment) {
      continue;
    }

    let path = match prefix {
      Some(p) => format!("{p}.{segment}"),
      None => segment.to_owned(),
    };

    match &field.ty {
      // Timestamps are keyed by the declared name, never by the tag or the
      // prefix. Existing layouts depend on this.
      TypeDescription::Timestamp => {
        out.fields.insert(field.name.to_case(Case::Snake), TypeKind::Time);
      }
      TypeDescription::Record(inner) => {
        out.fields.insert(path.clone(), TypeKind::Record);
        walk_into(Some(&path), inner, out);
      }
      TypeDescription::Sequence(element) => {
        out.fields.insert(path.clone(), TypeKind::Sequence);
        if let TypeDescription::Record(inner) = element.as_ref() {
          let element_prefix = format!("{path}.{ARRAY_MARKER}");
          walk_into(Some(&element_prefix), inner, out);
        }
      }
      TypeDescription::Scalar(kind) => {
        out.fields.insert(path, *kind);
      }
    }
  }
}

fn skipped(schema: &RecordSchema, field: &str, reason: SkipReason) -> SkippedField {
  SkippedField {
    record: schema.name.clone(),
    field: field.to_owned(),
    reason,
  }
}
