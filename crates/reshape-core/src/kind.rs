//! The closed set of semantic field kinds.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The semantic kind of a field, as recorded in a collection's layout.
///
/// The string form (`"string"`, `"int64"`, `"sequence"`, ...) is what gets
/// persisted; serde and strum agree on it.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TypeKind {
  String,
  Int,
  Int8,
  Int16,
  Int32,
  Int64,
  Uint,
  Uint8,
  Uint16,
  Uint32,
  Uint64,
  Float32,
  Float64,
  Bool,
  /// A timestamp; stored documents hold an RFC 3339 string.
  Time,
  /// An array, of scalars or of records.
  Sequence,
  /// A nested document.
  Record,
}

impl TypeKind {
  /// Parse a persisted kind string.
  pub fn parse(s: &str) -> crate::Result<Self> {
    s.parse()
      .map_err(|_| crate::Error::UnknownKind(s.to_owned()))
  }
}
