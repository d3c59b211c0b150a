//! Default values used when a field is introduced or changes kind.
//!
//! A [`Catalog`] is built once from the builtin table merged with caller
//! overrides and is never mutated afterwards.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::{Map, Value};

use crate::{Error, Result, kind::TypeKind};

/// How the default for a kind is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
  /// A fixed JSON value.
  Fixed(Value),
  /// The current UTC instant as an RFC 3339 string, resolved at lookup.
  Now,
}

impl DefaultValue {
  fn resolve(&self) -> Value {
    match self {
      Self::Fixed(v) => v.clone(),
      Self::Now => Value::String(Utc::now().to_rfc3339()),
    }
  }
}

/// Per-kind default values.
#[derive(Debug, Clone)]
pub struct Catalog {
  defaults: HashMap<TypeKind, DefaultValue>,
}

impl Default for Catalog {
  fn default() -> Self { Self::builtin() }
}

impl Catalog {
  /// The builtin defaults. Narrow integer widths and unsigned kinds have no
  /// builtin default and are skipped unless configured.
  pub fn builtin() -> Self {
    use DefaultValue::{Fixed, Now};

    let defaults = HashMap::from([
      (TypeKind::String, Fixed(Value::String(String::new()))),
      (TypeKind::Int, Fixed(Value::from(0))),
      (TypeKind::Int32, Fixed(Value::from(0))),
      (TypeKind::Int64, Fixed(Value::from(0))),
      (TypeKind::Float32, Fixed(Value::from(0.0))),
      (TypeKind::Float64, Fixed(Value::from(0.0))),
      (TypeKind::Bool, Fixed(Value::Bool(false))),
      (TypeKind::Time, Now),
      (TypeKind::Sequence, Fixed(Value::Array(Vec::new()))),
      (TypeKind::Record, Fixed(Value::Object(Map::new()))),
    ]);
    Self { defaults }
  }

  /// The builtin defaults with `overrides` merged on top.
  pub fn with_overrides(
    overrides: impl IntoIterator<Item = (TypeKind, Value)>,
  ) -> Self {
    let mut catalog = Self::builtin();
    for (kind, value) in overrides {
      catalog.defaults.insert(kind, DefaultValue::Fixed(value));
    }
    catalog
  }

  /// The value a newly introduced field of `kind` is set to.
  pub fn default_for(&self, kind: TypeKind) -> Result<Value> {
    self
      .defaults
      .get(&kind)
      .map(DefaultValue::resolve)
      .ok_or(Error::NoDefault(kind))
  }
}
