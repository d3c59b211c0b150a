//! Core types and pure algorithms for the Reshape schema reconciler.
//!
//! This crate is deliberately free of database, runtime, and logging
//! dependencies. Diagnostics produced while walking a schema are returned as
//! data so the caller decides how to surface them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod diff;
pub mod document;
pub mod error;
pub mod kind;
pub mod layout;
pub mod migration;
pub mod schema;
pub mod store;
pub mod walk;

pub use error::{Error, Result};

/// Reserved path segment meaning "every element of this array of records".
pub const ARRAY_MARKER: &str = "$[]";

/// Returns true for the reserved identity field names.
pub fn is_identity(name: &str) -> bool { name == "id" || name == "_id" }
