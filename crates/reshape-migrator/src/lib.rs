//! Schema reconciliation for Reshape.
//!
//! A [`Migrator`] owns the registered `(collection, schema)` pairs and, on
//! each [`Migrator::run_migrations`] pass, reconciles every collection
//! concurrently against any [`reshape_core::store::DocumentStore`].
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut migrator = Migrator::new(Arc::new(store), MigratorConfig::default()).await;
//! migrator.register::<User>("users").await?;
//! let report = migrator.run_migrations().await;
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod migrator;
pub mod persist;

pub use config::MigratorConfig;
pub use error::{Error, Result};
pub use executor::{Applied, Executor};
pub use migrator::{MigrationReport, Migrator, Outcome};

#[cfg(test)]
mod mock;
