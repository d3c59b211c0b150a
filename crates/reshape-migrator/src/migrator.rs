//! [`Migrator`] — schema registration and the concurrent reconciliation pass.

use std::sync::Arc;

use reshape_core::{
  catalog::Catalog,
  diff::diff,
  document::{Filter, Sort},
  layout::LayoutSnapshot,
  schema::{Record, RecordSchema, TypeDescription},
  store::{DocumentStore, LAYOUT_COLLECTION, MIGRATION_LOG_COLLECTION},
  walk::{SkipReason, SkippedField, Walked, walk_schema},
};
use tokio::task::JoinSet;

use crate::{Error, Executor, MigratorConfig, Result, persist};

// ─── Report ──────────────────────────────────────────────────────────────────

/// What one reconciliation task did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  /// No layout existed; one was recorded from the schema and nothing else
  /// was done.
  Seeded { fields: usize },
  /// The stored layout already matched the schema.
  Unchanged,
  Applied {
    /// Field-level changes that succeeded.
    changes: usize,
    /// Fields that were skipped or failed.
    skipped: usize,
  },
  /// The task was abandoned.
  Failed(String),
  /// The task had not reported back when the wait ended (timeout or panic).
  Unfinished,
}

/// The result of one [`Migrator::run_migrations`] pass.
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
  /// One outcome per registered collection, in registration order.
  pub outcomes:  Vec<(String, Outcome)>,
  /// The overall timeout elapsed before every task finished.
  pub timed_out: bool,
}

impl MigrationReport {
  pub fn outcome(&self, collection: &str) -> Option<&Outcome> {
    self
      .outcomes
      .iter()
      .find(|(c, _)| c == collection)
      .map(|(_, o)| o)
  }
}

// ─── Migrator ────────────────────────────────────────────────────────────────

struct Registration {
  collection: String,
  schema:     Arc<RecordSchema>,
}

/// Keeps registered collections' stored layouts in line with their schemas.
pub struct Migrator<S> {
  store:         Arc<S>,
  catalog:       Arc<Catalog>,
  config:        MigratorConfig,
  registrations: Vec<Registration>,
}

impl<S> Migrator<S>
where
  S: DocumentStore + 'static,
{
  /// Create a migrator and make sure the system collections exist.
  ///
  /// Failing to create them is logged, not fatal: later reads and writes
  /// against them report their own errors per collection.
  pub async fn new(store: Arc<S>, config: MigratorConfig) -> Self {
    let catalog = Arc::new(config.catalog());
    let migrator = Self {
      store,
      catalog,
      config,
      registrations: Vec::new(),
    };

    let mut system = vec![LAYOUT_COLLECTION];
    if migrator.config.save_migration_log {
      system.push(MIGRATION_LOG_COLLECTION);
    }
    match migrator.store.list_collection_names().await {
      Ok(existing) => {
        for name in system {
          if existing.iter().any(|c| c == name) {
            continue;
          }
          if let Err(e) = migrator.store.create_collection(name).await {
            tracing::warn!("Error creating '{name}' collection: {e}");
          }
        }
      }
      Err(e) => tracing::warn!("Error listing collections: {e}"),
    }

    migrator
  }

  pub fn config(&self) -> &MigratorConfig { &self.config }

  /// Registered collection names, in registration order.
  pub fn collections(&self) -> impl Iterator<Item = &str> + '_ {
    self.registrations.iter().map(|r| r.collection.as_str())
  }

  /// Register a record type declared in code.
  pub async fn register<T: Record>(&mut self, collection: &str) -> Result<()> {
    self.register_schema(collection, T::schema()).await
  }

  /// Register `description` as the schema of `collection`.
  ///
  /// The description must be a record. A missing collection is created when
  /// `create_collections` is on and rejected otherwise. On first sight the
  /// walked layout is recorded directly, with nothing to diff against.
  /// Registering a collection again replaces its schema.
  pub async fn register_schema(
    &mut self,
    collection: &str,
    description: impl Into<TypeDescription>,
  ) -> Result<()> {
    let schema = description.into().into_record(collection)?;

    let existing = self
      .store
      .list_collection_names()
      .await
      .map_err(Error::store)?;
    if !existing.iter().any(|c| c == collection) {
      if !self.config.create_collections {
        return Err(Error::CollectionMissing(collection.to_owned()));
      }
      self
        .store
        .create_collection(collection)
        .await
        .map_err(Error::store)?;
      tracing::info!("Created collection '{collection}'");
    }

    if persist::load_layout(&*self.store, collection).await?.is_none() {
      seed(&*self.store, collection, walk_logged(collection, &schema)).await?;
    }

    let schema = Arc::new(schema);
    match self
      .registrations
      .iter_mut()
      .find(|r| r.collection == collection)
    {
      Some(r) => r.schema = schema,
      None => self.registrations.push(Registration {
        collection: collection.to_owned(),
        schema,
      }),
    }
    Ok(())
  }

  /// Reconcile every registered collection concurrently.
  ///
  /// Returns once every task has finished or the configured timeout has
  /// elapsed. Tasks still running at the timeout are detached, not aborted:
  /// their in-flight store operations run to completion in the background.
  pub async fn run_migrations(&self) -> MigrationReport {
    let mut tasks = JoinSet::new();
    for r in &self.registrations {
      let store      = Arc::clone(&self.store);
      let catalog    = Arc::clone(&self.catalog);
      let schema     = Arc::clone(&r.schema);
      let collection = r.collection.clone();
      let save_log   = self.config.save_migration_log;

      tasks.spawn(async move {
        let outcome =
          reconcile(&*store, &catalog, &collection, &schema, save_log).await;
        (collection, outcome)
      });
    }

    let mut finished: Vec<(String, Outcome)> = Vec::new();
    let wait = async {
      while let Some(joined) = tasks.join_next().await {
        match joined {
          Ok((collection, Ok(outcome))) => finished.push((collection, outcome)),
          Ok((collection, Err(e))) => {
            tracing::warn!("Migration of collection '{collection}' failed: {e}");
            finished.push((collection, Outcome::Failed(e.to_string())));
          }
          Err(e) => tracing::warn!("Migration task did not complete: {e}"),
        }
      }
    };

    let timed_out = tokio::time::timeout(self.config.timeout(), wait)
      .await
      .is_err();
    if timed_out {
      tracing::warn!(
        "Migrations did not finish within {:?}; {} task(s) left running",
        self.config.timeout(),
        tasks.len()
      );
      tasks.detach_all();
    }

    let outcomes = self
      .registrations
      .iter()
      .map(|r| {
        let outcome = finished
          .iter()
          .find(|(c, _)| *c == r.collection)
          .map(|(_, o)| o.clone())
          .unwrap_or(Outcome::Unfinished);
        (r.collection.clone(), outcome)
      })
      .collect();

    MigrationReport { outcomes, timed_out }
  }
}

// ─── Task body ───────────────────────────────────────────────────────────────

/// Walk → diff → apply for one collection.
async fn reconcile<S: DocumentStore>(
  store: &S,
  catalog: &Catalog,
  collection: &str,
  schema: &RecordSchema,
  save_log: bool,
) -> Result<Outcome> {
  let walked = walk_logged(collection, schema);

  let Some(snapshot) = persist::load_layout(store, collection).await? else {
    return seed(store, collection, walked).await;
  };

  let newest = store
    .find_one(collection, &Filter::all(), Some(Sort::Descending))
    .await
    .map_err(Error::store)?;
  if newest.is_none() {
    tracing::debug!("Collection '{collection}' has no documents yet");
  }

  let current = walked.fields.descriptors();
  let plan = diff(&snapshot.fields, &current);
  if plan.is_empty() {
    tracing::debug!("Collection '{collection}' is up to date");
    return Ok(Outcome::Unchanged);
  }

  let applied = Executor::new(store, catalog, collection, save_log)
    .apply(&plan, snapshot.fields, &current)
    .await?;

  Ok(Outcome::Applied {
    changes: applied.entries.len(),
    skipped: applied.skipped.len(),
  })
}

/// Record the first layout of a collection.
async fn seed<S: DocumentStore>(
  store: &S,
  collection: &str,
  walked: Walked,
) -> Result<Outcome> {
  let fields = walked.fields.len();
  persist::insert_layout(store, &LayoutSnapshot::new(collection, walked.fields)).await?;
  tracing::info!("Recorded initial layout of collection '{collection}' ({fields} fields)");
  Ok(Outcome::Seeded { fields })
}

fn walk_logged(collection: &str, schema: &RecordSchema) -> Walked {
  let walked = walk_schema(schema);
  for SkippedField { record, field, reason } in &walked.skipped {
    match reason {
      SkipReason::MissingTag => tracing::warn!(
        "Field '{field}' of schema '{record}' (collection '{collection}') has no path tag; skipped"
      ),
      SkipReason::Excluded => tracing::debug!(
        "Field '{field}' of schema '{record}' (collection '{collection}') is excluded"
      ),
    }
  }
  walked
}
