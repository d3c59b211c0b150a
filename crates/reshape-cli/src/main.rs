//! `reshape` — reconcile configured collections against their schemas.
//!
//! Reads `reshape.toml` (or the path given with `--config`), opens the SQLite
//! document store and runs one migration pass, or prints the flattened layout
//! of a configured schema.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use reshape_core::walk::walk_schema;
use reshape_migrator::{Migrator, Outcome};
use reshape_store_sqlite::SqliteStore;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Reshape schema migrator")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "reshape.toml")]
  config: PathBuf,

  /// Database path, overriding the configured one.
  #[arg(short, long)]
  database: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Register every configured schema and run one migration pass.
  Run,
  /// Print the flattened field layout of a configured schema.
  Walk {
    /// Collection whose schema to walk.
    collection: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let mut settings = Settings::load(&cli.config)?;
  if let Some(database) = cli.database {
    settings.database = database;
  }

  match cli.command {
    Command::Run => run(settings).await,
    Command::Walk { collection } => walk(&settings, &collection),
  }
}

async fn run(settings: Settings) -> anyhow::Result<()> {
  let store = SqliteStore::open(&settings.database)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.database))?;

  let mut migrator = Migrator::new(Arc::new(store), settings.migrator).await;
  for entry in settings.schemas {
    if let Err(e) = migrator
      .register_schema(&entry.collection, entry.schema)
      .await
    {
      tracing::error!("Could not register collection '{}': {e}", entry.collection);
    }
  }

  let report = migrator.run_migrations().await;
  for (collection, outcome) in &report.outcomes {
    let summary = match outcome {
      Outcome::Seeded { fields } => format!("seeded ({fields} fields)"),
      Outcome::Unchanged => "up to date".to_owned(),
      Outcome::Applied { changes, skipped } => {
        format!("{changes} change(s), {skipped} skipped")
      }
      Outcome::Failed(e) => format!("failed: {e}"),
      Outcome::Unfinished => "unfinished".to_owned(),
    };
    println!("{collection}: {summary}");
  }
  if report.timed_out {
    anyhow::bail!("migrations timed out");
  }
  Ok(())
}

fn walk(settings: &Settings, collection: &str) -> anyhow::Result<()> {
  let schema = settings
    .schema(collection)
    .with_context(|| format!("no schema configured for collection '{collection}'"))?;

  let walked = walk_schema(schema);
  for (path, kind) in walked.fields.iter() {
    println!("{path}\t{kind}");
  }
  for skipped in &walked.skipped {
    tracing::info!(
      "Skipped field '{}' of '{}' ({:?})",
      skipped.field,
      skipped.record,
      skipped.reason
    );
  }
  Ok(())
}
