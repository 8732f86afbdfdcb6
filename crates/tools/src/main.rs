//! Operator commands that run against the database directly.
//!
//! ```text
//! realms-tools migrate                 apply schema migrations
//! realms-tools seed-codex <dir>        import every <kind>.csv in <dir>
//! realms-tools lean-migrate [--dry-run] [--batch-size N]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use realms_core::codex::{parse_codex_csv, CodexKind};
use realms_db::lean_migration::{run_lean_migration, DEFAULT_BATCH_SIZE};
use realms_db::models::codex::UpsertCodexEntry;
use realms_db::repositories::CodexRepo;
use realms_db::DbPool;

#[derive(Debug, Parser)]
#[command(name = "realms-tools", version, about = "Realms maintenance commands")]
struct Cli {
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,

    /// Load codex CSV exports (`feats.csv`, `skills.csv`, ...) from a
    /// directory. Files with other names are skipped.
    SeedCodex {
        dir: PathBuf,
    },

    /// Rewrite stored character documents into the lean format.
    LeanMigrate {
        /// Report what would change without writing.
        #[arg(long)]
        dry_run: bool,

        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "realms_tools=info,realms_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let pool = realms_db::create_pool(&cli.database_url)
        .await
        .context("connecting to the database")?;

    match cli.command {
        Command::Migrate => {
            realms_db::run_migrations(&pool)
                .await
                .context("running migrations")?;
            tracing::info!("Migrations applied");
        }
        Command::SeedCodex { dir } => seed_codex(&pool, &dir).await?,
        Command::LeanMigrate {
            dry_run,
            batch_size,
        } => lean_migrate(&pool, dry_run, batch_size).await?,
    }

    pool.close().await;
    Ok(())
}

async fn seed_codex(pool: &DbPool, dir: &Path) -> anyhow::Result<()> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut total = 0;
    for path in files {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Ok(kind) = CodexKind::from_file_name(file_name) else {
            tracing::warn!(file = %path.display(), "Skipping file that is not a codex export");
            continue;
        };

        let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        let records = parse_codex_csv(kind, &bytes)?;
        let entries: Vec<UpsertCodexEntry> = records.into_iter().map(Into::into).collect();
        let imported = CodexRepo::bulk_upsert(pool, kind, &entries)
            .await
            .with_context(|| format!("importing {}", path.display()))?;

        tracing::info!(kind = kind.as_str(), imported, "Codex table seeded");
        total += imported;
    }

    if total == 0 {
        bail!("no codex rows found in {}", dir.display());
    }
    println!("Imported {total} codex rows");
    Ok(())
}

async fn lean_migrate(pool: &DbPool, dry_run: bool, batch_size: i64) -> anyhow::Result<()> {
    let summary = run_lean_migration(pool, dry_run, batch_size)
        .await
        .context("running the lean migration")?;

    for failure in &summary.failures {
        eprintln!("character {}: {}", failure.character_id, failure.error);
    }

    let mode = if dry_run { " (dry run)" } else { "" };
    println!(
        "Lean migration{mode}: scanned {}, migrated {}, unchanged {}, failed {}",
        summary.scanned,
        summary.migrated,
        summary.unchanged,
        summary.failed()
    );
    Ok(())
}
