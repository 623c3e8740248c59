use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tax_data::TaxBracketLoader;
use tax_db_sqlite::SqliteRepository;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Load income-year bracket tables from a CSV file into the database.
///
/// The CSV file should have the following columns:
/// - income_year: e.g. 2024-2025
/// - min_income: lower bound of the bracket
/// - max_income: upper bound (empty for the top bracket)
/// - rate: marginal rate as a fraction (e.g. 0.325)
/// - description: label shown in breakdowns
///
/// Each income year in the file replaces that year's stored table.
#[derive(Parser, Debug)]
#[command(name = "tax-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing tax bracket data
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database: a file path, `:memory:` or a `sqlite:` URL
    #[arg(short, long, default_value = "tax.db")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let written = run(&args).await?;

    println!("{written} tax brackets loaded from {}", args.file.display());
    Ok(())
}

async fn run(args: &Args) -> Result<usize> {
    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        info!(database = %args.database, "migrations applied");
    }

    if let Some(seeds_dir) = &args.seeds {
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        info!(dir = %seeds_dir.display(), "seeds applied");
    }

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;
    let rows = TaxBracketLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
    info!(file = %args.file.display(), rows = rows.len(), "parsed bracket file");

    TaxBracketLoader::load(&repo, &rows)
        .await
        .context("Failed to load tax brackets into database")
}
