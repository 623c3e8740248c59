use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use tax_cli::config::{AppConfig, Overrides};
use tax_cli::input::{parse_decimal, parse_income};
use tax_cli::interactive::Session;
use tax_cli::{app, commands, logging};
use tax_core::{IncomeYear, TaxBracket, UpperBound};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Progressive income tax calculator.
///
/// Looks up the bracket table for an income year and works out the tax owed,
/// optionally with a per-bracket breakdown. Runs an interactive session when
/// no subcommand is given.
#[derive(Debug, Parser)]
#[command(name = "tax-calculator", version, about)]
struct Cli {
    /// Config file (default: $TAX_CALCULATOR_CONFIG, then ./tax-calculator.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database backend to use.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `tax.db`), `:memory:` or a `sqlite:` URL.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Log level or filter directive (overridden by RUST_LOG).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prompt for the income year and income (the default).
    Interactive,

    /// Calculate tax for one income.
    Calculate {
        /// Income year, e.g. 2020-2021.
        #[arg(long, value_parser = IncomeYear::parse)]
        year: IncomeYear,

        /// Taxable income; commas allowed.
        #[arg(long, value_parser = parse_income, allow_negative_numbers = true)]
        income: Decimal,

        /// Show the per-bracket breakdown.
        #[arg(long)]
        breakdown: bool,

        /// Print the full assessment as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the income years with stored rates.
    Years,

    /// Show stored tax brackets.
    Brackets {
        /// Only this income year.
        #[arg(long, value_parser = IncomeYear::parse)]
        year: Option<IncomeYear>,
    },

    /// Replace one stored bracket, keeping its year and position.
    UpdateBracket {
        /// Bracket id, as shown by `brackets`.
        #[arg(long)]
        id: i64,

        /// Lower bound; income above this is taxed at `rate`.
        #[arg(long, value_parser = parse_decimal, allow_negative_numbers = true)]
        min: Decimal,

        /// Upper bound. Omit for the open top bracket.
        #[arg(long, value_parser = parse_decimal)]
        max: Option<Decimal>,

        /// Marginal rate as a fraction, e.g. 0.19.
        #[arg(long, value_parser = parse_decimal)]
        rate: Decimal,

        #[arg(long)]
        description: String,
    },

    /// Remove every bracket for an income year.
    DeleteYear {
        #[arg(long, value_parser = IncomeYear::parse)]
        year: IncomeYear,
    },

    /// Check that the database is reachable.
    Health {
        #[arg(long)]
        json: bool,
    },
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging("warn");

    let cli = Cli::parse();

    let (mut config, config_path) =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply(Overrides {
        backend: cli.backend,
        connection_string: cli.db,
        log_level: cli.log_level,
        log_file: cli.log_file,
    });

    if !logging::env_filter_active() {
        if let Err(error) = logging::set_log_level(&config.logging.level) {
            warn!(%error, "keeping default log level");
        }
    }
    if let Some(path) = &config.logging.file {
        logging::enable_file_logging(path)?;
    }
    debug!(config = ?config_path, "configuration loaded");

    let db_config = config.db_config();
    let repo = app::open_repository(&db_config).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => {
            let stdin = io::stdin();
            let mut session = Session::new(repo.as_ref(), stdin.lock(), &mut out);
            session.run().await?;
        }
        Command::Calculate {
            year,
            income,
            breakdown,
            json,
        } => commands::calculate(repo.as_ref(), &mut out, &year, income, breakdown, json).await?,
        Command::Years => commands::years(repo.as_ref(), &mut out).await?,
        Command::Brackets { year } => {
            commands::brackets(repo.as_ref(), &mut out, year.as_ref()).await?
        }
        Command::UpdateBracket {
            id,
            min,
            max,
            rate,
            description,
        } => {
            let bracket = TaxBracket::new(min, UpperBound::from(max), rate, description);
            commands::update_bracket(repo.as_ref(), &mut out, id, &bracket).await?
        }
        Command::DeleteYear { year } => {
            commands::delete_year(repo.as_ref(), &mut out, &year).await?
        }
        Command::Health { json } => commands::health(repo.as_ref(), &mut out, json).await?,
    }

    out.flush()?;
    Ok(())
}
