//! Non-interactive subcommands. Each writes its report to `out`.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};
use tax_core::{
    CalculationResult, IncomeYear, RepositoryError, TaxAssessment, TaxBracket, TaxBracketRecord,
    TaxCalculator, TaxRateRepository,
};
use tracing::{info, warn};

use crate::format::{breakdown_line, format_currency, format_rate, format_upper_bound};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The banner-delimited per-bracket listing shared with the interactive
/// session.
pub fn write_breakdown(
    out: &mut impl Write,
    income: Decimal,
    result: &CalculationResult,
) -> Result<()> {
    writeln!(out, "\n--- Tax Breakdown ---")?;
    writeln!(out, "Income: {}", format_currency(income))?;
    writeln!(out)?;
    for contribution in &result.breakdown {
        writeln!(out, "{}", breakdown_line(contribution))?;
    }
    writeln!(out)?;
    writeln!(out, "Total Tax: {}", format_currency(result.total_tax))?;
    writeln!(
        out,
        "After Tax Income: {}",
        format_currency(income - result.total_tax)
    )?;
    writeln!(out, "--- End Breakdown ---")?;
    Ok(())
}

pub fn write_assessment(
    out: &mut impl Write,
    assessment: &TaxAssessment,
    breakdown: bool,
) -> Result<()> {
    writeln!(
        out,
        "The estimated tax on your taxable income is: {}",
        format_currency(assessment.tax)
    )?;
    if breakdown {
        let result = CalculationResult {
            total_tax: assessment.tax,
            breakdown: assessment.breakdown.clone(),
        };
        write_breakdown(out, assessment.income, &result)?;
    }
    Ok(())
}

pub async fn calculate(
    repo: &dyn TaxRateRepository,
    out: &mut impl Write,
    year: &IncomeYear,
    income: Decimal,
    breakdown: bool,
    json: bool,
) -> Result<()> {
    let assessment = TaxCalculator::new(repo).assess(year, income).await?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&assessment)?)?;
    } else {
        write_assessment(out, &assessment, breakdown)?;
    }
    Ok(())
}

pub async fn years(repo: &dyn TaxRateRepository, out: &mut impl Write) -> Result<()> {
    let years = TaxCalculator::new(repo).supported_years().await?;

    if years.is_empty() {
        writeln!(out, "No income years are available.")?;
        return Ok(());
    }
    for year in years {
        writeln!(out, "{year}")?;
    }
    Ok(())
}

#[derive(Debug, Clone, Tabled)]
struct BracketRow {
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "#")]
    order: i32,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Id")]
    id: i64,
}

pub async fn brackets(
    repo: &dyn TaxRateRepository,
    out: &mut impl Write,
    year: Option<&IncomeYear>,
) -> Result<()> {
    let records = repo
        .list_bracket_records(year)
        .await
        .context("Failed to list tax brackets")?;

    if records.is_empty() {
        match year {
            Some(year) => writeln!(out, "No tax brackets found for {year}")?,
            None => writeln!(out, "No tax brackets found")?,
        }
        return Ok(());
    }

    writeln!(out, "{}", bracket_table(&records))?;
    Ok(())
}

impl From<&TaxBracketRecord> for BracketRow {
    fn from(record: &TaxBracketRecord) -> Self {
        Self {
            year: record.income_year.to_string(),
            order: record.bracket_order,
            from: format_currency(record.bracket.lower_bound),
            to: format_upper_bound(&record.bracket.upper_bound),
            rate: format_rate(record.bracket.rate),
            description: record.bracket.description.clone(),
            id: record.id,
        }
    }
}

fn bracket_table(records: &[TaxBracketRecord]) -> String {
    Table::new(records.iter().map(BracketRow::from))
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..5)).with(Alignment::right()))
        .to_string()
}

/// Replaces the bracket stored under `id` and prints the stored result.
///
/// The rest of that year's table is checked against the new bracket, so an
/// edit that would overlap a neighbour is refused.
pub async fn update_bracket(
    repo: &dyn TaxRateRepository,
    out: &mut impl Write,
    id: i64,
    bracket: &TaxBracket,
) -> Result<()> {
    let record = match repo.update_tax_bracket(id, bracket).await {
        Ok(record) => record,
        Err(RepositoryError::NotFound) => anyhow::bail!("No tax bracket with id {id}."),
        Err(RepositoryError::InvalidBrackets(error)) => {
            anyhow::bail!("Update to tax bracket {id} rejected: {error}")
        }
        Err(error) => return Err(error).context("Failed to update tax bracket"),
    };
    info!(id, year = %record.income_year, "tax bracket updated");

    writeln!(out, "Updated tax bracket {id} for {}.", record.income_year)?;
    writeln!(out, "{}", bracket_table(std::slice::from_ref(&record)))?;
    Ok(())
}

pub async fn delete_year(
    repo: &dyn TaxRateRepository,
    out: &mut impl Write,
    year: &IncomeYear,
) -> Result<()> {
    if repo.delete_tax_year(year).await? {
        writeln!(out, "Deleted tax brackets for {year}.")?;
    } else {
        writeln!(out, "No tax brackets stored for {year}.")?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

impl HealthReport {
    pub async fn check(repo: &dyn TaxRateRepository) -> Self {
        let connected = match repo.ping().await {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "health check failed");
                false
            }
        };

        Self {
            status: if connected { "ok" } else { "error" },
            database: if connected { "connected" } else { "disconnected" },
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            version: VERSION,
        }
    }
}

pub async fn health(repo: &dyn TaxRateRepository, out: &mut impl Write, json: bool) -> Result<()> {
    let report = HealthReport::check(repo).await;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writeln!(out, "status:    {}", report.status)?;
        writeln!(out, "database:  {}", report.database)?;
        writeln!(out, "timestamp: {}", report.timestamp)?;
        writeln!(out, "version:   {}", report.version)?;
    }

    if report.status != "ok" {
        anyhow::bail!("database is not reachable");
    }
    Ok(())
}
