//! Question-and-answer session on any line-based input and output.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use tax_core::{IncomeYear, TaxCalculator, TaxRateRepository};
use tracing::{debug, error};

use crate::commands::write_breakdown;
use crate::format::format_currency;
use crate::input::{is_affirmative, parse_income};

pub const YEAR_PROMPT: &str = "Please enter the income year (eg: 2020-2021): ";
pub const INCOME_PROMPT: &str = "Please enter your total taxable income for the full income year: ";
pub const BREAKDOWN_PROMPT: &str = "\nWould you like to see a detailed tax breakdown? (y/n): ";

pub struct Session<'r, R, W> {
    repo: &'r dyn TaxRateRepository,
    input: R,
    output: W,
}

impl<'r, R: BufRead, W: Write> Session<'r, R, W> {
    pub fn new(repo: &'r dyn TaxRateRepository, input: R, output: W) -> Self {
        Self {
            repo,
            input,
            output,
        }
    }

    /// Hands back the output, e.g. a buffer to inspect.
    pub fn into_output(self) -> W {
        self.output
    }

    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.output, "Australian Tax Calculator\n")?;

        writeln!(self.output, "Connecting to database...")?;
        if let Err(err) = self.repo.ping().await {
            error!(%err, "database ping failed");
            writeln!(self.output, "Failed to connect to database.")?;
            return Err(err).context("Database is not reachable");
        }
        writeln!(self.output, "Database connected successfully!\n")?;

        let calculator = TaxCalculator::new(self.repo);

        let year = self.ask_year()?;
        if !calculator.is_year_supported(&year).await? {
            writeln!(self.output, "Sorry, tax rates for {year} are not available.")?;
            let supported = calculator.supported_years().await?;
            let list: Vec<String> = supported.iter().map(ToString::to_string).collect();
            writeln!(self.output, "Supported years: {}", list.join(", "))?;
            return Ok(());
        }

        let income = self.ask_income()?;
        let result = calculator.tax_breakdown(&year, income).await?;
        debug!(%year, %income, tax = %result.total_tax, "interactive calculation");

        writeln!(
            self.output,
            "\nThe estimated tax on your taxable income is: {}",
            format_currency(result.total_tax)
        )?;

        let answer = self.ask(BREAKDOWN_PROMPT)?;
        if is_affirmative(&answer) {
            write_breakdown(&mut self.output, income, &result)?;
            writeln!(self.output)?;
        }

        Ok(())
    }

    fn ask_year(&mut self) -> Result<IncomeYear> {
        loop {
            let answer = self.ask(YEAR_PROMPT)?;
            match IncomeYear::parse(&answer) {
                Ok(year) => return Ok(year),
                Err(_) => writeln!(
                    self.output,
                    "Please enter a valid income year in format YYYY-YYYY"
                )?,
            }
        }
    }

    fn ask_income(&mut self) -> Result<Decimal> {
        loop {
            let answer = self.ask(INCOME_PROMPT)?;
            match parse_income(&answer) {
                Ok(income) => return Ok(income),
                Err(err) => {
                    debug!(%err, "rejected income entry");
                    writeln!(
                        self.output,
                        "Please enter a valid income amount (numbers only)"
                    )?
                }
            }
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("input ended before an answer was given");
        }
        Ok(line.trim().to_string())
    }
}
