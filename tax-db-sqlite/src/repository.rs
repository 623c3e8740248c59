use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use tax_core::{
    IncomeYear, RepositoryError, TaxBracket, TaxBracketRecord, TaxRateRepository,
    validate_brackets,
};
use tracing::{debug, info};

use crate::columns::{
    format_timestamp, get_decimal, get_income_year, get_timestamp, get_upper_bound,
};

const RECORD_COLUMNS: &str = "id, income_year, bracket_order, min_income, max_income, \
                              tax_rate, description, created_at, updated_at";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect to `connection`, which may be `:memory:`, a `sqlite:` URL or a
    /// bare file path. Files are created when missing.
    pub async fn new(connection: &str) -> Result<Self> {
        if connection == ":memory:" {
            return Self::in_memory().await;
        }

        let options = if connection.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(connection)
                .with_context(|| format!("Invalid SQLite URL: {}", connection))?
        } else {
            SqliteConnectOptions::new().filename(connection)
        }
        .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", connection))?;
        Ok(Self { pool })
    }

    /// A private in-memory database. Each SQLite connection would see its own
    /// empty database, so the pool holds exactly one that never expires.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory SQLite URL")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(&self, seeds_dir: &Path) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    /// `true` when no bracket rows exist yet.
    pub async fn is_empty(&self) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tax_brackets")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(count == 0)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_record(
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
    ) -> Result<TaxBracketRecord, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM tax_brackets WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_record(&row)
    }
}

fn row_to_bracket(row: &SqliteRow) -> Result<TaxBracket, RepositoryError> {
    Ok(TaxBracket {
        lower_bound: get_decimal(row, "min_income")?,
        upper_bound: get_upper_bound(row, "max_income")?,
        rate: get_decimal(row, "tax_rate")?,
        description: row
            .try_get("description")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
    })
}

fn row_to_record(row: &SqliteRow) -> Result<TaxBracketRecord, RepositoryError> {
    Ok(TaxBracketRecord {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        income_year: get_income_year(row, "income_year")?,
        bracket_order: row
            .try_get("bracket_order")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        bracket: row_to_bracket(row)?,
        created_at: get_timestamp(row, "created_at")?,
        updated_at: get_timestamp(row, "updated_at")?,
    })
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

#[async_trait]
impl TaxRateRepository for SqliteRepository {
    async fn get_tax_brackets(
        &self,
        year: &IncomeYear,
    ) -> Result<Vec<TaxBracket>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT min_income, max_income, tax_rate, description
             FROM tax_brackets
             WHERE income_year = ?
             ORDER BY bracket_order",
        )
        .bind(year.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        if rows.is_empty() {
            return Err(RepositoryError::NotFound);
        }

        rows.iter().map(row_to_bracket).collect()
    }

    async fn list_income_years(&self) -> Result<Vec<IncomeYear>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT DISTINCT income_year FROM tax_brackets ORDER BY income_year",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|row| get_income_year(row, "income_year"))
            .collect()
    }

    async fn is_year_supported(&self, year: &IncomeYear) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM tax_brackets WHERE income_year = ?)",
        )
        .bind(year.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn list_bracket_records(
        &self,
        year: Option<&IncomeYear>,
    ) -> Result<Vec<TaxBracketRecord>, RepositoryError> {
        let rows = match year {
            Some(year) => {
                sqlx::query(&format!(
                    "SELECT {RECORD_COLUMNS} FROM tax_brackets
                     WHERE income_year = ? ORDER BY bracket_order"
                ))
                .bind(year.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {RECORD_COLUMNS} FROM tax_brackets
                     ORDER BY income_year, bracket_order"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_err)?;

        rows.iter().map(row_to_record).collect()
    }

    async fn replace_tax_year(
        &self,
        year: &IncomeYear,
        brackets: &[TaxBracket],
    ) -> Result<usize, RepositoryError> {
        validate_brackets(brackets)?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let removed = sqlx::query("DELETE FROM tax_brackets WHERE income_year = ?")
            .bind(year.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?
            .rows_affected();

        for (index, bracket) in brackets.iter().enumerate() {
            sqlx::query(
                "INSERT INTO tax_brackets
                    (income_year, bracket_order, min_income, max_income, tax_rate, description)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(year.as_str())
            .bind(index as i64 + 1)
            .bind(bracket.lower_bound.to_string())
            .bind(bracket.upper_bound.to_sentinel().to_string())
            .bind(bracket.rate.to_string())
            .bind(&bracket.description)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        info!(%year, removed, inserted = brackets.len(), "replaced tax year");
        Ok(brackets.len())
    }

    async fn delete_tax_year(&self, year: &IncomeYear) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM tax_brackets WHERE income_year = ?")
            .bind(year.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        let removed = result.rows_affected();
        info!(%year, removed, "deleted tax year");
        Ok(removed > 0)
    }

    async fn update_tax_bracket(
        &self,
        id: i64,
        bracket: &TaxBracket,
    ) -> Result<TaxBracketRecord, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let existing = Self::fetch_record(&mut tx, id).await?;

        // The year's table must stay well-formed with the new bracket in place.
        let rows = sqlx::query(
            "SELECT id, min_income, max_income, tax_rate, description
             FROM tax_brackets WHERE income_year = ? ORDER BY bracket_order",
        )
        .bind(existing.income_year.as_str())
        .fetch_all(&mut *tx)
        .await
        .map_err(db_err)?;

        let mut table = Vec::with_capacity(rows.len());
        for row in &rows {
            let row_id: i64 = row.try_get("id").map_err(db_err)?;
            if row_id == id {
                table.push(bracket.clone());
            } else {
                table.push(row_to_bracket(row)?);
            }
        }
        validate_brackets(&table)?;

        sqlx::query(
            "UPDATE tax_brackets SET
                min_income = ?, max_income = ?, tax_rate = ?, description = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(bracket.lower_bound.to_string())
        .bind(bracket.upper_bound.to_sentinel().to_string())
        .bind(bracket.rate.to_string())
        .bind(&bracket.description)
        .bind(format_timestamp(Utc::now()))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let updated = Self::fetch_record(&mut tx, id).await?;
        tx.commit().await.map_err(db_err)?;

        info!(id, year = %updated.income_year, "updated tax bracket");
        Ok(updated)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(())
    }
}
