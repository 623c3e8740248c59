//! Typed column readers for `tax_brackets` rows.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};
use tax_core::{IncomeYear, RepositoryError, UpperBound};

/// Get a decimal value from a row. TEXT is parsed exactly; INTEGER and REAL
/// are accepted for rows written by other tools.
pub fn get_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{}': {}", column, e))
            })?;
            Decimal::from_str(val.trim()).map_err(|e| {
                RepositoryError::Database(format!(
                    "Column '{}' holds '{}', not a decimal: {}",
                    column, val, e
                ))
            })
        }
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to get INTEGER from '{}': {}",
                    column, e
                ))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Upper bound column; the storage sentinel (or anything above it) reads
/// back as [`UpperBound::Unbounded`].
pub fn get_upper_bound(row: &SqliteRow, column: &str) -> Result<UpperBound, RepositoryError> {
    get_decimal(row, column).map(UpperBound::from_sentinel)
}

pub fn get_income_year(row: &SqliteRow, column: &str) -> Result<IncomeYear, RepositoryError> {
    let raw: String = row
        .try_get(column)
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    IncomeYear::parse(&raw).map_err(|e| RepositoryError::Database(e.to_string()))
}

/// Timestamps are written as `YYYY-MM-DD HH:MM:SS` (SQLite's
/// `CURRENT_TIMESTAMP`), always UTC. RFC 3339 is accepted too.
pub fn get_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, RepositoryError> {
    let raw: String = row
        .try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", column, e)))?;
    parse_timestamp(&raw)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid timestamp in '{}': {}", column, raw)))
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE test_values (
                id INTEGER PRIMARY KEY,
                text_value TEXT,
                int_value INTEGER,
                real_value REAL,
                blob_value BLOB
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    async fn fetch(pool: &SqlitePool, insert: &str, select: &str) -> SqliteRow {
        sqlx::query(insert)
            .execute(pool)
            .await
            .expect("Failed to insert test data");
        sqlx::query(select)
            .fetch_one(pool)
            .await
            .expect("Failed to fetch row")
    }

    // =========================================================================
    // get_decimal
    // =========================================================================

    #[tokio::test]
    async fn get_decimal_from_text_is_exact() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id, text_value) VALUES (1, '0.325')",
            "SELECT text_value FROM test_values WHERE id = 1",
        )
        .await;

        assert_eq!(get_decimal(&row, "text_value"), Ok(dec!(0.325)));
    }

    #[tokio::test]
    async fn get_decimal_from_integer() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id, int_value) VALUES (1, 18200)",
            "SELECT int_value FROM test_values WHERE id = 1",
        )
        .await;

        assert_eq!(get_decimal(&row, "int_value"), Ok(dec!(18200)));
    }

    #[tokio::test]
    async fn get_decimal_from_real() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id, real_value) VALUES (1, 0.19)",
            "SELECT real_value FROM test_values WHERE id = 1",
        )
        .await;

        assert_eq!(get_decimal(&row, "real_value"), Ok(dec!(0.19)));
    }

    #[tokio::test]
    async fn get_decimal_rejects_non_numeric_text() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id, text_value) VALUES (1, 'lots')",
            "SELECT text_value FROM test_values WHERE id = 1",
        )
        .await;

        assert!(matches!(
            get_decimal(&row, "text_value"),
            Err(RepositoryError::Database(msg)) if msg.contains("lots")
        ));
    }

    #[tokio::test]
    async fn get_decimal_rejects_null() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id) VALUES (1)",
            "SELECT text_value FROM test_values WHERE id = 1",
        )
        .await;

        assert!(matches!(
            get_decimal(&row, "text_value"),
            Err(RepositoryError::Database(msg)) if msg.contains("NULL")
        ));
    }

    #[tokio::test]
    async fn get_decimal_column_not_found() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id) VALUES (1)",
            "SELECT id FROM test_values WHERE id = 1",
        )
        .await;

        assert!(matches!(
            get_decimal(&row, "nonexistent_column"),
            Err(RepositoryError::Database(msg)) if msg.contains("nonexistent_column")
        ));
    }

    // =========================================================================
    // get_upper_bound / get_income_year
    // =========================================================================

    #[tokio::test]
    async fn sentinel_reads_as_unbounded() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id, text_value, int_value) VALUES (1, '999999999.99', 45000)",
            "SELECT text_value, int_value FROM test_values WHERE id = 1",
        )
        .await;

        assert_eq!(get_upper_bound(&row, "text_value"), Ok(UpperBound::Unbounded));
        assert_eq!(
            get_upper_bound(&row, "int_value"),
            Ok(UpperBound::Bounded(dec!(45000)))
        );
    }

    #[tokio::test]
    async fn malformed_income_year_is_a_database_error() {
        let pool = setup_test_db().await;
        let row = fetch(
            &pool,
            "INSERT INTO test_values (id, text_value) VALUES (1, '2020/21')",
            "SELECT text_value FROM test_values WHERE id = 1",
        )
        .await;

        assert!(matches!(
            get_income_year(&row, "text_value"),
            Err(RepositoryError::Database(_))
        ));
    }

    // =========================================================================
    // timestamps
    // =========================================================================

    #[test]
    fn parses_sqlite_and_rfc3339_timestamps() {
        let expected = Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap();

        assert_eq!(parse_timestamp("2024-07-01 09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-07-01T09:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-07-01T19:30:00+10:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn format_timestamp_round_trips() {
        let at = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();

        assert_eq!(format_timestamp(at), "2025-01-31 23:59:59");
        assert_eq!(parse_timestamp(&format_timestamp(at)), Some(at));
    }
}
