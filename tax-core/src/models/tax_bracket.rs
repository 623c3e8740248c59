use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{IncomeYear, UpperBound};

/// A contiguous income range taxed at a single flat rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower_bound: Decimal,
    pub upper_bound: UpperBound,
    /// Marginal rate as a fraction (e.g. `0.325` for 32.5%).
    pub rate: Decimal,
    pub description: String,
}

impl TaxBracket {
    pub fn new(
        lower_bound: Decimal,
        upper_bound: UpperBound,
        rate: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
            description: description.into(),
        }
    }
}

/// A bracket as stored, with its position in the year's table and audit
/// timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracketRecord {
    pub id: i64,
    pub income_year: IncomeYear,
    /// 1-based position within the year; ascending income order.
    pub bracket_order: i32,
    pub bracket: TaxBracket,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
