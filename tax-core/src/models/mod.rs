mod assessment;
mod calculation_result;
mod income_year;
mod tax_bracket;
mod upper_bound;

pub use assessment::TaxAssessment;
pub use calculation_result::{BracketContribution, CalculationResult};
pub use income_year::{IncomeYear, ParseIncomeYearError};
pub use tax_bracket::{TaxBracket, TaxBracketRecord};
pub use upper_bound::{UNBOUNDED_SENTINEL, UpperBound};
