//! Well-formedness checks for a bracket table.
//!
//! The engine trusts its input. These checks run where tables enter the
//! system: the store's replace operation and the CSV loader.
//!
//! Gaps between consecutive brackets are accepted: published tables usually
//! start each bracket one dollar above the previous bracket's top
//! (`18,200` then `18,201`).

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{TaxBracket, UNBOUNDED_SENTINEL};

/// A bracket table that cannot be used for calculation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BracketError {
    #[error("no tax brackets provided")]
    Empty,

    #[error("bracket {index} ('{description}') has rate {rate} outside 0..=1")]
    RateOutOfRange {
        index: usize,
        description: String,
        rate: Decimal,
    },

    #[error("bracket {index} ('{description}') has negative lower bound {lower}")]
    NegativeLowerBound {
        index: usize,
        description: String,
        lower: Decimal,
    },

    #[error("bracket {index} ('{description}') has upper bound {upper} below lower bound {lower}")]
    InvertedBounds {
        index: usize,
        description: String,
        lower: Decimal,
        upper: Decimal,
    },

    #[error(
        "bracket {index} ('{description}') has upper bound {upper}, which storage reads back as unbounded"
    )]
    UpperBoundTooLarge {
        index: usize,
        description: String,
        upper: Decimal,
    },

    #[error(
        "bracket {index} ('{description}') starts at {lower}, below the previous bracket's upper bound {previous_upper}"
    )]
    Overlapping {
        index: usize,
        description: String,
        lower: Decimal,
        previous_upper: Decimal,
    },

    #[error("bracket {index} ('{description}') is unbounded but is not the last bracket")]
    UnboundedBeforeLast { index: usize, description: String },

    #[error("last bracket ('{description}') must be unbounded to cover all higher incomes")]
    BoundedLast { description: String },
}

/// Checks that `brackets` is non-empty, sorted, non-overlapping and ends in
/// an unbounded bracket, with every rate in `0..=1`.
///
/// A finite upper bound must stay below [`UNBOUNDED_SENTINEL`].
///
/// Returns the first problem found, scanning in table order.
pub fn validate_brackets(brackets: &[TaxBracket]) -> Result<(), BracketError> {
    let last_index = brackets.len().checked_sub(1).ok_or(BracketError::Empty)?;
    let mut previous_upper: Option<Decimal> = None;

    for (index, bracket) in brackets.iter().enumerate() {
        let description = || bracket.description.clone();

        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(BracketError::RateOutOfRange {
                index,
                description: description(),
                rate: bracket.rate,
            });
        }

        if bracket.lower_bound < Decimal::ZERO {
            return Err(BracketError::NegativeLowerBound {
                index,
                description: description(),
                lower: bracket.lower_bound,
            });
        }

        if let Some(previous_upper) = previous_upper {
            if bracket.lower_bound < previous_upper {
                return Err(BracketError::Overlapping {
                    index,
                    description: description(),
                    lower: bracket.lower_bound,
                    previous_upper,
                });
            }
        }

        match bracket.upper_bound.value() {
            Some(upper) if upper < bracket.lower_bound => {
                return Err(BracketError::InvertedBounds {
                    index,
                    description: description(),
                    lower: bracket.lower_bound,
                    upper,
                });
            }
            Some(upper) if upper >= UNBOUNDED_SENTINEL => {
                return Err(BracketError::UpperBoundTooLarge {
                    index,
                    description: description(),
                    upper,
                });
            }
            Some(_) if index == last_index => {
                return Err(BracketError::BoundedLast {
                    description: description(),
                });
            }
            Some(upper) => previous_upper = Some(upper),
            None if index != last_index => {
                return Err(BracketError::UnboundedBeforeLast {
                    index,
                    description: description(),
                });
            }
            None => {}
        }
    }

    Ok(())
}
