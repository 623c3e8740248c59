//! Progressive income tax calculation.
//!
//! [`progressive`] walks an ordered bracket table to produce the tax owed and
//! its per-bracket breakdown. [`validation`] checks that a table is
//! well-formed before it is stored; the engine itself trusts its input.

pub mod common;
pub mod progressive;
pub mod validation;

pub use progressive::{ProgressiveTax, compute_breakdown, compute_tax};
pub use validation::{BracketError, validate_brackets};
