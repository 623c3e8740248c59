pub mod calculations;
pub mod db;
pub mod models;
pub mod service;

pub use calculations::{BracketError, ProgressiveTax, validate_brackets};
pub use db::{DbConfig, RepositoryError, RepositoryFactory, RepositoryRegistry, TaxRateRepository};
pub use models::*;
pub use service::{CalculatorError, TaxCalculator};
