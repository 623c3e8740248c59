//! Bulk loading of bracket tables from CSV.

pub mod loader;

pub use loader::{BracketRow, TaxBracketLoader, TaxBracketLoaderError};
