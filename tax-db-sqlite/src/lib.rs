//! SQLite storage for income-year bracket tables.

pub mod columns;
pub mod factory;
pub mod repository;

pub use factory::{SqliteRepositoryFactory, seeds_dir};
pub use repository::SqliteRepository;
