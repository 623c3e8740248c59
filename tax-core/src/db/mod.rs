pub mod factory;
pub mod repository;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use repository::{RepositoryError, TaxRateRepository};

#[cfg(test)]
pub(crate) mod testing;
