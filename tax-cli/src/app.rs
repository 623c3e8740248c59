use anyhow::{Context, Result};
use tax_core::db::{DbConfig, RepositoryRegistry};
use tax_core::TaxRateRepository;
use tax_db_sqlite::SqliteRepositoryFactory;
use tracing::debug;

/// Registry with every storage backend this build supports.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(config: &DbConfig) -> Result<Box<dyn TaxRateRepository>> {
    debug!(backend = %config.backend, db = %config.connection_string, "opening repository");
    build_registry().create(config).await.with_context(|| {
        format!(
            "Failed to open {} database '{}'",
            config.backend, config.connection_string
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_offers_sqlite() {
        assert_eq!(build_registry().available_backends(), vec!["sqlite"]);
    }

    #[tokio::test]
    async fn unknown_backend_error_has_context() {
        let config = DbConfig {
            backend: "mysql".to_string(),
            connection_string: "tax".to_string(),
        };

        let err = open_repository(&config).await.err().unwrap();

        assert_eq!(err.to_string(), "Failed to open mysql database 'tax'");
        assert!(format!("{err:#}").contains("unknown backend 'mysql'"));
    }

    #[tokio::test]
    async fn opens_seeded_memory_database() {
        let repo = open_repository(&DbConfig::default()).await.unwrap();

        assert!(!repo.list_income_years().await.unwrap().is_empty());
    }
}
