use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use tax_core::db::repository::{RepositoryError, TaxRateRepository};
use tax_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteRepository;

/// Resolve the seeds directory at runtime so it works in both development and
/// packaged distribution.
///
/// Resolution order:
/// 1. **`TAX_DB_SQLITE_SEEDS_DIR`** if set.
/// 2. **`./seeds`** if the directory exists in the current working directory.
/// 3. **`$CARGO_MANIFEST_DIR/seeds`** as last resort (build tree).
pub fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TAX_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`tax_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use tax_core::db::RepositoryRegistry;
/// use tax_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`
    /// (`:memory:`, a bare file path or a `sqlite:` URL) and bring its schema
    /// up to date.
    ///
    /// Seed files (see [`seeds_dir`]) are applied only while the store holds
    /// no brackets, so years removed later are not silently restored.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn TaxRateRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        if repo.is_empty().await? {
            let dir = seeds_dir();
            info!(seeds = %dir.display(), "seeding empty database");
            repo.run_seeds(&dir)
                .await
                .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        }

        Ok(Box::new(repo))
    }
}
