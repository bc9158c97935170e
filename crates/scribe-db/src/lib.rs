//! # scribe-db
//!
//! PostgreSQL database layer for scribe.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for notebooks, notes, and tags
//! - Schema migrations (behind the `migrations` feature)
//!
//! Referential integrity lives in the schema: deleting a notebook cascades
//! to its notes, deleting a note cascades to its tags.
//!
//! ## Example
//!
//! ```rust,ignore
//! use scribe_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/scribe").await?;
//!     let notebook = db.notebooks.insert("Lab").await?;
//!     println!("Created notebook: {}", notebook.id);
//!     Ok(())
//! }
//! ```

pub mod notebooks;
pub mod notes;
pub mod pool;
pub mod tags;

// Re-export core types
pub use scribe_core::*;

// Re-export repository implementations
pub use notebooks::PgNotebookRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use tags::PgTagRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Notebook repository.
    pub notebooks: PgNotebookRepository,
    /// Note repository.
    pub notes: PgNoteRepository,
    /// Tag repository.
    pub tags: PgTagRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notebooks: PgNotebookRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
