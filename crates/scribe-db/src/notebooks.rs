//! Notebook repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use scribe_core::{Error, Notebook, NotebookRepository, Result};

/// PostgreSQL implementation of NotebookRepository.
#[derive(Clone)]
pub struct PgNotebookRepository {
    pool: Pool<Postgres>,
}

impl PgNotebookRepository {
    /// Create a new PgNotebookRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotebookRepository for PgNotebookRepository {
    async fn insert(&self, name: &str) -> Result<Notebook> {
        let row = sqlx::query("INSERT INTO notebook (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(Notebook {
            id: row.get("id"),
            name: name.to_string(),
        })
    }

    async fn find(&self, id: i64) -> Result<Option<Notebook>> {
        let row = sqlx::query("SELECT id, name FROM notebook WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| Notebook {
            id: r.get("id"),
            name: r.get("name"),
        }))
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<Notebook>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query("SELECT id, name FROM notebook WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Notebook {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Notebook>> {
        let rows = sqlx::query("SELECT id, name FROM notebook ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Notebook {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM notebook WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(exists)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        // note and tag rows go with it via ON DELETE CASCADE
        sqlx::query("DELETE FROM notebook WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
