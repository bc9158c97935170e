//! Tag repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row, Transaction};

use scribe_core::{Error, Result, Tag, TagRepository};

/// PostgreSQL implementation of TagRepository.
#[derive(Clone)]
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Transaction-aware variants for writes that span multiple entities.
impl PgTagRepository {
    /// Insert one tag row per value within an existing transaction.
    pub async fn insert_many_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        note_id: i64,
        values: &[String],
    ) -> Result<Vec<Tag>> {
        let mut tags = Vec::with_capacity(values.len());
        for value in values {
            let row = sqlx::query("INSERT INTO tag (note_id, value) VALUES ($1, $2) RETURNING id")
                .bind(note_id)
                .bind(value)
                .fetch_one(&mut **tx)
                .await
                .map_err(Error::Database)?;
            tags.push(Tag {
                id: row.get("id"),
                note_id,
                value: value.clone(),
            });
        }
        Ok(tags)
    }

    /// Bulk-delete tags by id within an existing transaction.
    pub async fn delete_by_ids_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ids: &[i64],
    ) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query("DELETE FROM tag WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn insert_many(&self, note_id: i64, values: &[String]) -> Result<Vec<Tag>> {
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let tags = self.insert_many_tx(&mut tx, note_id, values).await?;
        tx.commit().await.map_err(Error::Database)?;

        Ok(tags)
    }

    async fn list_for_note(&self, note_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, note_id, value FROM tag WHERE note_id = $1 ORDER BY id")
            .bind(note_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Tag {
                id: r.get("id"),
                note_id: r.get("note_id"),
                value: r.get("value"),
            })
            .collect())
    }

    async fn list_for_notes(&self, note_ids: &[i64]) -> Result<Vec<Tag>> {
        if note_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows =
            sqlx::query("SELECT id, note_id, value FROM tag WHERE note_id = ANY($1) ORDER BY id")
                .bind(note_ids)
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Tag {
                id: r.get("id"),
                note_id: r.get("note_id"),
                value: r.get("value"),
            })
            .collect())
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query("DELETE FROM tag WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
