//! Note repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row, Transaction};

use scribe_core::{Error, NewNote, Note, NoteRepository, Result};

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row_to_note(row: PgRow) -> Note {
    Note {
        id: row.get("id"),
        notebook_id: row.get("notebook_id"),
        title: row.get("title"),
        body: row.get("body"),
        created_at: row.get("created_at"),
        last_modified: row.get("last_modified"),
    }
}

/// Transaction-aware variants for writes that span multiple entities.
impl PgNoteRepository {
    /// Insert a note within an existing transaction.
    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        new: NewNote,
    ) -> Result<Note> {
        let row = sqlx::query(
            "INSERT INTO note (notebook_id, title, body, created_at, last_modified)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(new.notebook_id)
        .bind(&new.title)
        .bind(&new.body)
        .bind(new.created_at)
        .bind(new.last_modified)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(Note {
            id: row.get("id"),
            notebook_id: new.notebook_id,
            title: new.title,
            body: new.body,
            created_at: new.created_at,
            last_modified: new.last_modified,
        })
    }

    /// Replace title and body within an existing transaction.
    pub async fn update_content_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        title: &str,
        body: &str,
        last_modified: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE note SET title = $1, body = $2, last_modified = $3 WHERE id = $4")
            .bind(title)
            .bind(body)
            .bind(last_modified)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Stamp `last_modified` within an existing transaction.
    pub async fn touch_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        last_modified: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE note SET last_modified = $1 WHERE id = $2")
            .bind(last_modified)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, new: NewNote) -> Result<Note> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let note = self.insert_tx(&mut tx, new).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(note)
    }

    async fn find(&self, id: i64) -> Result<Option<Note>> {
        let row = sqlx::query(
            "SELECT id, notebook_id, title, body, created_at, last_modified
             FROM note
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_row_to_note))
    }

    async fn list_for_notebook(&self, notebook_id: i64) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            "SELECT id, notebook_id, title, body, created_at, last_modified
             FROM note
             WHERE notebook_id = $1
             ORDER BY id",
        )
        .bind(notebook_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_row_to_note).collect())
    }

    async fn update_content(
        &self,
        id: i64,
        title: &str,
        body: &str,
        last_modified: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE note SET title = $1, body = $2, last_modified = $3 WHERE id = $4")
            .bind(title)
            .bind(body)
            .bind(last_modified)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn touch(&self, id: i64, last_modified: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE note SET last_modified = $1 WHERE id = $2")
            .bind(last_modified)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM note WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(exists)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        // tag rows go with it via ON DELETE CASCADE
        sqlx::query("DELETE FROM note WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
