//! Repository traits for the durable store.
//!
//! These traits define the store contract the services orchestrate against,
//! enabling pluggable backends and testability. The store is responsible
//! for referential integrity: deleting a notebook cascades to its notes,
//! deleting a note cascades to its tags.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Note, Notebook, Tag};

/// Fields accepted when inserting a note row.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub notebook_id: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Repository for notebook rows.
#[async_trait]
pub trait NotebookRepository: Send + Sync {
    /// Insert a new notebook and return the persisted row.
    async fn insert(&self, name: &str) -> Result<Notebook>;

    /// Fetch a notebook by id.
    async fn find(&self, id: i64) -> Result<Option<Notebook>>;

    /// Fetch the notebooks whose ids exist; missing ids are omitted.
    async fn find_many(&self, ids: &[i64]) -> Result<Vec<Notebook>>;

    /// Fetch every notebook.
    async fn list_all(&self) -> Result<Vec<Notebook>>;

    /// Check if a notebook exists.
    async fn exists(&self, id: i64) -> Result<bool>;

    /// Delete a notebook. The store cascades to its notes and their tags.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Repository for note rows.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note and return the persisted row.
    async fn insert(&self, new: NewNote) -> Result<Note>;

    /// Fetch a note by id.
    async fn find(&self, id: i64) -> Result<Option<Note>>;

    /// Fetch every note owned by a notebook.
    async fn list_for_notebook(&self, notebook_id: i64) -> Result<Vec<Note>>;

    /// Replace title and body and stamp `last_modified`.
    async fn update_content(
        &self,
        id: i64,
        title: &str,
        body: &str,
        last_modified: DateTime<Utc>,
    ) -> Result<()>;

    /// Stamp `last_modified` without touching content.
    async fn touch(&self, id: i64, last_modified: DateTime<Utc>) -> Result<()>;

    /// Check if a note exists.
    async fn exists(&self, id: i64) -> Result<bool>;

    /// Delete a note. The store cascades to its tags.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Repository for tag rows.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Insert one tag row per value for the note, in a single transaction.
    /// Values are not deduplicated.
    async fn insert_many(&self, note_id: i64, values: &[String]) -> Result<Vec<Tag>>;

    /// Fetch every tag owned by a note.
    async fn list_for_note(&self, note_id: i64) -> Result<Vec<Tag>>;

    /// Fetch every tag owned by any of the given notes.
    async fn list_for_notes(&self, note_ids: &[i64]) -> Result<Vec<Tag>>;

    /// Bulk-delete tags by id.
    async fn delete_by_ids(&self, ids: &[i64]) -> Result<()>;
}
