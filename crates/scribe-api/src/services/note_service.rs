//! Note operations, including the tag channel.
//!
//! Every mutation refreshes both the note view and the owning notebook
//! view after the store write commits: the notebook's cached view embeds
//! note views, and the two caches may not disagree past a single write.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};

use scribe_cache::ViewCache;
use scribe_core::{
    CreateNoteRequest, EntityGraph, Error, NewNote, NotebookRepository, NoteRepository, NoteView,
    Result, UpdateNoteRequest,
};
use scribe_db::Database;

use super::load_notebook_graph;

/// Orchestrates note reads/writes against the store and the view cache.
#[derive(Clone)]
pub struct NoteService {
    db: Database,
    cache: ViewCache,
}

impl NoteService {
    pub fn new(db: Database, cache: ViewCache) -> Self {
        Self { db, cache }
    }

    /// Create a note with its initial tag set inside an existing notebook.
    pub async fn create(&self, req: CreateNoteRequest) -> Result<NoteView> {
        let CreateNoteRequest {
            notebook_id,
            title,
            body,
            tags,
        } = req;
        let notebook = self
            .db
            .notebooks
            .find(notebook_id)
            .await?
            .ok_or(Error::NotebookNotFound(notebook_id))?;

        let now = Utc::now();
        let mut tx = self.db.pool.begin().await.map_err(Error::Database)?;
        let note = self
            .db
            .notes
            .insert_tx(
                &mut tx,
                NewNote {
                    notebook_id: notebook.id,
                    title,
                    body,
                    created_at: now,
                    last_modified: now,
                },
            )
            .await?;
        let note_id = note.id;
        self.db.tags.insert_many_tx(&mut tx, note_id, &tags).await?;
        tx.commit().await.map_err(Error::Database)?;

        let graph = load_notebook_graph(&self.db, notebook).await?;
        info!(
            note_id,
            notebook_id,
            tag_count = tags.len(),
            "created note"
        );
        self.refresh_caches(&graph, note_id).await
    }

    /// Fetch a note view, cache-first.
    ///
    /// A store load refreshes the owning notebook's entry as well: the
    /// notebook view embeds this note's view, so both are rebuilt from the
    /// same subgraph.
    pub async fn get(&self, id: i64) -> Result<NoteView> {
        if let Some(view) = self.cache.note(id).await {
            return Ok(view);
        }
        let note = self
            .db
            .notes
            .find(id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        let notebook = self
            .db
            .notebooks
            .find(note.notebook_id)
            .await?
            .ok_or(Error::NotebookNotFound(note.notebook_id))?;
        let graph = load_notebook_graph(&self.db, notebook).await?;
        self.refresh_caches(&graph, id).await
    }

    /// Full replace of title, body, and tags.
    ///
    /// The tag set is not diffed: every existing tag row is dropped and the
    /// request's values recreated, duplicates and all.
    pub async fn update(&self, id: i64, req: UpdateNoteRequest) -> Result<NoteView> {
        let note = self
            .db
            .notes
            .find(id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        let notebook = self
            .db
            .notebooks
            .find(note.notebook_id)
            .await?
            .ok_or(Error::NotebookNotFound(note.notebook_id))?;
        let mut graph = load_notebook_graph(&self.db, notebook).await?;

        let dropped = graph.take_tags(id)?;
        let now = Utc::now();
        let mut tx = self.db.pool.begin().await.map_err(Error::Database)?;
        self.db.tags.delete_by_ids_tx(&mut tx, &dropped).await?;
        let created = self.db.tags.insert_many_tx(&mut tx, id, &req.tags).await?;
        self.db
            .notes
            .update_content_tx(&mut tx, id, &req.title, &req.body, now)
            .await?;
        tx.commit().await.map_err(Error::Database)?;

        // the cache sees the new state only once the store has committed
        for tag in created {
            graph.insert_tag(tag)?;
        }
        graph.set_note_content(id, &req.title, &req.body, now)?;

        self.refresh_caches(&graph, id).await
    }

    /// Partial update described as a field-name → value map.
    ///
    /// The allow-list check runs before anything is persisted, so a
    /// rejected request leaves both the store and the caches untouched.
    /// The `tags` key is reserved for the tag operations.
    pub async fn update_partial(
        &self,
        id: i64,
        fields: &HashMap<String, String>,
    ) -> Result<NoteView> {
        let note = self
            .db
            .notes
            .find(id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        let notebook = self
            .db
            .notebooks
            .find(note.notebook_id)
            .await?
            .ok_or(Error::NotebookNotFound(note.notebook_id))?;
        let mut graph = load_notebook_graph(&self.db, notebook).await?;

        graph.update_note_fields(id, fields)?;
        let now = Utc::now();
        graph.touch_note(id, now)?;

        let (title, body) = {
            let node = graph
                .note(id)
                .ok_or_else(|| Error::Internal(format!("note {id} vanished while materializing")))?;
            (node.title.clone(), node.body.clone())
        };
        self.db.notes.update_content(id, &title, &body, now).await?;

        self.refresh_caches(&graph, id).await
    }

    /// Delete a note; the store cascades to its tags.
    ///
    /// The owning notebook's cache cascade runs first, while the cached
    /// view still lists this note. The in-memory detach precedes the
    /// physical delete so the repopulated notebook view cannot retain the
    /// row that is about to disappear.
    pub async fn delete(&self, id: i64) -> Result<i64> {
        let note = self
            .db
            .notes
            .find(id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        let notebook_id = note.notebook_id;
        self.cache.invalidate_notebook_cascade(notebook_id).await;

        let notebook = self
            .db
            .notebooks
            .find(notebook_id)
            .await?
            .ok_or(Error::NotebookNotFound(notebook_id))?;
        let mut graph = load_notebook_graph(&self.db, notebook).await?;
        graph.detach_note(id)?;
        self.db.notes.delete(id).await?;

        if let Some(view) = graph.notebook_view(notebook_id) {
            self.cache.put_notebook(view).await;
        }
        info!(note_id = id, notebook_id, "deleted note");
        Ok(id)
    }

    /// Add one tag per value to the note. Values are not deduplicated
    /// against the existing set.
    pub async fn add_tags(&self, id: i64, values: &[String]) -> Result<NoteView> {
        let note = self
            .db
            .notes
            .find(id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        let notebook = self
            .db
            .notebooks
            .find(note.notebook_id)
            .await?
            .ok_or(Error::NotebookNotFound(note.notebook_id))?;
        let mut graph = load_notebook_graph(&self.db, notebook).await?;

        let now = Utc::now();
        let mut tx = self.db.pool.begin().await.map_err(Error::Database)?;
        let created = self.db.tags.insert_many_tx(&mut tx, id, values).await?;
        self.db.notes.touch_tx(&mut tx, id, now).await?;
        tx.commit().await.map_err(Error::Database)?;

        for tag in created {
            graph.insert_tag(tag)?;
        }
        graph.touch_note(id, now)?;

        debug!(note_id = id, tag_count = values.len(), "added tags");
        self.refresh_caches(&graph, id).await
    }

    /// Remove exactly the note's tags whose value appears in `values`.
    /// Values not present on the note are silently ignored.
    pub async fn delete_tags(&self, id: i64, values: &[String]) -> Result<NoteView> {
        let note = self
            .db
            .notes
            .find(id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        let notebook = self
            .db
            .notebooks
            .find(note.notebook_id)
            .await?
            .ok_or(Error::NotebookNotFound(note.notebook_id))?;
        let mut graph = load_notebook_graph(&self.db, notebook).await?;

        let removed = graph.detach_tags_by_value(id, values)?;
        let now = Utc::now();
        let mut tx = self.db.pool.begin().await.map_err(Error::Database)?;
        self.db.tags.delete_by_ids_tx(&mut tx, &removed).await?;
        self.db.notes.touch_tx(&mut tx, id, now).await?;
        tx.commit().await.map_err(Error::Database)?;
        graph.touch_note(id, now)?;

        debug!(note_id = id, tag_count = removed.len(), "removed tags");
        self.refresh_caches(&graph, id).await
    }

    /// Rebuild both views from the subgraph and upsert them into the cache.
    async fn refresh_caches(&self, graph: &EntityGraph, note_id: i64) -> Result<NoteView> {
        let note_view = graph
            .note_view(note_id)
            .ok_or_else(|| Error::Internal(format!("note {note_id} vanished while materializing")))?;
        let notebook_view = graph.notebook_view(note_view.notebook_id).ok_or_else(|| {
            Error::Internal(format!(
                "notebook {} vanished while materializing",
                note_view.notebook_id
            ))
        })?;
        self.cache.put_note(note_view.clone()).await;
        self.cache.put_notebook(notebook_view).await;
        Ok(note_view)
    }
}
