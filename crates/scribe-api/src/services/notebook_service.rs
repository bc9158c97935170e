//! Notebook operations.
//!
//! Reads go cache-first with a store fallback; writes go to the store
//! first and update the cache only after the store has committed.

use tracing::info;

use scribe_cache::ViewCache;
use scribe_core::{Error, NotebookRepository, NotebookView, Result};
use scribe_db::Database;

use super::load_notebook_graph;

/// Orchestrates notebook reads/writes against the store and the view cache.
#[derive(Clone)]
pub struct NotebookService {
    db: Database,
    cache: ViewCache,
}

impl NotebookService {
    pub fn new(db: Database, cache: ViewCache) -> Self {
        Self { db, cache }
    }

    /// Create an empty notebook and prime the cache with its view.
    pub async fn create(&self, name: &str) -> Result<NotebookView> {
        let notebook = self.db.notebooks.insert(name).await?;
        let view = NotebookView {
            id: notebook.id,
            name: notebook.name,
            notes: Vec::new(),
        };
        self.cache.put_notebook(view.clone()).await;
        info!(notebook_id = view.id, "created notebook");
        Ok(view)
    }

    /// Fetch a notebook view, cache-first.
    pub async fn get(&self, id: i64) -> Result<NotebookView> {
        if let Some(view) = self.cache.notebook(id).await {
            return Ok(view);
        }
        let view = self.load_view(id).await?;
        self.cache.put_notebook(view.clone()).await;
        Ok(view)
    }

    /// Fetch the notebooks whose ids exist, silently omitting the rest.
    /// Store-backed: a bulk read does not go through the cache.
    pub async fn get_many(&self, ids: &[i64]) -> Result<Vec<NotebookView>> {
        let notebooks = self.db.notebooks.find_many(ids).await?;
        let mut views = Vec::with_capacity(notebooks.len());
        for notebook in notebooks {
            let id = notebook.id;
            let graph = load_notebook_graph(&self.db, notebook).await?;
            if let Some(view) = graph.notebook_view(id) {
                views.push(view);
            }
        }
        Ok(views)
    }

    /// Fetch a notebook view filtered to the notes carrying `tag`.
    ///
    /// The full view resolves cache-or-store as in [`Self::get`]; the
    /// filtered result is a new value and the cached full view stays
    /// untouched.
    pub async fn get_by_tag(&self, notebook_id: i64, tag: &str) -> Result<NotebookView> {
        let view = self.get(notebook_id).await?;
        Ok(view.with_tag(tag))
    }

    /// Delete a notebook; the store cascades to its notes and their tags.
    ///
    /// The cache cascade runs first, while the cached view still lists the
    /// notes whose entries have to go.
    pub async fn delete(&self, id: i64) -> Result<i64> {
        if !self.db.notebooks.exists(id).await? {
            return Err(Error::NotebookNotFound(id));
        }
        self.cache.invalidate_notebook_cascade(id).await;
        self.db.notebooks.delete(id).await?;
        info!(notebook_id = id, "deleted notebook");
        Ok(id)
    }

    /// Fetch every notebook with its notes. Store-backed, uncached.
    pub async fn list_all(&self) -> Result<Vec<NotebookView>> {
        let notebooks = self.db.notebooks.list_all().await?;
        let mut views = Vec::with_capacity(notebooks.len());
        for notebook in notebooks {
            let id = notebook.id;
            let graph = load_notebook_graph(&self.db, notebook).await?;
            if let Some(view) = graph.notebook_view(id) {
                views.push(view);
            }
        }
        Ok(views)
    }

    async fn load_view(&self, id: i64) -> Result<NotebookView> {
        let notebook = self
            .db
            .notebooks
            .find(id)
            .await?
            .ok_or(Error::NotebookNotFound(id))?;
        let graph = load_notebook_graph(&self.db, notebook).await?;
        graph
            .notebook_view(id)
            .ok_or_else(|| Error::Internal(format!("notebook {id} vanished while materializing")))
    }
}
