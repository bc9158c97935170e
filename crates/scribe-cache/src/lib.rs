//! # scribe-cache
//!
//! In-memory view cache for notebooks and notes.
//!
//! Two independent bounded caches, one per entity kind, each holding the
//! last materialized view keyed by id. Entries are evicted by a maximum
//! entry count under a frequency-weighted approximate-LRU policy and by a
//! fixed TTL after write; either bound may drop an entry at any time, so
//! callers treat the cache as advisory and always have a store fallback.
//!
//! The one cross-cache operation is [`ViewCache::invalidate_notebook_cascade`]:
//! a notebook view embeds note views, so evicting the notebook also evicts
//! every note entry the cached view lists.
//!
//! Cache operations never fail a request. A miss is a signal, not an
//! error; the only failure mode is an invalid configuration at startup.

use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use scribe_core::{CacheConfig, NotebookView, NoteView, Result};

/// Two-tier view cache. Cloning is cheap and shares the underlying maps.
#[derive(Clone)]
pub struct ViewCache {
    notebooks: Cache<i64, NotebookView>,
    notes: Cache<i64, NoteView>,
}

impl ViewCache {
    /// Build both caches from the given configuration.
    ///
    /// Fails fast on invalid settings; no partial cache is usable after an
    /// error.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let notebooks = Cache::builder()
            .max_capacity(config.notebook_max_entries)
            .time_to_live(Duration::from_secs(config.notebook_ttl_minutes * 60))
            .build();
        let notes = Cache::builder()
            .max_capacity(config.note_max_entries)
            .time_to_live(Duration::from_secs(config.note_ttl_minutes * 60))
            .build();
        Ok(Self { notebooks, notes })
    }

    /// Look up a notebook view. `None` means absent, never an error.
    pub async fn notebook(&self, id: i64) -> Option<NotebookView> {
        let hit = self.notebooks.get(&id).await;
        debug!(
            subsystem = "cache",
            notebook_id = id,
            cache_hit = hit.is_some(),
            "notebook cache lookup"
        );
        hit
    }

    /// Look up a note view. `None` means absent, never an error.
    pub async fn note(&self, id: i64) -> Option<NoteView> {
        let hit = self.notes.get(&id).await;
        debug!(
            subsystem = "cache",
            note_id = id,
            cache_hit = hit.is_some(),
            "note cache lookup"
        );
        hit
    }

    /// Unconditional upsert of a notebook view.
    pub async fn put_notebook(&self, view: NotebookView) {
        self.notebooks.insert(view.id, view).await;
    }

    /// Unconditional upsert of a note view.
    pub async fn put_note(&self, view: NoteView) {
        self.notes.insert(view.id, view).await;
    }

    /// Drop the notebook entry if present. Idempotent.
    pub async fn invalidate_notebook(&self, id: i64) {
        self.notebooks.invalidate(&id).await;
    }

    /// Drop the note entry if present. Idempotent.
    pub async fn invalidate_note(&self, id: i64) {
        self.notes.invalidate(&id).await;
    }

    /// Cascading invalidation of a notebook and the notes its cached view
    /// embeds.
    ///
    /// The note list must be read before the notebook entry is dropped;
    /// afterwards there is nothing left to cascade from. A notebook that is
    /// not cached is a no-op.
    pub async fn invalidate_notebook_cascade(&self, id: i64) {
        if let Some(view) = self.notebooks.get(&id).await {
            for note in &view.notes {
                self.notes.invalidate(&note.id).await;
            }
            self.notebooks.invalidate(&id).await;
            debug!(
                subsystem = "cache",
                notebook_id = id,
                result_count = view.notes.len(),
                "cascade-invalidated notebook"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scribe_core::{CacheConfig, Error};

    fn cache() -> ViewCache {
        ViewCache::new(&CacheConfig::default()).unwrap()
    }

    fn note_view(id: i64, notebook_id: i64) -> NoteView {
        let now = Utc::now();
        NoteView {
            id,
            notebook_id,
            title: format!("note {id}"),
            body: "body".to_string(),
            tags: vec!["x".to_string()],
            created_at: now,
            last_modified: now,
        }
    }

    fn notebook_view(id: i64, notes: Vec<NoteView>) -> NotebookView {
        NotebookView {
            id,
            name: format!("notebook {id}"),
            notes,
        }
    }

    #[tokio::test]
    async fn test_put_then_get_returns_the_written_view() {
        let cache = cache();
        let view = note_view(1, 10);

        cache.put_note(view.clone()).await;

        assert_eq!(cache.note(1).await, Some(view));
    }

    #[tokio::test]
    async fn test_miss_returns_none() {
        let cache = cache();
        assert!(cache.note(404).await.is_none());
        assert!(cache.notebook(404).await.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_prior_entry() {
        let cache = cache();
        cache.put_note(note_view(1, 10)).await;

        let mut replacement = note_view(1, 10);
        replacement.body = "rewritten".to_string();
        cache.put_note(replacement.clone()).await;

        assert_eq!(cache.note(1).await, Some(replacement));
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let cache = cache();
        cache.put_note(note_view(1, 10)).await;

        cache.invalidate_note(1).await;
        assert!(cache.note(1).await.is_none());

        // a second invalidation of the same id is a no-op
        cache.invalidate_note(1).await;
        assert!(cache.note(1).await.is_none());
    }

    #[tokio::test]
    async fn test_cascade_evicts_embedded_notes() {
        let cache = cache();
        let notes = vec![note_view(1, 10), note_view(2, 10)];
        for note in &notes {
            cache.put_note(note.clone()).await;
        }
        cache.put_notebook(notebook_view(10, notes)).await;

        cache.invalidate_notebook_cascade(10).await;

        assert!(cache.notebook(10).await.is_none());
        assert!(cache.note(1).await.is_none());
        assert!(cache.note(2).await.is_none());
    }

    #[tokio::test]
    async fn test_cascade_on_uncached_notebook_leaves_notes_alone() {
        let cache = cache();
        cache.put_note(note_view(1, 10)).await;

        cache.invalidate_notebook_cascade(10).await;

        // with no notebook entry there is no note list to cascade from
        assert!(cache.note(1).await.is_some());
    }

    #[tokio::test]
    async fn test_cascade_tolerates_notes_missing_from_note_cache() {
        let cache = cache();
        let notes = vec![note_view(1, 10), note_view(2, 10)];
        cache.put_note(notes[0].clone()).await;
        cache.put_notebook(notebook_view(10, notes)).await;

        cache.invalidate_notebook_cascade(10).await;

        assert!(cache.notebook(10).await.is_none());
        assert!(cache.note(1).await.is_none());
        assert!(cache.note(2).await.is_none());
    }

    #[tokio::test]
    async fn test_caches_are_independent() {
        let cache = cache();
        cache.put_note(note_view(1, 10)).await;
        cache.put_notebook(notebook_view(10, Vec::new())).await;

        cache.invalidate_note(1).await;

        assert!(cache.notebook(10).await.is_some());
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let config = CacheConfig {
            notebook_ttl_minutes: 0,
            ..CacheConfig::default()
        };
        match ViewCache::new(&config) {
            Err(Error::Config(_)) => {}
            Err(other) => panic!("expected a configuration error, got {other}"),
            Ok(_) => panic!("expected construction to fail"),
        }
    }
}
