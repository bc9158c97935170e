//! Core data models for scribe.
//!
//! Row types mirror the store schema one-to-one. View types are flattened
//! snapshots of an entity and its immediate children, used for cache
//! storage and API responses; they carry plain id fields instead of live
//! references and are never mutated in place once built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ROW TYPES
// =============================================================================

/// A notebook row: a named collection of notes.
#[derive(Debug, Clone, PartialEq)]
pub struct Notebook {
    pub id: i64,
    pub name: String,
}

/// A note row. `notebook_id` is the owning side of the relation.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: i64,
    pub notebook_id: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// A tag row. Tags are not deduplicated by value: a note may carry two
/// tags with identical text.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub note_id: i64,
    pub value: String,
}

// =============================================================================
// VIEW TYPES
// =============================================================================

/// Flattened snapshot of a note with its tag values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NoteView {
    pub id: i64,
    pub notebook_id: i64,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Flattened snapshot of a notebook with the views of every note it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NotebookView {
    pub id: i64,
    pub name: String,
    pub notes: Vec<NoteView>,
}

impl NotebookView {
    /// Derive a view holding only the notes whose tag set contains `tag`
    /// (exact string match). Returns a new value; `self` is untouched.
    pub fn with_tag(&self, tag: &str) -> NotebookView {
        NotebookView {
            id: self.id,
            name: self.name.clone(),
            notes: self
                .notes
                .iter()
                .filter(|note| note.tags.iter().any(|t| t == tag))
                .cloned()
                .collect(),
        }
    }
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Request for creating a new note inside an existing notebook.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateNoteRequest {
    pub notebook_id: i64,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request for a full note replace: title, body, and the complete tag set.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn note_view(id: i64, tags: &[&str]) -> NoteView {
        let now = Utc::now();
        NoteView {
            id,
            notebook_id: 1,
            title: format!("note {id}"),
            body: "body".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: now,
            last_modified: now,
        }
    }

    #[test]
    fn test_with_tag_filters_notes() {
        let view = NotebookView {
            id: 1,
            name: "Lab".to_string(),
            notes: vec![note_view(1, &["a"]), note_view(2, &["b"])],
        };

        let filtered = view.with_tag("a");
        assert_eq!(filtered.id, 1);
        assert_eq!(filtered.name, "Lab");
        assert_eq!(filtered.notes.len(), 1);
        assert_eq!(filtered.notes[0].id, 1);

        // the source view keeps its full note list
        assert_eq!(view.notes.len(), 2);
    }

    #[test]
    fn test_with_tag_requires_exact_match() {
        let view = NotebookView {
            id: 1,
            name: "Lab".to_string(),
            notes: vec![note_view(1, &["rust-lang"])],
        };

        assert!(view.with_tag("rust").notes.is_empty());
        assert_eq!(view.with_tag("rust-lang").notes.len(), 1);
    }

    #[test]
    fn test_with_tag_no_match_yields_empty_notes() {
        let view = NotebookView {
            id: 3,
            name: "Empty".to_string(),
            notes: vec![note_view(1, &[])],
        };

        let filtered = view.with_tag("anything");
        assert!(filtered.notes.is_empty());
        assert_eq!(filtered.id, 3);
    }
}
