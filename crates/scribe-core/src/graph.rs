//! In-memory entity graph for notebooks, notes, and tags.
//!
//! The store owns durability; this graph is the in-memory materialization
//! services build views from. Entities live in id-indexed maps: the owning
//! direction (notebook→notes, note→tags) is an explicit id set, the back
//! direction is a plain id field. Keeping both directions as ids instead of
//! live references makes the symmetry invariants checkable by equality and
//! rules out reference cycles.
//!
//! Mutations go through the attach/detach operations below, which keep the
//! two directions consistent no matter which side initiated the change.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::{Note, Notebook, NotebookView, NoteView, Tag};

/// Notebook node: owning side of the notebook→note edge.
#[derive(Debug, Clone)]
pub struct NotebookNode {
    pub id: i64,
    pub name: String,
    pub note_ids: BTreeSet<i64>,
}

/// Note node. `notebook_id` is the back-reference; `tag_ids` the owned set.
#[derive(Debug, Clone)]
pub struct NoteNode {
    pub id: i64,
    pub notebook_id: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub tag_ids: BTreeSet<i64>,
}

/// Tag node. `note_id` is the back-reference to the owning note.
#[derive(Debug, Clone)]
pub struct TagNode {
    pub id: i64,
    pub note_id: i64,
    pub value: String,
}

/// Ids dropped by a cascading notebook removal.
#[derive(Debug, Default)]
pub struct RemovedSubgraph {
    pub note_ids: Vec<i64>,
    pub tag_ids: Vec<i64>,
}

/// Arena-style graph of the three entity kinds.
#[derive(Debug, Default)]
pub struct EntityGraph {
    notebooks: HashMap<i64, NotebookNode>,
    notes: HashMap<i64, NoteNode>,
    tags: HashMap<i64, TagNode>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a notebook with an empty note set.
    pub fn insert_notebook(&mut self, notebook: Notebook) {
        self.notebooks.insert(
            notebook.id,
            NotebookNode {
                id: notebook.id,
                name: notebook.name,
                note_ids: BTreeSet::new(),
            },
        );
    }

    /// Add a note row and attach it to its notebook.
    pub fn insert_note(&mut self, note: Note) -> Result<()> {
        let notebook_id = note.notebook_id;
        self.notes.insert(
            note.id,
            NoteNode {
                id: note.id,
                notebook_id,
                title: note.title,
                body: note.body,
                created_at: note.created_at,
                last_modified: note.last_modified,
                tag_ids: BTreeSet::new(),
            },
        );
        self.attach_note(note.id, notebook_id)
    }

    /// Add a tag row and attach it to its note.
    pub fn insert_tag(&mut self, tag: Tag) -> Result<()> {
        let note_id = tag.note_id;
        self.tags.insert(
            tag.id,
            TagNode {
                id: tag.id,
                note_id,
                value: tag.value,
            },
        );
        self.attach_tag(tag.id, note_id)
    }

    /// Point the note at `notebook_id` and enter it in that notebook's note
    /// set. Idempotent; a note is never left in two owners' sets.
    pub fn attach_note(&mut self, note_id: i64, notebook_id: i64) -> Result<()> {
        if !self.notebooks.contains_key(&notebook_id) {
            return Err(Error::NotebookNotFound(notebook_id));
        }
        let note = self
            .notes
            .get_mut(&note_id)
            .ok_or(Error::NoteNotFound(note_id))?;
        let previous = note.notebook_id;
        note.notebook_id = notebook_id;
        if previous != notebook_id {
            if let Some(old_owner) = self.notebooks.get_mut(&previous) {
                old_owner.note_ids.remove(&note_id);
            }
        }
        let notebook = self
            .notebooks
            .get_mut(&notebook_id)
            .ok_or(Error::NotebookNotFound(notebook_id))?;
        notebook.note_ids.insert(note_id);
        Ok(())
    }

    /// Point the tag at `note_id` and enter it in that note's tag set.
    pub fn attach_tag(&mut self, tag_id: i64, note_id: i64) -> Result<()> {
        if !self.notes.contains_key(&note_id) {
            return Err(Error::NoteNotFound(note_id));
        }
        let tag = self
            .tags
            .get_mut(&tag_id)
            .ok_or_else(|| Error::Internal(format!("tag {tag_id} is not in the graph")))?;
        let previous = tag.note_id;
        tag.note_id = note_id;
        if previous != note_id {
            if let Some(old_owner) = self.notes.get_mut(&previous) {
                old_owner.tag_ids.remove(&tag_id);
            }
        }
        let note = self
            .notes
            .get_mut(&note_id)
            .ok_or(Error::NoteNotFound(note_id))?;
        note.tag_ids.insert(tag_id);
        Ok(())
    }

    /// Remove the note from its notebook's set and drop it with its tags.
    /// Must run before the backing row is physically deleted so no
    /// materialized notebook state retains the doomed note. Returns the ids
    /// of the tags that went with it.
    pub fn detach_note(&mut self, note_id: i64) -> Result<Vec<i64>> {
        let note = self
            .notes
            .remove(&note_id)
            .ok_or(Error::NoteNotFound(note_id))?;
        if let Some(notebook) = self.notebooks.get_mut(&note.notebook_id) {
            notebook.note_ids.remove(&note_id);
        }
        let removed: Vec<i64> = note.tag_ids.into_iter().collect();
        for tag_id in &removed {
            self.tags.remove(tag_id);
        }
        Ok(removed)
    }

    /// Remove the tag from its note's set and drop it.
    pub fn detach_tag(&mut self, tag_id: i64) -> Result<()> {
        let tag = self
            .tags
            .remove(&tag_id)
            .ok_or_else(|| Error::Internal(format!("tag {tag_id} is not in the graph")))?;
        if let Some(note) = self.notes.get_mut(&tag.note_id) {
            note.tag_ids.remove(&tag_id);
        }
        Ok(())
    }

    /// Cascade removal of a notebook: every owned note and every tag owned
    /// by those notes goes with it. Returns the dropped ids.
    pub fn remove_notebook(&mut self, id: i64) -> Result<RemovedSubgraph> {
        let notebook = self
            .notebooks
            .remove(&id)
            .ok_or(Error::NotebookNotFound(id))?;
        let mut removed = RemovedSubgraph::default();
        for note_id in notebook.note_ids {
            if let Some(note) = self.notes.remove(&note_id) {
                for tag_id in note.tag_ids {
                    self.tags.remove(&tag_id);
                    removed.tag_ids.push(tag_id);
                }
            }
            removed.note_ids.push(note_id);
        }
        Ok(removed)
    }

    /// Detach and drop every tag of the note, returning their ids.
    /// Clearing to an empty set is legal.
    pub fn take_tags(&mut self, note_id: i64) -> Result<Vec<i64>> {
        let note = self
            .notes
            .get_mut(&note_id)
            .ok_or(Error::NoteNotFound(note_id))?;
        let removed: Vec<i64> = std::mem::take(&mut note.tag_ids).into_iter().collect();
        for tag_id in &removed {
            self.tags.remove(tag_id);
        }
        Ok(removed)
    }

    /// Tag diff for a removal request: detach and drop exactly the note's
    /// tags whose value appears in `values`. Values not present on the note
    /// are ignored. Returns the ids of the dropped tags.
    pub fn detach_tags_by_value(&mut self, note_id: i64, values: &[String]) -> Result<Vec<i64>> {
        let doomed: Vec<i64> = {
            let note = self
                .notes
                .get(&note_id)
                .ok_or(Error::NoteNotFound(note_id))?;
            note.tag_ids
                .iter()
                .copied()
                .filter(|tag_id| {
                    self.tags
                        .get(tag_id)
                        .is_some_and(|tag| values.contains(&tag.value))
                })
                .collect()
        };
        for tag_id in &doomed {
            self.detach_tag(*tag_id)?;
        }
        Ok(doomed)
    }

    /// Replace the note's title and body and stamp `last_modified`.
    pub fn set_note_content(
        &mut self,
        note_id: i64,
        title: &str,
        body: &str,
        last_modified: DateTime<Utc>,
    ) -> Result<()> {
        let note = self
            .notes
            .get_mut(&note_id)
            .ok_or(Error::NoteNotFound(note_id))?;
        note.title = title.to_string();
        note.body = body.to_string();
        note.last_modified = last_modified;
        Ok(())
    }

    /// Stamp `last_modified` without touching content.
    pub fn touch_note(&mut self, note_id: i64, last_modified: DateTime<Utc>) -> Result<()> {
        let note = self
            .notes
            .get_mut(&note_id)
            .ok_or(Error::NoteNotFound(note_id))?;
        note.last_modified = last_modified;
        Ok(())
    }

    /// Apply a partial update described as a field-name → value map.
    ///
    /// The allow-list is explicit: `title` and `body` are the only mutable
    /// attributes. The `tags` key is reserved for the tag operations and is
    /// rejected outright. The whole map is validated before anything is
    /// applied, so a rejected request leaves the note untouched.
    pub fn update_note_fields(
        &mut self,
        note_id: i64,
        fields: &HashMap<String, String>,
    ) -> Result<()> {
        if !self.notes.contains_key(&note_id) {
            return Err(Error::NoteNotFound(note_id));
        }
        for key in fields.keys() {
            match key.as_str() {
                "tags" => return Err(Error::IllegalTagModification),
                "title" | "body" => {}
                other => return Err(Error::IllegalField(other.to_string())),
            }
        }
        let note = self
            .notes
            .get_mut(&note_id)
            .ok_or(Error::NoteNotFound(note_id))?;
        for (key, value) in fields {
            match key.as_str() {
                "title" => note.title = value.clone(),
                "body" => note.body = value.clone(),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn notebook(&self, id: i64) -> Option<&NotebookNode> {
        self.notebooks.get(&id)
    }

    pub fn note(&self, id: i64) -> Option<&NoteNode> {
        self.notes.get(&id)
    }

    pub fn tag(&self, id: i64) -> Option<&TagNode> {
        self.tags.get(&id)
    }

    /// Flatten a note and its tag values into a view snapshot.
    pub fn note_view(&self, id: i64) -> Option<NoteView> {
        let note = self.notes.get(&id)?;
        let tags = note
            .tag_ids
            .iter()
            .filter_map(|tag_id| self.tags.get(tag_id))
            .map(|tag| tag.value.clone())
            .collect();
        Some(NoteView {
            id: note.id,
            notebook_id: note.notebook_id,
            title: note.title.clone(),
            body: note.body.clone(),
            tags,
            created_at: note.created_at,
            last_modified: note.last_modified,
        })
    }

    /// Flatten a notebook and the views of every note it owns.
    pub fn notebook_view(&self, id: i64) -> Option<NotebookView> {
        let notebook = self.notebooks.get(&id)?;
        let notes = notebook
            .note_ids
            .iter()
            .filter_map(|note_id| self.note_view(*note_id))
            .collect();
        Some(NotebookView {
            id: notebook.id,
            name: notebook.name.clone(),
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn notebook(id: i64) -> Notebook {
        Notebook {
            id,
            name: format!("notebook {id}"),
        }
    }

    fn note(id: i64, notebook_id: i64) -> Note {
        let now = Utc::now();
        Note {
            id,
            notebook_id,
            title: format!("note {id}"),
            body: "body".to_string(),
            created_at: now,
            last_modified: now,
        }
    }

    fn tag(id: i64, note_id: i64, value: &str) -> Tag {
        Tag {
            id,
            note_id,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_attach_keeps_both_directions_consistent() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();

        assert_eq!(graph.note(10).unwrap().notebook_id, 1);
        assert!(graph.notebook(1).unwrap().note_ids.contains(&10));
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();

        graph.attach_note(10, 1).unwrap();
        graph.attach_note(10, 1).unwrap();

        assert_eq!(graph.notebook(1).unwrap().note_ids.len(), 1);
    }

    #[test]
    fn test_reattach_moves_note_between_owner_sets() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_notebook(notebook(2));
        graph.insert_note(note(10, 1)).unwrap();

        graph.attach_note(10, 2).unwrap();

        assert_eq!(graph.note(10).unwrap().notebook_id, 2);
        assert!(!graph.notebook(1).unwrap().note_ids.contains(&10));
        assert!(graph.notebook(2).unwrap().note_ids.contains(&10));
    }

    #[test]
    fn test_attach_to_unknown_notebook_fails() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();

        let err = graph.attach_note(10, 99).unwrap_err();
        assert!(matches!(err, Error::NotebookNotFound(99)));
        // the failed attach left the original edge alone
        assert_eq!(graph.note(10).unwrap().notebook_id, 1);
    }

    #[test]
    fn test_attach_tag_keeps_both_directions_consistent() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();
        graph.insert_tag(tag(100, 10, "x")).unwrap();

        assert_eq!(graph.tag(100).unwrap().note_id, 10);
        assert!(graph.note(10).unwrap().tag_ids.contains(&100));
    }

    #[test]
    fn test_detach_note_drops_note_and_tags() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();
        graph.insert_tag(tag(100, 10, "x")).unwrap();
        graph.insert_tag(tag(101, 10, "y")).unwrap();

        let removed = graph.detach_note(10).unwrap();

        assert_eq!(removed, vec![100, 101]);
        assert!(graph.note(10).is_none());
        assert!(graph.tag(100).is_none());
        assert!(!graph.notebook(1).unwrap().note_ids.contains(&10));
    }

    #[test]
    fn test_remove_notebook_cascades_to_notes_and_tags() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();
        graph.insert_note(note(11, 1)).unwrap();
        graph.insert_tag(tag(100, 10, "a")).unwrap();
        graph.insert_tag(tag(101, 10, "b")).unwrap();
        graph.insert_tag(tag(102, 11, "c")).unwrap();
        graph.insert_tag(tag(103, 11, "d")).unwrap();

        let removed = graph.remove_notebook(1).unwrap();

        assert_eq!(removed.note_ids.len(), 2);
        assert_eq!(removed.tag_ids.len(), 4);
        assert!(graph.notebook_view(1).is_none());
        for note_id in removed.note_ids {
            assert!(graph.note(note_id).is_none());
        }
        for tag_id in removed.tag_ids {
            assert!(graph.tag(tag_id).is_none());
        }
    }

    #[test]
    fn test_take_tags_clears_the_whole_set() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();
        graph.insert_tag(tag(100, 10, "a")).unwrap();
        graph.insert_tag(tag(101, 10, "b")).unwrap();

        let removed = graph.take_tags(10).unwrap();

        assert_eq!(removed, vec![100, 101]);
        assert!(graph.note(10).unwrap().tag_ids.is_empty());
        assert_eq!(graph.note_view(10).unwrap().tags, Vec::<String>::new());

        // clearing an already-empty set is legal
        assert!(graph.take_tags(10).unwrap().is_empty());
    }

    #[test]
    fn test_detach_tags_by_value_removes_exactly_the_matches() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();
        graph.insert_tag(tag(100, 10, "a")).unwrap();
        graph.insert_tag(tag(101, 10, "b")).unwrap();
        graph.insert_tag(tag(102, 10, "c")).unwrap();

        let removed = graph
            .detach_tags_by_value(10, &["a".to_string(), "b".to_string(), "zzz".to_string()])
            .unwrap();

        assert_eq!(removed, vec![100, 101]);
        assert_eq!(graph.note_view(10).unwrap().tags, vec!["c".to_string()]);
    }

    #[test]
    fn test_duplicate_tag_values_are_kept() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();
        graph.insert_tag(tag(100, 10, "x")).unwrap();
        graph.insert_tag(tag(101, 10, "x")).unwrap();

        assert_eq!(
            graph.note_view(10).unwrap().tags,
            vec!["x".to_string(), "x".to_string()]
        );

        // removing by value takes every tag carrying it
        let removed = graph.detach_tags_by_value(10, &["x".to_string()]).unwrap();
        assert_eq!(removed, vec![100, 101]);
        assert!(graph.note_view(10).unwrap().tags.is_empty());
    }

    #[test]
    fn test_update_note_fields_rejects_tags_key() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();
        graph.insert_tag(tag(100, 10, "x")).unwrap();

        let mut fields = HashMap::new();
        fields.insert("tags".to_string(), "y".to_string());

        let err = graph.update_note_fields(10, &fields).unwrap_err();
        assert!(matches!(err, Error::IllegalTagModification));
        // tags survived the rejected request
        assert_eq!(graph.note_view(10).unwrap().tags, vec!["x".to_string()]);
    }

    #[test]
    fn test_update_note_fields_rejects_unknown_field() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();

        let mut fields = HashMap::new();
        fields.insert("title".to_string(), "changed".to_string());
        fields.insert("color".to_string(), "red".to_string());

        let err = graph.update_note_fields(10, &fields).unwrap_err();
        assert!(matches!(err, Error::IllegalField(ref f) if f == "color"));
        // the valid key in the same request was not applied either
        assert_eq!(graph.note(10).unwrap().title, "note 10");
    }

    #[test]
    fn test_update_note_fields_sets_title_and_body() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();

        let mut fields = HashMap::new();
        fields.insert("title".to_string(), "new title".to_string());
        fields.insert("body".to_string(), "new body".to_string());

        graph.update_note_fields(10, &fields).unwrap();

        let view = graph.note_view(10).unwrap();
        assert_eq!(view.title, "new title");
        assert_eq!(view.body, "new body");
    }

    #[test]
    fn test_notebook_view_embeds_note_views() {
        let mut graph = EntityGraph::new();
        graph.insert_notebook(notebook(1));
        graph.insert_note(note(10, 1)).unwrap();
        graph.insert_note(note(11, 1)).unwrap();
        graph.insert_tag(tag(100, 10, "a")).unwrap();

        let view = graph.notebook_view(1).unwrap();
        assert_eq!(view.notes.len(), 2);
        assert_eq!(view.notes[0].id, 10);
        assert_eq!(view.notes[0].tags, vec!["a".to_string()]);
        assert!(view.notes[1].tags.is_empty());
    }
}
