//! Service layer: store orchestration and cache maintenance.

mod notebook_service;
mod note_service;

pub use notebook_service::NotebookService;
pub use note_service::NoteService;

use scribe_core::{EntityGraph, Notebook, NoteRepository, Result, TagRepository};
use scribe_db::Database;

/// Materialize a notebook's subgraph (the notebook row, its notes, their
/// tags) into an entity graph. Tags are fetched for all notes in one query
/// so the load stays at two round-trips regardless of note count.
pub(crate) async fn load_notebook_graph(db: &Database, notebook: Notebook) -> Result<EntityGraph> {
    let notebook_id = notebook.id;
    let mut graph = EntityGraph::new();
    graph.insert_notebook(notebook);

    let notes = db.notes.list_for_notebook(notebook_id).await?;
    let note_ids: Vec<i64> = notes.iter().map(|note| note.id).collect();
    for note in notes {
        graph.insert_note(note)?;
    }
    for tag in db.tags.list_for_notes(&note_ids).await? {
        graph.insert_tag(tag)?;
    }
    Ok(graph)
}
