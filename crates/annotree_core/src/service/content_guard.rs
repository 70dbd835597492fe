//! Content guard for destructive operations.
//!
//! # Responsibility
//! - Decide whether an item or subtree holds text a writer would lose.
//!
//! # Invariants
//! - Placeholder-only and blank files never count as content.
//! - Empty folders never count as content.
//! - The walk is iterative, so nesting depth is bounded by memory only.
//! - The walk terminates because the parent relation is acyclic.

use crate::model::note_item::{NoteBody, NoteId, EMPTY_NOTE_PLACEHOLDER};
use crate::store::tree_store::{TreeError, TreeResult, TreeStore};

/// Returns whether file content is something other than blank/placeholder.
pub fn is_meaningful_text(content: &str) -> bool {
    let trimmed = content.trim();
    !trimmed.is_empty() && trimmed != EMPTY_NOTE_PLACEHOLDER
}

/// Returns whether `id` is a file with real content or a folder whose
/// subtree contains one.
pub fn has_meaningful_content(store: &TreeStore, id: NoteId) -> TreeResult<bool> {
    if !store.contains(id) {
        return Err(TreeError::NodeNotFound(id));
    }
    // Depth-first; stops at the first meaningful file.
    let mut pending = vec![id];
    while let Some(current) = pending.pop() {
        let Some(item) = store.get(current) else {
            continue;
        };
        match &item.body {
            NoteBody::File { content, .. } => {
                if is_meaningful_text(content) {
                    return Ok(true);
                }
            }
            NoteBody::Folder => pending.extend_from_slice(store.child_ids(Some(current))),
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{has_meaningful_content, is_meaningful_text};
    use crate::model::note_item::{NoteKind, EMPTY_NOTE_PLACEHOLDER};
    use crate::store::tree_store::{TreeError, TreeStore};
    use uuid::Uuid;

    #[test]
    fn placeholder_and_blank_text_are_not_meaningful() {
        assert!(!is_meaningful_text(EMPTY_NOTE_PLACEHOLDER));
        assert!(!is_meaningful_text(&format!("  {EMPTY_NOTE_PLACEHOLDER}\n")));
        assert!(!is_meaningful_text(" \n\t"));
        assert!(is_meaningful_text("hello"));
    }

    #[test]
    fn empty_folder_has_no_content() {
        let mut store = TreeStore::new();
        let folder = store.create("A", NoteKind::Folder, None).unwrap();
        assert!(!has_meaningful_content(&store, folder).unwrap());
    }

    #[test]
    fn nested_file_content_propagates_to_every_ancestor() {
        let mut store = TreeStore::new();
        let a = store.create("A", NoteKind::Folder, None).unwrap();
        let b = store.create("B", NoteKind::Folder, Some(a)).unwrap();
        let c = store.create("C", NoteKind::Folder, Some(b)).unwrap();
        let doc = store.create("doc", NoteKind::File, Some(c)).unwrap();
        store.create("blank", NoteKind::File, Some(a)).unwrap();

        assert!(!has_meaningful_content(&store, a).unwrap());

        store.update_content(doc, "<p>draft</p>").unwrap();
        for id in [a, b, c, doc] {
            assert!(has_meaningful_content(&store, id).unwrap());
        }
    }

    #[test]
    fn missing_item_is_not_found() {
        let store = TreeStore::new();
        let id = Uuid::new_v4();
        assert_eq!(
            has_meaningful_content(&store, id).unwrap_err(),
            TreeError::NodeNotFound(id)
        );
    }
}
