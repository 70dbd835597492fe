//! Folder navigation cursor.
//!
//! # Responsibility
//! - Track the folder path the user has drilled into.
//! - Recover when a folder on that path is deleted.
//!
//! # Invariants
//! - Every stacked id is a folder whose parent is the previous entry.
//! - An empty stack means the root level.

use crate::model::note_item::{NoteId, NoteItem};
use crate::store::tree_store::{TreeError, TreeResult, TreeStore};

/// Stack of folder ids from the root down to the folder being shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationCursor {
    stack: Vec<NoteId>,
}

impl NavigationCursor {
    /// Creates a cursor positioned at the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folder being shown, `None` for the root.
    pub fn current_folder(&self) -> Option<NoteId> {
        self.stack.last().copied()
    }

    /// Stacked folder ids, root-most first.
    pub fn path(&self) -> &[NoteId] {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_at_root(&self) -> bool {
        self.stack.is_empty()
    }

    /// Descends into a folder listed in the current view.
    ///
    /// # Errors
    /// - `NodeNotFound` when `folder_id` does not exist.
    /// - `NodeMustBeFolder` when it is a file.
    /// - `NotInCurrentFolder` when it is not a direct child of the current folder.
    pub fn enter(&mut self, store: &TreeStore, folder_id: NoteId) -> TreeResult<()> {
        let folder = store
            .get(folder_id)
            .ok_or(TreeError::NodeNotFound(folder_id))?;
        if !folder.is_folder() {
            return Err(TreeError::NodeMustBeFolder(folder_id));
        }
        let current = self.current_folder();
        if folder.parent_id != current {
            return Err(TreeError::NotInCurrentFolder { folder_id, current });
        }
        self.stack.push(folder_id);
        Ok(())
    }

    /// Goes up one level. No-op at the root.
    pub fn back(&mut self) -> Option<NoteId> {
        self.stack.pop()
    }

    /// Returns to the root.
    pub fn reset(&mut self) {
        self.stack.clear();
    }

    /// Drops every entry from the first one that no longer resolves to a
    /// folder under the previous entry.
    ///
    /// Returns `true` when the path was shortened.
    pub fn reconcile(&mut self, store: &TreeStore) -> bool {
        let mut parent = None;
        let valid_len = self
            .stack
            .iter()
            .take_while(|id| {
                let valid = store
                    .get(**id)
                    .is_some_and(|item| item.is_folder() && item.parent_id == parent);
                parent = Some(**id);
                valid
            })
            .count();
        let truncated = valid_len < self.stack.len();
        self.stack.truncate(valid_len);
        truncated
    }

    /// Items in the folder being shown.
    pub fn list_current<'s>(&self, store: &'s TreeStore) -> Vec<&'s NoteItem> {
        store.list(self.current_folder())
    }
}
