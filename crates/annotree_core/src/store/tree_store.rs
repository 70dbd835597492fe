//! Note tree store and its error taxonomy.
//!
//! # Responsibility
//! - Create, rename and edit folder/file items.
//! - Answer hierarchy queries (children, ancestor chain, descendants).
//! - Remove whole subtrees in one step.
//!
//! # Invariants
//! - `parent_id` always references an existing folder.
//! - No item is its own ancestor.
//! - Ids are unique across folders and files.
//! - `children` mirrors the `parent_id` of every stored item.

use crate::model::note_item::{NoteBody, NoteId, NoteItem, NoteKind, NoteLink};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Broad category of a [`TreeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeErrorKind {
    /// User input rejected (blank name).
    Validation,
    /// A reference points nowhere or at the wrong variant.
    Referential,
    /// A parent chain would loop.
    Cycle,
    /// Target id is absent.
    NotFound,
    /// Operation does not apply to the target's variant.
    Type,
}

/// Errors from tree store, navigation and delete operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Name is blank after trim.
    InvalidName,
    /// Parent id does not exist.
    ParentNotFound(NoteId),
    /// Parent exists but is a file.
    ParentMustBeFolder(NoteId),
    /// Folder is not listed in the folder the cursor is showing.
    NotInCurrentFolder {
        folder_id: NoteId,
        current: Option<NoteId>,
    },
    /// Snapshot contains the same id twice.
    DuplicateId(NoteId),
    /// Parent chain loops back to `node_id`.
    CycleDetected { node_id: NoteId, parent_id: NoteId },
    /// Target item does not exist.
    NodeNotFound(NoteId),
    /// Target exists but is a folder.
    NodeMustBeFile(NoteId),
    /// Target exists but is a file.
    NodeMustBeFolder(NoteId),
}

impl TreeError {
    pub fn kind(&self) -> TreeErrorKind {
        match self {
            Self::InvalidName => TreeErrorKind::Validation,
            Self::ParentNotFound(_)
            | Self::ParentMustBeFolder(_)
            | Self::NotInCurrentFolder { .. }
            | Self::DuplicateId(_) => TreeErrorKind::Referential,
            Self::CycleDetected { .. } => TreeErrorKind::Cycle,
            Self::NodeNotFound(_) => TreeErrorKind::NotFound,
            Self::NodeMustBeFile(_) | Self::NodeMustBeFolder(_) => TreeErrorKind::Type,
        }
    }
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "name must not be blank"),
            Self::ParentNotFound(id) => write!(f, "parent folder not found: {id}"),
            Self::ParentMustBeFolder(id) => write!(f, "parent must be a folder: {id}"),
            Self::NotInCurrentFolder { folder_id, current } => match current {
                Some(current) => write!(f, "folder {folder_id} is not a child of {current}"),
                None => write!(f, "folder {folder_id} is not at root level"),
            },
            Self::DuplicateId(id) => write!(f, "duplicate note id: {id}"),
            Self::CycleDetected { node_id, parent_id } => write!(
                f,
                "parent chain cycle: node {node_id} under parent {parent_id}"
            ),
            Self::NodeNotFound(id) => write!(f, "note item not found: {id}"),
            Self::NodeMustBeFile(id) => write!(f, "note item must be a file: {id}"),
            Self::NodeMustBeFolder(id) => write!(f, "note item must be a folder: {id}"),
        }
    }
}

impl Error for TreeError {}

/// Owned collection of note items for one session.
#[derive(Debug, Default, Clone)]
pub struct TreeStore {
    items: HashMap<NoteId, NoteItem>,
    // Parent -> children in insertion order. `None` holds root items.
    children: HashMap<Option<NoteId>, Vec<NoteId>>,
}

impl TreeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a loaded snapshot.
    ///
    /// # Errors
    /// - `DuplicateId` when an id appears twice.
    /// - `ParentNotFound` / `ParentMustBeFolder` for bad parent references.
    /// - `CycleDetected` when parent links loop.
    pub fn from_items(items: impl IntoIterator<Item = NoteItem>) -> TreeResult<Self> {
        let mut store = Self::new();
        for item in items {
            if store.items.contains_key(&item.id) {
                return Err(TreeError::DuplicateId(item.id));
            }
            store.items.insert(item.id, item);
        }
        store.validate_hierarchy()?;
        store.rebuild_index();
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.items.contains_key(&id)
    }

    /// Loads one item by id.
    pub fn get(&self, id: NoteId) -> Option<&NoteItem> {
        self.items.get(&id)
    }

    /// Iterates every stored item in no particular order.
    pub fn items(&self) -> impl Iterator<Item = &NoteItem> {
        self.items.values()
    }

    /// Creates one item under an optional parent folder.
    ///
    /// The name is validated before the parent, so a blank name never
    /// consumes an id.
    pub fn create(
        &mut self,
        name: &str,
        kind: NoteKind,
        parent_id: Option<NoteId>,
    ) -> TreeResult<NoteId> {
        let name = normalize_name(name)?;
        if let Some(parent_id) = parent_id {
            self.ensure_folder_parent(parent_id)?;
        }

        let mut item = match kind {
            NoteKind::Folder => NoteItem::new_folder(name, parent_id),
            NoteKind::File => NoteItem::new_file(name, parent_id),
        };
        while self.items.contains_key(&item.id) {
            item.id = uuid::Uuid::new_v4();
        }

        let id = item.id;
        self.attach(item);
        Ok(id)
    }

    /// Renames one item and bumps `updated_at`.
    pub fn rename(&mut self, id: NoteId, new_name: &str) -> TreeResult<()> {
        if !self.items.contains_key(&id) {
            return Err(TreeError::NodeNotFound(id));
        }
        let name = normalize_name(new_name)?;
        let item = self.items.get_mut(&id).ok_or(TreeError::NodeNotFound(id))?;
        item.name = name;
        item.touch();
        Ok(())
    }

    /// Replaces the content of one file.
    pub fn update_content(&mut self, id: NoteId, content: impl Into<String>) -> TreeResult<()> {
        let item = self.items.get_mut(&id).ok_or(TreeError::NodeNotFound(id))?;
        match &mut item.body {
            NoteBody::Folder => return Err(TreeError::NodeMustBeFile(id)),
            NoteBody::File { content: current, .. } => *current = content.into(),
        }
        item.touch();
        Ok(())
    }

    /// Replaces the entity links of one file.
    pub fn update_links(&mut self, id: NoteId, links: Vec<NoteLink>) -> TreeResult<()> {
        let item = self.items.get_mut(&id).ok_or(TreeError::NodeNotFound(id))?;
        match &mut item.body {
            NoteBody::Folder => return Err(TreeError::NodeMustBeFile(id)),
            NoteBody::File { links: current, .. } => *current = links,
        }
        item.touch();
        Ok(())
    }

    /// Lists items directly under `parent_id` (root items for `None`).
    ///
    /// Order is not part of the contract; callers needing a stable order
    /// must sort.
    pub fn list(&self, parent_id: Option<NoteId>) -> Vec<&NoteItem> {
        self.child_ids(parent_id)
            .iter()
            .filter_map(|id| self.items.get(id))
            .collect()
    }

    /// Ids directly under `parent_id`.
    pub fn child_ids(&self, parent_id: Option<NoteId>) -> &[NoteId] {
        self.children.get(&parent_id).map_or(&[], Vec::as_slice)
    }

    /// Returns the chain from the root-most ancestor down to `id`, inclusive.
    pub fn ancestor_chain(&self, id: NoteId) -> TreeResult<Vec<NoteId>> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let item = self
                .items
                .get(&current)
                .ok_or(TreeError::NodeNotFound(current))?;
            chain.push(current);
            cursor = item.parent_id;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Collects every descendant id of `id`, excluding `id` itself.
    pub fn descendant_ids(&self, id: NoteId) -> TreeResult<HashSet<NoteId>> {
        if !self.items.contains_key(&id) {
            return Err(TreeError::NodeNotFound(id));
        }
        let mut collected = HashSet::new();
        let mut pending = self.child_ids(Some(id)).to_vec();
        while let Some(current) = pending.pop() {
            if collected.insert(current) {
                pending.extend_from_slice(self.child_ids(Some(current)));
            }
        }
        Ok(collected)
    }

    /// Removes `id` and its whole subtree in one step.
    ///
    /// Returns removed items. An absent id is an error and leaves the store
    /// untouched.
    pub fn remove_subtree(&mut self, id: NoteId) -> TreeResult<Vec<NoteItem>> {
        let mut doomed = self.descendant_ids(id)?;
        doomed.insert(id);

        let mut removed = Vec::with_capacity(doomed.len());
        for doomed_id in &doomed {
            if let Some(item) = self.items.remove(doomed_id) {
                removed.push(item);
            }
        }
        for doomed_id in &doomed {
            self.children.remove(&Some(*doomed_id));
        }
        if let Some(parent_id) = removed
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.parent_id)
        {
            if let Some(siblings) = self.children.get_mut(&parent_id) {
                siblings.retain(|sibling| *sibling != id);
            }
        }
        Ok(removed)
    }

    /// Re-inserts items previously taken out by [`TreeStore::remove_subtree`].
    ///
    /// On error the store is left as it was before the call.
    pub fn restore(&mut self, items: Vec<NoteItem>) -> TreeResult<()> {
        let mut candidate = self.clone();
        for item in items {
            if candidate.items.contains_key(&item.id) {
                return Err(TreeError::DuplicateId(item.id));
            }
            candidate.items.insert(item.id, item);
        }
        candidate.validate_hierarchy()?;
        candidate.rebuild_index();
        *self = candidate;
        Ok(())
    }

    /// Overwrites one stored item in place, keeping its position.
    ///
    /// Used to roll back a rename or edit. The stored parent is kept.
    pub fn replace(&mut self, mut item: NoteItem) -> TreeResult<()> {
        let current = self
            .items
            .get_mut(&item.id)
            .ok_or(TreeError::NodeNotFound(item.id))?;
        item.parent_id = current.parent_id;
        *current = item;
        Ok(())
    }

    /// Returns whether making `candidate_parent` the parent of `node_id`
    /// would close a loop.
    pub fn would_create_cycle(&self, node_id: NoteId, candidate_parent: NoteId) -> bool {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent);
        while let Some(current) = cursor {
            if current == node_id || !visited.insert(current) {
                return true;
            }
            cursor = self.items.get(&current).and_then(|item| item.parent_id);
        }
        false
    }

    fn ensure_folder_parent(&self, parent_id: NoteId) -> TreeResult<()> {
        let parent = self
            .items
            .get(&parent_id)
            .ok_or(TreeError::ParentNotFound(parent_id))?;
        if !parent.is_folder() {
            return Err(TreeError::ParentMustBeFolder(parent_id));
        }
        Ok(())
    }

    fn attach(&mut self, item: NoteItem) {
        self.children.entry(item.parent_id).or_default().push(item.id);
        self.items.insert(item.id, item);
    }

    fn validate_hierarchy(&self) -> TreeResult<()> {
        for item in self.items.values() {
            let Some(parent_id) = item.parent_id else {
                continue;
            };
            self.ensure_folder_parent(parent_id)?;
            if self.would_create_cycle(item.id, parent_id) {
                return Err(TreeError::CycleDetected {
                    node_id: item.id,
                    parent_id,
                });
            }
        }
        Ok(())
    }

    fn rebuild_index(&mut self) {
        let mut ordered: Vec<&NoteItem> = self.items.values().collect();
        ordered.sort_by_key(|item| (item.created_at, item.id));
        let mut children: HashMap<Option<NoteId>, Vec<NoteId>> = HashMap::new();
        for item in ordered {
            children.entry(item.parent_id).or_default().push(item.id);
        }
        self.children = children;
    }
}

fn normalize_name(value: &str) -> TreeResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TreeError::InvalidName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, TreeError, TreeStore};
    use crate::model::note_item::NoteKind;

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(normalize_name("  Ideias  ").unwrap(), "Ideias");
        assert_eq!(normalize_name(" \t ").unwrap_err(), TreeError::InvalidName);
    }

    #[test]
    fn would_create_cycle_detects_descendant_parent() {
        let mut store = TreeStore::new();
        let a = store.create("A", NoteKind::Folder, None).unwrap();
        let b = store.create("B", NoteKind::Folder, Some(a)).unwrap();
        assert!(store.would_create_cycle(a, b));
        assert!(store.would_create_cycle(a, a));
        assert!(!store.would_create_cycle(b, a));
    }

    #[test]
    fn remove_subtree_detaches_from_parent_index() {
        let mut store = TreeStore::new();
        let a = store.create("A", NoteKind::Folder, None).unwrap();
        let b = store.create("B", NoteKind::Folder, Some(a)).unwrap();
        store.create("doc", NoteKind::File, Some(b)).unwrap();

        let removed = store.remove_subtree(b).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(store.child_ids(Some(a)).is_empty());
        assert!(store.child_ids(Some(b)).is_empty());
        assert_eq!(store.len(), 1);
    }
}
