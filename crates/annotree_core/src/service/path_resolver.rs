//! Breadcrumb rendering.
//!
//! # Responsibility
//! - Turn the navigation cursor or an item's ancestor chain into display names.
//!
//! # Invariants
//! - Resolution never mutates the store or the cursor.
//! - The synthetic root label is always the first segment.

use crate::model::note_item::NoteId;
use crate::service::navigation::NavigationCursor;
use crate::store::tree_store::{TreeResult, TreeStore};

/// Root segment shown before any folder name.
pub const DEFAULT_ROOT_LABEL: &str = "Anotações";

const SEGMENT_SEPARATOR: &str = " / ";

/// Resolves folder ids to breadcrumb segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    root_label: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_LABEL)
    }
}

impl PathResolver {
    pub fn new(root_label: impl Into<String>) -> Self {
        Self {
            root_label: root_label.into(),
        }
    }

    pub fn root_label(&self) -> &str {
        &self.root_label
    }

    /// Breadcrumb of the folder the cursor is showing.
    ///
    /// Stacked ids that no longer resolve to a folder are skipped.
    pub fn resolve(&self, store: &TreeStore, cursor: &NavigationCursor) -> Vec<String> {
        let mut segments = vec![self.root_label.clone()];
        segments.extend(
            cursor
                .path()
                .iter()
                .filter_map(|id| store.get(*id))
                .filter(|item| item.is_folder())
                .map(|item| item.name.clone()),
        );
        segments
    }

    /// Breadcrumb of any item, ending with the item's own name.
    pub fn resolve_item(&self, store: &TreeStore, id: NoteId) -> TreeResult<Vec<String>> {
        let chain = store.ancestor_chain(id)?;
        let mut segments = Vec::with_capacity(chain.len() + 1);
        segments.push(self.root_label.clone());
        segments.extend(
            chain
                .iter()
                .filter_map(|id| store.get(*id))
                .map(|item| item.name.clone()),
        );
        Ok(segments)
    }

    /// Joins segments the way the breadcrumb bar shows them.
    pub fn render(segments: &[String]) -> String {
        segments.join(SEGMENT_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::{PathResolver, DEFAULT_ROOT_LABEL};
    use crate::model::note_item::NoteKind;
    use crate::service::navigation::NavigationCursor;
    use crate::store::tree_store::TreeStore;

    #[test]
    fn root_cursor_resolves_to_root_label_only() {
        let store = TreeStore::new();
        let cursor = NavigationCursor::new();
        let segments = PathResolver::default().resolve(&store, &cursor);
        assert_eq!(segments, vec![DEFAULT_ROOT_LABEL.to_string()]);
    }

    #[test]
    fn resolve_item_includes_every_ancestor() {
        let mut store = TreeStore::new();
        let world = store.create("Mundo", NoteKind::Folder, None).unwrap();
        let magic = store.create("Magia", NoteKind::Folder, Some(world)).unwrap();
        let doc = store.create("Elementos", NoteKind::File, Some(magic)).unwrap();

        let resolver = PathResolver::new("Notes");
        let segments = resolver.resolve_item(&store, doc).unwrap();
        assert_eq!(
            PathResolver::render(&segments),
            "Notes / Mundo / Magia / Elementos"
        );
    }
}
