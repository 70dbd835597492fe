//! Note item domain model.
//!
//! # Responsibility
//! - Define the tagged `Folder`/`File` record stored in the tree.
//! - Provide timestamp helpers used by every mutation path.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - `parent_id`, when set, points at a folder (enforced by `TreeStore`).
//! - `updated_at` only moves forward.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier shared by folders and files.
pub type NoteId = Uuid;

/// Body a freshly created file starts with.
///
/// The rich-text editor renders this as a hint; a file whose content still
/// equals it is treated as empty by the delete guard.
pub const EMPTY_NOTE_PLACEHOLDER: &str = "<div>Comece a escrever suas anotações aqui...</div>";

/// Variant tag of a note item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    /// Container that may hold folders and files.
    Folder,
    /// Leaf holding rich-text content.
    File,
}

impl NoteKind {
    /// Storage/log representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

/// Link from a file to an external world entity (character, faction, ...).
///
/// The core stores these records as given and never inspects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteLink {
    pub link_id: String,
    pub entity_type: String,
    pub entity_id: String,
    /// Epoch ms.
    pub created_at: i64,
}

/// Variant-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoteBody {
    Folder,
    File {
        /// Opaque serialized rich text.
        content: String,
        #[serde(default)]
        links: Vec<NoteLink>,
    },
}

/// One node of the note tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteItem {
    pub id: NoteId,
    /// User-facing label. Not unique among siblings.
    pub name: String,
    /// `None` means root-level item.
    pub parent_id: Option<NoteId>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
    #[serde(flatten)]
    pub body: NoteBody,
}

impl NoteItem {
    /// Creates an empty folder with a generated id.
    pub fn new_folder(name: impl Into<String>, parent_id: Option<NoteId>) -> Self {
        Self::with_body(Uuid::new_v4(), name, parent_id, NoteBody::Folder)
    }

    /// Creates a file with a generated id whose content is the placeholder.
    pub fn new_file(name: impl Into<String>, parent_id: Option<NoteId>) -> Self {
        Self::with_body(
            Uuid::new_v4(),
            name,
            parent_id,
            NoteBody::File {
                content: EMPTY_NOTE_PLACEHOLDER.to_string(),
                links: Vec::new(),
            },
        )
    }

    /// Creates an item with a caller-provided id.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_body(
        id: NoteId,
        name: impl Into<String>,
        parent_id: Option<NoteId>,
        body: NoteBody,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            name: name.into(),
            parent_id,
            created_at: now,
            updated_at: now,
            body,
        }
    }

    pub fn kind(&self) -> NoteKind {
        match self.body {
            NoteBody::Folder => NoteKind::Folder,
            NoteBody::File { .. } => NoteKind::File,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.body, NoteBody::Folder)
    }

    /// File content, `None` for folders.
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            NoteBody::Folder => None,
            NoteBody::File { content, .. } => Some(content.as_str()),
        }
    }

    /// File links, `None` for folders.
    pub fn links(&self) -> Option<&[NoteLink]> {
        match &self.body {
            NoteBody::Folder => None,
            NoteBody::File { links, .. } => Some(links.as_slice()),
        }
    }

    /// Advances `updated_at` to now, or by 1 ms when the clock has not moved.
    pub fn touch(&mut self) {
        self.updated_at = now_epoch_ms().max(self.updated_at + 1);
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}
