//! Core of the hierarchical note organizer.
//! This crate owns the folder/file tree and every invariant on it.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{AnnotreeConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note_item::{
    NoteBody, NoteId, NoteItem, NoteKind, NoteLink, EMPTY_NOTE_PLACEHOLDER,
};
pub use repo::note_repo::{
    InMemoryNoteRepository, NoteRepoError, NoteRepoResult, NoteRepository, SqliteNoteRepository,
};
pub use service::cascade_delete::{
    begin_delete, delete_with_confirmation, DeleteConfirmation, DeleteOutcome, DeletePhase,
    DeleteReport, DeleteResolution, PendingDelete,
};
pub use service::content_guard::{has_meaningful_content, is_meaningful_text};
pub use service::navigation::NavigationCursor;
pub use service::note_tree_service::{NoteServiceError, NoteServiceResult, NoteTreeService};
pub use service::path_resolver::{PathResolver, DEFAULT_ROOT_LABEL};
pub use store::tree_store::{TreeError, TreeErrorKind, TreeResult, TreeStore};

/// Minimal health-check API for embedding hosts.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
