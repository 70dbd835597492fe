//! Note organizer use cases.
//!
//! # Responsibility
//! - Navigation, breadcrumbs and the guarded delete protocol over `TreeStore`.
//! - Session facade wiring the store to a repository.

pub mod cascade_delete;
pub mod content_guard;
pub mod navigation;
pub mod note_tree_service;
pub mod path_resolver;
