//! Domain model for the note organizer tree.
//!
//! # Responsibility
//! - Define the folder/file record shared by store, guard and persistence.
//! - Own the canonical empty-note placeholder.
//!
//! # Invariants
//! - Folders and files share one id space.
//! - Only files carry content and entity links.

pub mod note_item;
