//! Persistence contracts for note trees.
//!
//! # Responsibility
//! - Define keyed CRUD over note items behind one trait.
//! - Keep SQL details out of the store and the delete protocol.
//!
//! # Invariants
//! - Repositories never validate hierarchy themselves; `TreeStore` does.
//! - Multi-item deletes are atomic.

pub mod note_repo;
