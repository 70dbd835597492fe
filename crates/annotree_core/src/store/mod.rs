//! In-memory ownership of the note tree.
//!
//! # Responsibility
//! - Hold every note item of one session keyed by id.
//! - Enforce hierarchy invariants on every mutation.
//!
//! # Invariants
//! - Parents are existing folders; the parent relation is acyclic.
//! - No operation is observable half-applied.

pub mod tree_store;
