//! Guarded cascade deletion.
//!
//! # Responsibility
//! - Run the delete protocol: guard check, optional confirmation, removal.
//! - Remove a target together with its whole subtree in one step.
//!
//! # Invariants
//! - Targets with meaningful content are never removed without confirmation.
//! - Cancelling a pending delete leaves the store untouched.
//! - Removal is all-or-nothing; no partial subtree is observable.

use crate::model::note_item::{NoteId, NoteItem, NoteKind};
use crate::service::content_guard::has_meaningful_content;
use crate::store::tree_store::{TreeError, TreeResult, TreeStore};

/// Phase of one delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePhase {
    Idle,
    PendingConfirmation,
    /// Confirmation accepted, removal not yet run. Both happen inside
    /// [`PendingDelete::confirm`], so callers see this phase only through
    /// [`DeleteReport::phases`].
    Confirmed,
    Executed,
}

/// Summary of an executed delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    /// Item the delete was requested for.
    pub target: NoteId,
    /// Every removed item, target included. Order is unspecified.
    pub removed: Vec<NoteItem>,
    /// Whether the delete went through an explicit confirmation.
    pub confirmed: bool,
}

impl DeleteReport {
    pub fn removed_ids(&self) -> Vec<NoteId> {
        self.removed.iter().map(|item| item.id).collect()
    }

    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// Phases the request passed through after leaving idle, in order.
    pub fn phases(&self) -> Vec<DeletePhase> {
        if self.confirmed {
            vec![
                DeletePhase::PendingConfirmation,
                DeletePhase::Confirmed,
                DeletePhase::Executed,
            ]
        } else {
            vec![DeletePhase::Executed]
        }
    }
}

/// Delete waiting for an external yes/no decision.
///
/// Dropping the token is equivalent to [`PendingDelete::cancel`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending delete does nothing until confirmed"]
pub struct PendingDelete {
    target: NoteId,
    name: String,
    kind: NoteKind,
}

impl PendingDelete {
    pub fn target(&self) -> NoteId {
        self.target
    }

    /// Display name shown in the confirmation dialog.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NoteKind {
        self.kind
    }

    pub fn phase(&self) -> DeletePhase {
        DeletePhase::PendingConfirmation
    }

    /// Executes the delete after the user confirmed it.
    ///
    /// # Errors
    /// - `NodeNotFound` when the target disappeared while pending.
    pub fn confirm(self, store: &mut TreeStore) -> TreeResult<DeleteReport> {
        execute_delete(store, self.target, true)
    }

    /// Abandons the delete; returns the protocol to idle.
    pub fn cancel(self) -> DeletePhase {
        DeletePhase::Idle
    }
}

/// Result of starting a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Guard was clear; the subtree is gone.
    Deleted(DeleteReport),
    /// Guard found content; the caller must confirm or cancel.
    NeedsConfirmation(PendingDelete),
}

impl DeleteOutcome {
    pub fn phase(&self) -> DeletePhase {
        match self {
            Self::Deleted(_) => DeletePhase::Executed,
            Self::NeedsConfirmation(_) => DeletePhase::PendingConfirmation,
        }
    }
}

/// Final result of a delete driven through a confirmation collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteResolution {
    Deleted(DeleteReport),
    Cancelled,
}

impl DeleteResolution {
    pub fn phase(&self) -> DeletePhase {
        match self {
            Self::Deleted(_) => DeletePhase::Executed,
            Self::Cancelled => DeletePhase::Idle,
        }
    }
}

/// Confirmation dialog boundary.
pub trait DeleteConfirmation {
    /// Asks whether the named item (and its subtree) may be deleted.
    fn confirm(&mut self, name: &str, kind: NoteKind) -> bool;
}

impl<F> DeleteConfirmation for F
where
    F: FnMut(&str, NoteKind) -> bool,
{
    fn confirm(&mut self, name: &str, kind: NoteKind) -> bool {
        self(name, kind)
    }
}

/// Starts the delete protocol for `id`.
///
/// Items without meaningful content are removed right away; others come back
/// as a [`PendingDelete`].
pub fn begin_delete(store: &mut TreeStore, id: NoteId) -> TreeResult<DeleteOutcome> {
    let item = store.get(id).ok_or(TreeError::NodeNotFound(id))?;
    if has_meaningful_content(store, id)? {
        return Ok(DeleteOutcome::NeedsConfirmation(PendingDelete {
            target: id,
            name: item.name.clone(),
            kind: item.kind(),
        }));
    }
    execute_delete(store, id, false).map(DeleteOutcome::Deleted)
}

/// Runs the whole protocol, asking `confirmation` when the guard trips.
pub fn delete_with_confirmation(
    store: &mut TreeStore,
    id: NoteId,
    confirmation: &mut impl DeleteConfirmation,
) -> TreeResult<DeleteResolution> {
    match begin_delete(store, id)? {
        DeleteOutcome::Deleted(report) => Ok(DeleteResolution::Deleted(report)),
        DeleteOutcome::NeedsConfirmation(pending) => {
            if confirmation.confirm(pending.name(), pending.kind()) {
                pending.confirm(store).map(DeleteResolution::Deleted)
            } else {
                pending.cancel();
                Ok(DeleteResolution::Cancelled)
            }
        }
    }
}

fn execute_delete(store: &mut TreeStore, id: NoteId, confirmed: bool) -> TreeResult<DeleteReport> {
    let removed = store.remove_subtree(id)?;
    Ok(DeleteReport {
        target: id,
        removed,
        confirmed,
    })
}
