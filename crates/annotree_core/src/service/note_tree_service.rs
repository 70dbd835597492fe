//! Note tree session service.
//!
//! # Responsibility
//! - Own one store, one navigation cursor and one repository per session.
//! - Route every mutation through the store, then write it through.
//! - Run the guarded delete protocol and keep the cursor valid afterwards.
//!
//! # Invariants
//! - Store and repository agree after every call; a failed write rolls the
//!   store change back.
//! - New items are created in the folder the cursor is showing.
//! - Logs carry ids and counts only, never names or content.

use crate::config::AnnotreeConfig;
use crate::model::note_item::{NoteId, NoteItem, NoteKind, NoteLink};
use crate::repo::note_repo::{NoteRepoError, NoteRepository};
use crate::service::cascade_delete::{
    begin_delete, DeleteConfirmation, DeleteOutcome, DeleteReport, DeleteResolution,
    PendingDelete,
};
use crate::service::content_guard::has_meaningful_content;
use crate::service::navigation::NavigationCursor;
use crate::service::path_resolver::PathResolver;
use crate::store::tree_store::{TreeError, TreeStore};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from session service operations.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Hierarchy, validation or lookup failure.
    Tree(TreeError),
    /// Persistence failure; the in-memory change was rolled back.
    Repo(NoteRepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tree(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<TreeError> for NoteServiceError {
    fn from(value: TreeError) -> Self {
        Self::Tree(value)
    }
}

impl From<NoteRepoError> for NoteServiceError {
    fn from(value: NoteRepoError) -> Self {
        Self::Repo(value)
    }
}

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Note organizer facade for one editing session.
pub struct NoteTreeService<R: NoteRepository> {
    repo: R,
    store: TreeStore,
    cursor: NavigationCursor,
    resolver: PathResolver,
}

impl<R: NoteRepository> NoteTreeService<R> {
    /// Loads the persisted tree and positions the cursor at the root.
    ///
    /// # Errors
    /// - Repository read failures.
    /// - Snapshots breaking hierarchy invariants (duplicate ids, bad
    ///   parents, cycles).
    pub fn open(repo: R, config: &AnnotreeConfig) -> NoteServiceResult<Self> {
        let items = repo.load_all()?;
        let store = TreeStore::from_items(items).map_err(|err| {
            error!(
                "event=session_open module=service status=error error_code=invalid_snapshot error={err}"
            );
            err
        })?;
        info!(
            "event=session_open module=service status=ok item_count={}",
            store.len()
        );
        Ok(Self {
            repo,
            store,
            cursor: NavigationCursor::new(),
            resolver: PathResolver::new(config.root_label.as_str()),
        })
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn cursor(&self) -> &NavigationCursor {
        &self.cursor
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Ends the session and hands the repository back.
    pub fn into_repository(self) -> R {
        self.repo
    }

    pub fn item(&self, id: NoteId) -> Option<&NoteItem> {
        self.store.get(id)
    }

    /// Items in the folder the cursor is showing.
    pub fn list_current(&self) -> Vec<&NoteItem> {
        self.cursor.list_current(&self.store)
    }

    pub fn list(&self, parent_id: Option<NoteId>) -> Vec<&NoteItem> {
        self.store.list(parent_id)
    }

    /// Breadcrumb of the current folder, root label first.
    pub fn breadcrumb(&self) -> Vec<String> {
        self.resolver.resolve(&self.store, &self.cursor)
    }

    /// Breadcrumb of any item, ending with its own name.
    pub fn item_path(&self, id: NoteId) -> NoteServiceResult<Vec<String>> {
        Ok(self.resolver.resolve_item(&self.store, id)?)
    }

    pub fn enter(&mut self, folder_id: NoteId) -> NoteServiceResult<()> {
        self.cursor.enter(&self.store, folder_id)?;
        Ok(())
    }

    pub fn back(&mut self) -> Option<NoteId> {
        self.cursor.back()
    }

    pub fn create_folder(&mut self, name: &str) -> NoteServiceResult<NoteId> {
        self.create(name, NoteKind::Folder)
    }

    pub fn create_file(&mut self, name: &str) -> NoteServiceResult<NoteId> {
        self.create(name, NoteKind::File)
    }

    pub fn rename(&mut self, id: NoteId, new_name: &str) -> NoteServiceResult<()> {
        let previous = self.snapshot(id)?;
        self.store.rename(id, new_name)?;
        self.persist_update(previous, "note_rename")
    }

    pub fn update_content(&mut self, id: NoteId, content: impl Into<String>) -> NoteServiceResult<()> {
        let previous = self.snapshot(id)?;
        self.store.update_content(id, content)?;
        self.persist_update(previous, "note_update_content")
    }

    pub fn update_links(&mut self, id: NoteId, links: Vec<NoteLink>) -> NoteServiceResult<()> {
        let previous = self.snapshot(id)?;
        self.store.update_links(id, links)?;
        self.persist_update(previous, "note_update_links")
    }

    pub fn has_meaningful_content(&self, id: NoteId) -> NoteServiceResult<bool> {
        Ok(has_meaningful_content(&self.store, id)?)
    }

    /// Starts the delete protocol for one item.
    ///
    /// Empty items are deleted and persisted immediately; items with content
    /// come back as a pending delete awaiting [`Self::confirm_delete`] or
    /// [`Self::cancel_delete`].
    pub fn request_delete(&mut self, id: NoteId) -> NoteServiceResult<DeleteOutcome> {
        match begin_delete(&mut self.store, id)? {
            DeleteOutcome::Deleted(report) => {
                self.persist_delete(report).map(DeleteOutcome::Deleted)
            }
            DeleteOutcome::NeedsConfirmation(pending) => {
                info!(
                    "event=note_delete module=service status=pending target={} kind={}",
                    pending.target(),
                    pending.kind().as_str()
                );
                Ok(DeleteOutcome::NeedsConfirmation(pending))
            }
        }
    }

    pub fn confirm_delete(&mut self, pending: PendingDelete) -> NoteServiceResult<DeleteReport> {
        let report = pending.confirm(&mut self.store)?;
        self.persist_delete(report)
    }

    pub fn cancel_delete(&mut self, pending: PendingDelete) {
        info!(
            "event=note_delete module=service status=cancelled target={}",
            pending.target()
        );
        pending.cancel();
    }

    /// Runs the delete protocol, asking `confirmation` when content is at stake.
    pub fn delete_with_confirmation(
        &mut self,
        id: NoteId,
        confirmation: &mut impl DeleteConfirmation,
    ) -> NoteServiceResult<DeleteResolution> {
        match self.request_delete(id)? {
            DeleteOutcome::Deleted(report) => Ok(DeleteResolution::Deleted(report)),
            DeleteOutcome::NeedsConfirmation(pending) => {
                if confirmation.confirm(pending.name(), pending.kind()) {
                    self.confirm_delete(pending).map(DeleteResolution::Deleted)
                } else {
                    self.cancel_delete(pending);
                    Ok(DeleteResolution::Cancelled)
                }
            }
        }
    }

    fn create(&mut self, name: &str, kind: NoteKind) -> NoteServiceResult<NoteId> {
        let parent_id = self.cursor.current_folder();
        let id = self.store.create(name, kind, parent_id).map_err(|err| {
            warn!(
                "event=note_create module=service status=rejected kind={} error={err}",
                kind.as_str()
            );
            err
        })?;
        let item = self.snapshot(id)?;

        if let Err(err) = self.repo.insert_item(&item) {
            self.store.remove_subtree(id)?;
            error!(
                "event=note_create module=service status=error kind={} id={id} error_code=persist_failed error={err}",
                kind.as_str()
            );
            return Err(err.into());
        }

        info!(
            "event=note_create module=service status=ok kind={} id={id} parent={}",
            kind.as_str(),
            parent_id.map_or_else(|| "root".to_string(), |parent| parent.to_string())
        );
        Ok(id)
    }

    fn snapshot(&self, id: NoteId) -> NoteServiceResult<NoteItem> {
        self.store
            .get(id)
            .cloned()
            .ok_or(NoteServiceError::Tree(TreeError::NodeNotFound(id)))
    }

    fn persist_update(&mut self, previous: NoteItem, event: &'static str) -> NoteServiceResult<()> {
        let id = previous.id;
        let current = self.snapshot(id)?;
        if let Err(err) = self.repo.update_item(&current) {
            self.store.replace(previous)?;
            error!(
                "event={event} module=service status=error id={id} error_code=persist_failed error={err}"
            );
            return Err(err.into());
        }
        info!("event={event} module=service status=ok id={id}");
        Ok(())
    }

    fn persist_delete(&mut self, report: DeleteReport) -> NoteServiceResult<DeleteReport> {
        let ids = report.removed_ids();
        if let Err(err) = self.repo.delete_items(&ids) {
            error!(
                "event=note_delete module=service status=error target={} error_code=persist_failed error={err}",
                report.target
            );
            self.store.restore(report.removed)?;
            return Err(err.into());
        }

        if self.cursor.reconcile(&self.store) {
            warn!(
                "event=cursor_reconcile module=service status=truncated depth={}",
                self.cursor.depth()
            );
        }
        info!(
            "event=note_delete module=service status=ok target={} removed_count={}",
            report.target,
            report.removed_count()
        );
        Ok(report)
    }
}
