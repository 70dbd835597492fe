use annotree_core::db::open_db_in_memory;
use annotree_core::{
    AnnotreeConfig, DeleteOutcome, DeleteResolution, InMemoryNoteRepository, NoteId, NoteItem,
    NoteKind, NoteLink, NoteRepoError, NoteRepoResult, NoteRepository, NoteServiceError,
    NoteTreeService, SqliteNoteRepository, TreeError, DEFAULT_ROOT_LABEL,
};
use std::cell::Cell;

/// In-memory repository whose writes can be switched to fail.
#[derive(Default)]
struct FlakyRepository {
    inner: InMemoryNoteRepository,
    fail_writes: Cell<bool>,
}

impl FlakyRepository {
    fn check(&self) -> NoteRepoResult<()> {
        if self.fail_writes.get() {
            return Err(NoteRepoError::InvalidData("disk unavailable".to_string()));
        }
        Ok(())
    }
}

impl NoteRepository for FlakyRepository {
    fn load_all(&self) -> NoteRepoResult<Vec<NoteItem>> {
        self.inner.load_all()
    }

    fn insert_item(&self, item: &NoteItem) -> NoteRepoResult<()> {
        self.check()?;
        self.inner.insert_item(item)
    }

    fn update_item(&self, item: &NoteItem) -> NoteRepoResult<()> {
        self.check()?;
        self.inner.update_item(item)
    }

    fn delete_items(&self, ids: &[NoteId]) -> NoteRepoResult<()> {
        self.check()?;
        self.inner.delete_items(ids)
    }
}

fn open_memory_service() -> NoteTreeService<InMemoryNoteRepository> {
    NoteTreeService::open(InMemoryNoteRepository::new(), &AnnotreeConfig::default()).unwrap()
}

#[test]
fn create_places_items_in_current_folder() {
    let mut service = open_memory_service();
    let folder = service.create_folder("Ideias Principais").unwrap();
    service.enter(folder).unwrap();
    let file = service.create_file("Personagens Secundários").unwrap();

    assert_eq!(service.item(file).unwrap().parent_id, Some(folder));
    let listed: Vec<_> = service.list_current().iter().map(|item| item.id).collect();
    assert_eq!(listed, vec![file]);
    assert_eq!(
        service.breadcrumb(),
        vec![DEFAULT_ROOT_LABEL.to_string(), "Ideias Principais".to_string()]
    );
    assert_eq!(
        service.item_path(file).unwrap(),
        vec![
            DEFAULT_ROOT_LABEL.to_string(),
            "Ideias Principais".to_string(),
            "Personagens Secundários".to_string()
        ]
    );
    assert_eq!(service.repository().len(), 2);
}

#[test]
fn blank_name_is_rejected_before_reaching_repository() {
    let mut service = open_memory_service();
    let err = service.create_file("  ").unwrap_err();
    assert!(matches!(err, NoteServiceError::Tree(TreeError::InvalidName)));
    assert!(service.store().is_empty());
    assert!(service.repository().is_empty());
}

#[test]
fn sqlite_session_persists_across_reopen() {
    let conn = open_db_in_memory().unwrap();
    let config = AnnotreeConfig {
        root_label: "Notes".to_string(),
        ..AnnotreeConfig::default()
    };

    let (folder, file) = {
        let repo = SqliteNoteRepository::try_new(&conn).unwrap();
        let mut service = NoteTreeService::open(repo, &config).unwrap();
        let folder = service.create_folder("Notas Gerais").unwrap();
        service.enter(folder).unwrap();
        let file = service.create_file("Sistema de Magia").unwrap();
        service.update_content(file, "<h1>Magia</h1>").unwrap();
        service
            .update_links(
                file,
                vec![NoteLink {
                    link_id: "link-1".to_string(),
                    entity_type: "character".to_string(),
                    entity_id: "elena".to_string(),
                    created_at: 1_705_000_000_000,
                }],
            )
            .unwrap();
        service.rename(folder, "Worldbuilding").unwrap();
        (folder, file)
    };

    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let service = NoteTreeService::open(repo, &config).unwrap();
    assert_eq!(service.store().len(), 2);
    assert_eq!(service.item(folder).unwrap().name, "Worldbuilding");
    let reloaded = service.item(file).unwrap();
    assert_eq!(reloaded.content(), Some("<h1>Magia</h1>"));
    assert_eq!(reloaded.links().unwrap().len(), 1);
    assert_eq!(
        service.item_path(file).unwrap(),
        vec![
            "Notes".to_string(),
            "Worldbuilding".to_string(),
            "Sistema de Magia".to_string()
        ]
    );
}

#[test]
fn confirmed_delete_removes_subtree_from_repository_and_resets_cursor() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut service = NoteTreeService::open(repo, &AnnotreeConfig::default()).unwrap();

    let a = service.create_folder("A").unwrap();
    service.enter(a).unwrap();
    let b = service.create_folder("B").unwrap();
    service.enter(b).unwrap();
    let doc = service.create_file("doc").unwrap();
    service.update_content(doc, "hello").unwrap();

    let DeleteOutcome::NeedsConfirmation(pending) = service.request_delete(a).unwrap() else {
        panic!("folder with content must wait for confirmation");
    };
    assert_eq!(service.store().len(), 3);

    let report = service.confirm_delete(pending).unwrap();
    assert_eq!(report.removed_count(), 3);
    assert!(service.cursor().is_at_root());
    assert_eq!(service.breadcrumb(), vec![DEFAULT_ROOT_LABEL.to_string()]);
    assert!(service.list(None).is_empty());

    let persisted = SqliteNoteRepository::try_new(&conn)
        .unwrap()
        .load_all()
        .unwrap();
    assert!(persisted.is_empty());
}

#[test]
fn cancelled_delete_keeps_everything() {
    let mut service = open_memory_service();
    let file = service.create_file("draft").unwrap();
    service.update_content(file, "once upon a time").unwrap();

    let mut decline = |_: &str, _: NoteKind| false;
    let resolution = service.delete_with_confirmation(file, &mut decline).unwrap();
    assert_eq!(resolution, DeleteResolution::Cancelled);
    assert!(service.item(file).is_some());
    assert_eq!(service.repository().len(), 1);

    let DeleteOutcome::NeedsConfirmation(pending) = service.request_delete(file).unwrap() else {
        panic!("file with content must wait for confirmation");
    };
    service.cancel_delete(pending);
    assert!(service.item(file).is_some());
}

#[test]
fn failed_writes_roll_back_the_store() {
    let repo = FlakyRepository::default();
    let mut service = NoteTreeService::open(repo, &AnnotreeConfig::default()).unwrap();
    let folder = service.create_folder("A").unwrap();
    let file = service.create_file("doc").unwrap();
    let before = service.item(file).unwrap().clone();

    service.repository().fail_writes.set(true);

    let err = service.create_folder("B").unwrap_err();
    assert!(matches!(err, NoteServiceError::Repo(_)));
    assert_eq!(service.store().len(), 2);

    let err = service.update_content(file, "lost words").unwrap_err();
    assert!(matches!(err, NoteServiceError::Repo(_)));
    assert_eq!(service.item(file), Some(&before));

    let err = service.rename(folder, "Renamed").unwrap_err();
    assert!(matches!(err, NoteServiceError::Repo(_)));
    assert_eq!(service.item(folder).unwrap().name, "A");

    let err = service.request_delete(folder).unwrap_err();
    assert!(matches!(err, NoteServiceError::Repo(_)));
    assert!(service.item(folder).is_some());
    assert_eq!(service.store().len(), 2);

    service.repository().fail_writes.set(false);
    let outcome = service.request_delete(folder).unwrap();
    assert!(matches!(outcome, DeleteOutcome::Deleted(_)));
    assert_eq!(service.into_repository().inner.len(), 1);
}

#[test]
fn open_rejects_corrupt_snapshot() {
    let folder = NoteItem::new_folder("A", None);
    let file = NoteItem::new_file("doc", None);
    let child_of_file = NoteItem::new_folder("bad", Some(file.id));
    let repo = InMemoryNoteRepository::with_items(vec![folder, file.clone(), child_of_file]);

    let err = NoteTreeService::open(repo, &AnnotreeConfig::default())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        NoteServiceError::Tree(TreeError::ParentMustBeFolder(id)) if id == file.id
    ));
}
