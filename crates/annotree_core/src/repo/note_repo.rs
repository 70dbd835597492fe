//! Note item repository contracts plus SQLite and in-memory implementations.
//!
//! # Responsibility
//! - Load a full tree snapshot and write single-item changes back.
//! - Store entity links as an opaque JSON array.
//!
//! # Invariants
//! - `delete_items` removes every listed id in one transaction.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::note_item::{NoteBody, NoteId, NoteItem, NoteLink};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_ITEM_COLUMNS: [&str; 8] = [
    "id",
    "kind",
    "parent_id",
    "name",
    "content",
    "links_json",
    "created_at",
    "updated_at",
];

pub type NoteRepoResult<T> = Result<T, NoteRepoError>;

/// Errors from note repository operations.
#[derive(Debug)]
pub enum NoteRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target row does not exist.
    NotFound(NoteId),
    /// Insert target id is already stored.
    AlreadyExists(NoteId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Links could not be encoded or decoded.
    Serialization(serde_json::Error),
    /// Persisted data cannot be converted to a valid item.
    InvalidData(String),
}

impl Display for NoteRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note row not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "note row already exists: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "note repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "note repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "note repository requires column `{column}` in table `{table}`"
            ),
            Self::Serialization(err) => write!(f, "note links serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid note data: {message}"),
        }
    }
}

impl Error for NoteRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::NotFound(_)
            | Self::AlreadyExists(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for NoteRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for NoteRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for NoteRepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Keyed persistence for note items.
pub trait NoteRepository {
    /// Loads every stored item.
    fn load_all(&self) -> NoteRepoResult<Vec<NoteItem>>;
    /// Inserts one new item. Its parent must already be stored.
    ///
    /// An id that is already stored fails with `AlreadyExists`.
    fn insert_item(&self, item: &NoteItem) -> NoteRepoResult<()>;
    /// Overwrites name, content, links and timestamps of one item.
    fn update_item(&self, item: &NoteItem) -> NoteRepoResult<()>;
    /// Deletes all listed items atomically.
    fn delete_items(&self, ids: &[NoteId]) -> NoteRepoResult<()>;
}

/// Repository that keeps items in process memory only.
#[derive(Debug, Default)]
pub struct InMemoryNoteRepository {
    items: RefCell<HashMap<NoteId, NoteItem>>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-filled with a snapshot.
    pub fn with_items(items: impl IntoIterator<Item = NoteItem>) -> Self {
        Self {
            items: RefCell::new(items.into_iter().map(|item| (item.id, item)).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl NoteRepository for InMemoryNoteRepository {
    fn load_all(&self) -> NoteRepoResult<Vec<NoteItem>> {
        let mut items: Vec<NoteItem> = self.items.borrow().values().cloned().collect();
        items.sort_by_key(|item| (item.created_at, item.id));
        Ok(items)
    }

    fn insert_item(&self, item: &NoteItem) -> NoteRepoResult<()> {
        let mut items = self.items.borrow_mut();
        if items.contains_key(&item.id) {
            return Err(NoteRepoError::AlreadyExists(item.id));
        }
        items.insert(item.id, item.clone());
        Ok(())
    }

    fn update_item(&self, item: &NoteItem) -> NoteRepoResult<()> {
        let mut items = self.items.borrow_mut();
        let stored = items
            .get_mut(&item.id)
            .ok_or(NoteRepoError::NotFound(item.id))?;
        *stored = item.clone();
        Ok(())
    }

    fn delete_items(&self, ids: &[NoteId]) -> NoteRepoResult<()> {
        let mut items = self.items.borrow_mut();
        for id in ids {
            items.remove(id);
        }
        Ok(())
    }
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> NoteRepoResult<Self> {
        ensure_note_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn load_all(&self) -> NoteRepoResult<Vec<NoteItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                kind,
                parent_id,
                name,
                content,
                links_json,
                created_at,
                updated_at
             FROM note_items
             ORDER BY created_at ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_note_item_row(row)?);
        }
        Ok(items)
    }

    fn insert_item(&self, item: &NoteItem) -> NoteRepoResult<()> {
        let (kind, content, links_json) = encode_body(&item.body)?;
        self.conn.execute(
            "INSERT INTO note_items (
                id,
                kind,
                parent_id,
                name,
                content,
                links_json,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                item.id.to_string(),
                kind,
                item.parent_id.map(|value| value.to_string()),
                item.name.as_str(),
                content,
                links_json,
                item.created_at,
                item.updated_at,
            ],
        )
        .map_err(|err| map_insert_error(err, item.id))?;
        Ok(())
    }

    fn update_item(&self, item: &NoteItem) -> NoteRepoResult<()> {
        let (kind, content, links_json) = encode_body(&item.body)?;
        let changed = self.conn.execute(
            "UPDATE note_items
             SET name = ?2,
                 content = ?3,
                 links_json = ?4,
                 updated_at = ?5
             WHERE id = ?1
               AND kind = ?6;",
            params![
                item.id.to_string(),
                item.name.as_str(),
                content,
                links_json,
                item.updated_at,
                kind,
            ],
        )?;
        if changed == 0 {
            return Err(NoteRepoError::NotFound(item.id));
        }
        Ok(())
    }

    fn delete_items(&self, ids: &[NoteId]) -> NoteRepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare("DELETE FROM note_items WHERE id = ?1;")?;
            for id in ids {
                // Descendants may already be gone through ON DELETE CASCADE.
                stmt.execute([id.to_string()])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn map_insert_error(err: rusqlite::Error, id: NoteId) -> NoteRepoError {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            NoteRepoError::AlreadyExists(id)
        }
        other => other.into(),
    }
}

fn encode_body(body: &NoteBody) -> NoteRepoResult<(&'static str, Option<&str>, Option<String>)> {
    match body {
        NoteBody::Folder => Ok(("folder", None, None)),
        NoteBody::File { content, links } => {
            let links_json = if links.is_empty() {
                None
            } else {
                Some(serde_json::to_string(links)?)
            };
            Ok(("file", Some(content.as_str()), links_json))
        }
    }
}

fn parse_note_item_row(row: &Row<'_>) -> NoteRepoResult<NoteItem> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "note_items.id")?;
    let parent_id = row
        .get::<_, Option<String>>("parent_id")?
        .map(|value| parse_uuid(&value, "note_items.parent_id"))
        .transpose()?;

    let kind: String = row.get("kind")?;
    let body = match kind.as_str() {
        "folder" => NoteBody::Folder,
        "file" => {
            let content: Option<String> = row.get("content")?;
            let content = content.ok_or_else(|| {
                NoteRepoError::InvalidData(format!("file {id} has NULL note_items.content"))
            })?;
            let links = match row.get::<_, Option<String>>("links_json")? {
                Some(json) => serde_json::from_str::<Vec<NoteLink>>(&json)?,
                None => Vec::new(),
            };
            NoteBody::File { content, links }
        }
        other => {
            return Err(NoteRepoError::InvalidData(format!(
                "invalid note kind `{other}` in note_items.kind"
            )));
        }
    };

    Ok(NoteItem {
        id,
        name: row.get("name")?,
        parent_id,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        body,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> NoteRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| NoteRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_note_connection_ready(conn: &Connection) -> NoteRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(NoteRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "note_items")? {
        return Err(NoteRepoError::MissingRequiredTable("note_items"));
    }
    for column in NOTE_ITEM_COLUMNS {
        if !table_has_column(conn, "note_items", column)? {
            return Err(NoteRepoError::MissingRequiredColumn {
                table: "note_items",
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> NoteRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> NoteRepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
