use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::{params_from_iter, Connection, OpenFlags};
use tracing::{debug, trace, warn};

use crate::config::SqliteConfig;
use crate::error::{AccessError, Result};
use crate::format;
use crate::result::{TabularResult, UpdateOutcome};
use crate::value::SqlQuery;

/// Read and write primitives every other database helper is built on.
///
/// Collaborators take an implementation of this trait instead of reaching
/// for a process-wide instance, so they can be exercised against a fixture
/// database.
pub trait SqlAccess {
    /// Execute one statement and return its rows as text.
    fn run_query(&self, query: &SqlQuery) -> Result<TabularResult>;

    /// Execute and commit one write statement.
    fn run_update(&self, query: &SqlQuery) -> Result<UpdateOutcome>;
}

/// The database an access handle operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    /// Named in-memory database shared by every connection of the process.
    SharedMemory(String),
}

impl Target {
    fn open(&self) -> rusqlite::Result<Connection> {
        match self {
            Target::File(path) => Connection::open(path),
            Target::SharedMemory(name) => Connection::open_with_flags(
                format!("file:{}?mode=memory&cache=shared", name),
                OpenFlags::default(),
            ),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::File(path) => write!(f, "{}", path.display()),
            Target::SharedMemory(name) => write!(f, "memory:{}", name),
        }
    }
}

#[derive(Debug)]
struct Inner {
    config: SqliteConfig,
    target: Target,
    target_name: String,
    open: AtomicUsize,
    // Keeps a shared in-memory database alive between operations.
    _anchor: Option<Mutex<Connection>>,
}

/// Handle on a single SQLite database.
///
/// No connection is held between calls: every operation opens its own,
/// runs exactly one statement and closes it again before returning, on
/// success and on failure alike. Clones share the same target and
/// connection counter.
#[derive(Debug, Clone)]
pub struct SqliteAccess {
    inner: Arc<Inner>,
}

impl SqliteAccess {
    /// Create a new handle from the given config
    pub fn new(config: SqliteConfig) -> Self {
        let target = Target::File(config.db_path.clone());
        Self::with_target(config, target, None)
    }

    /// Handle on the database file at `path` with default settings.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::new(SqliteConfig::new(path.as_ref()))
    }

    /// Handle on a named in-memory database that lives as long as the
    /// handle (and its clones).
    pub fn shared_memory(name: &str) -> Result<Self> {
        let target = Target::SharedMemory(name.to_string());
        let anchor = target.open().map_err(|source| AccessError::Connection {
            target: target.to_string(),
            source,
        })?;
        Ok(Self::with_target(
            SqliteConfig::new(name),
            target,
            Some(Mutex::new(anchor)),
        ))
    }

    fn with_target(config: SqliteConfig, target: Target, anchor: Option<Mutex<Connection>>) -> Self {
        let target_name = target.to_string();
        Self {
            inner: Arc::new(Inner {
                config,
                target,
                target_name,
                open: AtomicUsize::new(0),
                _anchor: anchor,
            }),
        }
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.inner.config
    }

    pub fn target(&self) -> &Target {
        &self.inner.target
    }

    /// Connections currently held by in-flight operations of this handle.
    pub fn open_connections(&self) -> usize {
        self.inner.open.load(Ordering::SeqCst)
    }

    fn connect(&self) -> Result<OpenConnection<'_>> {
        let name = self.inner.target_name.as_str();
        let conn = self
            .inner
            .target
            .open()
            .map_err(|source| {
                warn!(db = name, error = %source, "failed to open database");
                AccessError::Connection {
                    target: name.to_string(),
                    source,
                }
            })?;
        let guard = OpenConnection::new(conn, &self.inner.open, name);
        let timeout = Duration::from_millis(self.inner.config.busy_timeout_ms);
        guard
            .busy_timeout(timeout)
            .map_err(|err| self.engine_error(err))?;
        Ok(guard)
    }

    fn engine_error(&self, err: rusqlite::Error) -> AccessError {
        let err = AccessError::from_engine(&self.inner.target_name, err);
        warn!(db = %self.inner.target_name, kind = ?err.kind(), error = %err, "statement failed");
        err
    }
}

impl SqlAccess for SqliteAccess {
    fn run_query(&self, query: &SqlQuery) -> Result<TabularResult> {
        let conn = self.connect()?;
        debug!(
            db = %self.inner.target_name,
            statement = %query.statement,
            params = query.params.len(),
            "running query"
        );
        let table = conn
            .prepare(&query.statement)
            .and_then(|mut stmt| format::tabulate(&mut stmt, params_from_iter(query.params.iter())));
        table.map_err(|err| self.engine_error(err))
    }

    fn run_update(&self, query: &SqlQuery) -> Result<UpdateOutcome> {
        let mut conn = self.connect()?;
        debug!(
            db = %self.inner.target_name,
            statement = %query.statement,
            params = query.params.len(),
            "running update"
        );
        execute_committed(&mut conn, query).map_err(|err| self.engine_error(err))
    }
}

/// Run one statement inside its own transaction. The transaction rolls back
/// when dropped, so nothing is visible to other readers unless the commit
/// succeeded.
fn execute_committed(conn: &mut Connection, query: &SqlQuery) -> rusqlite::Result<UpdateOutcome> {
    let tx = conn.transaction()?;
    let changes = tx.execute(&query.statement, params_from_iter(query.params.iter()))?;
    let last_insert_rowid = tx.last_insert_rowid();
    tx.commit()?;
    Ok(UpdateOutcome {
        last_insert_rowid,
        changes,
    })
}

/// A connection counted against its handle until dropped.
struct OpenConnection<'a> {
    conn: Connection,
    counter: &'a AtomicUsize,
    target: &'a str,
}

impl<'a> OpenConnection<'a> {
    fn new(conn: Connection, counter: &'a AtomicUsize, target: &'a str) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        trace!(db = target, "connection opened");
        Self {
            conn,
            counter,
            target,
        }
    }
}

impl Deref for OpenConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl DerefMut for OpenConnection<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl Drop for OpenConnection<'_> {
    // The connection itself closes right after this, when the field drops.
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
        trace!(db = self.target, "connection released");
    }
}
