//! Parameterized SQLite access with schema introspection.
//!
//! # Intention
//!
//! - Give the web layer one way to read and write its SQLite database:
//!   statement text plus bound values in, rows of text or a typed error out.
//! - Open a connection per operation and release it on every exit path.
//! - Describe the live schema (tables, views, columns, DDL) from the
//!   database's own catalog.
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code and the per-session list state that pages
//!   through query results belong here.
//! - No routing, templating or business rules.
//!
//! # Example
//! ```no_run
//! use sqlite_access::{SqlAccess, SqlQuery, SqliteAccess};
//!
//! let db = SqliteAccess::open("FlaskWebsite.db");
//! let users = db.run_query(
//!     &SqlQuery::new("SELECT Username, Admin FROM Users WHERE Username = ?").with_value("alice"),
//! )?;
//! for row in users.data() {
//!     println!("{} admin={}", row[0], row[1]);
//! }
//! # Ok::<(), sqlite_access::AccessError>(())
//! ```

pub mod browse;
pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod paging;
pub mod result;
pub mod session;
pub mod sqlite;
pub mod value;

pub use catalog::{Catalog, ObjectKind};
pub use config::SqliteConfig;
pub use error::{is_error_payload, AccessError, ErrorKind, ParseOptionError, Result, ERROR_MARKER};
pub use paging::{PageAction, Pager};
pub use result::{TabularResult, UpdateOutcome};
pub use session::{SessionContext, SessionRegistry};
pub use sqlite::{SqlAccess, SqliteAccess, Target};
pub use value::{Params, SqlQuery, Value};
