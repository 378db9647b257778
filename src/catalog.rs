//! Schema introspection on top of [`SqlAccess::run_query`].
//!
//! Everything here reads `sqlite_master` (or the `pragma_table_info`
//! table-valued function) on each call; nothing is cached.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, ParseOptionError, Result};
use crate::result::TabularResult;
use crate::sqlite::SqlAccess;
use crate::value::SqlQuery;

const LIST_OBJECTS: &str = r"SELECT name FROM sqlite_master
WHERE type = ?1 AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
ORDER BY name";

const OBJECT_DDL: &str = "SELECT sql FROM sqlite_master WHERE type = ?1 AND name = ?2";

/// Column set reported by [`Catalog::describe_columns`].
pub const COLUMN_INFO_HEADER: [&str; 6] = ["cid", "name", "type", "notnull", "dflt_value", "pk"];

const COLUMN_INFO: &str = r#"SELECT cid, name, type, "notnull", dflt_value, pk
FROM pragma_table_info(?1)
ORDER BY cid"#;

/// Kind of schema object stored in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Table,
    View,
}

impl ObjectKind {
    /// Value of the `type` column in `sqlite_master`.
    pub const fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Table => "table",
            ObjectKind::View => "view",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "table" => Ok(ObjectKind::Table),
            "view" => Ok(ObjectKind::View),
            other => Err(ParseOptionError::new("object kind", other)),
        }
    }
}

/// Quote `name` as an SQL identifier. Only ever applied to names that
/// [`Catalog::resolve_object`] has already matched against the catalog.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Schema queries available on every [`SqlAccess`] implementation.
pub trait Catalog: SqlAccess {
    /// User tables ordered by name; `sqlite_*` internal tables are left out.
    fn list_tables(&self) -> Result<TabularResult> {
        self.list_objects(ObjectKind::Table)
    }

    /// Views ordered by name.
    fn list_views(&self) -> Result<TabularResult> {
        self.list_objects(ObjectKind::View)
    }

    fn list_objects(&self, kind: ObjectKind) -> Result<TabularResult> {
        self.run_query(&SqlQuery::new(LIST_OBJECTS).with_value(kind.as_str()))
    }

    /// Match `name` exactly against the live table and view listings.
    ///
    /// This is the only way a caller-supplied identifier reaches a statement
    /// in a position that cannot take a bound value.
    fn resolve_object(&self, name: &str) -> Result<ObjectKind> {
        for kind in [ObjectKind::Table, ObjectKind::View] {
            let listing = self.list_objects(kind)?;
            if listing.data().iter().any(|row| row[0] == name) {
                return Ok(kind);
            }
        }
        Err(AccessError::UnknownObject(name.to_string()))
    }

    /// One row per declared column, in declaration order, with the columns
    /// of [`COLUMN_INFO_HEADER`].
    fn describe_columns(&self, name: &str) -> Result<TabularResult> {
        self.resolve_object(name)?;
        self.run_query(&SqlQuery::new(COLUMN_INFO).with_value(name))
    }

    /// Stored `CREATE` statement of the object; a header-only result when
    /// there is no such object of that kind.
    fn object_ddl(&self, kind: ObjectKind, name: &str) -> Result<TabularResult> {
        self.run_query(
            &SqlQuery::new(OBJECT_DDL)
                .with_value(kind.as_str())
                .with_value(name),
        )
    }

    /// Rows of a table or view. `None` and `Some(0)` both return every row.
    fn sample_rows(&self, name: &str, limit: Option<u32>) -> Result<TabularResult> {
        self.resolve_object(name)?;
        let select = format!("SELECT * FROM {}", quote_identifier(name));
        let query = match limit.filter(|n| *n > 0) {
            Some(n) => SqlQuery::new(format!("{} LIMIT ?1", select)).with_value(n),
            None => SqlQuery::new(select),
        };
        self.run_query(&query)
    }

    fn row_count(&self, name: &str) -> Result<u64> {
        self.resolve_object(name)?;
        let counted = self.run_query(&SqlQuery::new(format!(
            "SELECT count(*) FROM {}",
            quote_identifier(name)
        )))?;
        let cell = counted.first_row().map(|row| row[0].as_str()).unwrap_or("0");
        cell.parse().map_err(|err| {
            AccessError::Statement(rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(err),
            ))
        })
    }
}

impl<T: SqlAccess + ?Sized> Catalog for T {}
