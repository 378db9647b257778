//! Helpers behind the database schema browser screen.

use std::str::FromStr;

use serde::Serialize;

use crate::catalog::{Catalog, ObjectKind};
use crate::error::{ParseOptionError, Result};
use crate::result::TabularResult;

/// A user table and the number of rows it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub rows: u64,
}

/// What to show for a selected table or view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    /// Column metadata.
    Columns,
    /// The first rows of data.
    Rows,
    /// The first rows of a view plus its definition.
    View,
}

impl FromStr for Detail {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "table" | "columns" => Ok(Detail::Columns),
            "rows" => Ok(Detail::Rows),
            "view" => Ok(Detail::View),
            other => Err(ParseOptionError::new("detail option", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectDetails {
    pub rows: TabularResult,
    /// Display form of the view definition, for [`Detail::View`] only.
    pub definition: Option<String>,
}

/// Every user table with its row count, skipping backup copies (any table
/// with `backup` in its name, in any case).
pub fn table_summaries<C: Catalog + ?Sized>(db: &C) -> Result<Vec<TableSummary>> {
    let tables = db.list_tables()?;
    let mut summaries = Vec::with_capacity(tables.len());
    for row in tables.data() {
        let name = &row[0];
        if name.to_lowercase().contains("backup") {
            continue;
        }
        summaries.push(TableSummary {
            name: name.clone(),
            rows: db.row_count(name)?,
        });
    }
    Ok(summaries)
}

pub fn view_names<C: Catalog + ?Sized>(db: &C) -> Result<Vec<String>> {
    Ok(db
        .list_views()?
        .into_data()
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .collect())
}

pub fn object_details<C: Catalog + ?Sized>(
    db: &C,
    name: &str,
    detail: Detail,
    limit: Option<u32>,
) -> Result<ObjectDetails> {
    match detail {
        Detail::Columns => Ok(ObjectDetails {
            rows: db.describe_columns(name)?,
            definition: None,
        }),
        Detail::Rows => Ok(ObjectDetails {
            rows: db.sample_rows(name, limit)?,
            definition: None,
        }),
        Detail::View => {
            let rows = db.sample_rows(name, limit)?;
            let ddl = db.object_ddl(ObjectKind::View, name)?;
            Ok(ObjectDetails {
                rows,
                definition: ddl.first_row().map(|row| display_definition(&row[0])),
            })
        }
    }
}

/// Normalise stored DDL for display: `\n` line endings, runs of blank lines
/// collapsed, tabs expanded to four spaces.
pub fn display_definition(sql: &str) -> String {
    let unix = sql.replace("\r\n", "\n");
    let mut out = String::with_capacity(unix.len());
    let mut blank_run = false;
    for line in unix.split('\n') {
        let blank = line.trim().is_empty();
        if blank && blank_run {
            continue;
        }
        blank_run = blank;
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&line.replace('\t', "    "));
    }
    out
}
