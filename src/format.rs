//! Conversion of SQLite result sets into [`TabularResult`]s.

use std::fmt::Write as _;

use rusqlite::types::ValueRef;
use rusqlite::Statement;

use crate::result::TabularResult;

/// Run `stmt` with `params` and collect every row as text.
///
/// The header is read once from the statement, before any row is fetched,
/// so queries that match nothing still report their column names.
pub(crate) fn tabulate<P: rusqlite::Params>(
    stmt: &mut Statement<'_>,
    params: P,
) -> rusqlite::Result<TabularResult> {
    let header: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = header.len();
    let mut table = TabularResult::with_header(header);

    let mut rows = stmt.query(params)?;
    while let Some(row) = rows.next()? {
        let mut record = Vec::with_capacity(width);
        for idx in 0..width {
            record.push(cell_text(row.get_ref(idx)?));
        }
        table.push_row(record);
    }
    Ok(table)
}

/// Text form of a single cell.
pub fn cell_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        // Debug keeps the fractional part (`1.0`) and round-trips exactly.
        ValueRef::Real(f) => format!("{:?}", f),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => {
            let mut out = String::with_capacity(b.len() * 2 + 3);
            out.push_str("x'");
            for byte in b {
                let _ = write!(out, "{:02x}", byte);
            }
            out.push('\'');
            out
        }
    }
}
