use std::collections::BTreeMap;

use serde::Serialize;

/// Query output with every cell rendered as text.
///
/// The first row is always the column-name header, so a query that matched
/// nothing still yields a single row. Serializes as a list of lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TabularResult {
    rows: Vec<Vec<String>>,
}

impl TabularResult {
    pub(crate) fn with_header(header: Vec<String>) -> Self {
        Self { rows: vec![header] }
    }

    pub(crate) fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    /// Rows after the header.
    pub fn data(&self) -> &[Vec<String>] {
        &self.rows[1..]
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Header followed by the data rows.
    pub fn as_rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn first_row(&self) -> Option<&[String]> {
        self.data().first().map(Vec::as_slice)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header().iter().position(|col| col == name)
    }

    /// All values of the named column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.data().iter().map(|row| row[idx].as_str()).collect())
    }

    /// Data rows keyed by column name. Duplicate column names keep the
    /// right-most value.
    pub fn records(&self) -> Vec<BTreeMap<String, String>> {
        self.data()
            .iter()
            .map(|row| {
                self.header()
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// Drop the header and keep only the data rows.
    pub fn into_data(mut self) -> Vec<Vec<String>> {
        self.rows.remove(0);
        self.rows
    }
}

/// Outcome of a committed write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// Row id of the most recent successful insert on the connection, or 0
    /// when the statement inserted nothing.
    pub last_insert_rowid: i64,
    /// Rows inserted, updated or deleted by the statement.
    pub changes: usize,
}
