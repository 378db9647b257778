use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

/// Rows shown per page by the paginated screens.
pub const DEFAULT_PAGE_SIZE: usize = 15;
/// Rows returned when browsing a table or view.
pub const DEFAULT_SAMPLE_ROWS: u32 = 15;

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_sample_rows() -> u32 {
    DEFAULT_SAMPLE_ROWS
}

/// SQLite access configuration
///
/// # Invariants
/// - `db_path` is non-empty.
/// - `page_size` is greater than zero.
/// - `busy_timeout_ms` of 0 means a locked database is reported at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// How long a statement waits on a locked database, in milliseconds
    #[serde(default)]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_sample_rows")]
    pub sample_rows: u32,
}

impl SqliteConfig {
    /// Create a new SQLite config for the database at `db_path`
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout_ms: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }

    pub fn with_busy_timeout_ms(mut self, ms: u64) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_sample_rows(mut self, sample_rows: u32) -> Self {
        self.sample_rows = sample_rows;
        self
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid sqlite config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading sqlite config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("loading {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            !self.db_path.as_os_str().is_empty(),
            "db_path must not be empty"
        );
        ensure!(self.page_size > 0, "page_size must be greater than zero");
        Ok(())
    }
}
