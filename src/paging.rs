use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::ParseOptionError;

/// Navigation request from a paginated screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageAction {
    First,
    Next,
    Previous,
    Last,
}

impl FromStr for PageAction {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f" | "first" => Ok(PageAction::First),
            "n" | "next" => Ok(PageAction::Next),
            "p" | "prev" | "previous" => Ok(PageAction::Previous),
            "l" | "last" => Ok(PageAction::Last),
            other => Err(ParseOptionError::new("page action", other)),
        }
    }
}

/// Sliding window over a cached list.
///
/// Tracks the exclusive end of the visible window. `end` never drops below
/// one page and, once the list size is known, never passes it; so the last
/// page always shows a full window when there are enough rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pager {
    page_size: usize,
    end: usize,
    total: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            end: page_size,
            total: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Record the size of a freshly loaded list. The current position is
    /// kept, clamped to the new size.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.clamp();
    }

    pub fn apply(&mut self, action: PageAction) {
        match action {
            PageAction::First => self.end = self.page_size,
            PageAction::Next => self.end = self.end.saturating_add(self.page_size),
            PageAction::Previous => self.end = self.end.saturating_sub(self.page_size),
            PageAction::Last => self.end = self.total,
        }
        self.clamp();
    }

    fn clamp(&mut self) {
        if self.end < self.page_size {
            self.end = self.page_size;
        }
        if self.total != 0 && self.end > self.total {
            self.end = self.total;
        }
    }

    /// Index range of the visible rows in a list of `len` rows.
    pub fn range(&self, len: usize) -> Range<usize> {
        let stop = self.end.min(len);
        let start = self.end.saturating_sub(self.page_size).min(stop);
        start..stop
    }

    pub fn window<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        &rows[self.range(rows.len())]
    }

    /// 1-based page number of the current window.
    pub fn page_number(&self) -> usize {
        self.end.div_ceil(self.page_size).max(1)
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }
}
