//! Per-session server-side state for the screens that browse large lists.
//!
//! Each logged-in session gets its own [`SessionContext`] with one typed
//! field per screen. Contexts are evicted explicitly when the session ends.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::browse::{ObjectDetails, TableSummary};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::paging::{PageAction, Pager};

/// A cached result list and the window currently shown from it.
#[derive(Debug, Clone, Default)]
pub struct PagedList {
    rows: Vec<Vec<String>>,
    pager: Pager,
    loaded: bool,
}

impl PagedList {
    pub fn new(page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            pager: Pager::new(page_size),
            loaded: false,
        }
    }

    /// Replace the cached rows, keeping the current position where it
    /// still fits.
    pub fn load(&mut self, rows: Vec<Vec<String>>) {
        self.pager.set_total(rows.len());
        self.rows = rows;
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn navigate(&mut self, action: PageAction) -> &[Vec<String>] {
        self.pager.apply(action);
        self.current()
    }

    pub fn current(&self) -> &[Vec<String>] {
        self.pager.window(&self.rows)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.pager.page_size());
    }

    fn cells(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// Listing shown on the schema browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Tables(Vec<TableSummary>),
    Views(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct BrowseState {
    pub listing: Option<Listing>,
    pub details: Option<ObjectDetails>,
}

impl BrowseState {
    fn cells(&self) -> usize {
        let listing = match &self.listing {
            Some(Listing::Tables(tables)) => tables.len() * 2,
            Some(Listing::Views(views)) => views.len(),
            None => 0,
        };
        let details = self
            .details
            .as_ref()
            .map_or(0, |d| d.rows.data().iter().map(Vec::len).sum::<usize>());
        listing + details
    }
}

/// Size of one populated entry of a [`SessionContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub key: &'static str,
    pub cells: usize,
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub orders: PagedList,
    pub music: PagedList,
    pub images: PagedList,
    pub browse: BrowseState,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl SessionContext {
    pub fn new(page_size: usize) -> Self {
        Self {
            orders: PagedList::new(page_size),
            music: PagedList::new(page_size),
            images: PagedList::new(page_size),
            browse: BrowseState::default(),
        }
    }

    /// Populated entries and their sizes, in a fixed order.
    pub fn contents(&self) -> Vec<StoreEntry> {
        let mut entries = Vec::new();
        for (key, list) in [
            ("orders", &self.orders),
            ("music", &self.music),
            ("images", &self.images),
        ] {
            if list.is_loaded() {
                entries.push(StoreEntry {
                    key,
                    cells: list.cells(),
                });
            }
        }
        if self.browse.listing.is_some() || self.browse.details.is_some() {
            entries.push(StoreEntry {
                key: "browse",
                cells: self.browse.cells(),
            });
        }
        entries
    }

    pub fn clear(&mut self) {
        for entry in self.contents() {
            debug!(key = entry.key, cells = entry.cells, "clearing session entry");
        }
        self.orders.clear();
        self.music.clear();
        self.images.clear();
        self.browse = BrowseState::default();
    }
}

/// Session contexts keyed by session id.
#[derive(Debug)]
pub struct SessionRegistry {
    page_size: usize,
    sessions: Mutex<HashMap<String, SessionContext>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl SessionRegistry {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` against the context of `session_id`, creating it on first use.
    pub fn with_session<R>(&self, session_id: &str, f: impl FnOnce(&mut SessionContext) -> R) -> R {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let context = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionContext::new(self.page_size));
        f(context)
    }

    /// Drop the context of a session that logged out or expired. Returns
    /// whether there was one.
    pub fn end_session(&self, session_id: &str) -> bool {
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id);
        match removed {
            Some(mut context) => {
                debug!(session = session_id, "ending session");
                context.clear();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
