use std::cell::{Cell, RefCell};
use std::fmt;

use crate::query::split_path_query;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryMethod {
    Push,
    Replace,
}

impl HistoryMethod {
    pub fn other(self) -> Self {
        match self {
            HistoryMethod::Push => HistoryMethod::Replace,
            HistoryMethod::Replace => HistoryMethod::Push,
        }
    }
}

impl fmt::Display for HistoryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryMethod::Push => f.write_str("pushState"),
            HistoryMethod::Replace => f.write_str("replaceState"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("{method} rejected for `{url}`: {reason}")]
    Rejected {
        method: HistoryMethod,
        url: String,
        reason: String,
    },
    #[error("navigation to `{url}` failed: {reason}")]
    Redirect { url: String, reason: String },
    #[error("browser history is unavailable")]
    Unavailable,
}

/// The slice of `window.location` / `window.history` the header needs.
///
/// `url` arguments are either absolute paths (`/th/about?x=1`) or query-only
/// (`?type=a`), which keeps the current path.
pub trait HistoryApi {
    fn pathname(&self) -> String;

    fn search(&self) -> String;

    fn current_url(&self) -> String {
        format!("{}{}", self.pathname(), self.search())
    }

    fn length(&self) -> usize;

    fn push_state(&self, url: &str) -> Result<(), HistoryError>;

    fn replace_state(&self, url: &str) -> Result<(), HistoryError>;

    fn write(&self, method: HistoryMethod, url: &str) -> Result<(), HistoryError> {
        match method {
            HistoryMethod::Push => self.push_state(url),
            HistoryMethod::Replace => self.replace_state(url),
        }
    }

    /// Full page navigation that replaces the current entry.
    fn redirect(&self, url: &str) -> Result<(), HistoryError>;
}

/// Session history kept in memory, for hosts without a browser and for tests.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: RefCell<Vec<String>>,
    index: Cell<usize>,
    redirects: RefCell<Vec<String>>,
    reject_push: Cell<bool>,
    reject_replace: Cell<bool>,
}

impl MemoryHistory {
    pub fn new(initial_url: &str) -> Self {
        Self {
            entries: RefCell::new(vec![Self::normalize(initial_url)]),
            index: Cell::new(0),
            redirects: RefCell::new(Vec::new()),
            reject_push: Cell::new(false),
            reject_replace: Cell::new(false),
        }
    }

    fn normalize(url: &str) -> String {
        if url.is_empty() {
            String::from("/")
        } else {
            url.to_owned()
        }
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with('?') {
            format!("{}{url}", self.pathname())
        } else {
            Self::normalize(url)
        }
    }

    fn current(&self) -> String {
        self.entries.borrow()[self.index.get()].clone()
    }

    /// Move one entry back, as the back button does. Returns false at the start.
    pub fn back(&self) -> bool {
        if self.index.get() == 0 {
            return false;
        }

        self.index.set(self.index.get() - 1);
        true
    }

    pub fn forward(&self) -> bool {
        if self.index.get() + 1 >= self.entries.borrow().len() {
            return false;
        }

        self.index.set(self.index.get() + 1);
        true
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.borrow().clone()
    }

    pub fn reject_push(&self, reject: bool) {
        self.reject_push.set(reject);
    }

    pub fn reject_replace(&self, reject: bool) {
        self.reject_replace.set(reject);
    }
}

impl HistoryApi for MemoryHistory {
    fn pathname(&self) -> String {
        let current = self.current();
        split_path_query(&current).0.to_owned()
    }

    fn search(&self) -> String {
        let current = self.current();
        split_path_query(&current).1.to_owned()
    }

    fn length(&self) -> usize {
        self.entries.borrow().len()
    }

    fn push_state(&self, url: &str) -> Result<(), HistoryError> {
        if self.reject_push.get() {
            return Err(HistoryError::Rejected {
                method: HistoryMethod::Push,
                url: url.to_owned(),
                reason: "push rejected".to_owned(),
            });
        }

        let resolved = self.resolve(url);
        let mut entries = self.entries.borrow_mut();
        entries.truncate(self.index.get() + 1);
        entries.push(resolved);
        self.index.set(entries.len() - 1);

        Ok(())
    }

    fn replace_state(&self, url: &str) -> Result<(), HistoryError> {
        if self.reject_replace.get() {
            return Err(HistoryError::Rejected {
                method: HistoryMethod::Replace,
                url: url.to_owned(),
                reason: "replace rejected".to_owned(),
            });
        }

        let resolved = self.resolve(url);
        self.entries.borrow_mut()[self.index.get()] = resolved;

        Ok(())
    }

    fn redirect(&self, url: &str) -> Result<(), HistoryError> {
        let resolved = self.resolve(url);
        self.redirects.borrow_mut().push(resolved.clone());
        self.entries.borrow_mut()[self.index.get()] = resolved;

        Ok(())
    }
}
