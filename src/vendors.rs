//! Recent Vendors
//!
//! A short most-recent-first list of vendor names the cashier has typed,
//! offered back as suggestions on the next sale.

use serde::{Deserialize, Serialize};

/// How many vendor names are remembered.
pub const MAX_RECENT_VENDORS: usize = 5;

/// Most recently used vendor names, newest first, without case-insensitive duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RecentVendors {
    names: Vec<String>,
}

impl RecentVendors {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `name` to the front of the list.
    ///
    /// Surrounding whitespace is trimmed and blank names are ignored. Any
    /// earlier entry equal ignoring case is replaced by the new spelling.
    /// Returns whether the list changed.
    pub fn record(&mut self, name: &str) -> bool {
        let name = name.trim();

        if name.is_empty() {
            return false;
        }

        if self.names.first().is_some_and(|first| first == name) {
            return false;
        }

        let lowered = name.to_lowercase();

        self.names.retain(|existing| existing.to_lowercase() != lowered);
        self.names.insert(0, name.to_string());
        self.names.truncate(MAX_RECENT_VENDORS);

        true
    }

    /// Forget the entry spelled exactly `name`. Returns whether one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();

        self.names.retain(|existing| existing != name);

        self.names.len() != before
    }

    /// Names, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of remembered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no name is remembered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<Vec<String>> for RecentVendors {
    fn from(stored: Vec<String>) -> Self {
        let mut vendors = RecentVendors::new();

        // Oldest first so the newest stored name ends up in front.
        for name in stored.iter().rev() {
            vendors.record(name);
        }

        vendors
    }
}

impl From<RecentVendors> for Vec<String> {
    fn from(vendors: RecentVendors) -> Self {
        vendors.names
    }
}
