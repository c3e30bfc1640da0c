//! Recent Vendor Storage
//!
//! Persists [`RecentVendors`] as a JSON array of names. Storage that is
//! missing or unreadable is treated as an empty list.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use bakehouse::vendors::RecentVendors;
use thiserror::Error;
use tracing::warn;

/// Errors writing the recent vendor list.
#[derive(Debug, Error)]
pub enum VendorStoreError {
    /// Wrapped IO error.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Wrapped JSON error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// JSON file holding the recent vendor list.
#[derive(Debug, Clone)]
pub struct VendorStore {
    path: PathBuf,
}

impl VendorStore {
    /// Use the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored list.
    pub fn load(&self) -> RecentVendors {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return RecentVendors::new(),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "could not read recent vendors");

                return RecentVendors::new();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|error| {
            warn!(path = %self.path.display(), %error, "ignoring corrupt recent vendors");

            RecentVendors::new()
        })
    }

    /// Overwrite the stored list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be written.
    pub fn save(&self, vendors: &RecentVendors) -> Result<(), VendorStoreError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_string(vendors)?)?;

        Ok(())
    }

    /// Record `name` as the most recent vendor and persist the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be saved.
    pub fn record(&self, name: &str) -> Result<RecentVendors, VendorStoreError> {
        let mut vendors = self.load();

        if vendors.record(name) {
            self.save(&vendors)?;
        }

        Ok(vendors)
    }

    /// Forget `name` and persist the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be saved.
    pub fn remove(&self, name: &str) -> Result<RecentVendors, VendorStoreError> {
        let mut vendors = self.load();

        if vendors.remove(name) {
            self.save(&vendors)?;
        }

        Ok(vendors)
    }
}
