//! Local Storage Config

use std::path::PathBuf;

use clap::Args;

/// File name of the recent vendors list inside the data directory.
pub const RECENT_VENDORS_FILE: &str = "recent_vendors.json";

/// Local storage settings.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// Directory for locally persisted state
    #[arg(long, env = "BAKEHOUSE_DATA_DIR", default_value = ".", global = true)]
    pub data_dir: PathBuf,
}

impl StoreConfig {
    /// Path of the recent vendors file.
    #[must_use]
    pub fn recent_vendors_path(&self) -> PathBuf {
        self.data_dir.join(RECENT_VENDORS_FILE)
    }
}
