//! CLI command implementations.

pub mod entry;
pub mod init;
pub mod search;
pub mod serve;

use anyhow::{Context, Result};
use encyclopedia_core::{Config, FileStore, Wiki};
use std::path::Path;

pub use entry::{create_entry, list_entries, random_entry, read_content, show_entry};
pub use init::init_project;
pub use search::search_entries;
pub use serve::{serve, ServeOptions};

/// Load the configuration named on the command line, or the default one
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load_or_default(path).context("Failed to load configuration")
}

/// Wiki backed by the configured entries directory
pub fn open_wiki(config: &Config) -> Wiki<FileStore> {
    let dir = config.entries_dir();
    tracing::debug!("Using entries directory {:?}", dir);
    Wiki::new(FileStore::new(dir))
}
