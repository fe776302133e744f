// Runtime settings shared by the CLI commands

use crate::search::DEFAULT_MAX_DEPTH;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "~/.config/sitetrail/";
pub const DATABASE_FILE: &str = "sitetrail.db";
pub const JSON_STORE_DIR: &str = "data";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreKind {
    #[default]
    Json,
    Sqlite,
}

impl StoreKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(StoreKind::Json),
            "sqlite" | "db" => Some(StoreKind::Sqlite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub store: StoreKind,
    pub crawl_depth: usize,
    pub threads: usize,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: expand_path(DEFAULT_DATA_DIR),
            store: StoreKind::default(),
            crawl_depth: DEFAULT_MAX_DEPTH,
            threads: 4,
            timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn with_data_dir(mut self, raw: &str) -> Self {
        self.data_dir = expand_path(raw);
        self
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn json_store_dir(&self) -> PathBuf {
        self.data_dir.join(JSON_STORE_DIR)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Expand `~` and environment variables; falls back to the raw path when a
/// variable is undefined.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}
