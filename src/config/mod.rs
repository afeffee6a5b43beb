pub mod settings;

use crate::core::{NameMatch, TimeMatch, DEFAULT_PAGE_SIZE};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub last_source_directory: Option<PathBuf>,
    pub last_target_directory: Option<PathBuf>,
    pub page_size: usize,
    pub name_match: NameMatch,
    pub time_match: TimeMatch,
    /// `chrono` format string used when rendering timestamps.
    pub timestamp_format: String,
    pub scan_progress_interval: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        settings::load_config(None)
    }

    /// Replaces values that would break paging or progress reporting.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if self.page_size == 0 {
            self.page_size = defaults.page_size;
        }
        if self.scan_progress_interval == 0 {
            self.scan_progress_interval = defaults.scan_progress_interval;
        }
        if self.timestamp_format.trim().is_empty() {
            self.timestamp_format = defaults.timestamp_format;
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_source_directory: None,
            last_target_directory: None,
            page_size: DEFAULT_PAGE_SIZE,
            name_match: NameMatch::Contains,
            time_match: TimeMatch::DateRange,
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            scan_progress_interval: 250,
        }
    }
}
