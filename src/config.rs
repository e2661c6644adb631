use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::CurationLimits;
use crate::query::DAYS_VIEW_WINDOW_DAYS;

const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Caller idle time before a submitted search runs.
    pub search_debounce_ms: u64,
    pub days_window_days: i64,
    pub curation: CurationLimits,
    /// Re-scan the store before every search instead of filtering the
    /// current snapshot.
    pub reload_on_search: bool,
    /// Directory for the JSON diagnostics log; disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            days_window_days: DAYS_VIEW_WINDOW_DAYS,
            curation: CurationLimits::default(),
            reload_on_search: false,
            log_dir: None,
        }
    }
}

impl LibraryConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, CoreError> {
        let config: LibraryConfig =
            toml::from_str(input).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.days_window_days < 0 {
            return Err(CoreError::Config("days_window_days must not be negative".to_string()));
        }
        if self.curation.recent_window_days < 0 {
            return Err(CoreError::Config(
                "curation.recent_window_days must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
