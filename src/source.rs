use crate::error::CoreError;
use crate::models::RawMediaRow;

pub(crate) mod sqlite;

pub use sqlite::SqliteMediaSource;

/// Full-scan access to the backing media store. Implementations may block;
/// the library calls them from a blocking task.
pub trait MediaSource: Send + Sync {
    fn photo_rows(&self) -> Result<Vec<RawMediaRow>, CoreError>;
    fn video_rows(&self) -> Result<Vec<RawMediaRow>, CoreError>;
}

/// Rows held in memory, mostly for embedding hosts that already queried the
/// store themselves, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    photos: Vec<RawMediaRow>,
    videos: Vec<RawMediaRow>,
    unavailable: Option<String>,
}

impl MemorySource {
    pub fn new(photos: Vec<RawMediaRow>, videos: Vec<RawMediaRow>) -> Self {
        Self {
            photos,
            videos,
            unavailable: None,
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            unavailable: Some(reason.to_string()),
            ..Self::default()
        }
    }

    fn scan(&self, rows: &[RawMediaRow]) -> Result<Vec<RawMediaRow>, CoreError> {
        match &self.unavailable {
            Some(reason) => Err(CoreError::SourceUnavailable(reason.clone())),
            None => Ok(rows.to_vec()),
        }
    }
}

impl MediaSource for MemorySource {
    fn photo_rows(&self) -> Result<Vec<RawMediaRow>, CoreError> {
        self.scan(&self.photos)
    }

    fn video_rows(&self) -> Result<Vec<RawMediaRow>, CoreError> {
        self.scan(&self.videos)
    }
}
