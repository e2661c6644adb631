use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// One row as handed over by a media source. Every column may be missing;
/// the normalizer decides which gaps are tolerable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMediaRow {
    pub id: Option<i64>,
    pub display_name: Option<String>,
    /// Milliseconds since the epoch.
    pub date_taken: Option<i64>,
    /// Seconds since the epoch, as the backing store records it.
    pub date_modified: Option<i64>,
    pub size: Option<i64>,
    pub mime_type: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub duration: Option<i64>,
    pub bucket_id: Option<String>,
    pub bucket_display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub fn content_base(self) -> &'static str {
        match self {
            MediaKind::Photo => "content://media/external/images/media",
            MediaKind::Video => "content://media/external/video/media",
        }
    }

    pub fn locator_for(self, id: i64) -> String {
        format!("{}/{}", self.content_base(), id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }
}

/// Identity of an item. Photo and video ids come from separate id spaces,
/// so the id alone is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MediaKey {
    pub kind: MediaKind,
    pub id: i64,
}

impl MediaKey {
    pub fn photo(id: i64) -> Self {
        Self {
            kind: MediaKind::Photo,
            id,
        }
    }

    pub fn video(id: i64) -> Self {
        Self {
            kind: MediaKind::Video,
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: i64,
    /// Source the row came from; not derived from the mime type.
    pub kind: MediaKind,
    pub locator: String,
    pub display_name: String,
    pub date_taken: i64,
    pub date_modified: i64,
    pub size_bytes: i64,
    pub mime_type: String,
    pub width: i64,
    pub height: i64,
    pub duration_ms: i64,
    pub bucket_id: String,
    pub bucket_display_name: String,
    pub is_favorite: bool,
    pub is_selected: bool,
}

impl MediaItem {
    pub fn key(&self) -> MediaKey {
        MediaKey {
            kind: self.kind,
            id: self.id,
        }
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }

    pub fn is_photo(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn date_taken_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.date_taken)
    }

    pub fn formatted_size(&self) -> String {
        format_bytes(self.size_bytes)
    }

    pub fn formatted_dimensions(&self) -> String {
        format!("{} x {}", self.width, self.height)
    }

    /// `m:ss` or `h:mm:ss`; empty for photos and zero-length clips.
    pub fn formatted_duration(&self) -> String {
        if !self.is_video() || self.duration_ms <= 0 {
            return String::new();
        }
        let seconds = self.duration_ms / 1000;
        let minutes = seconds / 60;
        let hours = minutes / 60;
        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes % 60, seconds % 60)
        } else {
            format!("{}:{:02}", minutes, seconds % 60)
        }
    }
}

pub fn format_bytes(bytes: i64) -> String {
    const KB: i64 = 1024;
    const MB: i64 = 1024 * 1024;
    const GB: i64 = 1024 * 1024 * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{} KB", bytes / KB)
    } else if bytes < GB {
        format!("{} MB", bytes / MB)
    } else {
        format!("{} GB", bytes / GB)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlbumType {
    UserCreated,
    CameraRoll,
    Favorites,
    RecentlyDeleted,
    Screenshots,
    Videos,
    Downloads,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub cover_locator: Option<String>,
    pub item_count: usize,
    pub is_default: bool,
    pub album_type: AlbumType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewType {
    Years,
    Months,
    Days,
    AllPhotos,
}

/// A titled date section of the photo grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaGroup {
    pub title: String,
    pub date: i64,
    pub items: Vec<MediaItem>,
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedSet {
    pub items: Vec<MediaItem>,
    pub albums: Vec<Album>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationLimits {
    pub favorite_limit: usize,
    pub recent_limit: usize,
    pub recent_window_days: i64,
}

impl Default for CurationLimits {
    fn default() -> Self {
        Self {
            favorite_limit: 10,
            recent_limit: 10,
            recent_window_days: 7,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curated {
    pub favorites: Vec<MediaItem>,
    pub recent: Vec<MediaItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Success(T),
    Failed(ErrorKind),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            LoadState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<ErrorKind> {
        match self {
            LoadState::Failed(kind) => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub load_id: String,
    pub item_count: usize,
    pub album_count: usize,
    pub skipped: usize,
    pub loaded_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub items: Vec<MediaItem>,
}
