use crate::error::CoreError;
use crate::models::{MediaItem, MediaKind, RawMediaRow};

pub const UNKNOWN_BUCKET_NAME: &str = "Unknown";

/// Maps one raw row into the unified item schema.
///
/// Only the identity column can fail; every other gap falls back to the
/// store's cursor defaults. `date_modified` arrives in seconds and is stored
/// in milliseconds, while `date_taken` is already in milliseconds.
pub fn normalize(kind: MediaKind, row: &RawMediaRow) -> Result<MediaItem, CoreError> {
    let id = match row.id {
        Some(id) if id > 0 => id,
        Some(id) => {
            return Err(CoreError::MalformedRecord(format!(
                "{} row has non-positive id {}",
                kind.as_str(),
                id
            )))
        }
        None => {
            return Err(CoreError::MalformedRecord(format!(
                "{} row is missing its id",
                kind.as_str()
            )))
        }
    };
    let duration_ms = match kind {
        MediaKind::Photo => 0,
        MediaKind::Video => row.duration.unwrap_or(0),
    };
    Ok(MediaItem {
        id,
        kind,
        locator: kind.locator_for(id),
        display_name: row.display_name.clone().unwrap_or_default(),
        date_taken: row.date_taken.unwrap_or(0),
        date_modified: row.date_modified.unwrap_or(0).saturating_mul(1000),
        size_bytes: row.size.unwrap_or(0),
        mime_type: row.mime_type.clone().unwrap_or_default(),
        width: row.width.unwrap_or(0),
        height: row.height.unwrap_or(0),
        duration_ms,
        bucket_id: row.bucket_id.clone().unwrap_or_default(),
        bucket_display_name: row
            .bucket_display_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_BUCKET_NAME.to_string()),
        is_favorite: false,
        is_selected: false,
    })
}
