use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};

use crate::error::CoreError;

/// Layout of a MediaStore-shaped database: one table per media kind, column
/// names as the platform store exposes them.
pub const STORE_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS images (
      _id INTEGER,
      _display_name TEXT,
      datetaken INTEGER,
      date_modified INTEGER,
      _size INTEGER,
      mime_type TEXT,
      width INTEGER,
      height INTEGER,
      bucket_id TEXT,
      bucket_display_name TEXT
    );

    CREATE TABLE IF NOT EXISTS video (
      _id INTEGER,
      _display_name TEXT,
      datetaken INTEGER,
      date_modified INTEGER,
      _size INTEGER,
      mime_type TEXT,
      width INTEGER,
      height INTEGER,
      duration INTEGER,
      bucket_id TEXT,
      bucket_display_name TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_images_datetaken ON images(datetaken DESC);
    CREATE INDEX IF NOT EXISTS idx_video_datetaken ON video(datetaken DESC);
"#;

pub struct MediaStoreDb {
    pub path: PathBuf,
    pub conn: Connection,
}

/// Opens an existing store read-only. The store belongs to the platform, so
/// nothing here ever writes to it.
pub fn open_media_store(path: impl AsRef<Path>) -> Result<MediaStoreDb, CoreError> {
    let path = path.as_ref().to_path_buf();
    if !path.exists() {
        return Err(CoreError::SourceUnavailable(format!(
            "media store not found: {}",
            path.display()
        )));
    }
    let conn = Connection::open_with_flags(
        &path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(MediaStoreDb { path, conn })
}

pub fn create_store_schema(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch(STORE_SCHEMA)?;
    Ok(())
}
