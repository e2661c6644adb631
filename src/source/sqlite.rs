use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::MediaSource;
use crate::db::open_media_store;
use crate::error::CoreError;
use crate::models::{MediaKind, RawMediaRow};

/// Reads a MediaStore-shaped SQLite database. Each scan opens its own
/// read-only connection, so the source can be shared across threads.
#[derive(Debug, Clone)]
pub struct SqliteMediaSource {
    path: PathBuf,
}

impl SqliteMediaSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn scan(&self, kind: MediaKind) -> Result<Vec<RawMediaRow>, CoreError> {
        let unavailable = |err: CoreError| match err {
            CoreError::Sqlite(e) => CoreError::SourceUnavailable(format!(
                "{} scan failed: {}",
                kind.as_str(),
                e
            )),
            other => other,
        };
        let store = open_media_store(&self.path).map_err(unavailable)?;
        read_rows(&store.conn, kind).map_err(unavailable)
    }
}

impl MediaSource for SqliteMediaSource {
    fn photo_rows(&self) -> Result<Vec<RawMediaRow>, CoreError> {
        self.scan(MediaKind::Photo)
    }

    fn video_rows(&self) -> Result<Vec<RawMediaRow>, CoreError> {
        self.scan(MediaKind::Video)
    }
}

fn table_for(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Photo => "images",
        MediaKind::Video => "video",
    }
}

pub(crate) fn read_rows(conn: &Connection, kind: MediaKind) -> Result<Vec<RawMediaRow>, CoreError> {
    let table = table_for(kind);
    if !table_exists(conn, table)? {
        return Err(CoreError::SourceUnavailable(format!(
            "media store has no {} table",
            table
        )));
    }

    let id_col = pick_column(conn, table, &["_id", "id"])?;
    let Some(id_col) = id_col else {
        return Err(CoreError::SourceUnavailable(format!(
            "{} table has no id column",
            table
        )));
    };
    let name_col = pick_column(conn, table, &["_display_name", "display_name", "title"])?;
    let taken_col = pick_column(conn, table, &["datetaken", "date_taken"])?;
    let modified_col = pick_column(conn, table, &["date_modified"])?;
    let size_col = pick_column(conn, table, &["_size", "size"])?;
    let mime_col = pick_column(conn, table, &["mime_type"])?;
    let width_col = pick_column(conn, table, &["width"])?;
    let height_col = pick_column(conn, table, &["height"])?;
    let duration_col = match kind {
        MediaKind::Video => pick_column(conn, table, &["duration"])?,
        MediaKind::Photo => None,
    };
    let bucket_id_col = pick_column(conn, table, &["bucket_id"])?;
    let bucket_name_col = pick_column(conn, table, &["bucket_display_name"])?;

    let order_by = taken_col
        .as_deref()
        .map(|col| format!("ORDER BY {} DESC", col))
        .unwrap_or_default();
    let sql = format!(
        "SELECT {id}, {name}, {taken}, {modified}, {size}, {mime}, {width}, {height}, {duration}, \
                {bucket_id}, {bucket_name} \
         FROM {table} {order_by};",
        id = id_col,
        name = name_col.as_deref().unwrap_or("NULL"),
        taken = taken_col.as_deref().unwrap_or("NULL"),
        modified = modified_col.as_deref().unwrap_or("NULL"),
        size = size_col.as_deref().unwrap_or("NULL"),
        mime = mime_col.as_deref().unwrap_or("NULL"),
        width = width_col.as_deref().unwrap_or("NULL"),
        height = height_col.as_deref().unwrap_or("NULL"),
        duration = duration_col.as_deref().unwrap_or("NULL"),
        bucket_id = bucket_id_col.as_deref().unwrap_or("NULL"),
        bucket_name = bucket_name_col.as_deref().unwrap_or("NULL"),
        table = table,
        order_by = order_by,
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    // Columns are read untyped: a value of the wrong storage class becomes
    // `None` and the normalizer applies its default. A missing id is left to
    // the normalizer too, so the row is counted as skipped.
    while let Some(row) = rows.next()? {
        let id = int_value(row.get(0)?);
        if id.is_none() {
            debug!(table, "media row without a usable id");
        }
        out.push(RawMediaRow {
            id,
            display_name: text_value(row.get(1)?),
            date_taken: int_value(row.get(2)?),
            date_modified: int_value(row.get(3)?),
            size: int_value(row.get(4)?),
            mime_type: text_value(row.get(5)?),
            width: int_value(row.get(6)?),
            height: int_value(row.get(7)?),
            duration: int_value(row.get(8)?),
            bucket_id: text_value(row.get(9)?),
            bucket_display_name: text_value(row.get(10)?),
        });
    }
    Ok(out)
}

fn int_value(raw: Value) -> Option<i64> {
    match raw {
        Value::Integer(v) => Some(v),
        Value::Real(v) if v.is_finite() => Some(v as i64),
        Value::Text(v) => v.trim().parse().ok(),
        _ => None,
    }
}

/// Bucket ids are integers in the platform store but text in exports.
fn text_value(raw: Value) -> Option<String> {
    match raw {
        Value::Integer(v) => Some(v.to_string()),
        Value::Text(v) => Some(v),
        Value::Real(v) => Some(v.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, CoreError> {
    let exists: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1;",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn pick_column(conn: &Connection, table: &str, preferred: &[&str]) -> Result<Option<String>, CoreError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }
    Ok(preferred
        .iter()
        .find(|col| columns.iter().any(|c| c == *col))
        .map(|col| (*col).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_store_schema;

    #[test]
    fn reads_rows_with_integer_bucket_ids() {
        let conn = Connection::open_in_memory().expect("memory db");
        create_store_schema(&conn).expect("schema");
        conn.execute(
            "INSERT INTO video (_id, _display_name, datetaken, date_modified, _size, mime_type, width, height, duration, bucket_id, bucket_display_name) \
             VALUES (2, 'clip.mp4', 100, 1, 2048, 'video/mp4', 1920, 1080, 5000, -1739773001, 'Camera');",
            [],
        )
        .unwrap();
        let rows = read_rows(&conn, MediaKind::Video).expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bucket_id.as_deref(), Some("-1739773001"));
        assert_eq!(rows[0].duration, Some(5000));
    }

    #[test]
    fn missing_table_is_unavailable() {
        let conn = Connection::open_in_memory().expect("memory db");
        let result = read_rows(&conn, MediaKind::Photo);
        assert!(matches!(result, Err(CoreError::SourceUnavailable(_))));
    }

    #[test]
    fn tolerates_alternate_column_names() {
        let conn = Connection::open_in_memory().expect("memory db");
        conn.execute_batch(
            "CREATE TABLE images (id INTEGER, display_name TEXT, date_taken INTEGER, mime_type TEXT);",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO images (id, display_name, date_taken, mime_type) VALUES (9, 'a.jpg', 5, 'image/jpeg');",
            [],
        )
        .unwrap();
        let rows = read_rows(&conn, MediaKind::Photo).expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, Some(9));
        assert_eq!(rows[0].display_name.as_deref(), Some("a.jpg"));
        assert_eq!(rows[0].bucket_display_name, None);
        assert_eq!(rows[0].date_modified, None);
    }

    #[test]
    fn unreadable_optional_values_fall_back_to_none() {
        let conn = Connection::open_in_memory().expect("memory db");
        create_store_schema(&conn).expect("schema");
        conn.execute(
            "INSERT INTO images (_id, _display_name, datetaken, width, height, _size, bucket_id) \
             VALUES (1, X'00ff', 'yesterday', 'unknown', '480', 12.5, NULL);",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO images (_id, _display_name) VALUES ('abc', 'broken.jpg');",
            [],
        )
        .unwrap();
        let rows = read_rows(&conn, MediaKind::Photo).expect("rows");
        assert_eq!(rows.len(), 2);
        let first = rows.iter().find(|r| r.id == Some(1)).expect("row 1");
        assert_eq!(first.display_name, None);
        assert_eq!(first.date_taken, None);
        assert_eq!(first.width, None);
        assert_eq!(first.height, Some(480));
        assert_eq!(first.size, Some(12));
        assert_eq!(first.bucket_id, None);
        assert!(rows.iter().any(|r| r.id.is_none()));

        let merged = crate::aggregate::aggregate(&rows, &[]);
        assert_eq!(merged.items.len(), 1);
        assert_eq!(merged.skipped, 1);
    }
}
