use rusqlite::{params, Connection};

use crate::db::create_store_schema;
use crate::error::CoreError;

const DEMO_BUCKETS: &[(&str, &str)] = &[
    ("-1739773001", "Camera"),
    ("-1313584517", "Screenshots"),
    ("540528482", "Download"),
    ("1028075469", "Road Trip"),
];

/// Writes a small MediaStore-shaped library: photos spread over the demo
/// buckets one minute apart, videos in the camera bucket.
pub fn seed_demo(conn: &Connection, photo_count: i64, video_count: i64) -> Result<(), CoreError> {
    create_store_schema(conn)?;
    conn.execute_batch("BEGIN;")?;
    let result = (|| -> Result<(), CoreError> {
        let base_ms = 1_700_000_000_000i64;

        let mut photo_stmt = conn.prepare(
            "INSERT INTO images \
             (_id, _display_name, datetaken, date_modified, _size, mime_type, width, height, bucket_id, bucket_display_name) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
        )?;
        for idx in 0..photo_count {
            let id = idx + 1;
            let taken = base_ms + idx * 60_000;
            let (bucket_id, bucket_name) = DEMO_BUCKETS[(idx as usize) % DEMO_BUCKETS.len()];
            let (name, mime) = if bucket_name == "Screenshots" {
                (format!("Screenshot_{}.png", id), "image/png")
            } else {
                (format!("IMG_{:04}.jpg", id), "image/jpeg")
            };
            photo_stmt.execute(params![
                id,
                name,
                taken,
                taken / 1000,
                250_000 + idx * 1024,
                mime,
                4032i64,
                3024i64,
                bucket_id,
                bucket_name,
            ])?;
        }

        let mut video_stmt = conn.prepare(
            "INSERT INTO video \
             (_id, _display_name, datetaken, date_modified, _size, mime_type, width, height, duration, bucket_id, bucket_display_name) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
        )?;
        let (camera_id, camera_name) = DEMO_BUCKETS[0];
        for idx in 0..video_count {
            let id = idx + 1;
            let taken = base_ms + idx * 90_000 + 30_000;
            video_stmt.execute(params![
                id,
                format!("VID_{:04}.mp4", idx + 1),
                taken,
                taken / 1000,
                12_000_000 + idx * 4096,
                "video/mp4",
                1920i64,
                1080i64,
                15_000 + idx * 1000,
                camera_id,
                camera_name,
            ])?;
        }

        Ok(())
    })();

    match result {
        Ok(()) => {
            conn.execute_batch("COMMIT;")?;
            Ok(())
        }
        Err(err) => {
            let _ = conn.execute_batch("ROLLBACK;");
            Err(err)
        }
    }
}
