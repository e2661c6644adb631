use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

const MAX_LOG_BYTES: u64 = 1_500_000;
const LOG_FILE: &str = "diagnostics.log";

const PATH_PREFIXES: &[&str] = &[
    "/storage/",
    "/sdcard/",
    "/data/",
    "/home/",
    "/Users/",
    "/tmp/",
    "/var/",
    "/private/",
    "C:\\",
    "D:\\",
];

#[derive(Debug, Serialize)]
pub struct LogEvent<'a> {
    pub ts: String,
    pub kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_id: Option<&'a str>,
    pub message: String,
}

/// Store paths can carry user and folder names; everything from the first
/// recognised path prefix onwards is dropped.
fn sanitize(input: &str) -> String {
    let cut = PATH_PREFIXES
        .iter()
        .filter_map(|prefix| input.find(prefix))
        .min();
    match cut {
        Some(idx) => format!("{}[redacted]", &input[..idx]),
        None => input.to_string(),
    }
}

/// Appends one JSON line to `<log_dir>/diagnostics.log`.
pub fn log_event(log_dir: &Path, kind: &str, load_id: Option<&str>, message: &str) -> io::Result<()> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE);
    trim_log(&path)?;
    let event = LogEvent {
        ts: Utc::now().to_rfc3339(),
        kind,
        load_id,
        message: sanitize(message),
    };
    let line = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

fn trim_log(path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let meta = fs::metadata(path)?;
    if meta.len() <= MAX_LOG_BYTES {
        return Ok(());
    }
    let data = fs::read(path)?;
    let mut keep_from = data.len().saturating_sub((MAX_LOG_BYTES / 2) as usize);
    // resume on a line boundary
    if let Some(offset) = data[keep_from..].iter().position(|b| *b == b'\n') {
        keep_from += offset + 1;
    }
    fs::write(path, &data[keep_from..])?;
    Ok(())
}
