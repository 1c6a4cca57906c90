//! File-history records returned by the upload service

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// One prior upload as reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub original_filename: String,
    /// Name the server stored the file under
    #[serde(default)]
    pub system_filename: Option<String>,
    pub file_size_bytes: u64,
    /// Upload time as sent by the server (ISO 8601)
    pub uploaded_at: String,
}

impl FileRecord {
    /// Human readable file size
    pub fn display_size(&self) -> String {
        format_size(self.file_size_bytes)
    }

    /// Upload time in the local timezone
    pub fn display_uploaded_at(&self) -> String {
        format_timestamp(&self.uploaded_at, &Local)
    }
}

/// Format a byte count using 1024-based units, e.g. `1536` -> `1.5 KB`
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut divisor = 1u64;
    while unit + 1 < SIZE_UNITS.len() && bytes / divisor >= 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let value = format!("{:.2}", bytes as f64 / divisor as f64);
    let value = value.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", value, SIZE_UNITS[unit])
}

/// Render a server timestamp in `tz`.
///
/// Offsets are honoured; naive timestamps are UTC. Anything unparseable is
/// returned unchanged.
///
/// Naive values are shifted from UTC rather than shown as-is, since the
/// service stamps uploads with UTC wall-clock time.
pub fn format_timestamp<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(raw) {
        Some(utc) => utc
            .with_timezone(tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => raw.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(500), "500 Bytes");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_250_000), "1.19 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3 GB");
        assert_eq!(format_size(5 * 1024u64.pow(5)), "5120 TB");
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        assert_eq!(
            format_timestamp("2024-05-01T12:34:56.789012", &Utc),
            "2024-05-01 12:34:56"
        );
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            format_timestamp("2024-05-01T12:34:56", &plus_two),
            "2024-05-01 14:34:56"
        );
    }

    #[test]
    fn test_offset_timestamp() {
        assert_eq!(
            format_timestamp("2024-05-01T12:00:00+09:00", &Utc),
            "2024-05-01 03:00:00"
        );
    }

    #[test]
    fn test_unparseable_timestamp_shown_raw() {
        assert_eq!(format_timestamp("yesterday", &Utc), "yesterday");
    }

    #[test]
    fn test_deserialize_server_record() {
        let json = r#"{
            "id": 7,
            "original_filename": "report.pdf",
            "system_filename": "0b6f0c1e-3a57-4a43-9d43-0c9d5f0c2b9a.pdf",
            "file_size_bytes": 2048,
            "uploaded_at": "2024-05-01T12:34:56"
        }"#;
        let record: FileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.original_filename, "report.pdf");
        assert_eq!(record.display_size(), "2 KB");

        let minimal = r#"{"id":1,"original_filename":"a","file_size_bytes":0,"uploaded_at":"x"}"#;
        let record: FileRecord = serde_json::from_str(minimal).unwrap();
        assert_eq!(record.system_filename, None);
    }
}
