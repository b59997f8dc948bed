use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Layout of stored timestamps: `2025-09-01 19:30:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The school's wall-clock offset (America/Sao_Paulo, UTC-03:00, no DST).
pub fn school_offset() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).unwrap_or_else(|| Utc.fix())
}

/// Format `instant` in school time.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&school_offset())
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Current school-local time, formatted for storage.
pub fn local_timestamp() -> String {
    format_timestamp(Utc::now())
}
