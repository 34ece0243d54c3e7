//! Fixed timestamp layout used in the persisted representation.

use crate::error::RecordError;
use chrono::NaiveDateTime;

/// ISO-8601 with six fractional digits and no offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Render a timestamp in the persisted layout.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a persisted timestamp, naming `field` in the error.
pub fn parse_timestamp(field: &str, raw: &str) -> Result<NaiveDateTime, RecordError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|source| {
        RecordError::InvalidTimestamp {
            field: field.to_string(),
            value: raw.to_string(),
            source,
        }
    })
}
