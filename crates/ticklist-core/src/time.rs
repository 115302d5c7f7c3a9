//! Local wall-clock timestamps and their ISO-8601 wire form.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound};
use serde::{de, Deserialize, Deserializer, Serializer};
use thiserror::Error;

/// Layout written to disk. Fractional seconds are omitted when zero.
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Layouts accepted on read, tried in order before RFC 3339 and bare dates.
const NAIVE_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised timestamp: {input:?}")]
pub struct TimestampError {
    pub input: String,
}

/// Current local time, truncated to microseconds.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

/// Current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a timestamp leniently.
///
/// Accepts ISO date-times with a `T` or space separator (seconds and fractions
/// optional), RFC 3339 with an offset (converted to local time), and bare
/// `YYYY-MM-DD` dates, which are read as midnight.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, TimestampError> {
    let trimmed = input.trim();
    for layout in NAIVE_LAYOUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, layout) {
            return Ok(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Local).naive_local());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(TimestampError {
        input: input.to_string(),
    })
}

/// ISO-8601 rendering used on disk.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(ISO_FORMAT).to_string()
}

/// Human-facing date, e.g. `Jun 15, 2024`, or `Not set`.
pub fn display_date(ts: Option<&NaiveDateTime>) -> String {
    match ts {
        Some(ts) => ts.format("%b %d, %Y").to_string(),
        None => "Not set".to_string(),
    }
}

/// Serde adapter for required timestamps.
pub mod iso {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(ISO_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(de::Error::custom)
    }
}

/// Serde adapter for optional timestamps. `null` and `""` both read as absent.
pub mod iso_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        ts: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.collect_str(&ts.format(ISO_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_timestamp(&raw).map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Tri-state field for patches: key absent leaves the value alone (via
/// `#[serde(default)]`), `null` clears it, a string sets it.
pub(crate) fn deserialize_patch_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<NaiveDateTime>>, D::Error> {
    iso_opt::deserialize(deserializer).map(Some)
}
