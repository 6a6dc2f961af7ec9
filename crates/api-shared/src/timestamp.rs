//! Timestamp serialisation helpers.
//!
//! Persisted timestamps use ISO-8601 with millisecond precision and a `Z` suffix, for example
//! `2025-08-05T09:30:00.123Z`. Parsing accepts any RFC 3339 value and normalises it to UTC.

use chrono::{DateTime, SecondsFormat, Utc};

/// Render a timestamp in the persisted form.
pub fn format(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `#[serde(with = "...")]` adaptor for `DateTime<Utc>` fields.
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
