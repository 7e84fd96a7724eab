#![forbid(unsafe_code)]

//! Timestamps are stored as epoch milliseconds and exchanged as RFC 3339.

use super::StoreError;
use serde::{Deserialize, Deserializer, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub fn now_ms() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    let ms = nanos / 1_000_000i128;
    if ms <= 0 {
        0
    } else if ms >= i64::MAX as i128 {
        i64::MAX
    } else {
        ms as i64
    }
}

pub fn format_rfc3339(ts_ms: i64) -> String {
    let nanos = (ts_ms as i128) * 1_000_000i128;
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH);
    dt.format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

pub fn parse_rfc3339(value: &str) -> Result<i64, StoreError> {
    let dt = OffsetDateTime::parse(value.trim(), &Rfc3339)
        .map_err(|_| StoreError::invalid(format!("invalid RFC 3339 timestamp '{value}'")))?;
    let ms = dt.unix_timestamp_nanos() / 1_000_000i128;
    i64::try_from(ms).map_err(|_| StoreError::invalid("timestamp out of range"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

impl RawTimestamp {
    fn into_ms<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            RawTimestamp::Millis(ms) => Ok(ms),
            RawTimestamp::Text(text) => parse_rfc3339(&text).map_err(E::custom),
        }
    }
}

pub(crate) fn serialize<S: Serializer>(ts_ms: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_rfc3339(*ts_ms))
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    RawTimestamp::deserialize(deserializer)?.into_ms()
}

pub(crate) mod option {
    use super::{RawTimestamp, format_rfc3339};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(
        ts_ms: &Option<i64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts_ms {
            Some(ts_ms) => serializer.serialize_some(&format_rfc3339(*ts_ms)),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        Option::<RawTimestamp>::deserialize(deserializer)?
            .map(RawTimestamp::into_ms)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_round_trip_keeps_milliseconds() {
        let ms = 1_700_000_000_123;
        let text = format_rfc3339(ms);
        assert!(text.starts_with("2023-11-14T22:13:20.123"));
        assert_eq!(parse_rfc3339(&text).expect("parse"), ms);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            parse_rfc3339("yesterday"),
            Err(StoreError::InvalidInput(_))
        ));
    }
}
