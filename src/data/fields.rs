//! Serde helpers for the loosely typed fields of Bandcamp responses
//!
//! Ids arrive as integers, floats or strings depending on the endpoint, and
//! dates arrive as UNIX timestamps.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use crate::client::{float_to_id, parse_id};

struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a numeric id as integer, float or string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::custom(format!("negative id {}", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
        float_to_id(v).ok_or_else(|| E::custom(format!("invalid id {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        parse_id(v).ok_or_else(|| E::custom(format!("invalid id '{}'", v)))
    }
}

/// Deserializes a required id
pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    deserializer.deserialize_any(IdVisitor)
}

/// Deserializes an optional id; `null` gives `None`
pub fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "id")] u64);

    Option::<Wrapped>::deserialize(deserializer).map(|w| w.map(|Wrapped(v)| v))
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = DateTime<Utc>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a UNIX timestamp or an RFC 3339 date")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        DateTime::from_timestamp(v, 0)
            .ok_or_else(|| E::custom(format!("timestamp {} out of range", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let secs =
            i64::try_from(v).map_err(|_| E::custom(format!("timestamp {} out of range", v)))?;
        self.visit_i64(secs)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Err(E::custom("timestamp is not finite"));
        }
        self.visit_i64(v.trunc() as i64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if let Ok(secs) = v.trim().parse::<i64>() {
            return self.visit_i64(secs);
        }
        DateTime::parse_from_rfc3339(v)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| E::custom(format!("invalid date '{}'", v)))
    }
}

/// Deserializes an optional release date
///
/// Accepts UNIX seconds, which the service sends, and RFC 3339 strings, which
/// is how the entities serialize their dates.
pub fn opt_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "timestamp")] DateTime<Utc>);

    fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }

    Option::<Wrapped>::deserialize(deserializer).map(|w| w.map(|Wrapped(v)| v))
}
