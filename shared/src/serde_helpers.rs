//! Serde helpers for backend payloads
//!
//! The backend stores ids as strings but hand-written fixtures and older
//! deployments send plain integers, so ids accept both. Timestamps arrive
//! either as RFC 3339 or as naive ISO 8601 values that are implicitly UTC.

use crate::types::Timestamp;
use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// 内部辅助：同时支持字符串和整数格式的 ID
#[derive(Debug, Clone)]
struct FlexibleId(String);

impl<'de> Deserialize<'de> for FlexibleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct FlexibleVisitor;

        impl<'de> Visitor<'de> for FlexibleVisitor {
            type Value = FlexibleId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer id")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FlexibleId(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FlexibleId(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FlexibleId(value.to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FlexibleId(value.to_string()))
            }
        }

        deserializer.deserialize_any(FlexibleVisitor)
    }
}

/// Id serialized as a string, deserialized from a string or an integer
pub mod id {
    use super::*;

    pub fn serialize<S>(id: &str, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(id)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        FlexibleId::deserialize(d).map(|id| id.0)
    }
}

/// Vec of ids, null treated as empty
pub mod vec_id {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S>(ids: &[String], s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = s.serialize_seq(Some(ids.len()))?;
        for id in ids {
            seq.serialize_element(id)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ids: Option<Vec<FlexibleId>> = Option::deserialize(d)?;
        Ok(ids
            .unwrap_or_default()
            .into_iter()
            .map(|id| id.0)
            .collect())
    }
}

/// Optional timestamp: RFC 3339 out, RFC 3339 or naive UTC in
pub mod option_timestamp {
    use super::*;

    pub fn serialize<S>(ts: &Option<Timestamp>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ts {
            Some(ts) => s.serialize_some(&ts.to_rfc3339()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse_timestamp(value)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {value}"))),
        }
    }
}

/// Parse a backend timestamp; naive values are taken as UTC
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    value
        .parse::<NaiveDateTime>()
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
