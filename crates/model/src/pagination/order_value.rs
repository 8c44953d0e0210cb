use crate::{core::value::Value, pagination::cursor::CursorError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The sort-column value of a cursor's anchor row.
///
/// Only these kinds can anchor a page. Anything else the store may return
/// (uuids, dates, json, NULL) is rejected when a cursor is built from a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderValue {
    String(String),
    Bytes(Vec<u8>),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Timestamp(#[serde(with = "timestamp_parts")] DateTime<Utc>),
    Duration(#[serde(with = "duration_parts")] TimeDelta),
}

impl TryFrom<&Value> for OrderValue {
    type Error = CursorError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let order_value = match value {
            Value::String(v) => OrderValue::String(v.clone()),
            Value::Bytes(v) => OrderValue::Bytes(v.clone()),
            Value::Int32(v) => OrderValue::Int32(*v),
            Value::Int64(v) => OrderValue::Int64(*v),
            Value::Uint32(v) => OrderValue::Uint32(*v),
            Value::Uint64(v) => OrderValue::Uint64(*v),
            Value::Float32(v) => OrderValue::Float32(*v),
            Value::Float64(v) => OrderValue::Float64(*v),
            Value::Boolean(v) => OrderValue::Bool(*v),
            Value::Timestamp(v) => OrderValue::Timestamp(*v),
            Value::Duration(v) => OrderValue::Duration(*v),
            other => {
                return Err(CursorError::UnsupportedOrderValue {
                    value: other.to_string(),
                    kind: other.kind(),
                });
            }
        };

        Ok(order_value)
    }
}

impl TryFrom<Value> for OrderValue {
    type Error = CursorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        OrderValue::try_from(&value)
    }
}

impl From<OrderValue> for Value {
    fn from(value: OrderValue) -> Self {
        match value {
            OrderValue::String(v) => Value::String(v),
            OrderValue::Bytes(v) => Value::Bytes(v),
            OrderValue::Int32(v) => Value::Int32(v),
            OrderValue::Int64(v) => Value::Int64(v),
            OrderValue::Uint32(v) => Value::Uint32(v),
            OrderValue::Uint64(v) => Value::Uint64(v),
            OrderValue::Float32(v) => Value::Float32(v),
            OrderValue::Float64(v) => Value::Float64(v),
            OrderValue::Bool(v) => Value::Boolean(v),
            OrderValue::Timestamp(v) => Value::Timestamp(v),
            OrderValue::Duration(v) => Value::Duration(v),
        }
    }
}

impl fmt::Display for OrderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Value::from(self.clone()).fmt(f)
    }
}

// Timestamps travel as (seconds, nanos) so no precision is lost.
mod timestamp_parts {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        (ts.timestamp(), ts.timestamp_subsec_nanos()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let (secs, nanos) = <(i64, u32)>::deserialize(d)?;
        DateTime::from_timestamp(secs, nanos)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {secs}s {nanos}ns")))
    }
}

// Durations are signed; the nanosecond part carries the same sign as the seconds.
mod duration_parts {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

    pub fn serialize<S: Serializer>(delta: &TimeDelta, s: S) -> Result<S::Ok, S::Error> {
        (delta.num_seconds(), delta.subsec_nanos()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<TimeDelta, D::Error> {
        let (secs, nanos) = <(i64, i32)>::deserialize(d)?;
        TimeDelta::try_seconds(secs)
            .and_then(|whole| whole.checked_add(&TimeDelta::nanoseconds(i64::from(nanos))))
            .ok_or_else(|| D::Error::custom(format!("duration out of range: {secs}s {nanos}ns")))
    }
}
