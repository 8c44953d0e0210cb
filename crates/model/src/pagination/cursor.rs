//! Opaque keyset cursors and their binary wire format.
//!
//! A cursor anchors a position in an ordered result stream: the tie-break id
//! of a boundary row, that row's sort-column value, and whether the next scan
//! runs before (`is_backwards`) or after the anchor. It also carries a
//! fingerprint of the sort contract it was issued under so a stale cursor
//! cannot be replayed against a different sort column or direction.

use crate::{core::value::Value, pagination::order_value::OrderValue};
use bincode::Options;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Upper bound on the encoded size of a cursor token.
pub const MAX_CURSOR_LEN: usize = 300;

const CURSOR_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("cursor is empty")]
    Empty,

    #[error("cursor exceeds max length: {len} bytes (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("unmarshal cursor: {0}")]
    Decode(String),

    #[error("marshal cursor: {0}")]
    Encode(String),

    #[error("unsupported cursor version: {0}")]
    UnsupportedVersion(u8),

    #[error("cursor has no order value")]
    MissingOrderValue,

    #[error("cursor has no primary id")]
    MissingPrimaryId,

    #[error("unsupported order value: {value} ({kind})")]
    UnsupportedOrderValue { value: String, kind: &'static str },

    #[error("cursor has no order value to encode")]
    Unpopulated,

    #[error("cursor was issued for a different sort order than '{column}' {direction}")]
    ContractMismatch {
        column: String,
        direction: &'static str,
    },
}

/// The ordering a cursor is valid for: the sort column and the direction the
/// client asked for (before any backwards inversion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortContract {
    pub column: String,
    pub descending: bool,
}

impl SortContract {
    pub fn new(column: &str, descending: bool) -> Self {
        SortContract {
            column: column.to_string(),
            descending,
        }
    }

    fn direction(&self) -> &'static str {
        if self.descending { "DESC" } else { "ASC" }
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(format!("{}:{}", self.column, self.direction()).as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    primary_id: String,
    order_value: Option<OrderValue>,
    is_backwards: bool,
    contract: u64,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u8,
    primary_id: String,
    order_value: Option<OrderValue>,
    is_backwards: bool,
    contract: u64,
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .reject_trailing_bytes()
        .with_limit(MAX_CURSOR_LEN as u64)
}

impl Cursor {
    pub fn new(
        primary_id: impl Into<String>,
        order_value: OrderValue,
        is_backwards: bool,
        contract: &SortContract,
    ) -> Self {
        Cursor {
            primary_id: primary_id.into(),
            order_value: Some(order_value),
            is_backwards,
            contract: contract.fingerprint(),
        }
    }

    /// Builds a cursor from a fetched column value. This is the only place a
    /// runtime value becomes an order value.
    pub fn from_value(
        primary_id: impl Into<String>,
        value: &Value,
        is_backwards: bool,
        contract: &SortContract,
    ) -> Result<Self, CursorError> {
        let order_value = OrderValue::try_from(value)?;
        Ok(Cursor::new(primary_id, order_value, is_backwards, contract))
    }

    /// A cursor that carries only its anchor id. It cannot be encoded and
    /// reading its order value panics.
    pub fn unpopulated(primary_id: impl Into<String>) -> Self {
        Cursor {
            primary_id: primary_id.into(),
            order_value: None,
            is_backwards: false,
            contract: 0,
        }
    }

    pub fn primary_id(&self) -> &str {
        &self.primary_id
    }

    pub fn is_backwards(&self) -> bool {
        self.is_backwards
    }

    pub fn is_forwards(&self) -> bool {
        !self.is_backwards
    }

    /// Fingerprint of the sort contract the cursor was issued under.
    pub fn contract(&self) -> u64 {
        self.contract
    }

    /// The anchor row's sort value.
    ///
    /// # Panics
    ///
    /// Panics on a cursor that was never populated; decoded and freshly built
    /// cursors always carry a value.
    pub fn order_value(&self) -> &OrderValue {
        match &self.order_value {
            Some(value) => value,
            None => panic!("unsupported or unset order_value in cursor: {self:?}"),
        }
    }

    /// Rejects a cursor issued under a different sort column or direction.
    pub fn verify(&self, contract: &SortContract) -> Result<(), CursorError> {
        if self.contract != contract.fingerprint() {
            return Err(CursorError::ContractMismatch {
                column: contract.column.clone(),
                direction: contract.direction(),
            });
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>, CursorError> {
        if self.order_value.is_none() {
            return Err(CursorError::Unpopulated);
        }

        let envelope = Envelope {
            version: CURSOR_VERSION,
            primary_id: self.primary_id.clone(),
            order_value: self.order_value.clone(),
            is_backwards: self.is_backwards,
            contract: self.contract,
        };

        let buf = bincode::DefaultOptions::new()
            .reject_trailing_bytes()
            .serialize(&envelope)
            .map_err(|e| CursorError::Encode(e.to_string()))?;
        if buf.len() > MAX_CURSOR_LEN {
            return Err(CursorError::TooLong {
                len: buf.len(),
                max: MAX_CURSOR_LEN,
            });
        }

        Ok(buf)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, CursorError> {
        if buf.is_empty() {
            return Err(CursorError::Empty);
        }
        if buf.len() > MAX_CURSOR_LEN {
            return Err(CursorError::TooLong {
                len: buf.len(),
                max: MAX_CURSOR_LEN,
            });
        }

        let envelope: Envelope = wire_options()
            .deserialize(buf)
            .map_err(|e| CursorError::Decode(e.to_string()))?;

        if envelope.version != CURSOR_VERSION {
            return Err(CursorError::UnsupportedVersion(envelope.version));
        }
        if envelope.primary_id.is_empty() {
            return Err(CursorError::MissingPrimaryId);
        }
        let Some(order_value) = envelope.order_value else {
            return Err(CursorError::MissingOrderValue);
        };

        Ok(Cursor {
            primary_id: envelope.primary_id,
            order_value: Some(order_value),
            is_backwards: envelope.is_backwards,
            contract: envelope.contract,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Cursor, CursorError, Envelope, MAX_CURSOR_LEN, SortContract, wire_options};
    use crate::{core::value::Value, pagination::order_value::OrderValue};
    use bincode::Options;
    use chrono::{TimeDelta, TimeZone, Utc};
    use uuid::Uuid;

    fn contract() -> SortContract {
        SortContract::new("created_at", false)
    }

    fn representative_values() -> Vec<OrderValue> {
        let when = Utc.with_ymd_and_hms(2025, 7, 24, 12, 0, 0).unwrap();
        vec![
            OrderValue::String(String::new()),
            OrderValue::String("hello".to_string()),
            OrderValue::Bytes(Vec::new()),
            OrderValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]),
            OrderValue::Int32(0),
            OrderValue::Int32(i32::MIN),
            OrderValue::Int32(i32::MAX),
            OrderValue::Int64(-100),
            OrderValue::Int64(i64::MIN),
            OrderValue::Int64(i64::MAX),
            OrderValue::Uint32(0),
            OrderValue::Uint32(u32::MAX),
            OrderValue::Uint64(u64::MAX),
            OrderValue::Float32(3.14),
            OrderValue::Float32(-0.0),
            OrderValue::Float32(f32::MAX),
            OrderValue::Float64(2.718281828),
            OrderValue::Float64(f64::MIN),
            OrderValue::Bool(true),
            OrderValue::Bool(false),
            OrderValue::Timestamp(when),
            OrderValue::Timestamp(when + TimeDelta::nanoseconds(123_456_789)),
            OrderValue::Timestamp(Utc.timestamp_opt(-1, 999_999_999).unwrap()),
            OrderValue::Duration(TimeDelta::minutes(5)),
            OrderValue::Duration(TimeDelta::zero()),
            OrderValue::Duration(TimeDelta::milliseconds(-1_500)),
            OrderValue::Duration(TimeDelta::nanoseconds(-7)),
            OrderValue::Duration(TimeDelta::MAX),
            OrderValue::Duration(TimeDelta::MIN),
        ]
    }

    #[test]
    fn test_round_trip_every_order_value() {
        for value in representative_values() {
            for backwards in [true, false] {
                let cursor = Cursor::new("foo_1", value.clone(), backwards, &contract());
                let buf = cursor.encode().unwrap();
                assert!(buf.len() <= MAX_CURSOR_LEN);

                let decoded = Cursor::decode(&buf).unwrap();
                assert_eq!(decoded.order_value(), &value, "value {value:?}");
                assert_eq!(decoded.primary_id(), "foo_1");
                assert_eq!(decoded.is_backwards(), backwards);
                assert_eq!(decoded.is_forwards(), !backwards);
                assert!(decoded.verify(&contract()).is_ok());
            }
        }
    }

    #[test]
    fn test_from_value_rejects_unsupported_kind() {
        let id = Uuid::nil();
        let err = Cursor::from_value("foo_1", &Value::Uuid(id), false, &contract()).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("unsupported order value: {id} (uuid)")
        );
    }

    #[test]
    fn test_from_value_accepts_supported_kind() {
        let cursor = Cursor::from_value("foo_1", &Value::Int64(100), true, &contract()).unwrap();
        assert_eq!(cursor.order_value(), &OrderValue::Int64(100));
        assert!(cursor.is_backwards());
    }

    #[test]
    #[should_panic(expected = "unsupported or unset order_value in cursor")]
    fn test_unpopulated_order_value_panics() {
        let cursor = Cursor::unpopulated("foo_1");
        let _ = cursor.order_value();
    }

    #[test]
    fn test_unpopulated_cursor_cannot_encode() {
        let cursor = Cursor::unpopulated("foo_1");
        assert_eq!(cursor.encode(), Err(CursorError::Unpopulated));
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert_eq!(Cursor::decode(&[]), Err(CursorError::Empty));
        assert!(matches!(
            Cursor::decode(&[0xff, 0xff, 0xff]),
            Err(CursorError::Decode(_)) | Err(CursorError::UnsupportedVersion(_))
        ));

        let oversized = vec![1u8; MAX_CURSOR_LEN + 1];
        assert_eq!(
            Cursor::decode(&oversized),
            Err(CursorError::TooLong {
                len: MAX_CURSOR_LEN + 1,
                max: MAX_CURSOR_LEN
            })
        );
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let cursor = Cursor::new("foo_1", OrderValue::Int32(1), false, &contract());
        let mut buf = cursor.encode().unwrap();
        buf.push(0);
        assert!(matches!(Cursor::decode(&buf), Err(CursorError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_missing_parts() {
        let envelope = Envelope {
            version: 1,
            primary_id: "foo_1".to_string(),
            order_value: None,
            is_backwards: false,
            contract: 0,
        };
        let buf = wire_options().serialize(&envelope).unwrap();
        assert_eq!(Cursor::decode(&buf), Err(CursorError::MissingOrderValue));

        let envelope = Envelope {
            version: 1,
            primary_id: String::new(),
            order_value: Some(OrderValue::Bool(true)),
            is_backwards: false,
            contract: 0,
        };
        let buf = wire_options().serialize(&envelope).unwrap();
        assert_eq!(Cursor::decode(&buf), Err(CursorError::MissingPrimaryId));

        let envelope = Envelope {
            version: 9,
            primary_id: "foo_1".to_string(),
            order_value: Some(OrderValue::Bool(true)),
            is_backwards: false,
            contract: 0,
        };
        let buf = wire_options().serialize(&envelope).unwrap();
        assert_eq!(Cursor::decode(&buf), Err(CursorError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_encode_rejects_oversized_anchor() {
        let value = OrderValue::String("x".repeat(MAX_CURSOR_LEN));
        let cursor = Cursor::new("foo_1", value, false, &contract());
        assert!(matches!(
            cursor.encode(),
            Err(CursorError::TooLong { max: MAX_CURSOR_LEN, .. })
        ));
    }

    #[test]
    fn test_verify_rejects_other_contracts() {
        let cursor = Cursor::new("foo_1", OrderValue::Int64(1), false, &contract());
        let decoded = Cursor::decode(&cursor.encode().unwrap()).unwrap();

        assert_eq!(
            decoded.verify(&SortContract::new("updated_at", false)),
            Err(CursorError::ContractMismatch {
                column: "updated_at".to_string(),
                direction: "ASC",
            })
        );
        assert!(decoded.verify(&SortContract::new("created_at", true)).is_err());
    }
}
