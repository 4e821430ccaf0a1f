//! Runtime values carried by statements.

use chrono::{DateTime, TimeDelta, Utc};

/// Soft-delete marker: set once the row is logically deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SoftDelete {
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDelete {
    /// A marker for a deleted row.
    #[must_use]
    pub const fn deleted(at: DateTime<Utc>) -> Self {
        Self {
            deleted_at: Some(at),
        }
    }
}

/// A dynamically typed value as handed over by the ORM.
///
/// Not every variant has a YDB representation; see
/// [`crate::value::encode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Int128(i128),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Uint128(u128),
    Float32(f32),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Time(DateTime<Utc>),
    Duration(TimeDelta),
    SoftDelete(SoftDelete),
    /// Structured data, bound through a field serializer.
    Json(serde_json::Value),
}

impl Value {
    /// Short name of the runtime type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int8(_) => "i8",
            Self::Int16(_) => "i16",
            Self::Int32(_) => "i32",
            Self::Int64(_) => "i64",
            Self::Int128(_) => "i128",
            Self::Uint8(_) => "u8",
            Self::Uint16(_) => "u16",
            Self::Uint32(_) => "u32",
            Self::Uint64(_) => "u64",
            Self::Uint128(_) => "u128",
            Self::Float32(_) => "f32",
            Self::Float64(_) => "f64",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Time(_) => "time",
            Self::Duration(_) => "duration",
            Self::SoftDelete(_) => "soft_delete",
            Self::Json(_) => "json",
        }
    }

    /// Returns the value rendered for inline display (escaped).
    ///
    /// **Warning**: meant for logging and `explain`, never for execution.
    #[must_use]
    pub fn to_inline(&self) -> String {
        match self {
            Self::Null | Self::SoftDelete(SoftDelete { deleted_at: None }) => String::from("NULL"),
            Self::Bool(b) => b.to_string(),
            Self::Int8(n) => n.to_string(),
            Self::Int16(n) => n.to_string(),
            Self::Int32(n) => n.to_string(),
            Self::Int64(n) => n.to_string(),
            Self::Int128(n) => n.to_string(),
            Self::Uint8(n) => n.to_string(),
            Self::Uint16(n) => n.to_string(),
            Self::Uint32(n) => n.to_string(),
            Self::Uint64(n) => n.to_string(),
            Self::Uint128(n) => n.to_string(),
            Self::Float32(f) => f.to_string(),
            Self::Float64(f) => f.to_string(),
            Self::String(s) => quote_literal(s),
            Self::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) if s.chars().all(|c| !c.is_control()) => quote_literal(s),
                _ => String::from("'<binary>'"),
            },
            Self::Time(t) | Self::SoftDelete(SoftDelete { deleted_at: Some(t) }) => {
                format!("'{}'", t.format("%Y-%m-%d %H:%M:%S%.3f"))
            }
            Self::Duration(d) => d.num_microseconds().map_or_else(
                || d.num_milliseconds().to_string(),
                |us| us.to_string(),
            ),
            Self::Json(j) => quote_literal(&j.to_string()),
        }
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Trait for types that can be converted to a [`Value`].
pub trait ToValue {
    /// Converts into a `Value`.
    fn to_value(self) -> Value;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

macro_rules! impl_to_value {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(self) -> Value {
                    Value::$variant(self)
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )+
    };
}

impl_to_value!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    i128 => Int128,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    u128 => Uint128,
    f32 => Float32,
    f64 => Float64,
    String => String,
    Vec<u8> => Bytes,
    DateTime<Utc> => Time,
    TimeDelta => Duration,
    SoftDelete => SoftDelete,
    serde_json::Value => Json,
);

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::String(String::from(self))
    }
}

impl ToValue for &[u8] {
    fn to_value(self) -> Value {
        Value::Bytes(self.to_vec())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        self.map_or(Value::Null, ToValue::to_value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        value.to_value()
    }
}

impl<T: ToValue> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.to_value()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_to_value_conversions() {
        assert_eq!(42i32.to_value(), Value::Int32(42));
        assert_eq!("abc".to_value(), Value::String("abc".into()));
        assert_eq!(None::<i64>.to_value(), Value::Null);
        assert_eq!(Some(7u8).to_value(), Value::Uint8(7));
        assert_eq!(Value::from(1.5f64), Value::Float64(1.5));
    }

    #[test]
    fn test_inline_rendering() {
        assert_eq!(Value::String("it's".into()).to_inline(), "'it''s'");
        assert_eq!(Value::Int64(123).to_inline(), "123");
        assert_eq!(Value::Null.to_inline(), "NULL");
        assert_eq!(Value::Bytes(vec![0, 1]).to_inline(), "'<binary>'");
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(Value::Time(t).to_inline(), "'2024-03-01 12:30:00.000'");
        assert_eq!(Value::Duration(TimeDelta::seconds(2)).to_inline(), "2000000");
    }
}
