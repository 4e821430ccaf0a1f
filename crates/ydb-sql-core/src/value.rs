//! Encoding of runtime values into typed YDB values.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{DialectError, Result};
use crate::schema::{Field, Serializer};
use crate::statement::{SoftDelete, Value};
use crate::types::{map_type, YdbType};

/// A value together with its YDB type, ready to be bound.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float(f32),
    Double(f64),
    Utf8(String),
    /// Bytes, YDB `String`.
    String(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Interval(TimeDelta),
    Json(String),
    JsonDocument(String),
    /// Present value of an `Optional<T>`.
    Optional(Box<TypedValue>),
    /// Absent value; carries the inner type `T` of `Optional<T>`.
    Null(YdbType),
    /// List with its element type.
    List(YdbType, Vec<TypedValue>),
    Struct(Vec<(String, TypedValue)>),
}

impl TypedValue {
    /// Returns the YDB type of the value.
    #[must_use]
    pub fn ydb_type(&self) -> YdbType {
        match self {
            Self::Bool(_) => YdbType::Bool,
            Self::Int8(_) => YdbType::Int8,
            Self::Int16(_) => YdbType::Int16,
            Self::Int32(_) => YdbType::Int32,
            Self::Int64(_) => YdbType::Int64,
            Self::Uint8(_) => YdbType::Uint8,
            Self::Uint16(_) => YdbType::Uint16,
            Self::Uint32(_) => YdbType::Uint32,
            Self::Uint64(_) => YdbType::Uint64,
            Self::Float(_) => YdbType::Float,
            Self::Double(_) => YdbType::Double,
            Self::Utf8(_) => YdbType::Utf8,
            Self::String(_) => YdbType::String,
            Self::Timestamp(_) => YdbType::Timestamp,
            Self::Interval(_) => YdbType::Interval,
            Self::Json(_) => YdbType::Json,
            Self::JsonDocument(_) => YdbType::JsonDocument,
            Self::Optional(inner) => inner.ydb_type().optional(),
            Self::Null(inner) => inner.clone().optional(),
            Self::List(element, _) => element.clone().list(),
            Self::Struct(members) => YdbType::Struct(
                members
                    .iter()
                    .map(|(name, value)| (name.clone(), value.ydb_type()))
                    .collect(),
            ),
        }
    }

    /// Wraps a non-optional value so that its type becomes `Optional<T>`.
    #[must_use]
    pub fn into_optional(self) -> Self {
        match self {
            Self::Optional(_) | Self::Null(_) => self,
            other => Self::Optional(Box::new(other)),
        }
    }
}

/// Encodes a runtime value.
///
/// Times and soft-delete markers become `Timestamp`, durations become
/// `Interval`. A soft-delete marker that is not set encodes as a typed NULL.
///
/// # Errors
///
/// Returns [`DialectError::UnsupportedValue`] for untyped NULL, 128-bit
/// integers and JSON values (which need a field serializer).
pub fn encode(value: &Value) -> Result<TypedValue> {
    let typed = match value {
        Value::Bool(v) => TypedValue::Bool(*v),
        Value::Int8(v) => TypedValue::Int8(*v),
        Value::Int16(v) => TypedValue::Int16(*v),
        Value::Int32(v) => TypedValue::Int32(*v),
        Value::Int64(v) => TypedValue::Int64(*v),
        Value::Uint8(v) => TypedValue::Uint8(*v),
        Value::Uint16(v) => TypedValue::Uint16(*v),
        Value::Uint32(v) => TypedValue::Uint32(*v),
        Value::Uint64(v) => TypedValue::Uint64(*v),
        Value::Float32(v) => TypedValue::Float(*v),
        Value::Float64(v) => TypedValue::Double(*v),
        Value::String(v) => TypedValue::Utf8(v.clone()),
        Value::Bytes(v) => TypedValue::String(v.clone()),
        Value::Time(t) => TypedValue::Timestamp(*t),
        Value::Duration(d) => TypedValue::Interval(*d),
        Value::SoftDelete(SoftDelete { deleted_at }) => match deleted_at {
            Some(t) => TypedValue::Timestamp(*t),
            None => TypedValue::Null(YdbType::Timestamp),
        },
        Value::Null | Value::Int128(_) | Value::Uint128(_) | Value::Json(_) => {
            return Err(DialectError::UnsupportedValue(value.type_name().to_string()));
        }
    };
    Ok(typed)
}

/// Encodes a value bound to a known field.
///
/// The field's serializer is applied first. A NULL becomes a typed NULL of
/// the field's column type when the field is nullable.
///
/// # Errors
///
/// Serializer failures, NULL for a NOT NULL field, and everything
/// [`encode`] rejects.
pub fn encode_field(field: &Field, value: &Value) -> Result<TypedValue> {
    if let Some(serializer) = field.effective_serializer() {
        return serializer.serialize(field, value);
    }
    if matches!(value, Value::Null) && field.nullable() {
        let (_, ty) = map_type(field)?;
        return Ok(TypedValue::Null(ty));
    }
    encode(value)
}

impl Serializer {
    /// Serializes `value` to JSON text wrapped in the field's column type.
    ///
    /// # Errors
    ///
    /// Fails when the value cannot be represented as JSON, or when the
    /// field's `type` tag names a format other than `json`/`jsondocument`.
    pub fn serialize(self, field: &Field, value: &Value) -> Result<TypedValue> {
        let text = serde_json::to_string(&to_json(value)?)?;
        match self {
            Self::Json => Ok(TypedValue::JsonDocument(text)),
            Self::YdbJson => match field.type_tag_normalized().as_deref() {
                Some("json") => Ok(TypedValue::Json(text)),
                Some("jsondocument") => Ok(TypedValue::JsonDocument(text)),
                other => Err(DialectError::UnsupportedSerialization {
                    field: field.db_name.clone(),
                    format: other.unwrap_or("unknown").to_string(),
                }),
            },
        }
    }
}

fn to_json(value: &Value) -> Result<serde_json::Value> {
    let json = match value {
        Value::Null | Value::SoftDelete(SoftDelete { deleted_at: None }) => serde_json::Value::Null,
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::Int8(v) => (*v).into(),
        Value::Int16(v) => (*v).into(),
        Value::Int32(v) => (*v).into(),
        Value::Int64(v) => (*v).into(),
        Value::Uint8(v) => (*v).into(),
        Value::Uint16(v) => (*v).into(),
        Value::Uint32(v) => (*v).into(),
        Value::Uint64(v) => (*v).into(),
        Value::Float32(v) => serde_json::to_value(v)?,
        Value::Float64(v) => serde_json::to_value(v)?,
        Value::String(v) => serde_json::Value::String(v.clone()),
        Value::Bytes(v) => serde_json::to_value(v)?,
        Value::Time(t) | Value::SoftDelete(SoftDelete { deleted_at: Some(t) }) => {
            serde_json::to_value(t)?
        }
        Value::Json(v) => v.clone(),
        Value::Int128(_) | Value::Uint128(_) | Value::Duration(_) => {
            return Err(DialectError::UnsupportedValue(value.type_name().to_string()));
        }
    };
    Ok(json)
}
