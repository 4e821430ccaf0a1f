//! YDB column types and the field-to-type mapper.

use std::fmt;

use crate::error::{DialectError, Result};
use crate::schema::{Field, FieldKind};

/// A YDB data type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum YdbType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float,
    Double,
    /// UTF-8 text.
    Utf8,
    /// Arbitrary bytes.
    String,
    Timestamp,
    Datetime,
    Interval,
    Json,
    JsonDocument,
    Yson,
    Optional(Box<YdbType>),
    List(Box<YdbType>),
    /// Struct with ordered, named members.
    Struct(Vec<(String, YdbType)>),
}

impl YdbType {
    /// Wraps the type in `Optional<>`.
    #[must_use]
    pub fn optional(self) -> Self {
        Self::Optional(Box::new(self))
    }

    /// Wraps the type in `List<>`.
    #[must_use]
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Strips every `Optional<>` layer.
    ///
    /// Returns the innermost type and whether at least one layer was removed.
    #[must_use]
    pub fn strip_optional(&self) -> (&Self, bool) {
        let mut current = self;
        let mut stripped = false;
        while let Self::Optional(inner) = current {
            current = inner;
            stripped = true;
        }
        (current, stripped)
    }

    /// Renders the type in YQL syntax, e.g. `Optional<Utf8>`.
    #[must_use]
    pub fn yql(&self) -> String {
        let mut out = String::new();
        self.write_yql(&mut out);
        out
    }

    fn write_yql(&self, out: &mut String) {
        match self {
            Self::Optional(inner) => {
                out.push_str("Optional<");
                inner.write_yql(out);
                out.push('>');
            }
            Self::List(inner) => {
                out.push_str("List<");
                inner.write_yql(out);
                out.push('>');
            }
            Self::Struct(members) => {
                out.push_str("Struct<");
                for (i, (name, ty)) in members.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push('\'');
                    for c in name.chars() {
                        if c == '\'' || c == '\\' {
                            out.push('\\');
                        }
                        out.push(c);
                    }
                    out.push_str("':");
                    ty.write_yql(out);
                }
                out.push('>');
            }
            primitive => out.push_str(primitive.primitive_name()),
        }
    }

    const fn primitive_name(&self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Uint8 => "Uint8",
            Self::Uint16 => "Uint16",
            Self::Uint32 => "Uint32",
            Self::Uint64 => "Uint64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Utf8 => "Utf8",
            Self::String => "String",
            Self::Timestamp => "Timestamp",
            Self::Datetime => "Datetime",
            Self::Interval => "Interval",
            Self::Json => "Json",
            Self::JsonDocument => "JsonDocument",
            Self::Yson => "Yson",
            Self::Optional(_) | Self::List(_) | Self::Struct(_) => "",
        }
    }

    /// Returns a YQL literal holding the zero value of this type.
    #[must_use]
    pub fn zero_literal(&self) -> String {
        match self {
            Self::Bool => "false".into(),
            Self::Int8 => "0t".into(),
            Self::Int16 => "0s".into(),
            Self::Int32 => "0".into(),
            Self::Int64 => "0l".into(),
            Self::Uint8 => "0ut".into(),
            Self::Uint16 => "0us".into(),
            Self::Uint32 => "0u".into(),
            Self::Uint64 => "0ul".into(),
            Self::Float => "Float(\"0\")".into(),
            Self::Double => "Double(\"0\")".into(),
            Self::Utf8 => "\"\"u".into(),
            Self::String => "\"\"".into(),
            Self::Timestamp => "Timestamp(\"1970-01-01T00:00:00.000000Z\")".into(),
            Self::Datetime => "Datetime(\"1970-01-01T00:00:00Z\")".into(),
            Self::Interval => "Interval(\"PT0S\")".into(),
            Self::Json => "Json(\"null\")".into(),
            Self::JsonDocument => "JsonDocument(\"null\")".into(),
            Self::Yson => "Yson(\"#\")".into(),
            Self::Optional(inner) => format!("Nothing({})", inner.clone().optional().yql()),
            Self::List(_) => "[]".into(),
            Self::Struct(members) => {
                let body: Vec<String> = members
                    .iter()
                    .map(|(name, ty)| format!("{name}:{}", ty.zero_literal()))
                    .collect();
                format!("<|{}|>", body.join(","))
            }
        }
    }
}

impl fmt::Display for YdbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.yql())
    }
}

/// Column description produced for a field or a live table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    name: String,
    data_type: YdbType,
    primary_key: bool,
    nullable: bool,
    length: i64,
    decimal_size: i64,
    default_value: Option<String>,
}

impl ColumnType {
    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column type, without `Optional<>` when it came from introspection.
    #[must_use]
    pub const fn data_type(&self) -> &YdbType {
        &self.data_type
    }

    /// YQL name of the column type as used in DDL.
    #[must_use]
    pub fn database_type_name(&self) -> String {
        self.data_type.yql()
    }

    #[must_use]
    pub const fn primary_key(&self) -> bool {
        self.primary_key
    }

    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.nullable
    }

    /// Declared field size, copied verbatim.
    #[must_use]
    pub const fn length(&self) -> i64 {
        self.length
    }

    /// Always zero; YDB columns carry no decimal size here.
    #[must_use]
    pub const fn decimal_size(&self) -> i64 {
        self.decimal_size
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Overrides the nullable flag.
    pub fn set_nullable(&mut self, nullable: bool) {
        self.nullable = nullable;
    }

    /// Sets the default value expression.
    pub fn set_default_value(&mut self, value: impl Into<String>) {
        self.default_value = Some(value.into());
    }

    fn from_field(field: &Field, data_type: YdbType, nullable: bool) -> Self {
        Self {
            name: field.db_name.clone(),
            data_type,
            primary_key: field.primary_key,
            nullable,
            length: i64::from(field.size),
            decimal_size: 0,
            default_value: None,
        }
    }
}

/// Fallible adjustment applied to a freshly built [`ColumnType`].
pub type ColumnTypeOption<'a> = &'a dyn Fn(&mut ColumnType) -> Result<()>;

/// Fills the default value with the zero literal of the column type.
pub fn with_zero_default(column: &mut ColumnType) -> Result<()> {
    let literal = column.data_type.zero_literal();
    column.set_default_value(literal);
    Ok(())
}

/// Maps a field to its column description and YDB type.
///
/// A `type` tag of `json`, `jsondocument` or `yson` wins over everything,
/// then a `serializer = "json"` tag, then the field kind. The returned
/// column mirrors the field's primary key and nullability.
///
/// # Errors
///
/// Returns [`DialectError::UnsupportedDataType`] for kinds without a YDB
/// counterpart.
pub fn map_type(field: &Field) -> Result<(ColumnType, YdbType)> {
    let ty = resolve_type(field)?;
    let column = ColumnType::from_field(field, ty.clone(), field.nullable());
    Ok((column, ty))
}

/// Returns the YQL type name of a field.
///
/// # Errors
///
/// Same as [`map_type`].
pub fn data_type_of(field: &Field) -> Result<String> {
    resolve_type(field).map(|ty| ty.yql())
}

fn resolve_type(field: &Field) -> Result<YdbType> {
    if let Some(tag) = field.type_tag_normalized() {
        match tag.as_str() {
            "json" => return Ok(YdbType::Json),
            "jsondocument" => return Ok(YdbType::JsonDocument),
            "yson" => return Ok(YdbType::Yson),
            _ => {}
        }
    }
    if field.has_json_serializer_tag() {
        return Ok(YdbType::JsonDocument);
    }

    let size = field.size;
    let ty = match &field.kind {
        FieldKind::Bool => YdbType::Bool,
        FieldKind::Int => match size {
            0..=8 => YdbType::Int8,
            9..=16 => YdbType::Int16,
            17..=32 => YdbType::Int32,
            _ => YdbType::Int64,
        },
        FieldKind::Uint => match size {
            0..=8 => YdbType::Uint8,
            9..=16 => YdbType::Uint16,
            17..=32 => YdbType::Uint32,
            _ => YdbType::Uint64,
        },
        FieldKind::Float => {
            if size <= 32 {
                YdbType::Float
            } else {
                YdbType::Double
            }
        }
        FieldKind::String => YdbType::Utf8,
        FieldKind::Bytes => YdbType::String,
        FieldKind::Time | FieldKind::SoftDelete => YdbType::Timestamp,
        other @ (FieldKind::Duration | FieldKind::Custom(_)) => {
            return Err(DialectError::UnsupportedDataType(other.to_string()));
        }
    };
    Ok(ty)
}

/// Builds a column description from a live YDB type.
///
/// Every `Optional<>` layer is stripped; the column is nullable when at
/// least one was. Options run in order and the first error aborts.
///
/// # Errors
///
/// Propagates the first error returned by an option.
pub fn type_by_ydb_type(
    field: &Field,
    ty: &YdbType,
    options: &[ColumnTypeOption<'_>],
) -> Result<(ColumnType, YdbType)> {
    let (inner, stripped) = ty.strip_optional();
    let mut column = ColumnType::from_field(field, inner.clone(), stripped);
    for option in options {
        option(&mut column)?;
    }
    Ok((column, inner.clone()))
}
