//! Model schema descriptions.
//!
//! A [`ModelSchema`] describes how a Rust struct maps onto a YDB table: its
//! fields, their kinds and constraints, and the secondary indexes declared on
//! it. Schemas are produced by `#[derive(Model)]`, built by hand, or loaded
//! from JSON, and are immutable once constructed.

mod cache;

pub use cache::SchemaCache;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Trait for types with a static model schema.
///
/// Implemented by `#[derive(Model)]`.
pub trait Model: 'static {
    /// Builds the schema for this model.
    fn schema() -> ModelSchema;
}

/// The logical kind of a field, independent of YDB.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Bytes,
    Time,
    Duration,
    /// Soft-delete marker; holds the deletion time when set.
    SoftDelete,
    /// Any other type, identified by its name.
    Custom(String),
}

impl FieldKind {
    /// Bit width assumed when none is declared.
    #[must_use]
    pub const fn default_size(&self) -> u32 {
        match self {
            Self::Int | Self::Uint | Self::Float => 64,
            _ => 0,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Uint => f.write_str("uint"),
            Self::Float => f.write_str("float"),
            Self::String => f.write_str("string"),
            Self::Bytes => f.write_str("bytes"),
            Self::Time => f.write_str("time"),
            Self::Duration => f.write_str("duration"),
            Self::SoftDelete => f.write_str("soft_delete"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// Serializer applied to field values before they are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Serializer {
    /// Plain JSON text stored in a `JsonDocument` column.
    Json,
    /// JSON stored in the column type named by the field's `type` tag.
    YdbJson,
}

/// Description of a single model field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Logical (Rust) field name.
    pub name: String,
    /// Column name in the table.
    pub db_name: String,
    /// Logical kind.
    pub kind: FieldKind,
    /// Bit width for numeric kinds.
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub unique: bool,
    /// Raw `type` tag, e.g. `json`, `jsondocument` or `yson`.
    #[serde(default)]
    pub type_tag: Option<String>,
    /// Raw `serializer` tag, e.g. `json`.
    #[serde(default)]
    pub serializer_tag: Option<String>,
    /// Explicitly chosen serializer.
    #[serde(default)]
    pub serializer: Option<Serializer>,
    #[serde(default)]
    pub default_value: Option<String>,
    /// Excluded from every schema change.
    #[serde(default)]
    pub ignore_migration: bool,
}

impl Field {
    /// Creates a field whose column name equals its logical name.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        let size = kind.default_size();
        Self {
            db_name: name.clone(),
            name,
            kind,
            size,
            primary_key: false,
            not_null: false,
            unique: false,
            type_tag: None,
            serializer_tag: None,
            serializer: None,
            default_value: None,
            ignore_migration: false,
        }
    }

    /// Sets the column name.
    #[must_use]
    pub fn db_name(mut self, db_name: impl Into<String>) -> Self {
        self.db_name = db_name.into();
        self
    }

    /// Sets the bit width.
    #[must_use]
    pub const fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Marks the field as part of the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the field as NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Marks the field as UNIQUE.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the `type` tag.
    #[must_use]
    pub fn type_tag(mut self, tag: impl Into<String>) -> Self {
        self.type_tag = Some(tag.into());
        self
    }

    /// Sets the `serializer` tag.
    #[must_use]
    pub fn serializer_tag(mut self, tag: impl Into<String>) -> Self {
        self.serializer_tag = Some(tag.into());
        self
    }

    /// Sets an explicit serializer.
    #[must_use]
    pub const fn serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Sets the default value expression.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Excludes the field from schema changes.
    #[must_use]
    pub const fn ignore_migration(mut self) -> Self {
        self.ignore_migration = true;
        self
    }

    /// Returns whether the column accepts NULL.
    #[must_use]
    pub const fn nullable(&self) -> bool {
        !self.not_null
    }

    /// Returns the normalized `type` tag (trimmed, lowercase).
    #[must_use]
    pub fn type_tag_normalized(&self) -> Option<String> {
        self.type_tag
            .as_deref()
            .map(|tag| tag.trim().to_ascii_lowercase())
    }

    /// Returns whether the `serializer` tag asks for JSON.
    #[must_use]
    pub fn has_json_serializer_tag(&self) -> bool {
        self.serializer_tag
            .as_deref()
            .is_some_and(|tag| tag.trim().eq_ignore_ascii_case("json"))
    }

    /// Returns the serializer in effect for this field.
    ///
    /// A `serializer = "json"` tag always selects [`Serializer::Json`]. A
    /// `type` tag of `json`, `jsondocument` or `yson` selects
    /// [`Serializer::YdbJson`] unless a serializer was set explicitly.
    #[must_use]
    pub fn effective_serializer(&self) -> Option<Serializer> {
        if let Some(tag) = self.type_tag_normalized() {
            if matches!(tag.as_str(), "json" | "jsondocument" | "yson") {
                return Some(self.serializer.unwrap_or(Serializer::YdbJson));
            }
        }
        if self.has_json_serializer_tag() {
            return Some(Serializer::Json);
        }
        self.serializer
    }
}

/// A secondary index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    /// Column names, in index order.
    pub fields: Vec<String>,
}

impl Index {
    /// Creates an index over the given columns.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// The kind of a declared table constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Check { expression: String },
    ForeignKey { references: String },
}

/// A declared table constraint. YDB enforces neither kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
}

/// Schema of one model: table name, fields, indexes and constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Model (struct) name.
    pub name: String,
    /// Base table name, without any path prefix.
    pub table: String,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl ModelSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            fields: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Appends a constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Finds a field by logical name or column name.
    #[must_use]
    pub fn look_up_field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.fields.iter().find(|f| f.db_name == name))
    }

    /// Finds an index by name.
    #[must_use]
    pub fn look_index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Returns the primary key fields in declaration order.
    pub fn primary_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.primary_key)
    }

    /// Returns the fields that take part in schema changes.
    pub fn migratable_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.ignore_migration)
    }

    /// Returns every column name in declaration order.
    #[must_use]
    pub fn db_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.db_name.as_str()).collect()
    }
}
