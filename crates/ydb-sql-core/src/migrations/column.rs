//! Column definitions for DDL.

use crate::error::{DialectError, Result};
use crate::schema::{Field, ModelSchema};
use crate::types::data_type_of;

/// Rejects field constraints YDB cannot express.
///
/// NOT NULL is accepted only on primary key columns, UNIQUE never, and a
/// non-empty DEFAULT never.
///
/// # Errors
///
/// [`DialectError::UnsupportedConstraint`] naming the model and field.
pub fn check_field_constraints(schema: &ModelSchema, field: &Field) -> Result<()> {
    let unsupported = |constraint: &str| DialectError::UnsupportedConstraint {
        model: schema.name.clone(),
        field: field.db_name.clone(),
        constraint: constraint.to_string(),
    };

    if field.not_null && !field.primary_key {
        return Err(unsupported("not null supported only for PrimaryKey in ydb"));
    }
    if field.unique {
        return Err(unsupported("UNIQUE is not supported in ydb"));
    }
    if field.default_value.as_deref().is_some_and(|d| !d.is_empty()) {
        return Err(unsupported("DEFAULT is not supported in ydb"));
    }
    Ok(())
}

/// Returns the column type followed by ` NOT NULL` for NOT NULL primary keys.
///
/// # Errors
///
/// Unsupported constraints (see [`check_field_constraints`]) and unmappable
/// field kinds.
pub fn full_data_type_of(schema: &ModelSchema, field: &Field) -> Result<String> {
    let mut sql = data_type_of(field)?;
    check_field_constraints(schema, field)?;
    if field.not_null {
        sql.push_str(" NOT NULL");
    }
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;

    fn schema() -> ModelSchema {
        ModelSchema::new("Flag", "flags")
    }

    #[test]
    fn test_plain_and_not_null_primary_key() {
        let field = Field::new("enabled", FieldKind::Bool);
        assert_eq!(full_data_type_of(&schema(), &field).unwrap(), "Bool");

        let field = Field::new("enabled", FieldKind::Bool).primary_key().not_null();
        assert_eq!(full_data_type_of(&schema(), &field).unwrap(), "Bool NOT NULL");
    }

    #[test]
    fn test_not_null_without_primary_key() {
        let field = Field::new("enabled", FieldKind::Bool).not_null();
        let err = full_data_type_of(&schema(), &field).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(
            err.to_string(),
            "model Flag, field enabled: not null supported only for PrimaryKey in ydb"
        );
    }

    #[test]
    fn test_unique() {
        let field = Field::new("enabled", FieldKind::Bool).primary_key().unique();
        let err = full_data_type_of(&schema(), &field).unwrap_err();
        assert!(err.to_string().ends_with("UNIQUE is not supported in ydb"));
    }

    #[test]
    fn test_default() {
        let field = Field::new("enabled", FieldKind::Bool).default_value("true");
        let err = full_data_type_of(&schema(), &field).unwrap_err();
        assert!(err.to_string().ends_with("DEFAULT is not supported in ydb"));

        let field = Field::new("enabled", FieldKind::Bool).default_value("");
        assert!(full_data_type_of(&schema(), &field).is_ok());
    }
}
