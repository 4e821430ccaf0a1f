//! `DECLARE` sections for named parameters.

use crate::statement::Param;

/// Appends one `DECLARE $name AS <Type>; ` per parameter.
pub fn declare_to(out: &mut String, params: &[Param]) {
    for param in params {
        out.push_str("DECLARE ");
        out.push_str(&param.name);
        out.push_str(" AS ");
        out.push_str(&param.value.ydb_type().yql());
        out.push_str("; ");
    }
}

/// Returns the `DECLARE` section for `params`.
#[must_use]
pub fn declare_section(params: &[Param]) -> String {
    let mut out = String::new();
    declare_to(&mut out, params);
    out
}
