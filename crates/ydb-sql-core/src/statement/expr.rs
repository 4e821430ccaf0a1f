//! Predicate expressions for WHERE clauses.

use std::fmt;

use super::value::{ToValue, Value};

/// Creates a column reference.
#[must_use]
pub fn col(name: &str) -> Column {
    Column {
        name: String::from(name),
    }
}

/// A column reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name, possibly dotted.
    pub name: String,
}

impl Column {
    fn compare<T: ToValue>(self, op: CompareOp, value: T) -> Expr {
        Expr::Compare {
            column: self.name,
            op,
            value: value.to_value(),
        }
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq<T: ToValue>(self, value: T) -> Expr {
        self.compare(CompareOp::Eq, value)
    }

    /// Creates an inequality expression.
    #[must_use]
    pub fn not_eq<T: ToValue>(self, value: T) -> Expr {
        self.compare(CompareOp::NotEq, value)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt<T: ToValue>(self, value: T) -> Expr {
        self.compare(CompareOp::Lt, value)
    }

    /// Creates a less-than-or-equal expression.
    #[must_use]
    pub fn lt_eq<T: ToValue>(self, value: T) -> Expr {
        self.compare(CompareOp::LtEq, value)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt<T: ToValue>(self, value: T) -> Expr {
        self.compare(CompareOp::Gt, value)
    }

    /// Creates a greater-than-or-equal expression.
    #[must_use]
    pub fn gt_eq<T: ToValue>(self, value: T) -> Expr {
        self.compare(CompareOp::GtEq, value)
    }

    /// Creates a LIKE expression.
    #[must_use]
    pub fn like<T: ToValue>(self, pattern: T) -> Expr {
        self.compare(CompareOp::Like, pattern)
    }

    /// Creates an IN expression.
    #[must_use]
    pub fn in_list<T: ToValue>(self, values: Vec<T>) -> Expr {
        Expr::In {
            column: self.name,
            values: values.into_iter().map(ToValue::to_value).collect(),
        }
    }
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
    Like,
}

impl CompareOp {
    /// Operator text placed between the column and the parameter.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Like => " LIKE ",
        }
    }
}

/// A predicate in a WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `column <op> value`.
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    /// `column IN (values...)`.
    In { column: String, values: Vec<Value> },
    /// Disjunction of predicates.
    Or(Vec<Expr>),
    /// Negated predicate.
    Not(Box<Expr>),
    /// Raw SQL with positional values.
    Raw { sql: String, vars: Vec<Value> },
}

impl Expr {
    /// Combines two predicates with OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut exprs) => {
                exprs.push(other);
                Self::Or(exprs)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Negates a predicate.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Creates a raw SQL predicate.
    #[must_use]
    pub fn raw(sql: impl Into<String>, vars: Vec<Value>) -> Self {
        Self::Raw {
            sql: sql.into(),
            vars,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { column, op, value } => {
                write!(f, "{column}{}{}", op.as_sql(), value.to_inline())
            }
            Self::In { column, values } => {
                let values: Vec<String> = values.iter().map(Value::to_inline).collect();
                write!(f, "{column} IN ({})", values.join(", "))
            }
            Self::Or(exprs) => {
                let parts: Vec<String> = exprs.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(" OR "))
            }
            Self::Not(expr) => write!(f, "NOT ({expr})"),
            Self::Raw { sql, .. } => f.write_str(sql),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_builders() {
        assert_eq!(
            col("age").gt_eq(18),
            Expr::Compare {
                column: "age".into(),
                op: CompareOp::GtEq,
                value: Value::Int32(18),
            }
        );
        assert_eq!(col("name").like("a%").to_string(), "name LIKE 'a%'");
    }

    #[test]
    fn test_in_list() {
        let expr = col("id").in_list(vec!["a", "b"]);
        assert_eq!(expr.to_string(), "id IN ('a', 'b')");
    }

    #[test]
    fn test_or_flattens() {
        let expr = col("a").eq(1).or(col("b").eq(2)).or(col("c").eq(3));
        match &expr {
            Expr::Or(exprs) => assert_eq!(exprs.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(col("a").eq(1).not().to_string(), "NOT (a=1)");
    }
}
