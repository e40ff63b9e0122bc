//! Scalar argument values and the literal/bound formatting split.
//!
//! A [`Value`] is one scalar that can travel with a compiled statement. It
//! implements [`ToSql`] by delegating to the wrapped primitive, so the flat
//! argument list a builder collects can be handed straight to the
//! parameterized-execution primitives.
//!
//! [`Arg`] makes the caller's formatting choice explicit: `Literal` values
//! are inlined into the SQL text (escaped where needed), `Bound` values are
//! reserved as placeholders and surface in the argument list instead.

use bytes::BytesMut;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A scalar query argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Value {
    /// Render this value for direct inlining into SQL text.
    ///
    /// Numbers are emitted verbatim, text is escaped and single-quoted,
    /// booleans and NULL take their SQL keyword forms.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Text(s) => format!("'{}'", escape_text(s)),
            Value::Null => "NULL".to_string(),
        }
    }
}

/// Escape a raw string for inlining as a SQL string literal.
///
/// Doubles embedded single quotes. Used only on the literal-inlining path;
/// bound values never pass through here.
pub fn escape_text(raw: &str) -> String {
    raw.replace('\'', "''")
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Int(v) => v.to_sql(ty, out),
            Value::Float(v) => v.to_sql(ty, out),
            Value::Text(v) => v.to_sql(ty, out),
            Value::Null => Ok(IsNull::Yes),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // The wrapped primitive decides at bind time, in to_sql_checked.
        true
    }

    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => v.to_sql_checked(ty, out),
            Value::Float(v) => v.to_sql_checked(ty, out),
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Null => Ok(IsNull::Yes),
        }
    }
}

/// A predicate value with its formatting policy made explicit.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    /// Inline the value into the SQL text (escaped where needed).
    Literal(Value),
    /// Reserve a placeholder and carry the value in the argument list.
    Bound(Value),
}

impl Arg {
    /// Create an inlined literal argument.
    pub fn literal(value: impl Into<Value>) -> Self {
        Arg::Literal(value.into())
    }

    /// Create a bound (placeholder) argument.
    pub fn bound(value: impl Into<Value>) -> Self {
        Arg::Bound(value.into())
    }
}
