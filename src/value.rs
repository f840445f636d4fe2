use std::fmt;
use std::fmt::{Display, Formatter};

/// An ordinary runtime value.
///
/// Booleans and null only ever exist as the interned constants below, so
/// two booleans compare equal exactly when they are the same instance; the
/// evaluator relies on this for `==`/`!=` on non-integers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Null,
}

pub const TRUE: Value = Value::Boolean(true);
pub const FALSE: Value = Value::Boolean(false);
pub const NULL: Value = Value::Null;

impl Value {
    /// The name used for this kind of value in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Boolean(_) => "BOOLEAN",
            Value::Null => "NULL",
        }
    }

    /// Only null and false are falsy; every integer, zero included, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null | Value::Boolean(false) => false,
            _ => true,
        }
    }

    pub fn same_type(&self, other: &Value) -> bool {
        self.type_name() == other.type_name()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        if b {
            TRUE
        } else {
            FALSE
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Integer(n)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => f.write_str("null"),
        }
    }
}
