//! Records and field values
//!
//! A record is a fixed-length tuple of typed values laid out according to a
//! [`Schema`](crate::schema::Schema). The schema owns the byte layout; this
//! module only defines the in-memory representation.

use std::fmt;

/// A single field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// 32-bit signed integer
    Int(i32),
    /// String, stored as fixed-length zero-padded bytes
    Str(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "'{}'", s),
        }
    }
}

/// A fixed-length tuple of field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    /// Create a record from field values, in schema field order
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of field `i`
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    pub fn get(&self, i: usize) -> &Value {
        &self.values[i]
    }

    /// All field values, in schema order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn set(&mut self, i: usize, value: Value) {
        self.values[i] = value;
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}
