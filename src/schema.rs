//! Schema definition and the fixed-layout record codec
//!
//! A schema is an ordered set of typed fields, exactly one of which is the
//! primary key. The key field must be integer-typed because the key is used
//! for point lookups and may carry an index, and indexes support only single
//! integer search keys.
//!
//! The schema drives the on-disk record layout: every record serializes to
//! `len()` bytes, field after field, integers little-endian and strings
//! zero-padded to their declared width. The schema itself is persisted into
//! the metadata block as a bincode blob.

use serde::{Deserialize, Serialize};

use crate::error::{HeapError, Result};
use crate::record::{Record, Value};

/// Type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// 32-bit signed integer (4 bytes, little-endian)
    Int,
    /// Fixed-width string of the given byte length, zero-padded
    Str(usize),
}

impl FieldType {
    /// Serialized width in bytes
    pub fn width(&self) -> usize {
        match self {
            FieldType::Int => 4,
            FieldType::Str(n) => *n,
        }
    }
}

/// A named, typed schema field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    ty: FieldType,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> FieldType {
        self.ty
    }
}

/// An ordered set of typed fields with one integer primary key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
    key: usize,
}

impl Schema {
    /// Create a schema from `(name, type)` pairs and the name of the key field
    ///
    /// Fails if the field list is empty, a name repeats, the key field is
    /// missing, or the key field is not integer-typed.
    pub fn new(fields: &[(&str, FieldType)], key_field: &str) -> Result<Self> {
        if fields.is_empty() {
            return Err(HeapError::Schema("schema has no fields".into()));
        }
        for (i, (name, _)) in fields.iter().enumerate() {
            if fields[..i].iter().any(|(n, _)| n == name) {
                return Err(HeapError::Schema(format!("duplicate field name '{}'", name)));
            }
        }

        let key = fields
            .iter()
            .position(|(name, _)| *name == key_field)
            .ok_or_else(|| HeapError::Schema(format!("key field '{}' not in schema", key_field)))?;
        if fields[key].1 != FieldType::Int {
            return Err(HeapError::Schema(format!(
                "key field '{}' must be of integer type",
                key_field
            )));
        }

        Ok(Self {
            fields: fields
                .iter()
                .map(|(name, ty)| Field {
                    name: (*name).to_string(),
                    ty: *ty,
                })
                .collect(),
            key,
        })
    }

    /// Number of fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Serialized record length in bytes
    pub fn len(&self) -> usize {
        self.fields.iter().map(|f| f.ty.width()).sum()
    }

    /// True if the schema has no fields (never true for a valid schema)
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of the named field, if present
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Field at position `i`
    pub fn field(&self, i: usize) -> &Field {
        &self.fields[i]
    }

    /// Position of the primary key field
    pub fn key_index(&self) -> usize {
        self.key
    }

    /// Name of the primary key field
    pub fn key_name(&self) -> &str {
        &self.fields[self.key].name
    }

    /// A record of default values (0 / empty), used as deserialization scratch
    pub fn blank_record(&self) -> Record {
        Record::new(
            self.fields
                .iter()
                .map(|f| match f.ty {
                    FieldType::Int => Value::Int(0),
                    FieldType::Str(_) => Value::Str(String::new()),
                })
                .collect(),
        )
    }

    // -------------------------------------------------------------------------
    // Record codec
    // -------------------------------------------------------------------------

    /// Serialize `rec` into `buf` at `offset`
    ///
    /// The record must match the schema in arity and field types, and string
    /// values must fit their declared width.
    pub fn write_record(&self, rec: &Record, buf: &mut [u8], offset: usize) -> Result<()> {
        if rec.len() != self.fields.len() {
            return Err(HeapError::Schema(format!(
                "record has {} fields, schema has {}",
                rec.len(),
                self.fields.len()
            )));
        }

        let mut pos = offset;
        for (i, field) in self.fields.iter().enumerate() {
            match (field.ty, rec.get(i)) {
                (FieldType::Int, Value::Int(v)) => {
                    buf[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
                }
                (FieldType::Str(n), Value::Str(s)) => {
                    let bytes = s.as_bytes();
                    if bytes.len() > n {
                        return Err(HeapError::Schema(format!(
                            "value for field '{}' exceeds {} bytes",
                            field.name, n
                        )));
                    }
                    buf[pos..pos + bytes.len()].copy_from_slice(bytes);
                    buf[pos + bytes.len()..pos + n].fill(0);
                }
                (_, value) => {
                    return Err(HeapError::Schema(format!(
                        "value {} does not match type of field '{}'",
                        value, field.name
                    )));
                }
            }
            pos += field.ty.width();
        }
        Ok(())
    }

    /// Deserialize a record from `buf` at `offset`
    pub fn read_record(&self, buf: &[u8], offset: usize) -> Record {
        let mut rec = self.blank_record();
        let mut pos = offset;
        for (i, field) in self.fields.iter().enumerate() {
            match field.ty {
                FieldType::Int => {
                    let mut raw = [0u8; 4];
                    raw.copy_from_slice(&buf[pos..pos + 4]);
                    rec.set(i, Value::Int(i32::from_le_bytes(raw)));
                }
                FieldType::Str(n) => {
                    let raw = &buf[pos..pos + n];
                    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
                    rec.set(i, Value::Str(String::from_utf8_lossy(&raw[..end]).into_owned()));
                }
            }
            pos += field.ty.width();
        }
        rec
    }

    /// Primary key value of `rec`
    pub fn key_of(&self, rec: &Record) -> Result<i32> {
        self.int_value(rec, self.key)
    }

    /// Integer value of field `i` in `rec`
    ///
    /// Fails if the field is not integer-typed or the record does not match
    /// the schema.
    pub fn int_value(&self, rec: &Record, i: usize) -> Result<i32> {
        if i >= rec.len() {
            return Err(HeapError::Schema(format!(
                "record has no field {} (schema mismatch)",
                i
            )));
        }
        match rec.get(i) {
            Value::Int(v) => Ok(*v),
            Value::Str(_) => Err(HeapError::FieldTypeMismatch {
                field: self.fields[i].name.clone(),
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Metadata-block persistence
    // -------------------------------------------------------------------------

    /// Serialize the schema to its metadata-block blob
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| HeapError::Serialization(e.to_string()))
    }

    /// Recover a schema from its metadata-block blob
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| HeapError::Serialization(e.to_string()))
    }
}
