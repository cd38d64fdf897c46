// Decoded attribute values
//
// This module defines the logical value produced for each column of a scanned tuple.

use std::fmt;
use std::hash::{Hash, Hasher};
use serde::{Serialize, Deserialize};

/// Possible values for a column of an output row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Date(String),
    Timestamp(String),
    Blob(Vec<u8>),
}

impl Eq for DataValue {}

impl Hash for DataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            DataValue::Null => 0.hash(state),
            DataValue::Integer(i) => { 1.hash(state); i.hash(state); }
            DataValue::Float(f) => { 2.hash(state); f.to_bits().hash(state); }
            DataValue::Text(s) => { 3.hash(state); s.hash(state); }
            DataValue::Boolean(b) => { 4.hash(state); b.hash(state); }
            DataValue::Date(s) => { 5.hash(state); s.hash(state); }
            DataValue::Timestamp(s) => { 6.hash(state); s.hash(state); }
            DataValue::Blob(b) => { 7.hash(state); b.hash(state); }
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "NULL"),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Text(s) => write!(f, "{}", s),
            DataValue::Boolean(b) => write!(f, "{}", if *b { "t" } else { "f" }),
            DataValue::Date(s) => write!(f, "{}", s),
            DataValue::Timestamp(s) => write!(f, "{}", s),
            DataValue::Blob(b) => write!(f, "\\x{}", hex::encode(b)),
        }
    }
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Integer(_) => "integer",
            DataValue::Float(_) => "float",
            DataValue::Text(_) => "text",
            DataValue::Boolean(_) => "boolean",
            DataValue::Date(_) => "date",
            DataValue::Timestamp(_) => "timestamp",
            DataValue::Blob(_) => "blob",
        }
    }
}
