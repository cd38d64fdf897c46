// Column Type Module
//
// This module defines the column types the scanner understands and how each one
// is laid out inside a heap tuple.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Data types supported by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Boolean,
    Char,
    SmallInt,
    Integer,
    BigInt,
    Oid,
    Real,
    Double,
    Date,
    Timestamp,
    TimestampTz,
    Uuid,
    Name,
    Text,
    Varchar,
    Bpchar,
    Bytea,
}

/// Storage alignment of an attribute (attalign)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Char,
    Short,
    Int,
    Double,
}

impl Alignment {
    pub fn bytes(&self) -> usize {
        match self {
            Alignment::Char => 1,
            Alignment::Short => 2,
            Alignment::Int => 4,
            Alignment::Double => 8,
        }
    }

    /// Round `offset` up to this alignment
    pub fn align(&self, offset: usize) -> usize {
        let a = self.bytes();
        (offset + a - 1) & !(a - 1)
    }
}

/// Physical length of an attribute (attlen)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLength {
    Fixed(usize),
    Varlena,
}

/// Maximum length of a `name` value including the terminating NUL
pub const NAMEDATALEN: usize = 64;

impl DataType {
    /// Convert a string representation to a DataType
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "bool" | "boolean" => Ok(DataType::Boolean),
            "\"char\"" | "char1" => Ok(DataType::Char),
            "int2" | "smallint" => Ok(DataType::SmallInt),
            "int4" | "int" | "integer" => Ok(DataType::Integer),
            "int8" | "bigint" => Ok(DataType::BigInt),
            "oid" => Ok(DataType::Oid),
            "float4" | "real" => Ok(DataType::Real),
            "float8" | "double" | "double precision" => Ok(DataType::Double),
            "date" => Ok(DataType::Date),
            "timestamp" => Ok(DataType::Timestamp),
            "timestamptz" => Ok(DataType::TimestampTz),
            "uuid" => Ok(DataType::Uuid),
            "name" => Ok(DataType::Name),
            "text" => Ok(DataType::Text),
            "varchar" | "character varying" => Ok(DataType::Varchar),
            "bpchar" | "char" | "character" => Ok(DataType::Bpchar),
            "bytea" => Ok(DataType::Bytea),
            _ => Err(format!("Unknown data type: {}", s)),
        }
    }

    pub fn storage_length(&self) -> StorageLength {
        match self {
            DataType::Boolean | DataType::Char => StorageLength::Fixed(1),
            DataType::SmallInt => StorageLength::Fixed(2),
            DataType::Integer | DataType::Oid | DataType::Real | DataType::Date => StorageLength::Fixed(4),
            DataType::BigInt | DataType::Double | DataType::Timestamp | DataType::TimestampTz => StorageLength::Fixed(8),
            DataType::Uuid => StorageLength::Fixed(16),
            DataType::Name => StorageLength::Fixed(NAMEDATALEN),
            DataType::Text | DataType::Varchar | DataType::Bpchar | DataType::Bytea => StorageLength::Varlena,
        }
    }

    pub fn alignment(&self) -> Alignment {
        match self {
            DataType::Boolean | DataType::Char | DataType::Uuid | DataType::Name => Alignment::Char,
            DataType::SmallInt => Alignment::Short,
            DataType::Integer | DataType::Oid | DataType::Real | DataType::Date => Alignment::Int,
            DataType::BigInt | DataType::Double | DataType::Timestamp | DataType::TimestampTz => Alignment::Double,
            DataType::Text | DataType::Varchar | DataType::Bpchar | DataType::Bytea => Alignment::Int,
        }
    }

    /// Check if this is a fixed-size data type
    pub fn is_fixed_size(&self) -> bool {
        matches!(self.storage_length(), StorageLength::Fixed(_))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "bool",
            DataType::Char => "\"char\"",
            DataType::SmallInt => "int2",
            DataType::Integer => "int4",
            DataType::BigInt => "int8",
            DataType::Oid => "oid",
            DataType::Real => "float4",
            DataType::Double => "float8",
            DataType::Date => "date",
            DataType::Timestamp => "timestamp",
            DataType::TimestampTz => "timestamptz",
            DataType::Uuid => "uuid",
            DataType::Name => "name",
            DataType::Text => "text",
            DataType::Varchar => "varchar",
            DataType::Bpchar => "bpchar",
            DataType::Bytea => "bytea",
        };
        write!(f, "{}", name)
    }
}
