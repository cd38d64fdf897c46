use serde::Serialize;
use thiserror::Error;

use crate::catalog::DataType;

/// Structural damage in a tuple; the tuple cannot be decoded at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TupleFormatError {
    #[error("tuple length {0} is shorter than the tuple header")]
    TooShort(usize),
    #[error("t_hoff {hoff} is invalid for a tuple of {len} bytes")]
    BadHeaderOffset { hoff: usize, len: usize },
    #[error("null bitmap for {natts} attributes does not fit before t_hoff {hoff}")]
    BitmapOverflow { natts: usize, hoff: usize },
}

/// Failure to decode a single attribute; the rest of the row is still usable
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DecodeError {
    #[error("attribute needs {needed} bytes at data offset {offset}, only {available} available")]
    Truncated { offset: usize, needed: usize, available: usize },
    #[error("attribute position unknown after an earlier attribute failed to decode")]
    OffsetLost,
    #[error("invalid varlena header 0x{0:02x}")]
    InvalidVarlena(u8),
    #[error("unsupported external value tag {0}")]
    UnsupportedExternalTag(u8),
    #[error("expected {expected} bytes for {data_type}, found {actual}")]
    InvalidLength { data_type: String, expected: usize, actual: usize },
    #[error("invalid UTF-8 in {0} value")]
    InvalidUtf8(String),
    #[error("value out of range for {0}")]
    OutOfRange(String),
    #[error("toasted value {value_id} in toast relation {toast_relid} cannot be resolved")]
    UnresolvedToast { value_id: u32, toast_relid: u32 },
    #[error("unsupported compression method {0}")]
    UnsupportedCompression(u8),
    #[error("decompression failed: {0}")]
    Decompression(String),
    #[error("toast fetch failed: {0}")]
    Toast(String),
}

impl DecodeError {
    pub(crate) fn invalid_length(data_type: DataType, expected: usize, actual: usize) -> Self {
        DecodeError::InvalidLength { data_type: data_type.to_string(), expected, actual }
    }
}

/// Failure to form a tuple from values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("{values} values given for a table with {columns} columns")]
    TooManyValues { values: usize, columns: usize },
    #[error("value of type {value} cannot be stored in column {column} of type {data_type}")]
    TypeMismatch { column: String, data_type: DataType, value: &'static str },
    #[error("value for column {0} is out of range")]
    OutOfRange(String),
}
