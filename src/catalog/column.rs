// Column Management Module
//
// This module defines the Column type that describes one attribute of a table.

use super::schema::{Alignment, DataType, StorageLength};
use serde::{Serialize, Deserialize};

/// Represents a column in a table's current definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    name: String,
    /// Column data type
    data_type: DataType,
    /// Dropped columns keep their storage but are never surfaced
    #[serde(default)]
    dropped: bool,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Column {
            name: name.into(),
            data_type,
            dropped: false,
        }
    }

    /// Create a placeholder for a dropped column that still occupies tuple space
    pub fn dropped(name: impl Into<String>, data_type: DataType) -> Self {
        Column {
            name: name.into(),
            data_type,
            dropped: true,
        }
    }

    /// Get the column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the column data type
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    pub fn storage_length(&self) -> StorageLength {
        self.data_type.storage_length()
    }

    pub fn alignment(&self) -> Alignment {
        self.data_type.alignment()
    }
}
