//! Table Management Module
//!
//! This module defines the Table type that describes a table's current column layout.

use std::path::Path;
use super::column::Column;
use crate::common::types::TableId;
use serde::{Serialize, Deserialize};

/// Represents a table schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table ID (unique within the catalog)
    #[serde(default)]
    id: TableId,
    /// Table name
    name: String,
    /// Columns in attribute number order
    columns: Vec<Column>,
}

impl Table {
    /// Create a new table with the given name and columns
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Table {
            id: 0, // Assigned by the Catalog unless set explicitly
            name: name.into(),
            columns,
        }
    }

    /// Load a table definition from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a table definition from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_json(&text)?)
    }

    /// Get the table ID
    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn with_id(mut self, id: TableId) -> Self {
        self.id = id;
        self
    }

    pub(crate) fn set_id(&mut self, id: TableId) {
        self.id = id;
    }

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get all columns, including dropped ones
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of attributes, including dropped ones
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get a live column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|idx| &self.columns[idx])
    }

    /// Get the column index for a live column name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| !c.is_dropped() && c.name() == name)
    }

    /// Names of the columns that are surfaced in output rows
    pub fn visible_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.is_dropped())
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Get a string representation of the table schema
    pub fn schema_string(&self) -> String {
        let mut schema = format!("TABLE {} (\n", self.name);

        let live: Vec<&Column> = self.columns.iter().filter(|c| !c.is_dropped()).collect();
        for (i, col) in live.iter().enumerate() {
            schema.push_str(&format!("  {} {}", col.name(), col.data_type()));
            if i < live.len() - 1 {
                schema.push_str(",\n");
            }
        }

        schema.push_str("\n)");
        schema
    }
}
