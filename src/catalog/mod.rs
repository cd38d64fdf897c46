//! Catalog Management Module
//!
//! This module maps table identifiers to their current definition and to the
//! block source holding their pages.

pub mod schema;
pub mod table;
pub mod column;

// Re-export key types
pub use self::table::Table;
pub use self::column::Column;
pub use self::schema::{Alignment, DataType, StorageLength};

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use parking_lot::RwLock;
use thiserror::Error;

use crate::common::types::TableId;
use crate::storage::disk::BlockSource;

/// First identifier handed out to tables registered without one
pub const FIRST_NORMAL_TABLE_ID: TableId = 16384;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Table {0} already exists")]
    TableAlreadyExists(TableId),
    #[error("Table {0} not found")]
    TableNotFound(TableId),
}

/// A table definition together with the storage that holds its pages
#[derive(Clone)]
pub struct Relation {
    pub table: Table,
    pub storage: Arc<dyn BlockSource>,
}

/// The Catalog is the registry of scannable tables
pub struct Catalog {
    /// Registered relations by table ID
    relations: RwLock<HashMap<TableId, Relation>>,
    /// Counter for assigning table IDs
    table_id_counter: AtomicU32,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create a new, empty catalog
    pub fn new() -> Self {
        Catalog {
            relations: RwLock::new(HashMap::new()),
            table_id_counter: AtomicU32::new(FIRST_NORMAL_TABLE_ID),
        }
    }

    /// Register a table and its storage.
    ///
    /// A table with ID 0 gets the next free identifier. Returns the ID in use.
    pub fn register_table(&self, mut table: Table, storage: Arc<dyn BlockSource>) -> Result<TableId, CatalogError> {
        let mut relations = self.relations.write();

        if table.id() == 0 {
            let mut id = self.table_id_counter.fetch_add(1, Ordering::SeqCst);
            while relations.contains_key(&id) {
                id = self.table_id_counter.fetch_add(1, Ordering::SeqCst);
            }
            table.set_id(id);
        } else if relations.contains_key(&table.id()) {
            return Err(CatalogError::TableAlreadyExists(table.id()));
        }

        let id = table.id();
        log::debug!("registered table {} ({}) with {} columns", table.name(), id, table.column_count());
        relations.insert(id, Relation { table, storage });
        Ok(id)
    }

    /// Check if a table exists
    pub fn table_exists(&self, id: TableId) -> bool {
        self.relations.read().contains_key(&id)
    }

    /// Get a copy of a table definition
    pub fn get_table(&self, id: TableId) -> Option<Table> {
        self.relations.read().get(&id).map(|r| r.table.clone())
    }

    /// Resolve a table for reading; the read lock is held only for the lookup
    pub fn open_relation(&self, id: TableId) -> Result<Relation, CatalogError> {
        self.relations
            .read()
            .get(&id)
            .cloned()
            .ok_or(CatalogError::TableNotFound(id))
    }

    /// Remove a table from the catalog
    pub fn drop_table(&self, id: TableId) -> Result<(), CatalogError> {
        self.relations
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(CatalogError::TableNotFound(id))
    }

    /// IDs of all registered tables, sorted
    pub fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self.relations.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
