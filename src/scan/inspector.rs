// Block Inspector
//
// Resolves a table through the catalog, validates the block number against the
// relation size and reads the page, so a scan never sees an unchecked block.

use log::debug;
use serde::Serialize;

use crate::catalog::{Catalog, Table};
use crate::common::types::{BlockNumber, OffsetNumber, Page, TableId};
use crate::storage::disk::BlockSource;
use crate::storage::page::{ItemId, PageHeader, PageManager};
use crate::storage::tuple::HeapTupleHeader;
use super::error::ScanError;
use super::scanner::{check_block_argument, PageTupleScanner};

/// One line pointer, with the tuple header it points at when that can be read
#[derive(Debug, Clone, Serialize)]
pub struct ItemInfo {
    pub offset: OffsetNumber,
    pub item: ItemId,
    pub header: Option<HeapTupleHeader>,
}

/// A page image read from a relation, together with the schema to scan it with
#[derive(Debug, Clone)]
pub struct BlockSnapshot {
    table: Table,
    block: BlockNumber,
    total_blocks: BlockNumber,
    page: Page,
}

impl BlockSnapshot {
    /// Validate `block_number` and read that block from `storage`
    pub fn read(table: Table, storage: &dyn BlockSource, block_number: i64) -> Result<Self, ScanError> {
        // Argument errors take precedence over the size of the relation
        let block = check_block_argument(block_number)?;
        let total_blocks = storage.block_count()?;
        if block >= total_blocks {
            return Err(ScanError::OutOfRange { block, block_count: total_blocks });
        }

        let mut page = Page::new(block);
        storage.read_block(block, &mut page)?;
        debug!("read block {} of {} ({} blocks)", block, table.name(), total_blocks);

        Ok(Self { table, block, total_blocks, page })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn block(&self) -> BlockNumber {
        self.block
    }

    pub fn total_blocks(&self) -> BlockNumber {
        self.total_blocks
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Iterate over the tuples of the page
    pub fn tuples(&self) -> Result<PageTupleScanner<'_>, ScanError> {
        PageTupleScanner::open(&self.table, self.block as i64, self.total_blocks, &self.page)
    }

    pub fn header(&self) -> PageHeader {
        PageManager::new().get_header(&self.page)
    }

    /// Every line pointer of the page, whatever its state
    pub fn items(&self) -> Vec<ItemInfo> {
        let pm = PageManager::new();
        pm.item_ids(&self.page)
            .into_iter()
            .map(|(offset, item)| {
                let header = if item.is_normal() {
                    pm.get_item(&self.page, offset)
                        .ok()
                        .and_then(|bytes| HeapTupleHeader::from_bytes(bytes).ok())
                } else {
                    None
                };
                ItemInfo { offset, item, header }
            })
            .collect()
    }
}

/// Reads blocks of tables registered in a catalog
pub struct BlockInspector<'a> {
    catalog: &'a Catalog,
}

impl<'a> BlockInspector<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Read block `block_number` of table `table_id`
    pub fn read_block(&self, table_id: TableId, block_number: i64) -> Result<BlockSnapshot, ScanError> {
        let relation = self.catalog.open_relation(table_id)?;
        BlockSnapshot::read(relation.table, relation.storage.as_ref(), block_number)
    }
}
