use parking_lot::RwLock;

use crate::common::types::{BlockNumber, Page};
use super::{BlockSource, StorageError};

/// Relation held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryRelation {
    pages: RwLock<Vec<Page>>,
}

impl MemoryRelation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pages(pages: Vec<Page>) -> Self {
        let relation = Self::new();
        for page in pages {
            relation.append(page);
        }
        relation
    }

    /// Append a page image, renumbering it to the next block
    pub fn append(&self, mut page: Page) -> BlockNumber {
        let mut pages = self.pages.write();
        let block = pages.len() as BlockNumber;
        page.block = block;
        pages.push(page);
        block
    }
}

impl BlockSource for MemoryRelation {
    fn block_count(&self) -> Result<BlockNumber, StorageError> {
        BlockNumber::try_from(self.pages.read().len()).map_err(|_| StorageError::TooManyBlocks)
    }

    fn read_block(&self, block: BlockNumber, page: &mut Page) -> Result<(), StorageError> {
        let pages = self.pages.read();
        let stored = pages.get(block as usize).ok_or(StorageError::BlockOutOfRange {
            block,
            block_count: pages.len() as BlockNumber,
        })?;
        page.data.copy_from_slice(&stored.data);
        page.block = block;
        Ok(())
    }
}
