pub mod disk_manager;
pub mod memory;

pub use disk_manager::DiskManager;
pub use memory::MemoryRelation;

use thiserror::Error;
use crate::common::types::{BlockNumber, Page};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Block {block} is beyond the end of the relation ({block_count} blocks)")]
    BlockOutOfRange { block: BlockNumber, block_count: BlockNumber },
    #[error("Short read of block {block}: got {read} bytes")]
    ShortRead { block: BlockNumber, read: usize },
    #[error("Relation has too many blocks")]
    TooManyBlocks,
}

/// Anything that can hand out raw page images of one relation
pub trait BlockSource: Send + Sync {
    /// Current number of blocks in the relation
    fn block_count(&self) -> Result<BlockNumber, StorageError>;

    /// Copy block `block` into `page`
    fn read_block(&self, block: BlockNumber, page: &mut Page) -> Result<(), StorageError>;
}
