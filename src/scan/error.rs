use thiserror::Error;

use crate::catalog::CatalogError;
use crate::common::types::{BlockNumber, OffsetNumber, TableId};
use crate::storage::disk::StorageError;

pub use crate::storage::tuple::DecodeError;

/// Errors that end a scan, or prevent it from starting
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid block number {0}")]
    InvalidArgument(i64),
    #[error("block number {block} is out of range for relation with {block_count} blocks")]
    OutOfRange { block: BlockNumber, block_count: BlockNumber },
    #[error("corrupted page {block} at line pointer {offset}: {reason}")]
    CorruptPage { block: BlockNumber, offset: OffsetNumber, reason: String },
    #[error("table {0} does not exist")]
    TableNotFound(TableId),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<CatalogError> for ScanError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::TableNotFound(id) | CatalogError::TableAlreadyExists(id) => ScanError::TableNotFound(id),
        }
    }
}
