// heapinspect: raw heap page reader

pub mod common;
pub mod storage;
pub mod catalog;
pub mod scan;

// Re-export key items for convenient access
pub use storage::page::PageManager;
pub use storage::page::PageError;
pub use storage::disk::{BlockSource, DiskManager, MemoryRelation, StorageError};
pub use storage::tuple::{TupleBuilder, ToastResolver, MemoryToast};
pub use catalog::Catalog;
pub use common::value::DataValue;
pub use scan::{BlockInspector, BlockSnapshot, PageTupleScanner, Row, ScanError, DecodeError};
