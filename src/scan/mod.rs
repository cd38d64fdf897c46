//! Raw page scanning.
//!
//! [`PageTupleScanner`] reconstructs rows from one page image; [`BlockInspector`]
//! resolves a table and block through the [`Catalog`](crate::catalog::Catalog)
//! and hands out scanners over the page it read.

pub mod error;
pub mod inspector;
pub mod row;
pub mod scanner;

pub use error::{DecodeError, ScanError};
pub use inspector::{BlockInspector, BlockSnapshot, ItemInfo};
pub use row::{Row, TupleMeta};
pub use scanner::{check_block_argument, validate_block_number, PageTupleScanner};
