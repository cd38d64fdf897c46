use thiserror::Error;
use crate::common::types::OffsetNumber;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Not enough space in page")]
    InsufficientSpace,
    #[error("Invalid line pointer: {0}")]
    InvalidItemId(OffsetNumber),
    #[error("Item {offset} points outside the page ({start}..{end})")]
    ItemOutOfBounds { offset: OffsetNumber, start: usize, end: usize },
    #[error("Tuple of {0} bytes does not fit on a page")]
    TupleTooLarge(usize),
}
