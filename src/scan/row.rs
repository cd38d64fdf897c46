// Output rows of a page scan

use serde::Serialize;

use crate::common::types::{BlockNumber, ItemPointer, OffsetNumber, TxnId};
use crate::common::value::DataValue;
use crate::storage::tuple::{DecodeError, HeapTupleHeader};

/// Tuple header fields carried along with each row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TupleMeta {
    pub xmin: TxnId,
    pub xmax: TxnId,
    pub cid: u32,
    pub ctid: ItemPointer,
    pub infomask: u16,
    pub infomask2: u16,
    /// Attributes physically present in the tuple
    pub natts: usize,
}

impl From<&HeapTupleHeader> for TupleMeta {
    fn from(header: &HeapTupleHeader) -> Self {
        Self {
            xmin: header.xmin,
            xmax: header.xmax,
            cid: header.cid,
            ctid: header.ctid,
            infomask: header.infomask,
            infomask2: header.infomask2,
            natts: header.natts(),
        }
    }
}

/// One reconstructed tuple, with a value per column of the scanning schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub block: BlockNumber,
    /// Line pointer the tuple was read from
    pub offset: OffsetNumber,
    pub meta: TupleMeta,
    values: Vec<Result<DataValue, DecodeError>>,
}

impl Row {
    pub(crate) fn new(block: BlockNumber, offset: OffsetNumber, meta: TupleMeta, values: Vec<Result<DataValue, DecodeError>>) -> Self {
        Self { block, offset, meta, values }
    }

    /// Physical address of the tuple
    pub fn tid(&self) -> ItemPointer {
        ItemPointer::new(self.block, self.offset)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Decoded value of column `index`, or `None` if it failed to decode
    pub fn value(&self, index: usize) -> Option<&DataValue> {
        self.values.get(index).and_then(|v| v.as_ref().ok())
    }

    pub fn get(&self, index: usize) -> Option<&Result<DataValue, DecodeError>> {
        self.values.get(index)
    }

    pub fn is_null(&self, index: usize) -> bool {
        matches!(self.values.get(index), Some(Ok(DataValue::Null)))
    }

    pub fn error(&self, index: usize) -> Option<&DecodeError> {
        self.values.get(index).and_then(|v| v.as_ref().err())
    }

    pub fn has_errors(&self) -> bool {
        self.values.iter().any(|v| v.is_err())
    }

    pub fn values(&self) -> &[Result<DataValue, DecodeError>] {
        &self.values
    }

    /// Values with decode failures replaced by NULL
    pub fn into_values(self) -> Vec<DataValue> {
        self.values.into_iter().map(|v| v.unwrap_or(DataValue::Null)).collect()
    }
}
