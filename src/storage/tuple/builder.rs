//! Forms heap tuples from values, laid out exactly as the scanner expects to read them.

use crate::catalog::{Column, Table};
use crate::common::types::{ItemPointer, TxnId};
use crate::common::value::DataValue;
use crate::storage::page::layout::max_align;
use super::convert::{encode_value, StoredValue};
use super::error::BuildError;
use super::header::{
    bitmap_len, HeapTupleHeader, HEAP_HASEXTERNAL, HEAP_HASNULL, HEAP_HASVARWIDTH, HEAP_NATTS_MASK, TUPLE_HEADER_SIZE,
};

pub struct TupleBuilder<'a> {
    columns: &'a [Column],
    header: HeapTupleHeader,
}

impl<'a> TupleBuilder<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self {
            columns: table.columns(),
            header: HeapTupleHeader {
                xmin: 0,
                xmax: 0,
                cid: 0,
                ctid: ItemPointer::new(0, 0),
                infomask2: 0,
                infomask: 0,
                hoff: 0,
            },
        }
    }

    pub fn xmin(mut self, xid: TxnId) -> Self {
        self.header.xmin = xid;
        self
    }

    pub fn xmax(mut self, xid: TxnId) -> Self {
        self.header.xmax = xid;
        self
    }

    pub fn cid(mut self, cid: u32) -> Self {
        self.header.cid = cid;
        self
    }

    pub fn ctid(mut self, ctid: ItemPointer) -> Self {
        self.header.ctid = ctid;
        self
    }

    /// Extra t_infomask bits (hint bits); layout bits are computed from the values
    pub fn infomask(mut self, bits: u16) -> Self {
        self.header.infomask |= bits;
        self
    }

    /// Extra t_infomask2 bits outside the attribute count
    pub fn infomask2(mut self, bits: u16) -> Self {
        self.header.infomask2 |= bits & !HEAP_NATTS_MASK;
        self
    }

    /// Form a tuple holding `values` for the leading columns of the table
    pub fn build(&self, values: &[DataValue]) -> Result<Vec<u8>, BuildError> {
        self.check_width(values.len())?;
        let stored = values
            .iter()
            .zip(self.columns)
            .map(|(value, column)| encode_value(column, value))
            .collect::<Result<Vec<_>, _>>()?;
        self.build_stored(&stored)
    }

    /// Form a tuple from values already in stored form
    pub fn build_stored(&self, values: &[StoredValue]) -> Result<Vec<u8>, BuildError> {
        self.check_width(values.len())?;

        let natts = values.len();
        let has_nulls = values.iter().any(|v| *v == StoredValue::Null);
        let bitmap_bytes = if has_nulls { bitmap_len(natts) } else { 0 };
        let hoff = max_align(TUPLE_HEADER_SIZE + bitmap_bytes);

        let mut header = self.header;
        header.infomask &= !(HEAP_HASNULL | HEAP_HASVARWIDTH | HEAP_HASEXTERNAL);
        header.infomask2 = (header.infomask2 & !HEAP_NATTS_MASK) | natts as u16;
        header.hoff = hoff as u8;

        let mut bitmap = vec![0u8; bitmap_bytes];
        let mut data: Vec<u8> = Vec::new();

        for (attnum, (value, column)) in values.iter().zip(self.columns).enumerate() {
            match value {
                StoredValue::Null => {
                    header.infomask |= HEAP_HASNULL;
                    continue;
                }
                StoredValue::Fixed(bytes) => {
                    data.resize(column.alignment().align(data.len()), 0);
                    data.extend_from_slice(bytes);
                }
                StoredValue::Varlena(bytes) => {
                    header.infomask |= HEAP_HASVARWIDTH;
                    let first = bytes.first().copied().unwrap_or(0);
                    if first == 0x01 {
                        header.infomask |= HEAP_HASEXTERNAL;
                    }
                    // Values with a 1-byte header are never padded
                    if first & 0x01 == 0 {
                        data.resize(column.alignment().align(data.len()), 0);
                    }
                    data.extend_from_slice(bytes);
                }
            }
            if has_nulls {
                bitmap[attnum >> 3] |= 1 << (attnum & 0x07);
            }
        }

        let mut tuple = Vec::with_capacity(hoff + data.len());
        tuple.extend_from_slice(&header.to_bytes());
        tuple.extend_from_slice(&bitmap);
        tuple.resize(hoff, 0);
        tuple.extend_from_slice(&data);
        Ok(tuple)
    }

    fn check_width(&self, values: usize) -> Result<(), BuildError> {
        if values > self.columns.len() || values > HEAP_NATTS_MASK as usize {
            return Err(BuildError::TooManyValues { values, columns: self.columns.len() });
        }
        Ok(())
    }
}
