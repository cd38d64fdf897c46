//! Heap tuple header.
//!
//! Every tuple body starts with a fixed 23-byte header followed by an optional
//! null bitmap. Attribute data begins at `t_hoff`, which is always MAXALIGN'd.
//!
//! ```text
//! offset  field
//!  0      t_xmin       u32
//!  4      t_xmax       u32
//!  8      t_cid        u32   (or t_xvac)
//! 12      t_ctid       bi_hi u16, bi_lo u16, ip_posid u16
//! 18      t_infomask2  u16   (low 11 bits: attribute count)
//! 20      t_infomask   u16
//! 22      t_hoff       u8
//! 23      t_bits       [u8]  (present when HEAP_HASNULL is set)
//! ```

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::common::types::{ItemPointer, TxnId};
use super::error::TupleFormatError;

pub const TUPLE_HEADER_SIZE: usize = 23;

pub const HEAP_HASNULL: u16 = 0x0001;
pub const HEAP_HASVARWIDTH: u16 = 0x0002;
pub const HEAP_HASEXTERNAL: u16 = 0x0004;
pub const HEAP_XMIN_COMMITTED: u16 = 0x0100;
pub const HEAP_XMIN_INVALID: u16 = 0x0200;
pub const HEAP_XMAX_COMMITTED: u16 = 0x0400;
pub const HEAP_XMAX_INVALID: u16 = 0x0800;
pub const HEAP_UPDATED: u16 = 0x2000;

pub const HEAP_NATTS_MASK: u16 = 0x07FF;
pub const HEAP_HOT_UPDATED: u16 = 0x4000;
pub const HEAP_ONLY_TUPLE: u16 = 0x8000;

/// Bytes needed for a null bitmap covering `natts` attributes
pub fn bitmap_len(natts: usize) -> usize {
    natts.div_ceil(8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeapTupleHeader {
    pub xmin: TxnId,
    pub xmax: TxnId,
    pub cid: u32,
    pub ctid: ItemPointer,
    pub infomask2: u16,
    pub infomask: u16,
    pub hoff: u8,
}

impl HeapTupleHeader {
    /// Decode the fixed part of a tuple header; `bytes` must hold at least TUPLE_HEADER_SIZE bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TupleFormatError> {
        if bytes.len() < TUPLE_HEADER_SIZE {
            return Err(TupleFormatError::TooShort(bytes.len()));
        }

        let bi_hi = LittleEndian::read_u16(&bytes[12..14]) as u32;
        let bi_lo = LittleEndian::read_u16(&bytes[14..16]) as u32;

        Ok(Self {
            xmin: LittleEndian::read_u32(&bytes[0..4]),
            xmax: LittleEndian::read_u32(&bytes[4..8]),
            cid: LittleEndian::read_u32(&bytes[8..12]),
            ctid: ItemPointer::new((bi_hi << 16) | bi_lo, LittleEndian::read_u16(&bytes[16..18])),
            infomask2: LittleEndian::read_u16(&bytes[18..20]),
            infomask: LittleEndian::read_u16(&bytes[20..22]),
            hoff: bytes[22],
        })
    }

    pub fn to_bytes(&self) -> [u8; TUPLE_HEADER_SIZE] {
        let mut bytes = [0u8; TUPLE_HEADER_SIZE];
        LittleEndian::write_u32(&mut bytes[0..4], self.xmin);
        LittleEndian::write_u32(&mut bytes[4..8], self.xmax);
        LittleEndian::write_u32(&mut bytes[8..12], self.cid);
        LittleEndian::write_u16(&mut bytes[12..14], (self.ctid.block >> 16) as u16);
        LittleEndian::write_u16(&mut bytes[14..16], self.ctid.block as u16);
        LittleEndian::write_u16(&mut bytes[16..18], self.ctid.offset);
        LittleEndian::write_u16(&mut bytes[18..20], self.infomask2);
        LittleEndian::write_u16(&mut bytes[20..22], self.infomask);
        bytes[22] = self.hoff;
        bytes
    }

    /// Number of attributes physically present
    pub fn natts(&self) -> usize {
        (self.infomask2 & HEAP_NATTS_MASK) as usize
    }

    pub fn has_nulls(&self) -> bool {
        self.infomask & HEAP_HASNULL != 0
    }

    pub fn is_hot_updated(&self) -> bool {
        self.infomask2 & HEAP_HOT_UPDATED != 0
    }

    pub fn is_heap_only(&self) -> bool {
        self.infomask2 & HEAP_ONLY_TUPLE != 0
    }

    /// Names of the hint and state bits that are set, for diagnostics
    pub fn flag_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let infomask_flags = [
            (HEAP_HASNULL, "HASNULL"),
            (HEAP_HASVARWIDTH, "HASVARWIDTH"),
            (HEAP_HASEXTERNAL, "HASEXTERNAL"),
            (HEAP_XMIN_COMMITTED, "XMIN_COMMITTED"),
            (HEAP_XMIN_INVALID, "XMIN_INVALID"),
            (HEAP_XMAX_COMMITTED, "XMAX_COMMITTED"),
            (HEAP_XMAX_INVALID, "XMAX_INVALID"),
            (HEAP_UPDATED, "UPDATED"),
        ];
        for (bit, name) in infomask_flags {
            if self.infomask & bit != 0 {
                names.push(name);
            }
        }
        if self.is_hot_updated() {
            names.push("HOT_UPDATED");
        }
        if self.is_heap_only() {
            names.push("HEAP_ONLY");
        }
        names
    }
}

/// Read-only view of one tuple body inside a page
#[derive(Debug, Clone, Copy)]
pub struct TupleView<'a> {
    bytes: &'a [u8],
    header: HeapTupleHeader,
}

impl<'a> TupleView<'a> {
    /// Check the header against the tuple length and wrap the bytes
    pub fn new(bytes: &'a [u8]) -> Result<Self, TupleFormatError> {
        let header = HeapTupleHeader::from_bytes(bytes)?;
        let hoff = header.hoff as usize;

        if hoff < TUPLE_HEADER_SIZE || hoff > bytes.len() {
            return Err(TupleFormatError::BadHeaderOffset { hoff, len: bytes.len() });
        }
        if header.has_nulls() && TUPLE_HEADER_SIZE + bitmap_len(header.natts()) > hoff {
            return Err(TupleFormatError::BitmapOverflow { natts: header.natts(), hoff });
        }

        Ok(Self { bytes, header })
    }

    pub fn header(&self) -> &HeapTupleHeader {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn natts(&self) -> usize {
        self.header.natts()
    }

    /// Whether attribute `attnum` (0-based) is null.
    ///
    /// Attributes beyond the stored count are null.
    pub fn is_null(&self, attnum: usize) -> bool {
        if attnum >= self.natts() {
            return true;
        }
        if !self.header.has_nulls() {
            return false;
        }
        let bits = &self.bytes[TUPLE_HEADER_SIZE..];
        bits[attnum >> 3] & (1 << (attnum & 0x07)) == 0
    }

    /// Attribute data area, starting at t_hoff
    pub fn data(&self) -> &'a [u8] {
        &self.bytes[self.header.hoff as usize..]
    }
}
