use byteorder::{ByteOrder, LittleEndian};
use crate::common::types::{OffsetNumber, PAGE_SIZE};

pub const HEADER_SIZE: usize = 24; // lsn(8) + checksum, flags, lower, upper, special, pagesize_version(2 each) + prune_xid(4)
pub const ITEM_ID_SIZE: usize = 4; // lp_off:15, lp_flags:2, lp_len:15 packed in one u32

/// Layout version written into pd_pagesize_version
pub const PAGE_LAYOUT_VERSION: u16 = 4;

/// Tuple bodies are placed on 8-byte boundaries
pub const MAXIMUM_ALIGNOF: usize = 8;

/// Largest line pointer index that fits on a page
pub const MAX_OFFSET_NUMBER: OffsetNumber = (PAGE_SIZE / ITEM_ID_SIZE) as OffsetNumber;

const LP_OFF_MASK: u32 = 0x7FFF;
const LP_FLAGS_SHIFT: u32 = 15;
const LP_LEN_SHIFT: u32 = 17;

pub fn max_align(len: usize) -> usize {
    (len + MAXIMUM_ALIGNOF - 1) & !(MAXIMUM_ALIGNOF - 1)
}

/// Line pointer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ItemIdFlags {
    Unused,
    Normal,
    Redirect,
    Dead,
}

impl ItemIdFlags {
    fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => ItemIdFlags::Unused,
            1 => ItemIdFlags::Normal,
            2 => ItemIdFlags::Redirect,
            _ => ItemIdFlags::Dead,
        }
    }

    fn bits(self) -> u32 {
        match self {
            ItemIdFlags::Unused => 0,
            ItemIdFlags::Normal => 1,
            ItemIdFlags::Redirect => 2,
            ItemIdFlags::Dead => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemIdFlags::Unused => "unused",
            ItemIdFlags::Normal => "normal",
            ItemIdFlags::Redirect => "redirect",
            ItemIdFlags::Dead => "dead",
        }
    }
}

/// One entry of the line pointer array.
///
/// For a redirect, `offset` holds the target line pointer index and `length` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ItemId {
    pub offset: u16,
    pub flags: ItemIdFlags,
    pub length: u16,
}

impl ItemId {
    pub fn new(offset: u16, flags: ItemIdFlags, length: u16) -> Self {
        Self { offset, flags, length }
    }

    pub fn is_normal(&self) -> bool {
        self.flags == ItemIdFlags::Normal
    }

    pub fn to_bytes(&self) -> [u8; ITEM_ID_SIZE] {
        let word = (self.offset as u32 & LP_OFF_MASK)
            | (self.flags.bits() << LP_FLAGS_SHIFT)
            | ((self.length as u32 & LP_OFF_MASK) << LP_LEN_SHIFT);
        let mut bytes = [0u8; ITEM_ID_SIZE];
        LittleEndian::write_u32(&mut bytes, word);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let word = LittleEndian::read_u32(&bytes[0..4]);
        Self {
            offset: (word & LP_OFF_MASK) as u16,
            flags: ItemIdFlags::from_bits(word >> LP_FLAGS_SHIFT),
            length: ((word >> LP_LEN_SHIFT) & LP_OFF_MASK) as u16,
        }
    }
}

/// Byte position of line pointer `offset` (1-based) within the page
pub fn item_id_position(offset: OffsetNumber) -> usize {
    HEADER_SIZE + (offset as usize - 1) * ITEM_ID_SIZE
}
