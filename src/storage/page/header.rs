use byteorder::{ByteOrder, LittleEndian};
use crate::common::types::{OffsetNumber, PAGE_SIZE};
use crate::storage::page::layout::{HEADER_SIZE, ITEM_ID_SIZE, PAGE_LAYOUT_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PageHeader {
    pub lsn: u64,
    pub checksum: u16,
    pub flags: u16,
    pub lower: u16,
    pub upper: u16,
    pub special: u16,
    pub pagesize_version: u16,
    pub prune_xid: u32,
}

impl Default for PageHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl PageHeader {
    /// Header of an empty page with no special space
    pub fn new() -> Self {
        Self {
            lsn: 0,
            checksum: 0,
            flags: 0,
            lower: HEADER_SIZE as u16,
            upper: PAGE_SIZE as u16,
            special: PAGE_SIZE as u16,
            pagesize_version: PAGE_SIZE as u16 | PAGE_LAYOUT_VERSION,
            prune_xid: 0,
        }
    }

    // Serialize header to bytes
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];

        // pd_lsn is stored as two 32-bit halves, high word first
        LittleEndian::write_u32(&mut bytes[0..4], (self.lsn >> 32) as u32);
        LittleEndian::write_u32(&mut bytes[4..8], self.lsn as u32);
        LittleEndian::write_u16(&mut bytes[8..10], self.checksum);
        LittleEndian::write_u16(&mut bytes[10..12], self.flags);
        LittleEndian::write_u16(&mut bytes[12..14], self.lower);
        LittleEndian::write_u16(&mut bytes[14..16], self.upper);
        LittleEndian::write_u16(&mut bytes[16..18], self.special);
        LittleEndian::write_u16(&mut bytes[18..20], self.pagesize_version);
        LittleEndian::write_u32(&mut bytes[20..24], self.prune_xid);

        bytes
    }

    // Deserialize header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let xlogid = LittleEndian::read_u32(&bytes[0..4]) as u64;
        let xrecoff = LittleEndian::read_u32(&bytes[4..8]) as u64;

        Self {
            lsn: (xlogid << 32) | xrecoff,
            checksum: LittleEndian::read_u16(&bytes[8..10]),
            flags: LittleEndian::read_u16(&bytes[10..12]),
            lower: LittleEndian::read_u16(&bytes[12..14]),
            upper: LittleEndian::read_u16(&bytes[14..16]),
            special: LittleEndian::read_u16(&bytes[16..18]),
            pagesize_version: LittleEndian::read_u16(&bytes[18..20]),
            prune_xid: LittleEndian::read_u32(&bytes[20..24]),
        }
    }

    /// Number of line pointers in use
    pub fn max_offset_number(&self) -> OffsetNumber {
        let lower = self.lower as usize;
        if lower <= HEADER_SIZE {
            0
        } else {
            ((lower - HEADER_SIZE) / ITEM_ID_SIZE) as OffsetNumber
        }
    }

    pub fn page_size(&self) -> usize {
        (self.pagesize_version & 0xFF00) as usize
    }

    pub fn layout_version(&self) -> u16 {
        self.pagesize_version & 0x00FF
    }

    /// Bytes between the end of the line pointer array and the first tuple
    pub fn free_space(&self) -> usize {
        (self.upper as usize).saturating_sub(self.lower as usize)
    }

    /// Formatted as "xlogid/xrecoff"
    pub fn lsn_string(&self) -> String {
        format!("{:X}/{:X}", self.lsn >> 32, self.lsn as u32)
    }
}
