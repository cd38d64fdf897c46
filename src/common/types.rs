/// Page size in bytes (8KB)
pub const PAGE_SIZE: usize = 8192;

/// Physical block number within a relation's storage
pub type BlockNumber = u32;

/// Largest block number a relation can address; 0xFFFFFFFF is reserved as invalid
pub const MAX_BLOCK_NUMBER: BlockNumber = 0xFFFF_FFFE;

/// 1-based index into a page's line pointer array
pub type OffsetNumber = u16;

/// First valid line pointer index
pub const FIRST_OFFSET_NUMBER: OffsetNumber = 1;

/// Table identifier (object id)
pub type TableId = u32;

/// Transaction ID type
pub type TxnId = u32;

/// Owned page image
#[derive(Debug, Clone)]
pub struct Page {
    pub data: [u8; PAGE_SIZE],
    pub block: BlockNumber,
}

impl Page {
    pub fn new(block: BlockNumber) -> Self {
        Self {
            data: [0; PAGE_SIZE],
            block,
        }
    }

    /// Build a page image from raw bytes; the slice must be exactly PAGE_SIZE long
    pub fn from_bytes(block: BlockNumber, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != PAGE_SIZE {
            return None;
        }
        let mut page = Self::new(block);
        page.data.copy_from_slice(bytes);
        Some(page)
    }

    /// A page that was never initialized is all zeros
    pub fn is_new(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }
}

/// Physical tuple address (block, line pointer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ItemPointer {
    pub block: BlockNumber,
    pub offset: OffsetNumber,
}

impl ItemPointer {
    pub fn new(block: BlockNumber, offset: OffsetNumber) -> Self {
        Self { block, offset }
    }
}

impl std::fmt::Display for ItemPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.block, self.offset)
    }
}
