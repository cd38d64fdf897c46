use crate::common::types::{OffsetNumber, Page, FIRST_OFFSET_NUMBER, PAGE_SIZE};
use crate::storage::page::header::PageHeader;
use crate::storage::page::error::PageError;
use crate::storage::page::layout::{
    item_id_position, max_align, ItemId, ItemIdFlags, HEADER_SIZE, ITEM_ID_SIZE, MAX_OFFSET_NUMBER,
};

pub struct PageManager {
    // Line pointers grow forward from the end of the header,
    // tuple bodies grow backward from pd_upper
}

impl Default for PageManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PageManager {
    pub fn new() -> Self {
        Self {}
    }

    pub fn init_page(&self, page: &mut Page) {
        page.data = [0; PAGE_SIZE];
        let header = PageHeader::new();
        page.data[0..HEADER_SIZE].copy_from_slice(&header.to_bytes());
    }

    /// Append a tuple body and a normal line pointer to it.
    ///
    /// Returns the 1-based offset number of the new line pointer.
    pub fn add_item(&self, page: &mut Page, data: &[u8]) -> Result<OffsetNumber, PageError> {
        let mut header = self.get_header(page);

        if data.len() > PAGE_SIZE - HEADER_SIZE - ITEM_ID_SIZE {
            return Err(PageError::TupleTooLarge(data.len()));
        }

        let aligned_len = max_align(data.len());
        let lower = header.lower as usize + ITEM_ID_SIZE;
        if (header.upper as usize) < aligned_len || (header.upper as usize - aligned_len) < lower {
            return Err(PageError::InsufficientSpace);
        }

        let offset_number = header.max_offset_number() + 1;
        if offset_number > MAX_OFFSET_NUMBER {
            return Err(PageError::InsufficientSpace);
        }

        let upper = header.upper as usize - aligned_len;
        page.data[upper..upper + data.len()].copy_from_slice(data);

        let item = ItemId::new(upper as u16, ItemIdFlags::Normal, data.len() as u16);
        self.write_item_id(page, offset_number, &item);

        header.lower = lower as u16;
        header.upper = upper as u16;
        self.write_header(page, &header);

        Ok(offset_number)
    }

    /// Overwrite the state of an existing line pointer.
    ///
    /// Dead and unused pointers keep no storage; a redirect stores its target in `lp_off`.
    pub fn set_item_flags(&self, page: &mut Page, offset: OffsetNumber, flags: ItemIdFlags, redirect_to: OffsetNumber) -> Result<(), PageError> {
        let mut item = self.get_item_id(page, offset)?;
        match flags {
            ItemIdFlags::Normal => {}
            ItemIdFlags::Redirect => {
                item.offset = redirect_to;
                item.length = 0;
            }
            ItemIdFlags::Dead | ItemIdFlags::Unused => {
                item.offset = 0;
                item.length = 0;
            }
        }
        item.flags = flags;
        self.write_item_id(page, offset, &item);
        Ok(())
    }

    /// Write a raw line pointer without any validation (used to build damaged pages)
    pub fn write_item_id(&self, page: &mut Page, offset: OffsetNumber, item: &ItemId) {
        let pos = item_id_position(offset);
        page.data[pos..pos + ITEM_ID_SIZE].copy_from_slice(&item.to_bytes());
    }

    pub fn get_item_id(&self, page: &Page, offset: OffsetNumber) -> Result<ItemId, PageError> {
        let header = self.get_header(page);
        if offset < FIRST_OFFSET_NUMBER || offset > header.max_offset_number() {
            return Err(PageError::InvalidItemId(offset));
        }
        let pos = item_id_position(offset);
        if pos + ITEM_ID_SIZE > PAGE_SIZE {
            return Err(PageError::InvalidItemId(offset));
        }
        Ok(ItemId::from_bytes(&page.data[pos..pos + ITEM_ID_SIZE]))
    }

    /// All line pointers of the page in offset order
    pub fn item_ids(&self, page: &Page) -> Vec<(OffsetNumber, ItemId)> {
        let max = self.get_header(page).max_offset_number();
        (FIRST_OFFSET_NUMBER..=max)
            .filter_map(|offset| self.get_item_id(page, offset).ok().map(|item| (offset, item)))
            .collect()
    }

    /// Borrow the bytes a line pointer refers to
    pub fn get_item<'a>(&self, page: &'a Page, offset: OffsetNumber) -> Result<&'a [u8], PageError> {
        let item = self.get_item_id(page, offset)?;
        let start = item.offset as usize;
        let end = start + item.length as usize;
        if start < HEADER_SIZE || end > PAGE_SIZE {
            return Err(PageError::ItemOutOfBounds { offset, start, end });
        }
        Ok(&page.data[start..end])
    }

    pub fn get_header(&self, page: &Page) -> PageHeader {
        PageHeader::from_bytes(&page.data[0..HEADER_SIZE])
    }

    pub fn write_header(&self, page: &mut Page, header: &PageHeader) {
        page.data[0..HEADER_SIZE].copy_from_slice(&header.to_bytes());
    }

    pub fn get_free_space(&self, page: &Page) -> usize {
        self.get_header(page).free_space()
    }
}
