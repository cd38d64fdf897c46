//! Page Tuple Scanner.
//!
//! Walks the line pointer array of one heap page and turns every normal slot
//! into a [`Row`] shaped by the table's current column list. Tuple visibility
//! is never consulted, so dead and uncommitted versions are returned as well.

use std::iter::FusedIterator;

use log::{debug, trace, warn};

use crate::catalog::{DataType, Table};
use crate::common::types::{BlockNumber, OffsetNumber, Page, FIRST_OFFSET_NUMBER, MAX_BLOCK_NUMBER, PAGE_SIZE};
use crate::common::value::DataValue;
use crate::storage::page::layout::{item_id_position, ItemId, HEADER_SIZE, ITEM_ID_SIZE};
use crate::storage::page::PageHeader;
use crate::storage::tuple::{
    decode_value, deform_tuple, detoast, DecodeError, RawAttribute, ToastResolver, TupleView, TUPLE_HEADER_SIZE,
};
use super::error::ScanError;
use super::row::{Row, TupleMeta};

/// Check that `block_number` can name a block at all
pub fn check_block_argument(block_number: i64) -> Result<BlockNumber, ScanError> {
    if block_number < 0 || block_number > MAX_BLOCK_NUMBER as i64 {
        return Err(ScanError::InvalidArgument(block_number));
    }
    Ok(block_number as BlockNumber)
}

/// Check `block_number` against the argument range, then against the relation size
pub fn validate_block_number(block_number: i64, total_blocks: BlockNumber) -> Result<BlockNumber, ScanError> {
    let block = check_block_argument(block_number)?;
    if block >= total_blocks {
        return Err(ScanError::OutOfRange { block, block_count: total_blocks });
    }
    Ok(block)
}

/// Forward-only iterator over the tuples of one page
pub struct PageTupleScanner<'a> {
    table: &'a Table,
    page: &'a Page,
    block: BlockNumber,
    /// Next line pointer to look at (1-based)
    next_offset: OffsetNumber,
    /// Highest line pointer in use, read once at open
    max_offset: OffsetNumber,
    toast: Option<&'a dyn ToastResolver>,
    rows: usize,
    done: bool,
}

impl<'a> PageTupleScanner<'a> {
    /// Start a scan of `page`, which holds block `block_number` of a relation
    /// with `total_blocks` blocks.
    pub fn open(table: &'a Table, block_number: i64, total_blocks: BlockNumber, page: &'a Page) -> Result<Self, ScanError> {
        let block = validate_block_number(block_number, total_blocks)?;

        let header = PageHeader::from_bytes(&page.data[..HEADER_SIZE]);
        if header.lower as usize > PAGE_SIZE {
            warn!("block {}: pd_lower {} is past the end of the page", block, header.lower);
            return Err(ScanError::CorruptPage {
                block,
                offset: 0,
                reason: format!("pd_lower {} exceeds page size {}", header.lower, PAGE_SIZE),
            });
        }
        let max_offset = header.max_offset_number();

        debug!("scanning block {} of {} with {} line pointers", block, table.name(), max_offset);

        Ok(Self {
            table,
            page,
            block,
            next_offset: FIRST_OFFSET_NUMBER,
            max_offset,
            toast: None,
            rows: 0,
            done: false,
        })
    }

    /// Resolve out-of-line values through `resolver` instead of reporting them as unresolved
    pub fn with_toast(mut self, resolver: &'a dyn ToastResolver) -> Self {
        self.toast = Some(resolver);
        self
    }

    pub fn block(&self) -> BlockNumber {
        self.block
    }

    pub fn max_offset(&self) -> OffsetNumber {
        self.max_offset
    }

    fn corrupt(&self, offset: OffsetNumber, reason: String) -> ScanError {
        ScanError::CorruptPage { block: self.block, offset, reason }
    }

    fn item_id(&self, offset: OffsetNumber) -> ItemId {
        let pos = item_id_position(offset);
        ItemId::from_bytes(&self.page.data[pos..pos + ITEM_ID_SIZE])
    }

    fn read_tuple(&self, offset: OffsetNumber, item: ItemId) -> Result<Row, ScanError> {
        let start = item.offset as usize;
        let len = item.length as usize;

        if start + len > PAGE_SIZE {
            return Err(self.corrupt(offset, format!("tuple at {} with length {} extends past end of page", start, len)));
        }
        if start < HEADER_SIZE {
            return Err(self.corrupt(offset, format!("tuple offset {} overlaps the page header", start)));
        }
        if len < TUPLE_HEADER_SIZE {
            return Err(self.corrupt(offset, format!("tuple length {} is shorter than the tuple header", len)));
        }

        let tuple = TupleView::new(&self.page.data[start..start + len]).map_err(|e| self.corrupt(offset, e.to_string()))?;

        let columns = self.table.columns();
        let values = deform_tuple(&tuple, columns)
            .into_iter()
            .zip(columns)
            .enumerate()
            .map(|(attnum, (raw, column))| {
                // Dropped columns keep their bytes on the page but have no value
                if column.is_dropped() {
                    return Ok(DataValue::Null);
                }
                let value = raw.and_then(|raw| self.convert(*column.data_type(), raw));
                if let Err(e) = &value {
                    warn!("block {} lp {}: column {} ({}): {}", self.block, offset, attnum + 1, column.name(), e);
                }
                value
            })
            .collect();

        Ok(Row::new(self.block, offset, TupleMeta::from(tuple.header()), values))
    }

    fn convert(&self, data_type: DataType, raw: RawAttribute<'_>) -> Result<DataValue, DecodeError> {
        match raw {
            RawAttribute::Null => Ok(DataValue::Null),
            RawAttribute::Fixed(bytes) => decode_value(data_type, bytes),
            RawAttribute::Varlena(varlena) => {
                let payload = detoast(varlena, self.toast)?;
                decode_value(data_type, &payload)
            }
        }
    }
}

impl Iterator for PageTupleScanner<'_> {
    type Item = Result<Row, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while self.next_offset <= self.max_offset {
            let offset = self.next_offset;
            self.next_offset += 1;

            let item = self.item_id(offset);
            if !item.is_normal() {
                trace!("block {} lp {}: skipping {} line pointer", self.block, offset, item.flags.as_str());
                continue;
            }

            return match self.read_tuple(offset, item) {
                Ok(row) => {
                    self.rows += 1;
                    Some(Ok(row))
                }
                Err(e) => {
                    warn!("{}", e);
                    self.done = true;
                    Some(Err(e))
                }
            };
        }

        debug!("block {}: scan finished with {} rows", self.block, self.rows);
        self.done = true;
        None
    }
}

impl FusedIterator for PageTupleScanner<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Column;
    use crate::storage::page::{ItemIdFlags, PageManager};
    use crate::storage::tuple::TupleBuilder;

    fn table() -> Table {
        Table::new("t", vec![Column::new("id", DataType::Integer), Column::new("name", DataType::Text)])
    }

    fn page_with(table: &Table, rows: &[(i64, &str)]) -> Page {
        let pm = PageManager::new();
        let mut page = Page::new(0);
        pm.init_page(&mut page);
        for (id, name) in rows {
            let tuple = TupleBuilder::new(table)
                .build(&[DataValue::Integer(*id), DataValue::Text(name.to_string())])
                .unwrap();
            pm.add_item(&mut page, &tuple).unwrap();
        }
        page
    }

    #[test]
    fn test_block_number_validation() {
        assert!(matches!(validate_block_number(-1, 10), Err(ScanError::InvalidArgument(-1))));
        assert!(matches!(validate_block_number(-1, 0), Err(ScanError::InvalidArgument(-1))));
        assert!(matches!(
            validate_block_number(MAX_BLOCK_NUMBER as i64 + 1, 10),
            Err(ScanError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_block_number(10, 10),
            Err(ScanError::OutOfRange { block: 10, block_count: 10 })
        ));
        assert_eq!(validate_block_number(9, 10).unwrap(), 9);
    }

    #[test]
    fn test_scan_rows_in_slot_order() {
        let table = table();
        let page = page_with(&table, &[(1, "a"), (2, "b"), (3, "c")]);

        let rows: Vec<Row> = PageTupleScanner::open(&table, 0, 1, &page)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows.len(), 3);
        let offsets: Vec<_> = rows.iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![1, 2, 3]);
        assert_eq!(rows[1].value(0), Some(&DataValue::Integer(2)));
        assert_eq!(rows[1].value(1), Some(&DataValue::Text("b".into())));
    }

    #[test]
    fn test_skips_non_normal_slots() {
        let table = table();
        let mut page = page_with(&table, &[(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
        let pm = PageManager::new();
        pm.set_item_flags(&mut page, 1, ItemIdFlags::Dead, 0).unwrap();
        pm.set_item_flags(&mut page, 2, ItemIdFlags::Redirect, 4).unwrap();
        pm.set_item_flags(&mut page, 3, ItemIdFlags::Unused, 0).unwrap();

        let rows: Vec<_> = PageTupleScanner::open(&table, 0, 1, &page).unwrap().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].as_ref().unwrap().offset, 4);
    }

    #[test]
    fn test_new_page_has_no_rows() {
        let table = table();
        let page = Page::new(0);
        let mut scanner = PageTupleScanner::open(&table, 0, 1, &page).unwrap();
        assert_eq!(scanner.max_offset(), 0);
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_corrupt_slot_ends_scan() {
        let table = table();
        let mut page = page_with(&table, &[(1, "a"), (2, "b"), (3, "c")]);
        let pm = PageManager::new();
        pm.write_item_id(&mut page, 2, &ItemId::new(8180, ItemIdFlags::Normal, 40));

        let mut scanner = PageTupleScanner::open(&table, 0, 1, &page).unwrap();
        assert_eq!(scanner.next().unwrap().unwrap().value(0), Some(&DataValue::Integer(1)));
        assert!(matches!(scanner.next(), Some(Err(ScanError::CorruptPage { block: 0, offset: 2, .. }))));
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_corrupt_pd_lower() {
        let table = table();
        let mut page = page_with(&table, &[(1, "a")]);
        let pm = PageManager::new();
        let mut header = pm.get_header(&page);
        header.lower = (PAGE_SIZE + 4) as u16;
        pm.write_header(&mut page, &header);

        assert!(matches!(
            PageTupleScanner::open(&table, 0, 1, &page),
            Err(ScanError::CorruptPage { offset: 0, .. })
        ));
    }

    #[test]
    fn test_dropped_column_is_null() {
        let written = Table::new("t", vec![
            Column::new("a", DataType::Integer),
            Column::new("b", DataType::Text),
            Column::new("c", DataType::Integer),
        ]);
        let pm = PageManager::new();
        let mut page = Page::new(0);
        pm.init_page(&mut page);
        let tuple = TupleBuilder::new(&written)
            .build(&[DataValue::Integer(1), DataValue::Text("gone".into()), DataValue::Integer(3)])
            .unwrap();
        pm.add_item(&mut page, &tuple).unwrap();

        let current = Table::new("t", vec![
            Column::new("a", DataType::Integer),
            Column::dropped("b", DataType::Text),
            Column::new("c", DataType::Integer),
        ]);
        let row = PageTupleScanner::open(&current, 0, 1, &page).unwrap().next().unwrap().unwrap();
        assert_eq!(row.into_values(), vec![DataValue::Integer(1), DataValue::Null, DataValue::Integer(3)]);
    }
}
