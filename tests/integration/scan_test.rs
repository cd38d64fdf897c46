use anyhow::Result;
use heapinspect::catalog::{Column, DataType, Table};
use heapinspect::common::types::{Page, PAGE_SIZE};
use heapinspect::common::value::DataValue;
use heapinspect::scan::{DecodeError, PageTupleScanner, Row, ScanError};
use heapinspect::storage::page::{ItemId, ItemIdFlags, PageManager};
use heapinspect::storage::tuple::varlena::{encode_compressed, encode_external, encode_inline, COMPRESSION_PGLZ};
use heapinspect::storage::tuple::{MemoryToast, StoredValue, ToastPointer, TupleBuilder};

#[path = "../common/mod.rs"]
mod common;

use common::{build_page, sample_row, sample_table};

fn scan_all(table: &Table, page: &Page) -> Result<Vec<Row>> {
    let rows = PageTupleScanner::open(table, 0, 1, page)?.collect::<Result<Vec<_>, ScanError>>()?;
    Ok(rows)
}

#[test]
fn test_round_trip() -> Result<()> {
    let table = sample_table();
    let mut rows: Vec<Vec<DataValue>> = (1..=20).map(sample_row).collect();
    rows[3][1] = DataValue::Null;
    rows[7][3] = DataValue::Null;
    rows[7][5] = DataValue::Null;
    rows[12] = vec![DataValue::Null; 6];
    let page = build_page(&table, &rows)?;

    let scanned = scan_all(&table, &page)?;
    assert_eq!(scanned.len(), rows.len());
    for (i, (row, expected)) in scanned.into_iter().zip(&rows).enumerate() {
        assert_eq!(row.offset as usize, i + 1);
        assert_eq!(row.meta.xmin, 1000 + i as u32);
        assert!(!row.has_errors());
        assert_eq!(&row.into_values(), expected);
    }
    Ok(())
}

#[test]
fn test_rows_follow_slot_order() -> Result<()> {
    let table = sample_table();
    let page = build_page(&table, &(1..=50).map(sample_row).collect::<Vec<_>>())?;

    let offsets: Vec<u16> = scan_all(&table, &page)?.iter().map(|r| r.offset).collect();
    assert_eq!(offsets, (1..=50).collect::<Vec<u16>>());
    Ok(())
}

#[test]
fn test_only_non_normal_slots_yield_nothing() -> Result<()> {
    let table = sample_table();
    let mut page = build_page(&table, &(1..=3).map(sample_row).collect::<Vec<_>>())?;
    let page_manager = PageManager::new();
    page_manager.set_item_flags(&mut page, 1, ItemIdFlags::Unused, 0)?;
    page_manager.set_item_flags(&mut page, 2, ItemIdFlags::Dead, 0)?;
    page_manager.set_item_flags(&mut page, 3, ItemIdFlags::Redirect, 1)?;

    assert!(scan_all(&table, &page)?.is_empty());
    Ok(())
}

#[test]
fn test_row_count_matches_normal_slots() -> Result<()> {
    let table = sample_table();
    let mut page = build_page(&table, &(1..=10).map(sample_row).collect::<Vec<_>>())?;
    let page_manager = PageManager::new();
    for offset in [2, 5, 9] {
        page_manager.set_item_flags(&mut page, offset, ItemIdFlags::Dead, 0)?;
    }

    let rows = scan_all(&table, &page)?;
    let offsets: Vec<u16> = rows.iter().map(|r| r.offset).collect();
    assert_eq!(offsets, vec![1, 3, 4, 6, 7, 8, 10]);
    assert_eq!(rows[2].value(0), Some(&DataValue::Integer(4)));
    Ok(())
}

#[test]
fn test_wider_schema_yields_nulls() -> Result<()> {
    let narrow = Table::new("t", vec![Column::new("a", DataType::Integer), Column::new("b", DataType::Text)]);
    let page = build_page(&narrow, &[vec![DataValue::Integer(7), DataValue::Text("x".into())]])?;

    let wide = Table::new("t", vec![
        Column::new("a", DataType::Integer),
        Column::new("b", DataType::Text),
        Column::new("c", DataType::BigInt),
        Column::new("d", DataType::Text),
    ]);
    let rows = scan_all(&wide, &page)?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].meta.natts, 2);
    assert!(!rows[0].has_errors());
    assert!(rows[0].is_null(2));
    assert!(rows[0].is_null(3));
    Ok(())
}

#[test]
fn test_narrower_schema_ignores_extra_attributes() -> Result<()> {
    let table = sample_table();
    let page = build_page(&table, &[sample_row(5)])?;

    let narrow = Table::new("t", vec![Column::new("id", DataType::Integer)]);
    let rows = scan_all(&narrow, &page)?;
    assert_eq!(rows[0].len(), 1);
    assert_eq!(rows[0].value(0), Some(&DataValue::Integer(5)));
    Ok(())
}

#[test]
fn test_corrupt_slot_keeps_earlier_rows() -> Result<()> {
    let table = sample_table();
    let mut page = build_page(&table, &(1..=4).map(sample_row).collect::<Vec<_>>())?;
    PageManager::new().write_item_id(&mut page, 3, &ItemId::new((PAGE_SIZE - 8) as u16, ItemIdFlags::Normal, 64));

    let mut scanner = PageTupleScanner::open(&table, 0, 1, &page)?;
    let first = scanner.next().unwrap()?;
    let second = scanner.next().unwrap()?;
    let err = scanner.next().unwrap().unwrap_err();
    assert!(matches!(err, ScanError::CorruptPage { block: 0, offset: 3, .. }));
    assert!(scanner.next().is_none());

    // Rows produced before the corruption are owned and intact
    drop(scanner);
    assert_eq!(first.into_values(), sample_row(1));
    assert_eq!(second.into_values(), sample_row(2));
    Ok(())
}

#[test]
fn test_bad_tuple_header_is_corruption() -> Result<()> {
    let table = sample_table();
    let mut page = build_page(&table, &[sample_row(1)])?;
    let page_manager = PageManager::new();
    let item = page_manager.get_item_id(&page, 1)?;
    // t_hoff beyond the tuple length
    page.data[item.offset as usize + 22] = 255;

    let err = PageTupleScanner::open(&table, 0, 1, &page)?.next().unwrap().unwrap_err();
    assert!(matches!(err, ScanError::CorruptPage { offset: 1, .. }));
    Ok(())
}

#[test]
fn test_block_number_errors_before_page_access() {
    let table = sample_table();
    let page = Page::new(0);
    assert!(matches!(PageTupleScanner::open(&table, -1, 4, &page), Err(ScanError::InvalidArgument(-1))));
    assert!(matches!(
        PageTupleScanner::open(&table, 4, 4, &page),
        Err(ScanError::OutOfRange { block: 4, block_count: 4 })
    ));
    assert!(matches!(PageTupleScanner::open(&table, 1 << 32, 4, &page), Err(ScanError::InvalidArgument(_))));
}

#[test]
fn test_decode_error_is_attribute_scoped() -> Result<()> {
    let table = Table::new("t", vec![
        Column::new("a", DataType::Text),
        Column::new("b", DataType::Integer),
    ]);
    let stored = [StoredValue::Varlena(encode_inline(&[0xff, 0xfe])), StoredValue::Fixed(9i32.to_le_bytes().to_vec())];
    let tuple = TupleBuilder::new(&table).build_stored(&stored)?;
    let page_manager = PageManager::new();
    let mut page = Page::new(0);
    page_manager.init_page(&mut page);
    page_manager.add_item(&mut page, &tuple)?;

    let rows = scan_all(&table, &page)?;
    assert_eq!(rows[0].error(0), Some(&DecodeError::InvalidUtf8("text".into())));
    assert_eq!(rows[0].value(1), Some(&DataValue::Integer(9)));
    Ok(())
}

#[test]
fn test_long_compressed_and_toasted_values() -> Result<()> {
    let table = Table::new("docs", vec![
        Column::new("id", DataType::Integer),
        Column::new("long", DataType::Text),
        Column::new("packed", DataType::Text),
        Column::new("toasted", DataType::Text),
        Column::new("tail", DataType::SmallInt),
    ]);
    let long_text = "x".repeat(300);
    let pointer = ToastPointer { raw_size: 5004, ext_size: 5000, compression: 0, value_id: 4242, toast_relid: 16999 };
    let stored = [
        StoredValue::Fixed(1i32.to_le_bytes().to_vec()),
        StoredValue::Varlena(encode_inline(long_text.as_bytes())),
        StoredValue::Varlena(encode_compressed(12, COMPRESSION_PGLZ, &[0x08, b'a', b'b', b'c', 0x06, 0x03])),
        StoredValue::Varlena(encode_external(pointer)),
        StoredValue::Fixed(77i16.to_le_bytes().to_vec()),
    ];
    let tuple = TupleBuilder::new(&table).build_stored(&stored)?;
    let page_manager = PageManager::new();
    let mut page = Page::new(0);
    page_manager.init_page(&mut page);
    page_manager.add_item(&mut page, &tuple)?;

    // Without a resolver only the toasted column fails
    let rows = scan_all(&table, &page)?;
    assert_eq!(rows[0].value(1), Some(&DataValue::Text(long_text.clone())));
    assert_eq!(rows[0].value(2), Some(&DataValue::Text("abcabcabcabc".into())));
    assert_eq!(rows[0].error(3), Some(&DecodeError::UnresolvedToast { value_id: 4242, toast_relid: 16999 }));
    assert_eq!(rows[0].value(4), Some(&DataValue::Integer(77)));

    let mut toast = MemoryToast::new();
    let body = "y".repeat(5000);
    toast.insert(16999, 4242, body.clone().into_bytes());
    let row = PageTupleScanner::open(&table, 0, 1, &page)?.with_toast(&toast).next().unwrap()?;
    assert_eq!(row.value(3), Some(&DataValue::Text(body)));
    Ok(())
}

#[test]
fn test_dropped_columns() -> Result<()> {
    let table = sample_table();
    let page = build_page(&table, &[sample_row(3)])?;

    let mut columns = table.columns().to_vec();
    columns[3] = Column::dropped("owner", DataType::Text);
    let altered = Table::new("accounts", columns);

    let values = scan_all(&altered, &page)?.remove(0).into_values();
    let mut expected = sample_row(3);
    expected[3] = DataValue::Null;
    assert_eq!(values, expected);
    Ok(())
}
