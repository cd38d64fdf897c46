use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use heapinspect::catalog::Catalog;
use heapinspect::common::types::{Page, PAGE_SIZE};
use heapinspect::common::value::DataValue;
use heapinspect::scan::{BlockInspector, BlockSnapshot, ScanError};
use heapinspect::storage::disk::disk_manager::RELSEG_SIZE;
use heapinspect::storage::disk::{BlockSource, DiskManager};
use heapinspect::storage::page::{ItemIdFlags, PageManager};

#[path = "../common/mod.rs"]
mod common;

use common::{build_page, sample_row, sample_table, write_relation};

#[test]
fn test_scan_blocks_from_relation_file() -> Result<()> {
    let table = sample_table();
    let pages = vec![
        build_page(&table, &(1..=3).map(sample_row).collect::<Vec<_>>())?,
        build_page(&table, &(4..=9).map(sample_row).collect::<Vec<_>>())?,
    ];
    let file = write_relation(&pages)?;

    let catalog = Catalog::new();
    let table_id = catalog.register_table(table, Arc::new(DiskManager::open(file.path())?))?;
    let inspector = BlockInspector::new(&catalog);

    let snapshot = inspector.read_block(table_id, 1)?;
    let rows = snapshot.tuples()?.collect::<Result<Vec<_>, ScanError>>()?;
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|r| r.block == 1));
    assert_eq!(rows[0].clone().into_values(), sample_row(4));
    assert_eq!(rows[5].clone().into_values(), sample_row(9));
    Ok(())
}

#[test]
fn test_block_errors() -> Result<()> {
    let table = sample_table();
    let file = write_relation(&[build_page(&table, &[sample_row(1)])?])?;

    let catalog = Catalog::new();
    let table_id = catalog.register_table(table, Arc::new(DiskManager::open(file.path())?))?;
    let inspector = BlockInspector::new(&catalog);

    assert!(matches!(inspector.read_block(table_id, -1), Err(ScanError::InvalidArgument(-1))));
    assert!(matches!(
        inspector.read_block(table_id, 1),
        Err(ScanError::OutOfRange { block: 1, block_count: 1 })
    ));
    assert!(matches!(inspector.read_block(table_id + 1, 0), Err(ScanError::TableNotFound(_))));
    Ok(())
}

#[test]
fn test_items_lists_every_line_pointer() -> Result<()> {
    let table = sample_table();
    let mut page = build_page(&table, &(1..=3).map(sample_row).collect::<Vec<_>>())?;
    PageManager::new().set_item_flags(&mut page, 2, ItemIdFlags::Dead, 0)?;
    let file = write_relation(&[page])?;
    let disk = DiskManager::open(file.path())?;

    let snapshot = BlockSnapshot::read(table, &disk, 0)?;
    let items = snapshot.items();
    let flags: Vec<_> = items.iter().map(|i| i.item.flags).collect();
    assert_eq!(flags, vec![ItemIdFlags::Normal, ItemIdFlags::Dead, ItemIdFlags::Normal]);
    assert_eq!(items[0].header.map(|h| h.xmin), Some(1000));
    assert!(items[1].header.is_none());
    assert_eq!(items[2].header.map(|h| h.natts()), Some(6));

    assert_eq!(snapshot.header().max_offset_number(), 3);
    assert_eq!(snapshot.tuples()?.count(), 2);
    Ok(())
}

#[test]
fn test_segmented_relation() -> Result<()> {
    let table = sample_table();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("16384");

    // First segment is full and sparse; the next block lives in "16384.1"
    let first = OpenOptions::new().create(true).write(true).truncate(true).open(&path)?;
    first.set_len(RELSEG_SIZE as u64 * PAGE_SIZE as u64)?;
    let mut second = OpenOptions::new().create(true).write(true).truncate(true).open(dir.path().join("16384.1"))?;
    second.write_all(&build_page(&table, &[sample_row(42)])?.data)?;
    second.flush()?;

    let disk = DiskManager::open(&path)?;
    assert_eq!(disk.block_count()?, RELSEG_SIZE + 1);
    let segments = disk.segment_files()?;
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[1].1, 1);

    let mut page = Page::new(0);
    disk.read_block(RELSEG_SIZE - 1, &mut page)?;
    assert!(page.is_new());

    let snapshot = BlockSnapshot::read(table.clone(), &disk, RELSEG_SIZE as i64)?;
    let rows = snapshot.tuples()?.collect::<Result<Vec<_>, ScanError>>()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].block, RELSEG_SIZE);
    assert_eq!(rows[0].value(0), Some(&DataValue::Integer(42)));

    // A never-initialized page scans to nothing
    let empty = BlockSnapshot::read(table, &disk, 0)?;
    assert_eq!(empty.tuples()?.count(), 0);
    Ok(())
}
