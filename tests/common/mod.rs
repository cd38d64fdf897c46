#![allow(dead_code)]

use std::io::Write;
use anyhow::Result;
use tempfile::NamedTempFile;
use heapinspect::catalog::{Column, DataType, Table};
use heapinspect::common::types::Page;
use heapinspect::common::value::DataValue;
use heapinspect::storage::page::PageManager;
use heapinspect::storage::tuple::TupleBuilder;

// Table covering fixed-width and varlena columns of every alignment
pub fn sample_table() -> Table {
    Table::new("accounts", vec![
        Column::new("id", DataType::Integer),
        Column::new("active", DataType::Boolean),
        Column::new("balance", DataType::BigInt),
        Column::new("owner", DataType::Text),
        Column::new("opened", DataType::Date),
        Column::new("rate", DataType::Double),
    ])
}

pub fn sample_row(id: i64) -> Vec<DataValue> {
    vec![
        DataValue::Integer(id),
        DataValue::Boolean(id % 2 == 0),
        DataValue::Integer(id * 1_000_000_007),
        DataValue::Text(format!("owner-{}", id)),
        DataValue::Date("2023-06-15".to_string()),
        DataValue::Float(id as f64 / 4.0),
    ]
}

// Build an initialized page holding one tuple per row
pub fn build_page(table: &Table, rows: &[Vec<DataValue>]) -> Result<Page> {
    let page_manager = PageManager::new();
    let mut page = Page::new(0);
    page_manager.init_page(&mut page);
    for (i, values) in rows.iter().enumerate() {
        let tuple = TupleBuilder::new(table).xmin(1000 + i as u32).build(values)?;
        page_manager.add_item(&mut page, &tuple)?;
    }
    Ok(page)
}

// Write page images back to back, as a relation data file
pub fn write_relation(pages: &[Page]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    for page in pages {
        file.write_all(&page.data)?;
    }
    file.flush()?;
    Ok(file)
}

pub fn write_schema(table: &Table) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(serde_json::to_string_pretty(table)?.as_bytes())?;
    file.flush()?;
    Ok(file)
}

// Generate test data of specified size
pub fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}
