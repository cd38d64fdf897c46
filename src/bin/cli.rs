use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Map, Value};

use heapinspect::catalog::{Catalog, Table};
use heapinspect::common::value::DataValue;
use heapinspect::scan::{BlockInspector, BlockSnapshot, Row};
use heapinspect::storage::disk::{BlockSource, DiskManager};

#[derive(Parser)]
#[command(author, version, about = "heapinspect - read tuples straight from heap relation files")]
struct Cli {
    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode the tuples of one block
    Scan {
        /// Relation data file (first segment)
        #[arg(short, long)]
        relation: PathBuf,

        /// Table definition as JSON
        #[arg(short, long)]
        schema: PathBuf,

        /// Block number to read
        #[arg(short, long, allow_negative_numbers = true)]
        block: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Table id to register the schema under
        #[arg(long, default_value_t = 0)]
        table_id: u32,
    },

    /// List the line pointers of one block
    Items {
        #[arg(short, long)]
        relation: PathBuf,

        #[arg(short, long, allow_negative_numbers = true)]
        block: i64,
    },

    /// Show the page header of one block
    Header {
        #[arg(short, long)]
        relation: PathBuf,

        #[arg(short, long, allow_negative_numbers = true)]
        block: i64,
    },

    /// Show relation size and segment files
    Info {
        #[arg(short, long)]
        relation: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

fn open_relation(path: &Path) -> Result<DiskManager> {
    DiskManager::open(path).with_context(|| format!("cannot open relation file {}", path.display()))
}

// Snapshot of a block when no column layout is needed
fn read_raw_block(path: &Path, block: i64) -> Result<BlockSnapshot> {
    let disk = open_relation(path)?;
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    Ok(BlockSnapshot::read(Table::new(name, Vec::new()), &disk, block)?)
}

fn run_scan(relation: &Path, schema: &Path, block: i64, format: Format, table_id: u32) -> Result<()> {
    let table = Table::from_json_file(schema)
        .with_context(|| format!("cannot load schema {}", schema.display()))?
        .with_id(table_id);

    let catalog = Catalog::new();
    let table_id = catalog.register_table(table, Arc::new(open_relation(relation)?))?;
    let snapshot = BlockInspector::new(&catalog).read_block(table_id, block)?;

    let mut rows = Vec::new();
    let mut failure = None;
    for result in snapshot.tuples()? {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => failure = Some(e),
        }
    }

    match format {
        Format::Table => display_rows(snapshot.table(), &rows),
        Format::Json => {
            for row in &rows {
                println!("{}", row_to_json(snapshot.table(), row));
            }
        }
    }

    // Rows before a corrupted slot are printed, then the scan fails
    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn value_to_json(value: &DataValue) -> Value {
    match value {
        DataValue::Null => Value::Null,
        DataValue::Integer(i) => json!(i),
        DataValue::Float(f) => json!(f),
        DataValue::Boolean(b) => json!(b),
        DataValue::Text(s) | DataValue::Date(s) | DataValue::Timestamp(s) => json!(s),
        DataValue::Blob(_) => json!(value.to_string()),
    }
}

fn row_to_json(table: &Table, row: &Row) -> Value {
    let mut values = Map::new();
    for (column, value) in table.columns().iter().zip(row.values()) {
        if column.is_dropped() {
            continue;
        }
        let value = match value {
            Ok(v) => value_to_json(v),
            Err(e) => json!({ "error": e.to_string() }),
        };
        values.insert(column.name().to_string(), value);
    }
    json!({
        "block": row.block,
        "lp": row.offset,
        "xmin": row.meta.xmin,
        "xmax": row.meta.xmax,
        "ctid": row.meta.ctid.to_string(),
        "values": values,
    })
}

fn display_rows(table: &Table, rows: &[Row]) {
    let mut headers = vec!["lp".to_string(), "xmin".to_string(), "xmax".to_string()];
    headers.extend(table.visible_column_names());

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut line = vec![row.offset.to_string(), row.meta.xmin.to_string(), row.meta.xmax.to_string()];
            for (column, value) in table.columns().iter().zip(row.values()) {
                if column.is_dropped() {
                    continue;
                }
                line.push(match value {
                    Ok(v) => v.to_string(),
                    Err(e) => format!("<error: {}>", e),
                });
            }
            line
        })
        .collect();

    print_table(&headers, &cells);
    println!("({} row{})", rows.len(), if rows.len() == 1 { "" } else { "s" });
}

fn print_table(headers: &[String], cells: &[Vec<String>]) {
    // Minimum width of 3 characters per column
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len().max(3)).collect();
    for line in cells {
        for (i, cell) in line.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    print!("|");
    for (header, width) in headers.iter().zip(&widths) {
        print!(" {:<width$} |", header, width = width);
    }
    println!();

    print!("+");
    for width in &widths {
        print!("{:-<width$}+", "", width = width + 2);
    }
    println!();

    for line in cells {
        print!("|");
        for (cell, width) in line.iter().zip(&widths) {
            print!(" {:<width$} |", cell, width = width);
        }
        println!();
    }
}

fn run_items(relation: &Path, block: i64) -> Result<()> {
    let snapshot = read_raw_block(relation, block)?;
    let headers: Vec<String> = ["lp", "lp_off", "lp_flags", "lp_len", "t_xmin", "t_xmax", "t_ctid", "natts", "t_hoff", "flags"]
        .iter()
        .map(|h| h.to_string())
        .collect();

    let cells: Vec<Vec<String>> = snapshot
        .items()
        .iter()
        .map(|info| {
            let mut line = vec![
                info.offset.to_string(),
                info.item.offset.to_string(),
                info.item.flags.as_str().to_string(),
                info.item.length.to_string(),
            ];
            match &info.header {
                Some(h) => line.extend([
                    h.xmin.to_string(),
                    h.xmax.to_string(),
                    h.ctid.to_string(),
                    h.natts().to_string(),
                    h.hoff.to_string(),
                    h.flag_names().join(","),
                ]),
                None => line.extend(std::iter::repeat_n(String::new(), 6)),
            }
            line
        })
        .collect();

    print_table(&headers, &cells);
    Ok(())
}

fn run_header(relation: &Path, block: i64) -> Result<()> {
    let snapshot = read_raw_block(relation, block)?;
    let header = snapshot.header();
    println!("block:            {}", snapshot.block());
    println!("lsn:              {}", header.lsn_string());
    println!("checksum:         {}", header.checksum);
    println!("flags:            {:#06x}", header.flags);
    println!("lower:            {}", header.lower);
    println!("upper:            {}", header.upper);
    println!("special:          {}", header.special);
    println!("pagesize:         {}", header.page_size());
    println!("version:          {}", header.layout_version());
    println!("prune_xid:        {}", header.prune_xid);
    println!("line pointers:    {}", header.max_offset_number());
    println!("free space:       {}", header.free_space());
    Ok(())
}

fn run_info(relation: &Path) -> Result<()> {
    let disk = open_relation(relation)?;
    println!("Relation: {}", disk.path().display());
    println!("Blocks:   {}", disk.block_count()?);
    for (path, blocks) in disk.segment_files()? {
        println!("  {} ({} blocks)", path.display(), blocks);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { relation, schema, block, format, table_id } => run_scan(&relation, &schema, block, format, table_id),
        Commands::Items { relation, block } => run_items(&relation, block),
        Commands::Header { relation, block } => run_header(&relation, block),
        Commands::Info { relation } => run_info(&relation),
    }
}
