use anyhow::Result;
use std::process::Command;

#[path = "../common/mod.rs"]
mod common;

use common::{build_page, sample_row, sample_table, write_relation, write_schema};

fn heapinspect() -> Command {
    Command::new(env!("CARGO_BIN_EXE_heapinspect"))
}

#[test]
fn test_cli_scan_table_output() -> Result<()> {
    let table = sample_table();
    let relation = write_relation(&[build_page(&table, &(1..=3).map(sample_row).collect::<Vec<_>>())?])?;
    let schema = write_schema(&table)?;

    let output = heapinspect()
        .arg("scan")
        .arg("--relation")
        .arg(relation.path())
        .arg("--schema")
        .arg(schema.path())
        .args(["--block", "0"])
        .output()?;

    let stdout = String::from_utf8(output.stdout)?;
    assert!(output.status.success(), "scan failed: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("owner"));
    assert!(stdout.contains("owner-2"));
    assert!(stdout.contains("2023-06-15"));
    assert!(stdout.contains("(3 rows)"));
    Ok(())
}

#[test]
fn test_cli_scan_json_output() -> Result<()> {
    let table = sample_table();
    let relation = write_relation(&[build_page(&table, &[sample_row(8)])?])?;
    let schema = write_schema(&table)?;

    let output = heapinspect()
        .arg("scan")
        .arg("--relation")
        .arg(relation.path())
        .arg("--schema")
        .arg(schema.path())
        .args(["--block", "0", "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let row: serde_json::Value = serde_json::from_str(stdout.lines().next().unwrap_or_default())?;
    assert_eq!(row["lp"], 1);
    assert_eq!(row["values"]["id"], 8);
    assert_eq!(row["values"]["active"], true);
    assert_eq!(row["values"]["owner"], "owner-8");
    assert_eq!(row["values"]["rate"], 2.0);
    Ok(())
}

#[test]
fn test_cli_block_out_of_range() -> Result<()> {
    let table = sample_table();
    let relation = write_relation(&[build_page(&table, &[sample_row(1)])?])?;
    let schema = write_schema(&table)?;

    for block in ["1", "-1"] {
        let output = heapinspect()
            .arg("scan")
            .arg("--relation")
            .arg(relation.path())
            .arg("--schema")
            .arg(schema.path())
            .args(["--block", block])
            .output()?;
        assert!(!output.status.success());
        let stderr = String::from_utf8(output.stderr)?;
        assert!(stderr.contains("block number"), "unexpected error: {}", stderr);
    }
    Ok(())
}

#[test]
fn test_cli_items_header_info() -> Result<()> {
    let table = sample_table();
    let relation = write_relation(&[
        build_page(&table, &[sample_row(1)])?,
        build_page(&table, &(1..=2).map(sample_row).collect::<Vec<_>>())?,
    ])?;

    let output = heapinspect().arg("items").arg("--relation").arg(relation.path()).args(["--block", "1"]).output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("lp_flags"));
    assert_eq!(stdout.matches("normal").count(), 2);

    let output = heapinspect().arg("header").arg("--relation").arg(relation.path()).args(["--block", "0"]).output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("pagesize:         8192"));
    assert!(stdout.contains("line pointers:    1"));

    let output = heapinspect().arg("info").arg("--relation").arg(relation.path()).output()?;
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)?.contains("Blocks:   2"));
    Ok(())
}
