use std::path::PathBuf;

use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::count;
use crate::pipeline::{plan_import, run_import};
use crate::settings::db_path;

pub fn run(file: &str, dry_run: bool) -> Result<()> {
    let file_path = PathBuf::from(file);
    if dry_run {
        let plan = plan_import(&file_path)?;
        for (entity, rows) in &plan.planned {
            println!("Would import {}: {}", entity.name(), count(*rows, "row"));
        }
        if !plan.skipped_sheets.is_empty() {
            println!(
                "{} would be skipped (unrecognized): {}",
                count(plan.skipped_sheets.len(), "sheet"),
                plan.skipped_sheets.join(", ")
            );
        }
        if plan.planned.is_empty() {
            println!("Nothing to import.");
        }
        return Ok(());
    }

    let conn = get_connection(&db_path())?;

    let report = run_import(&conn, &file_path)?;

    if report.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    for (entity, result) in &report.outcomes {
        let summary = format!(
            "{}: {} imported, {}",
            entity.name(),
            result.success_count,
            count(result.errors.len(), "error"),
        );
        if result.errors.is_empty() {
            println!("{summary}");
        } else {
            println!("{}", summary.yellow());
            for err in &result.errors {
                println!("  {} row {}: {}", "!".red(), err.row, err.message);
            }
        }
    }

    if !report.skipped_sheets.is_empty() {
        println!(
            "{} not imported (unrecognized): {}",
            count(report.skipped_sheets.len(), "sheet"),
            report.skipped_sheets.join(", ")
        );
    }

    println!(
        "Done: {} imported, {} failed",
        report.total_imported(),
        report.total_failed()
    );
    Ok(())
}
