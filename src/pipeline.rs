use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::{Result, SitebooksError};
use crate::importer;
use crate::models::{ImportJob, ImportResult, ParsedSheet};
use crate::resolver::{self, EntityType};
use crate::sequencer;
use crate::tabular;

pub struct PipelineReport {
    pub outcomes: Vec<(EntityType, ImportResult)>,
    pub skipped_sheets: Vec<String>,
    pub duplicate_file: bool,
}

impl PipelineReport {
    pub fn total_imported(&self) -> usize {
        self.outcomes.iter().map(|(_, r)| r.success_count).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.outcomes.iter().map(|(_, r)| r.errors.len()).sum()
    }
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

/// Dispatch on extension: workbook formats via calamine, delimited text via
/// the csv reader.
fn parse_file(file_path: &Path) -> Result<Vec<ParsedSheet>> {
    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        #[cfg(feature = "xlsx")]
        "xlsx" | "xls" | "xlsm" | "ods" => tabular::parse_workbook(file_path),
        #[cfg(not(feature = "xlsx"))]
        "xlsx" | "xls" | "xlsm" | "ods" => Err(SitebooksError::UnsupportedFile(
            "workbook support not compiled in (enable the xlsx feature)".to_string(),
        )),
        "csv" | "txt" => tabular::parse_delimited(file_path),
        _ => Err(SitebooksError::UnsupportedFile(
            file_path.display().to_string(),
        )),
    }
}

/// Resolve sheet labels and put the surviving jobs in dependency order.
/// Unresolved sheets are excluded, not errors.
fn resolve_jobs(sheets: Vec<ParsedSheet>) -> (Vec<ImportJob>, Vec<String>) {
    let mut jobs = Vec::new();
    let mut skipped = Vec::new();
    for sheet in sheets {
        match resolver::resolve(&sheet.name) {
            Some(entity) => jobs.push(ImportJob { entity, sheet }),
            None => skipped.push(sheet.name),
        }
    }
    (sequencer::sequence(jobs), skipped)
}

/// Resolve, order and import a batch of sheets. Jobs run serially in
/// dependency order.
pub fn import_sheets(
    conn: &Connection,
    sheets: Vec<ParsedSheet>,
) -> Result<(Vec<(EntityType, ImportResult)>, Vec<String>)> {
    let (jobs, skipped) = resolve_jobs(sheets);
    let mut outcomes = Vec::with_capacity(jobs.len());
    for job in &jobs {
        let result = importer::import_job(conn, job)?;
        outcomes.push((job.entity, result));
    }
    Ok((outcomes, skipped))
}

pub struct ImportPlan {
    pub planned: Vec<(EntityType, usize)>,
    pub skipped_sheets: Vec<String>,
}

/// Dry run: parse, resolve and sequence without touching the store.
/// Reports what `run_import` would import, as (entity, row count) in
/// execution order.
pub fn plan_import(file_path: &Path) -> Result<ImportPlan> {
    let sheets = parse_file(file_path)?;
    let (jobs, skipped_sheets) = resolve_jobs(sheets);
    Ok(ImportPlan {
        planned: jobs
            .iter()
            .map(|job| (job.entity, job.sheet.rows.len()))
            .collect(),
        skipped_sheets,
    })
}

/// Full pipeline for one uploaded file: parse, resolve, sequence, import,
/// and record the import in the audit log. A byte-identical re-upload is
/// detected by checksum and skipped.
pub fn run_import(conn: &Connection, file_path: &Path) -> Result<PipelineReport> {
    let checksum = compute_checksum(file_path)?;
    let seen = conn
        .prepare("SELECT 1 FROM imports WHERE checksum = ?1")?
        .exists([&checksum])?;
    if seen {
        return Ok(PipelineReport {
            outcomes: Vec::new(),
            skipped_sheets: Vec::new(),
            duplicate_file: true,
        });
    }

    let sheets = parse_file(file_path)?;
    let (outcomes, skipped_sheets) = import_sheets(conn, sheets)?;

    let report = PipelineReport {
        outcomes,
        skipped_sheets,
        duplicate_file: false,
    };
    conn.execute(
        "INSERT INTO imports (filename, sheet_count, record_count, checksum) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            report.outcomes.len() as i64,
            report.total_imported() as i64,
            checksum,
        ],
    )?;
    Ok(report)
}
