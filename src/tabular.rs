use std::path::Path;

use crate::error::Result;
use crate::models::{ParsedRow, ParsedSheet};

/// Canonicalize a free-form header into the snake_case key the persistence
/// layer expects: lowercase, runs of non-alphanumerics collapse to a single
/// underscore, no leading/trailing underscores. Idempotent.
pub fn canonicalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for c in raw.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            for lc in c.to_lowercase() {
                out.push(lc);
            }
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Assemble a sheet from raw string cells. Row 0 is the header row.
/// Returns None when there are no data rows (header-only and empty sheets
/// are skipped silently, not reported as errors).
fn build_sheet(name: &str, raw_rows: Vec<Vec<String>>) -> Option<ParsedSheet> {
    if raw_rows.len() < 2 {
        return None;
    }
    let mut headers: Vec<String> = Vec::with_capacity(raw_rows[0].len());
    for cell in &raw_rows[0] {
        let mut key = canonicalize_header(cell);
        if key.is_empty() {
            key = format!("column_{}", headers.len() + 1);
        }
        // Duplicate headers get a numeric suffix so row keys stay unique.
        if headers.contains(&key) {
            let mut n = 2;
            while headers.contains(&format!("{key}_{n}")) {
                n += 1;
            }
            key = format!("{key}_{n}");
        }
        headers.push(key);
    }

    let mut rows = Vec::new();
    for raw in raw_rows.into_iter().skip(1) {
        let mut fields = Vec::with_capacity(headers.len());
        for (i, key) in headers.iter().enumerate() {
            let value = raw.get(i).map(|v| v.trim().to_string()).unwrap_or_default();
            fields.push((key.clone(), value));
        }
        let row = ParsedRow { fields };
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }
    if rows.is_empty() {
        return None;
    }
    Some(ParsedSheet {
        name: name.to_string(),
        headers,
        rows,
    })
}

/// Parse a delimited-text file into at most one sheet named after the file
/// stem. The csv reader handles quoted fields with embedded delimiters,
/// doubled-quote escaping and CRLF/LF line endings.
pub fn parse_delimited(file_path: &Path) -> Result<Vec<ParsedSheet>> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        raw_rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    let name = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sheet")
        .to_string();
    Ok(build_sheet(&name, raw_rows).into_iter().collect())
}

#[cfg(feature = "xlsx")]
pub fn excel_serial_to_date(serial: f64) -> String {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    let date = base + chrono::Duration::days(serial as i64);
    date.format("%Y-%m-%d").to_string()
}

/// Coerce a typed workbook cell to the all-strings row contract. Typed date
/// cells normalize to YYYY-MM-DD; everything else becomes a trimmed string.
#[cfg(feature = "xlsx")]
fn cell_to_string(cell: &calamine::Data) -> String {
    use calamine::Data;
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()),
        Data::DateTimeIso(s) => s.trim().to_string(),
        Data::DurationIso(s) => s.trim().to_string(),
        Data::Empty | Data::Error(_) => String::new(),
    }
}

/// Parse every sheet of a workbook. Sheets without data rows are skipped.
#[cfg(feature = "xlsx")]
pub fn parse_workbook(file_path: &Path) -> Result<Vec<ParsedSheet>> {
    use calamine::Reader;

    use crate::error::SitebooksError;

    let mut workbook = calamine::open_workbook_auto(file_path)
        .map_err(|e| SitebooksError::Workbook(e.to_string()))?;

    let mut sheets = Vec::new();
    let names: Vec<String> = workbook.sheet_names().to_owned();
    for sheet_name in names {
        let Ok(range) = workbook.worksheet_range(&sheet_name) else {
            continue;
        };
        let raw_rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        if let Some(sheet) = build_sheet(&sheet_name, raw_rows) {
            sheets.push(sheet);
        }
    }
    Ok(sheets)
}
