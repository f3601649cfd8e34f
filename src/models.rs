use crate::resolver::EntityType;

/// One data row: ordered (canonical key, string value) pairs.
/// Keys are unique within a row and match the owning sheet's headers exactly.
#[derive(Debug, Clone, Default)]
pub struct ParsedRow {
    pub fields: Vec<(String, String)>,
}

impl ParsedRow {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// One sheet (workbook tab or delimited file) after header canonicalization.
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

/// One resolved (entity, rows) unit handed to the bulk importer.
#[derive(Debug, Clone)]
pub struct ImportJob {
    pub entity: EntityType,
    pub sheet: ParsedSheet,
}

/// Row-level failure: `row` is 1-based over data rows (header excluded).
#[derive(Debug, Clone)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ImportResult {
    pub success_count: usize,
    pub errors: Vec<RowError>,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct LedgerAccount {
    pub id: i64,
    pub number: String,
    pub name: String,
    pub account_type: String,
    pub parent_id: Option<i64>,
    pub is_active: bool,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct BankAccount {
    pub id: i64,
    pub name: String,
    pub bank_name: Option<String>,
    pub last_four: Option<String>,
    pub gl_account_id: Option<i64>,
    pub opening_balance: f64,
}
