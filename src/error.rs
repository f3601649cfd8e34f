use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitebooksError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("Unknown bank account id: {0}")]
    UnknownBankAccount(i64),

    #[error("Missing ledger account number {0} (run `sitebooks init` to seed the chart)")]
    MissingLedgerAccount(String),

    #[error("Unknown entity type: {0} (try `sitebooks template` for the full list)")]
    UnknownEntity(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, SitebooksError>;
