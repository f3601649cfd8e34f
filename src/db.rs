use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS ledger_accounts (
    id INTEGER PRIMARY KEY,
    number TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    account_type TEXT NOT NULL,
    parent_id INTEGER,
    is_active INTEGER DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (parent_id) REFERENCES ledger_accounts(id)
);

CREATE TABLE IF NOT EXISTS bank_accounts (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    bank_name TEXT,
    last_four TEXT,
    gl_account_id INTEGER,
    opening_balance REAL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (gl_account_id) REFERENCES ledger_accounts(id)
);

CREATE TABLE IF NOT EXISTS properties (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    address TEXT,
    city TEXT,
    state TEXT,
    property_type TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    property_id INTEGER,
    status TEXT DEFAULT 'active',
    start_date TEXT,
    budget REAL,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (property_id) REFERENCES properties(id)
);

CREATE TABLE IF NOT EXISTS vendors (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    trade TEXT,
    email TEXT,
    phone TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS customers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    email TEXT,
    phone TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    role TEXT,
    hire_date TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS equipment (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    category TEXT,
    purchase_date TEXT,
    cost REAL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS invoices (
    id INTEGER PRIMARY KEY,
    invoice_number TEXT NOT NULL UNIQUE,
    customer_id INTEGER NOT NULL,
    project_id INTEGER,
    invoice_date TEXT,
    amount REAL NOT NULL,
    status TEXT DEFAULT 'open',
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (customer_id) REFERENCES customers(id),
    FOREIGN KEY (project_id) REFERENCES projects(id)
);

CREATE TABLE IF NOT EXISTS bills (
    id INTEGER PRIMARY KEY,
    bill_number TEXT NOT NULL UNIQUE,
    vendor_id INTEGER NOT NULL,
    project_id INTEGER,
    bill_date TEXT,
    amount REAL NOT NULL,
    status TEXT DEFAULT 'open',
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (vendor_id) REFERENCES vendors(id),
    FOREIGN KEY (project_id) REFERENCES projects(id)
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    due_date TEXT,
    status TEXT DEFAULT 'open',
    created_at TEXT DEFAULT (datetime('now')),
    UNIQUE (project_id, title),
    FOREIGN KEY (project_id) REFERENCES projects(id)
);

CREATE TABLE IF NOT EXISTS journal_entries (
    id INTEGER PRIMARY KEY,
    entry_date TEXT NOT NULL,
    memo TEXT,
    reference TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS journal_lines (
    id INTEGER PRIMARY KEY,
    entry_id INTEGER NOT NULL,
    account_id INTEGER NOT NULL,
    debit REAL DEFAULT 0,
    credit REAL DEFAULT 0,
    FOREIGN KEY (entry_id) REFERENCES journal_entries(id),
    FOREIGN KEY (account_id) REFERENCES ledger_accounts(id)
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    sheet_count INTEGER,
    record_count INTEGER,
    checksum TEXT
);
";

// (number, name, account_type)
// 1040-1099 is left open: that band is reserved for auto-generated bank
// sub-accounts (see gl.rs).
const DEFAULT_ACCOUNTS: &[(&str, &str, &str)] = &[
    ("1000", "Cash & Bank", "asset"),
    ("1100", "Accounts Receivable", "asset"),
    ("1200", "Retainage Receivable", "asset"),
    ("1300", "Construction in Progress", "asset"),
    ("1500", "Equipment", "asset"),
    ("2000", "Accounts Payable", "liability"),
    ("2100", "Retainage Payable", "liability"),
    ("3000", "Owner's Equity", "equity"),
    ("3900", "Opening Balance Equity", "equity"),
    ("4000", "Contract Revenue", "income"),
    ("4100", "Property Management Fees", "income"),
    ("5000", "Materials", "expense"),
    ("5100", "Subcontractor Costs", "expense"),
    ("5200", "Equipment Rental", "expense"),
    ("6000", "Insurance", "expense"),
    ("6100", "Office & Administrative", "expense"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM ledger_accounts", [], |row| row.get(0))?;
    if count == 0 {
        for (number, name, account_type) in DEFAULT_ACCOUNTS {
            conn.execute(
                "INSERT INTO ledger_accounts (number, name, account_type) VALUES (?1, ?2, ?3)",
                rusqlite::params![number, name, account_type],
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &[
            "ledger_accounts",
            "bank_accounts",
            "properties",
            "projects",
            "vendors",
            "customers",
            "invoices",
            "bills",
            "journal_entries",
            "journal_lines",
            "imports",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT count(*) FROM ledger_accounts", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, DEFAULT_ACCOUNTS.len() as i64);
    }

    #[test]
    fn test_seed_includes_linkage_anchors() {
        let (_dir, conn) = test_db();
        for number in &["1000", "3900"] {
            let exists: bool = conn
                .prepare("SELECT 1 FROM ledger_accounts WHERE number = ?1")
                .unwrap()
                .exists([number])
                .unwrap();
            assert!(exists, "missing seeded account {number}");
        }
    }

    #[test]
    fn test_reserved_band_starts_empty() {
        let (_dir, conn) = test_db();
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM ledger_accounts WHERE CAST(number AS INTEGER) BETWEEN 1040 AND 1099",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 0);
    }
}
