use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::settings::{db_path, load_settings};

const COUNTED_TABLES: &[(&str, &str)] = &[
    ("ledger_accounts", "Ledger accounts"),
    ("bank_accounts", "Bank accounts"),
    ("properties", "Properties"),
    ("projects", "Projects"),
    ("vendors", "Vendors"),
    ("customers", "Customers"),
    ("invoices", "Invoices"),
    ("bills", "Bills"),
    ("journal_entries", "Journal entries"),
    ("imports", "Imports"),
];

pub fn run() -> Result<()> {
    let settings = load_settings();
    let path = db_path();
    if !path.exists() {
        println!("No database found at {} — run `sitebooks init` first.", path.display());
        return Ok(());
    }
    let conn = get_connection(&path)?;

    if !settings.company_name.is_empty() {
        println!("{}", settings.company_name.bold());
    }
    println!("Database: {}", path.display());

    let mut table = Table::new();
    table.set_header(vec!["Records", "Count"]);
    for (table_name, label) in COUNTED_TABLES {
        let count: i64 =
            conn.query_row(&format!("SELECT count(*) FROM {table_name}"), [], |r| r.get(0))?;
        table.add_row(vec![Cell::new(label), Cell::new(count)]);
    }
    println!("{table}");

    let unlinked: i64 = conn.query_row(
        "SELECT count(*) FROM bank_accounts WHERE gl_account_id IS NULL",
        [],
        |r| r.get(0),
    )?;
    if unlinked > 0 {
        println!(
            "{}",
            format!("{unlinked} bank account(s) without a ledger link — run `sitebooks backfill-gl`.")
                .yellow()
        );
    }
    Ok(())
}
