use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::db_path;

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt = conn.prepare(
        "SELECT number, name, account_type, is_active FROM ledger_accounts ORDER BY CAST(number AS INTEGER)",
    )?;
    let rows: Vec<(String, String, String, bool)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["Number", "Name", "Type", "Active"]);
    for (number, name, account_type, is_active) in rows {
        table.add_row(vec![
            Cell::new(number),
            Cell::new(name),
            Cell::new(account_type),
            Cell::new(if is_active { "yes" } else { "no" }),
        ]);
    }
    println!("Chart of Accounts\n{table}");
    Ok(())
}

pub fn banks() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt = conn.prepare(
        "SELECT b.name, b.bank_name, b.last_four, b.opening_balance, a.number \
         FROM bank_accounts b LEFT JOIN ledger_accounts a ON a.id = b.gl_account_id \
         ORDER BY b.name",
    )?;
    let rows: Vec<(String, Option<String>, Option<String>, f64, Option<String>)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["Name", "Bank", "Last Four", "Opening Balance", "GL Account"]);
    for (name, bank, last_four, opening, gl_number) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(bank.unwrap_or_default()),
            Cell::new(last_four.unwrap_or_default()),
            Cell::new(money(opening)),
            Cell::new(gl_number.unwrap_or_else(|| "(unlinked)".to_string())),
        ]);
    }
    println!("Bank Accounts\n{table}");
    Ok(())
}
