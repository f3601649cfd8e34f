use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;
use crate::gl;
use crate::models::{ImportJob, ImportResult, ParsedRow, RowError};
use crate::resolver::EntityType;

// ---------------------------------------------------------------------------
// Field helpers — all failures are row-level strings, never batch aborts
// ---------------------------------------------------------------------------

type RowResult<T> = std::result::Result<T, String>;

fn require<'a>(row: &'a ParsedRow, key: &str) -> RowResult<&'a str> {
    match row.get(key).map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("missing required field '{key}'")),
    }
}

fn optional(row: &ParsedRow, key: &str) -> Option<String> {
    row.get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

pub fn parse_number(key: &str, raw: &str) -> RowResult<f64> {
    let s = raw.replace(',', "").replace('$', "");
    let s = s.trim();
    let (s, negative) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => (inner.trim(), true),
        None => (s, false),
    };
    let value: f64 = s
        .parse()
        .map_err(|_| format!("field '{key}': '{raw}' is not a number"))?;
    Ok(if negative { -value } else { value })
}

pub fn parse_date(key: &str, raw: &str) -> RowResult<String> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"] {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, fmt) {
            return Ok(date.format("%Y-%m-%d").to_string());
        }
    }
    Err(format!("field '{key}': '{raw}' is not a date"))
}

pub fn parse_bool(key: &str, raw: &str) -> RowResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(format!("field '{key}': '{raw}' is not a boolean")),
    }
}

fn opt_number(row: &ParsedRow, key: &str) -> RowResult<Option<f64>> {
    optional(row, key).map(|v| parse_number(key, &v)).transpose()
}

fn opt_date(row: &ParsedRow, key: &str) -> RowResult<Option<String>> {
    optional(row, key).map(|v| parse_date(key, &v)).transpose()
}

fn db_err(e: rusqlite::Error) -> String {
    e.to_string()
}

/// First present column wins; later candidates are not even parsed, so a
/// junk value in an unused legacy column cannot sink the row.
fn opt_date_any(row: &ParsedRow, keys: &[&str]) -> RowResult<Option<String>> {
    for key in keys {
        if optional(row, key).is_some() {
            return opt_date(row, key);
        }
    }
    Ok(None)
}

/// Look up a referenced entity by its natural key. A miss reads as "the
/// dependency sheet was not imported first" to the end user.
fn foreign_id(conn: &Connection, sql: &str, key_value: &str, what: &str) -> RowResult<i64> {
    conn.query_row(sql, [key_value], |row| row.get(0))
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| format!("unknown {what} '{key_value}' (import {what}s first)"))
}

// ---------------------------------------------------------------------------
// Per-entity row handlers — insert-or-update on the entity's natural key
// ---------------------------------------------------------------------------

fn default_account_type(number: &str) -> &'static str {
    match number.chars().next() {
        Some('1') => "asset",
        Some('2') => "liability",
        Some('3') => "equity",
        Some('4') => "income",
        _ => "expense",
    }
}

fn import_ledger_account(conn: &Connection, row: &ParsedRow) -> RowResult<()> {
    let number = require(row, "account_number").or_else(|_| require(row, "number"))?;
    let name = require(row, "name")?;
    let account_type = optional(row, "account_type")
        .or_else(|| optional(row, "type"))
        .unwrap_or_else(|| default_account_type(number).to_string());
    let is_active = match optional(row, "is_active") {
        Some(v) => parse_bool("is_active", &v)?,
        None => true,
    };
    conn.execute(
        "INSERT INTO ledger_accounts (number, name, account_type, is_active) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(number) DO UPDATE SET name = ?2, account_type = ?3, is_active = ?4",
        rusqlite::params![number, name, account_type, is_active],
    )
    .map_err(db_err)?;
    Ok(())
}

fn import_bank_account(conn: &Connection, row: &ParsedRow) -> RowResult<()> {
    let name = require(row, "name")?;
    let bank_name = optional(row, "bank_name").or_else(|| optional(row, "bank"));
    // The distinguishing suffix: explicit column, or last 4 of a full number.
    let last_four = optional(row, "last_four").or_else(|| {
        optional(row, "account_number").map(|n| {
            let digits: Vec<char> = n.chars().filter(|c| c.is_ascii_digit()).collect();
            digits[digits.len().saturating_sub(4)..].iter().collect()
        })
    });
    let opening_balance = opt_number(row, "opening_balance")?.unwrap_or(0.0);

    conn.execute(
        "INSERT INTO bank_accounts (name, bank_name, last_four, opening_balance) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(name) DO UPDATE SET bank_name = ?2, last_four = ?3, opening_balance = ?4",
        rusqlite::params![name, bank_name, last_four, opening_balance],
    )
    .map_err(db_err)?;

    let bank_id: i64 = conn
        .query_row("SELECT id FROM bank_accounts WHERE name = ?1", [name], |r| r.get(0))
        .map_err(db_err)?;
    gl::ensure_link(conn, bank_id, Some(opening_balance)).map_err(|e| e.to_string())?;
    Ok(())
}

fn import_property(conn: &Connection, row: &ParsedRow) -> RowResult<()> {
    let name = require(row, "name")?;
    conn.execute(
        "INSERT INTO properties (name, address, city, state, property_type) VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(name) DO UPDATE SET address = ?2, city = ?3, state = ?4, property_type = ?5",
        rusqlite::params![
            name,
            optional(row, "address"),
            optional(row, "city"),
            optional(row, "state"),
            optional(row, "property_type").or_else(|| optional(row, "type")),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

fn import_project(conn: &Connection, row: &ParsedRow) -> RowResult<()> {
    let code = require(row, "code").or_else(|_| require(row, "project_code"))?;
    let name = require(row, "name")?;
    let property_id = match optional(row, "property") {
        Some(p) => Some(foreign_id(
            conn,
            "SELECT id FROM properties WHERE name = ?1",
            &p,
            "property",
        )?),
        None => None,
    };
    conn.execute(
        "INSERT INTO projects (code, name, property_id, status, start_date, budget) VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         ON CONFLICT(code) DO UPDATE SET name = ?2, property_id = ?3, status = ?4, start_date = ?5, budget = ?6",
        rusqlite::params![
            code,
            name,
            property_id,
            optional(row, "status").unwrap_or_else(|| "active".to_string()),
            opt_date(row, "start_date")?,
            opt_number(row, "budget")?,
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

fn import_vendor(conn: &Connection, row: &ParsedRow) -> RowResult<()> {
    let name = require(row, "name")?;
    conn.execute(
        "INSERT INTO vendors (name, trade, email, phone) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(name) DO UPDATE SET trade = ?2, email = ?3, phone = ?4",
        rusqlite::params![
            name,
            optional(row, "trade"),
            optional(row, "email"),
            optional(row, "phone"),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

fn import_customer(conn: &Connection, row: &ParsedRow) -> RowResult<()> {
    let name = require(row, "name")?;
    conn.execute(
        "INSERT INTO customers (name, email, phone) VALUES (?1, ?2, ?3) \
         ON CONFLICT(name) DO UPDATE SET email = ?2, phone = ?3",
        rusqlite::params![name, optional(row, "email"), optional(row, "phone")],
    )
    .map_err(db_err)?;
    Ok(())
}

fn import_employee(conn: &Connection, row: &ParsedRow) -> RowResult<()> {
    let name = require(row, "name")?;
    conn.execute(
        "INSERT INTO employees (name, role, hire_date) VALUES (?1, ?2, ?3) \
         ON CONFLICT(name) DO UPDATE SET role = ?2, hire_date = ?3",
        rusqlite::params![name, optional(row, "role"), opt_date(row, "hire_date")?],
    )
    .map_err(db_err)?;
    Ok(())
}

fn import_equipment(conn: &Connection, row: &ParsedRow) -> RowResult<()> {
    let name = require(row, "name")?;
    conn.execute(
        "INSERT INTO equipment (name, category, purchase_date, cost) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(name) DO UPDATE SET category = ?2, purchase_date = ?3, cost = ?4",
        rusqlite::params![
            name,
            optional(row, "category"),
            opt_date(row, "purchase_date")?,
            opt_number(row, "cost")?,
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

fn import_invoice(conn: &Connection, row: &ParsedRow) -> RowResult<()> {
    let number = require(row, "invoice_number").or_else(|_| require(row, "number"))?;
    let customer = require(row, "customer")?;
    let amount = parse_number("amount", require(row, "amount")?)?;
    let customer_id = foreign_id(
        conn,
        "SELECT id FROM customers WHERE name = ?1",
        customer,
        "customer",
    )?;
    let project_id = match optional(row, "project") {
        Some(code) => Some(foreign_id(
            conn,
            "SELECT id FROM projects WHERE code = ?1",
            &code,
            "project",
        )?),
        None => None,
    };
    conn.execute(
        "INSERT INTO invoices (invoice_number, customer_id, project_id, invoice_date, amount, status) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         ON CONFLICT(invoice_number) DO UPDATE SET customer_id = ?2, project_id = ?3, invoice_date = ?4, amount = ?5, status = ?6",
        rusqlite::params![
            number,
            customer_id,
            project_id,
            opt_date_any(row, &["invoice_date", "date"])?,
            amount,
            optional(row, "status").unwrap_or_else(|| "open".to_string()),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

fn import_bill(conn: &Connection, row: &ParsedRow) -> RowResult<()> {
    let number = require(row, "bill_number").or_else(|_| require(row, "number"))?;
    let vendor = require(row, "vendor")?;
    let amount = parse_number("amount", require(row, "amount")?)?;
    let vendor_id = foreign_id(conn, "SELECT id FROM vendors WHERE name = ?1", vendor, "vendor")?;
    let project_id = match optional(row, "project") {
        Some(code) => Some(foreign_id(
            conn,
            "SELECT id FROM projects WHERE code = ?1",
            &code,
            "project",
        )?),
        None => None,
    };
    conn.execute(
        "INSERT INTO bills (bill_number, vendor_id, project_id, bill_date, amount, status) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         ON CONFLICT(bill_number) DO UPDATE SET vendor_id = ?2, project_id = ?3, bill_date = ?4, amount = ?5, status = ?6",
        rusqlite::params![
            number,
            vendor_id,
            project_id,
            opt_date_any(row, &["bill_date", "date"])?,
            amount,
            optional(row, "status").unwrap_or_else(|| "open".to_string()),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

fn import_task(conn: &Connection, row: &ParsedRow) -> RowResult<()> {
    let project = require(row, "project")?;
    let title = require(row, "title").or_else(|_| require(row, "name"))?;
    let project_id = foreign_id(conn, "SELECT id FROM projects WHERE code = ?1", project, "project")?;
    conn.execute(
        "INSERT INTO tasks (project_id, title, due_date, status) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(project_id, title) DO UPDATE SET due_date = ?3, status = ?4",
        rusqlite::params![
            project_id,
            title,
            opt_date(row, "due_date")?,
            optional(row, "status").unwrap_or_else(|| "open".to_string()),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

fn import_row(conn: &Connection, entity: EntityType, row: &ParsedRow) -> RowResult<()> {
    match entity {
        EntityType::ChartOfAccounts => import_ledger_account(conn, row),
        EntityType::BankAccounts => import_bank_account(conn, row),
        EntityType::Properties => import_property(conn, row),
        EntityType::Projects => import_project(conn, row),
        EntityType::Vendors => import_vendor(conn, row),
        EntityType::Customers => import_customer(conn, row),
        EntityType::Employees => import_employee(conn, row),
        EntityType::Equipment => import_equipment(conn, row),
        EntityType::Invoices => import_invoice(conn, row),
        EntityType::Bills => import_bill(conn, row),
        EntityType::Tasks => import_task(conn, row),
    }
}

// ---------------------------------------------------------------------------
// import_job
// ---------------------------------------------------------------------------

/// Import one job's rows in document order. Every per-row failure is
/// collected; processing never short-circuits. Only inability to reach the
/// store at all is a job-level error.
pub fn import_job(conn: &Connection, job: &ImportJob) -> Result<ImportResult> {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;

    let mut result = ImportResult::default();
    for (i, row) in job.sheet.rows.iter().enumerate() {
        match import_row(conn, job.entity, row) {
            Ok(()) => result.success_count += 1,
            Err(message) => result.errors.push(RowError { row: i + 1, message }),
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::models::ParsedSheet;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn make_job(entity: EntityType, headers: &[&str], rows: &[&[&str]]) -> ImportJob {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .iter()
            .map(|cells| ParsedRow {
                fields: headers
                    .iter()
                    .zip(cells.iter())
                    .map(|(k, v)| (k.clone(), v.to_string()))
                    .collect(),
            })
            .collect();
        ImportJob {
            entity,
            sheet: ParsedSheet {
                name: entity.key().to_string(),
                headers,
                rows,
            },
        }
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("amount", "1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_number("amount", "$500").unwrap(), 500.0);
        assert_eq!(parse_number("amount", "(42.50)").unwrap(), -42.5);
        assert!(parse_number("amount", "twelve").is_err());
        assert!(parse_number("amount", "").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("date", "2025-01-15").unwrap(), "2025-01-15");
        assert_eq!(parse_date("date", "01/15/2025").unwrap(), "2025-01-15");
        assert!(parse_date("date", "13/45/2025").is_err());
        assert!(parse_date("date", "soon").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("is_active", "Yes").unwrap());
        assert!(!parse_bool("is_active", "0").unwrap());
        assert!(parse_bool("is_active", "maybe").is_err());
    }

    #[test]
    fn test_row_level_isolation() {
        let (_dir, conn) = test_db();
        let job = make_job(
            EntityType::Vendors,
            &["name", "trade"],
            &[
                &["Acme Concrete", "concrete"],
                &["Bolt Electric", "electrical"],
                &["", "plumbing"], // row 3: missing required name
                &["Delta Drywall", "drywall"],
                &["Evergreen Landscaping", "landscaping"],
            ],
        );
        let result = import_job(&conn, &job).unwrap();
        assert_eq!(result.success_count, 4);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 3);
        assert!(result.errors[0].message.contains("name"));
    }

    #[test]
    fn test_conversion_error_is_row_level() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO customers (name) VALUES ('Harbor Dev')", []).unwrap();
        let job = make_job(
            EntityType::Invoices,
            &["invoice_number", "customer", "amount"],
            &[
                &["INV-1", "Harbor Dev", "1200"],
                &["INV-2", "Harbor Dev", "lots"],
            ],
        );
        let result = import_job(&conn, &job).unwrap();
        assert_eq!(result.success_count, 1);
        assert_eq!(result.errors[0].row, 2);
        assert!(result.errors[0].message.contains("amount"));
    }

    #[test]
    fn test_preferred_date_column_shields_junk_fallback() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO customers (name) VALUES ('Harbor Dev')", []).unwrap();
        // Legacy exports carry a junk `date` column next to a good `invoice_date`.
        let job = make_job(
            EntityType::Invoices,
            &["invoice_number", "customer", "amount", "invoice_date", "date"],
            &[&["INV-1", "Harbor Dev", "1200", "2025-02-01", "N/A"]],
        );
        let result = import_job(&conn, &job).unwrap();
        assert_eq!(result.success_count, 1);
        assert!(result.errors.is_empty());
        let date: String = conn
            .query_row("SELECT invoice_date FROM invoices WHERE invoice_number = 'INV-1'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(date, "2025-02-01");
    }

    #[test]
    fn test_bill_date_fallback_used_only_when_needed() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO vendors (name) VALUES ('Acme Concrete')", []).unwrap();
        let job = make_job(
            EntityType::Bills,
            &["bill_number", "vendor", "amount", "bill_date", "date"],
            &[
                &["BILL-1", "Acme Concrete", "800", "2025-03-01", "junk"],
                &["BILL-2", "Acme Concrete", "900", "", "03/15/2025"],
            ],
        );
        let result = import_job(&conn, &job).unwrap();
        assert_eq!(result.success_count, 2, "errors: {:?}", result.errors);
        let date: String = conn
            .query_row("SELECT bill_date FROM bills WHERE bill_number = 'BILL-2'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(date, "2025-03-15");
    }

    #[test]
    fn test_chosen_date_column_still_validated() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO customers (name) VALUES ('Harbor Dev')", []).unwrap();
        let job = make_job(
            EntityType::Invoices,
            &["invoice_number", "customer", "amount", "invoice_date"],
            &[&["INV-1", "Harbor Dev", "1200", "N/A"]],
        );
        let result = import_job(&conn, &job).unwrap();
        assert_eq!(result.success_count, 0);
        assert!(result.errors[0].message.contains("invoice_date"));
    }

    #[test]
    fn test_missing_dependency_is_row_level() {
        let (_dir, conn) = test_db();
        let job = make_job(
            EntityType::Invoices,
            &["invoice_number", "customer", "amount"],
            &[&["INV-1", "Nobody LLC", "1200"]],
        );
        let result = import_job(&conn, &job).unwrap();
        assert_eq!(result.success_count, 0);
        assert!(result.errors[0].message.contains("Nobody LLC"));
    }

    #[test]
    fn test_reimport_updates_instead_of_duplicating() {
        let (_dir, conn) = test_db();
        let job = make_job(
            EntityType::ChartOfAccounts,
            &["account_number", "name"],
            &[&["7000", "Marketing"]],
        );
        import_job(&conn, &job).unwrap();
        let job2 = make_job(
            EntityType::ChartOfAccounts,
            &["account_number", "name"],
            &[&["7000", "Marketing & Ads"]],
        );
        import_job(&conn, &job2).unwrap();
        let (count, name): (i64, String) = conn
            .query_row(
                "SELECT count(*), name FROM ledger_accounts WHERE number = '7000'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(name, "Marketing & Ads");
    }

    #[test]
    fn test_account_type_defaults_from_number() {
        let (_dir, conn) = test_db();
        let job = make_job(
            EntityType::ChartOfAccounts,
            &["account_number", "name"],
            &[&["2400", "Notes Payable"], &["8100", "Interest Expense"]],
        );
        import_job(&conn, &job).unwrap();
        let t: String = conn
            .query_row(
                "SELECT account_type FROM ledger_accounts WHERE number = '2400'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(t, "liability");
    }

    #[test]
    fn test_bank_account_import_links_ledger() {
        let (_dir, conn) = test_db();
        let job = make_job(
            EntityType::BankAccounts,
            &["name", "account_number", "opening_balance"],
            &[&["Operating", "002837559921", "12500"]],
        );
        let result = import_job(&conn, &job).unwrap();
        assert_eq!(result.success_count, 1);

        let (gl_id, last_four): (Option<i64>, Option<String>) = conn
            .query_row(
                "SELECT gl_account_id, last_four FROM bank_accounts WHERE name = 'Operating'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(last_four.as_deref(), Some("9921"));
        let gl_id = gl_id.expect("bank account should be linked");
        let number: String = conn
            .query_row("SELECT number FROM ledger_accounts WHERE id = ?1", [gl_id], |r| r.get(0))
            .unwrap();
        assert_eq!(number, "1040");

        let entries: i64 = conn
            .query_row(
                "SELECT count(*) FROM journal_entries WHERE reference = ?1",
                [crate::gl::opening_balance_reference(1)],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_tasks_upsert_on_project_and_title() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO projects (code, name) VALUES ('EDG-2026', 'Edgewater')", [])
            .unwrap();
        let job = make_job(
            EntityType::Tasks,
            &["project", "title", "status"],
            &[&["EDG-2026", "Pour foundation", "open"]],
        );
        import_job(&conn, &job).unwrap();
        let job2 = make_job(
            EntityType::Tasks,
            &["project", "title", "status"],
            &[&["EDG-2026", "Pour foundation", "done"]],
        );
        import_job(&conn, &job2).unwrap();
        let (count, status): (i64, String) = conn
            .query_row("SELECT count(*), status FROM tasks", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(status, "done");
    }
}
