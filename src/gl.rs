use rusqlite::{Connection, OptionalExtension};

use crate::error::{Result, SitebooksError};

/// Numbers 1040-1099 are reserved for auto-generated bank sub-accounts.
/// Anything outside the band is user-managed and never touched here.
pub const BAND_START: i64 = 1040;
pub const BAND_END: i64 = 1099;

/// Parent of generated sub-accounts, and the fallback link target once the
/// band is exhausted.
pub const BANK_PARENT_NUMBER: &str = "1000";

/// Credit side of every opening balance posting.
pub const OPENING_EQUITY_NUMBER: &str = "3900";

pub struct LinkOutcome {
    pub ledger_account_id: i64,
    pub created: bool,
}

/// Deterministic reference used to detect an already-posted opening balance.
/// The `<kind>:<subtype>:<id>` shape is a persisted-data contract; changing
/// it would re-post balances for existing rows.
pub fn opening_balance_reference(bank_account_id: i64) -> String {
    format!("opening_balance:bank:{bank_account_id}")
}

fn account_id_by_number(conn: &Connection, number: &str) -> Result<i64> {
    conn.query_row(
        "SELECT id FROM ledger_accounts WHERE number = ?1",
        [number],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| SitebooksError::MissingLedgerAccount(number.to_string()))
}

/// Ensure a bank account has a ledger account behind it, creating one in the
/// reserved band when needed, and post its opening balance exactly once.
///
/// The link field and the reference lookup are read-then-write with no lock;
/// acceptable for the low-frequency administrative context this runs in.
pub fn ensure_link(
    conn: &Connection,
    bank_account_id: i64,
    opening_balance: Option<f64>,
) -> Result<LinkOutcome> {
    let (name, last_four, existing): (String, Option<String>, Option<i64>) = conn
        .query_row(
            "SELECT name, last_four, gl_account_id FROM bank_accounts WHERE id = ?1",
            [bank_account_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?
        .ok_or(SitebooksError::UnknownBankAccount(bank_account_id))?;

    // A set link is permanent: never overwritten, never re-posted against.
    if let Some(gl_id) = existing {
        return Ok(LinkOutcome {
            ledger_account_id: gl_id,
            created: false,
        });
    }

    // Reuse a ledger account whose display name carries this bank account's
    // last-four suffix, unless a different bank account already claimed it.
    let mut reused: Option<i64> = None;
    if let Some(suffix) = last_four.as_deref().filter(|s| !s.is_empty()) {
        reused = conn
            .query_row(
                "SELECT id FROM ledger_accounts \
                 WHERE name LIKE '%' || ?1 || '%' \
                 AND id NOT IN (SELECT gl_account_id FROM bank_accounts \
                                WHERE gl_account_id IS NOT NULL AND id != ?2)",
                rusqlite::params![suffix, bank_account_id],
                |row| row.get(0),
            )
            .optional()?;
    }

    let (ledger_account_id, created) = match reused {
        Some(id) => (id, false),
        None => {
            let max_assigned: Option<i64> = conn.query_row(
                "SELECT MAX(CAST(number AS INTEGER)) FROM ledger_accounts \
                 WHERE CAST(number AS INTEGER) BETWEEN ?1 AND ?2",
                [BAND_START, BAND_END],
                |row| row.get(0),
            )?;
            // Numbers are never reused once assigned, even if freed.
            let next = max_assigned.map_or(BAND_START, |m| m + 1);
            if next > BAND_END {
                // Band exhausted: link against the shared parent rather than fail.
                (account_id_by_number(conn, BANK_PARENT_NUMBER)?, false)
            } else {
                let parent_id = account_id_by_number(conn, BANK_PARENT_NUMBER)?;
                let display = match last_four.as_deref().filter(|s| !s.is_empty()) {
                    Some(suffix) => format!("{name} ({suffix})"),
                    None => name.clone(),
                };
                conn.execute(
                    "INSERT INTO ledger_accounts (number, name, account_type, parent_id) \
                     VALUES (?1, ?2, 'asset', ?3)",
                    rusqlite::params![next.to_string(), display, parent_id],
                )?;
                (conn.last_insert_rowid(), true)
            }
        }
    };

    conn.execute(
        "UPDATE bank_accounts SET gl_account_id = ?1 WHERE id = ?2",
        rusqlite::params![ledger_account_id, bank_account_id],
    )?;

    if let Some(balance) = opening_balance.filter(|b| *b > 0.0) {
        post_opening_balance(conn, bank_account_id, ledger_account_id, balance)?;
    }

    Ok(LinkOutcome {
        ledger_account_id,
        created,
    })
}

/// Post the balanced opening entry: debit the bank's ledger account, credit
/// Opening Balance Equity. No-op when the reference already exists.
fn post_opening_balance(
    conn: &Connection,
    bank_account_id: i64,
    ledger_account_id: i64,
    balance: f64,
) -> Result<()> {
    let reference = opening_balance_reference(bank_account_id);
    let already_posted = conn
        .prepare("SELECT 1 FROM journal_entries WHERE reference = ?1")?
        .exists([&reference])?;
    if already_posted {
        return Ok(());
    }

    let equity_id = account_id_by_number(conn, OPENING_EQUITY_NUMBER)?;
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    conn.execute(
        "INSERT INTO journal_entries (entry_date, memo, reference) VALUES (?1, ?2, ?3)",
        rusqlite::params![today, "Opening balance", reference],
    )?;
    let entry_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO journal_lines (entry_id, account_id, debit, credit) VALUES (?1, ?2, ?3, 0)",
        rusqlite::params![entry_id, ledger_account_id, balance],
    )?;
    conn.execute(
        "INSERT INTO journal_lines (entry_id, account_id, debit, credit) VALUES (?1, ?2, 0, ?3)",
        rusqlite::params![entry_id, equity_id, balance],
    )?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct BackfillResult {
    pub linked: usize,
    pub created: usize,
    pub failures: Vec<(i64, String)>,
}

/// Link every bank account that has no ledger account yet. A failing item is
/// recorded and the loop moves on; the batch never aborts.
pub fn backfill(conn: &Connection) -> Result<BackfillResult> {
    let pending: Vec<(i64, f64)> = conn
        .prepare("SELECT id, opening_balance FROM bank_accounts WHERE gl_account_id IS NULL ORDER BY id")?
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut result = BackfillResult::default();
    for (id, balance) in pending {
        match ensure_link(conn, id, Some(balance)) {
            Ok(outcome) => {
                result.linked += 1;
                if outcome.created {
                    result.created += 1;
                }
            }
            Err(e) => result.failures.push((id, e.to_string())),
        }
    }
    Ok(result)
}
