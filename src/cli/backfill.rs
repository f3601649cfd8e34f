use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::gl;
use crate::settings::db_path;

pub fn run() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let result = gl::backfill(&conn)?;

    println!(
        "{} bank account(s) linked ({} new ledger accounts)",
        result.linked, result.created
    );
    for (bank_id, message) in &result.failures {
        println!("  {} bank account {}: {}", "!".red(), bank_id, message);
    }
    if result.linked == 0 && result.failures.is_empty() {
        println!("All bank accounts already linked.");
    }
    Ok(())
}
