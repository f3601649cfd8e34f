use std::path::Path;

use crate::error::Result;
use crate::resolver::EntityType;

/// Canonical column keys for each entity's starter template, matching what
/// the bulk importer reads.
pub fn template_columns(entity: EntityType) -> &'static [&'static str] {
    match entity {
        EntityType::ChartOfAccounts => &["account_number", "name", "account_type"],
        EntityType::BankAccounts => &["name", "bank_name", "account_number", "opening_balance"],
        EntityType::Properties => &["name", "address", "city", "state", "property_type"],
        EntityType::Projects => &["code", "name", "property", "status", "start_date", "budget"],
        EntityType::Vendors => &["name", "trade", "email", "phone"],
        EntityType::Customers => &["name", "email", "phone"],
        EntityType::Employees => &["name", "role", "hire_date"],
        EntityType::Equipment => &["name", "category", "purchase_date", "cost"],
        EntityType::Invoices => &[
            "invoice_number",
            "customer",
            "project",
            "invoice_date",
            "amount",
            "status",
        ],
        EntityType::Bills => &["bill_number", "vendor", "project", "bill_date", "amount", "status"],
        EntityType::Tasks => &["project", "title", "due_date", "status"],
    }
}

fn sample_row(entity: EntityType) -> &'static [&'static str] {
    match entity {
        EntityType::ChartOfAccounts => &["1700", "Vehicles", "asset"],
        EntityType::BankAccounts => &["Operating", "First National", "002837559921", "25000"],
        EntityType::Properties => &[
            "8400 Edgewater",
            "8400 Edgewater Dr",
            "Portland",
            "OR",
            "mixed_use",
        ],
        EntityType::Projects => &[
            "EDG-2026",
            "Edgewater Phase One",
            "8400 Edgewater",
            "active",
            "2026-01-15",
            "1500000",
        ],
        EntityType::Vendors => &["Acme Concrete", "concrete", "office@acmeconcrete.com", "503-555-0142"],
        EntityType::Customers => &["Harbor Development", "ap@harbordev.com", "503-555-0117"],
        EntityType::Employees => &["Dana Reyes", "site supervisor", "2024-06-01"],
        EntityType::Equipment => &["Excavator 320", "heavy", "2023-04-12", "185000"],
        EntityType::Invoices => &[
            "INV-1001",
            "Harbor Development",
            "EDG-2026",
            "2026-02-01",
            "42000",
            "open",
        ],
        EntityType::Bills => &["BILL-2001", "Acme Concrete", "EDG-2026", "2026-02-03", "18500", "open"],
        EntityType::Tasks => &["EDG-2026", "Pour foundation", "2026-03-01", "open"],
    }
}

/// Write a starter CSV: canonical headers plus one example row. Every cell
/// is a plain string so nothing gets auto-coerced on the way back in.
pub fn write_template(entity: EntityType, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(template_columns(entity))?;
    wtr.write_record(sample_row(entity))?;
    wtr.flush()?;
    Ok(())
}
