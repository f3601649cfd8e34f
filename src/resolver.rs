use std::sync::OnceLock;

use regex::Regex;

/// Closed set of record categories the persistence layer understands.
/// Sheets that resolve to none of these are excluded from import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    ChartOfAccounts,
    BankAccounts,
    Properties,
    Projects,
    Vendors,
    Customers,
    Employees,
    Equipment,
    Invoices,
    Bills,
    Tasks,
}

impl EntityType {
    pub const ALL: &'static [EntityType] = &[
        Self::ChartOfAccounts,
        Self::BankAccounts,
        Self::Properties,
        Self::Projects,
        Self::Vendors,
        Self::Customers,
        Self::Employees,
        Self::Equipment,
        Self::Invoices,
        Self::Bills,
        Self::Tasks,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::ChartOfAccounts => "chart_of_accounts",
            Self::BankAccounts => "bank_accounts",
            Self::Properties => "properties",
            Self::Projects => "projects",
            Self::Vendors => "vendors",
            Self::Customers => "customers",
            Self::Employees => "employees",
            Self::Equipment => "equipment",
            Self::Invoices => "invoices",
            Self::Bills => "bills",
            Self::Tasks => "tasks",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ChartOfAccounts => "Chart of Accounts",
            Self::BankAccounts => "Bank Accounts",
            Self::Properties => "Properties",
            Self::Projects => "Projects",
            Self::Vendors => "Vendors",
            Self::Customers => "Customers",
            Self::Employees => "Employees",
            Self::Equipment => "Equipment",
            Self::Invoices => "Invoices",
            Self::Bills => "Bills",
            Self::Tasks => "Tasks",
        }
    }
}

// Lowercase, space-separated labels accepted on consumer-facing sheets.
const LABELS: &[(&str, EntityType)] = &[
    ("chart of accounts", EntityType::ChartOfAccounts),
    ("accounts", EntityType::ChartOfAccounts),
    ("gl accounts", EntityType::ChartOfAccounts),
    ("general ledger", EntityType::ChartOfAccounts),
    ("bank accounts", EntityType::BankAccounts),
    ("bank", EntityType::BankAccounts),
    ("properties", EntityType::Properties),
    ("property", EntityType::Properties),
    ("projects", EntityType::Projects),
    ("jobs", EntityType::Projects),
    ("vendors", EntityType::Vendors),
    ("subcontractors", EntityType::Vendors),
    ("suppliers", EntityType::Vendors),
    ("customers", EntityType::Customers),
    ("clients", EntityType::Customers),
    ("tenants", EntityType::Customers),
    ("employees", EntityType::Employees),
    ("staff", EntityType::Employees),
    ("equipment", EntityType::Equipment),
    ("fleet", EntityType::Equipment),
    ("invoices", EntityType::Invoices),
    ("customer invoices", EntityType::Invoices),
    ("bills", EntityType::Bills),
    ("vendor bills", EntityType::Bills),
    ("tasks", EntityType::Tasks),
    ("work orders", EntityType::Tasks),
];

fn lookup(label: &str) -> Option<EntityType> {
    LABELS.iter().find(|(l, _)| *l == label).map(|(_, e)| *e)
}

fn numeric_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+[_\-.\s]+").unwrap())
}

/// Map a sheet label to an entity type. Tolerates case, a leading numeric
/// prefix ("01_bank_accounts") and snake_case variants of the spaced labels.
pub fn resolve(label: &str) -> Option<EntityType> {
    let lowered = label.trim().to_lowercase();
    if let Some(entity) = lookup(&lowered) {
        return Some(entity);
    }

    let stripped = numeric_prefix().replace(&lowered, "").into_owned();
    if stripped != lowered {
        if let Some(entity) = lookup(&stripped) {
            return Some(entity);
        }
    }

    let spaced = stripped.replace('_', " ");
    lookup(spaced.trim())
}
