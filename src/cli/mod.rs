pub mod accounts;
pub mod backfill;
pub mod import;
pub mod init;
pub mod status;
pub mod template;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sitebooks",
    about = "Spreadsheet bulk-import and GL-linkage pipeline for construction bookkeeping."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up sitebooks: choose a data directory and seed the chart of accounts.
    Init {
        /// Path for sitebooks data (default: ~/Documents/sitebooks)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Company name shown in status output
        #[arg(long)]
        company: Option<String>,
    },
    /// Import a workbook or delimited file: all recognized sheets, dependency-ordered.
    Import {
        /// Path to XLSX/CSV file to import
        file: String,
        /// Parse and resolve only; report what would be imported without writing
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Link bank accounts to ledger accounts and post missing opening balances.
    BackfillGl,
    /// Write starter CSV templates with the headers the importer expects.
    Template {
        /// Entity to generate (e.g. vendors, invoices); omit for all entities
        entity: Option<String>,
        /// Output file (single entity) or directory (all entities)
        #[arg(long)]
        output: Option<String>,
    },
    /// Inspect accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Show current database and record counts.
    Status,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// List ledger accounts.
    List,
    /// List bank accounts and their ledger links.
    Banks,
}
