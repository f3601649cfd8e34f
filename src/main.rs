mod cli;
mod db;
mod error;
mod fmt;
mod gl;
mod importer;
mod models;
mod pipeline;
mod resolver;
mod sequencer;
mod settings;
mod tabular;
mod templates;

use clap::Parser;

use cli::{AccountsCommands, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, company } => cli::init::run(data_dir, company),
        Commands::Import { file, dry_run } => cli::import::run(&file, dry_run),
        Commands::BackfillGl => cli::backfill::run(),
        Commands::Template { entity, output } => {
            cli::template::run(entity.as_deref(), output.as_deref())
        }
        Commands::Accounts { command } => match command {
            AccountsCommands::List => cli::accounts::list(),
            AccountsCommands::Banks => cli::accounts::banks(),
        },
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
