//! Runinfo CLI: the `runinfo` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_logging(cli.verbose);

    match cli.command {
        Commands::Resolve {
            input,
            catalog,
            json,
        } => commands::resolve::run(input, catalog, json),

        Commands::Compare {
            old,
            new,
            catalog,
            relaxed,
            ignore_blocks,
            json,
        } => commands::compare::run(commands::compare::Args {
            old,
            new,
            catalog,
            relaxed,
            ignore_blocks,
            json,
        }),

        Commands::ResumeValues { old, catalog, json } => {
            commands::resume_values::run(old, catalog, json)
        }

        Commands::Merge { infos, json } => commands::merge::run(infos, json),

        Commands::Defaults {
            kind,
            name,
            catalog,
            class,
            component_path,
            json,
        } => commands::defaults::run(commands::defaults::Args {
            kind,
            name,
            catalog,
            class,
            component_path,
            json,
        }),
    }
}
