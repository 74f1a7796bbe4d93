mod api;
mod cli;
mod commands;
mod config;
mod sync;
mod ui;

use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;

use cli::{Cli, Command, DeclarationCommand, SetCommand};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    // Completions need no server connection
    if let Command::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "ddmctl", &mut io::stdout());
        return Ok(());
    }

    let config = config::Config::from_cli(&cli)?;
    let client = api::DdmClient::new(&config);

    match cli.command {
        Command::Declarations => commands::declaration::list(&client),
        Command::Declaration(cmd) => match cmd {
            DeclarationCommand::Create { path } => commands::declaration::create(&client, &path),
            DeclarationCommand::Get { identifier } => {
                commands::declaration::get(&client, &identifier)
            }
            DeclarationCommand::Delete { identifier } => {
                commands::declaration::delete(&client, &identifier)
            }
            DeclarationCommand::Sets { identifier } => {
                commands::declaration::sets(&client, &identifier)
            }
        },
        Command::Set(cmd) => match cmd {
            SetCommand::List => commands::set::list(&client),
            SetCommand::Get { name } => commands::set::get(&client, &name),
            SetCommand::Add { name, identifier } => {
                commands::set::add(&client, &name, &identifier)
            }
            SetCommand::Remove { name, identifier } => {
                commands::set::remove(&client, &name, &identifier)
            }
        },
        Command::Device(cmd) => commands::device::run(&client, &config, cmd),
        Command::Sync(args) => commands::sync::run(&client, &args.dir),
        // Handled before config resolution
        Command::Completions { .. } => Ok(()),
    }
}
