use crate::cli::{Cli, Commands};
use clap::Parser;

mod cli;
mod commands;
mod gui;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run::run(&args)?,
        Commands::Gui => commands::gui::run()?,
    }

    Ok(())
}
