mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;

use cli::{Cli, Commands};

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse_from(wild::args_os());

    match cli.command {
        Commands::Create(args) => commands::create(args)?,
        Commands::List(args) => commands::list(args)?,
        Commands::Add(args) => commands::add(args)?,
        Commands::Delete(args) => commands::delete(args)?,
        Commands::Cat(args) => commands::cat(args)?,
        Commands::Comment(args) => commands::comment(args)?,
    };

    Ok(())
}
