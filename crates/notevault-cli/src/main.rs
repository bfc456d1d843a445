//! Notevault CLI - encrypted notes in the terminal
//!
//! Command-line front end for `notevault-core`: config loading, secret
//! backends, the unlock gate and note commands.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod secrets;

use app::AppContext;
use cli::{Cli, Commands};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("NOTEVAULT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init(args) => commands::handle_init(cli, args),
        Commands::Completions { shell } => commands::handle_completions(*shell),
        Commands::Add(args) => commands::handle_add(&AppContext::load(cli)?, args),
        Commands::List(args) => commands::handle_list(&AppContext::load(cli)?, args),
        Commands::Show(args) => commands::handle_show(&AppContext::load(cli)?, args),
        Commands::Edit(args) => commands::handle_edit(&AppContext::load(cli)?, args),
        Commands::Delete(args) => commands::handle_delete(&AppContext::load(cli)?, args),
        Commands::Reset(args) => commands::handle_reset(&AppContext::load(cli)?, args),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        if let Some(typed) = errors::classify(&err) {
            typed.exit();
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
