//! Eator CLI - share and find leftover food around campus

use clap::{CommandFactory, Parser};

mod cli;
mod client;
mod config;
mod controller;
mod countdown;
mod error;
mod output;
mod policy;
mod repository;
mod session;

use cli::pin::{AddArgs, EditArgs};
use cli::{Cli, Commands, GlobalOptions, PinCommands};
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(err.exit_code());
    }
}

/// `warn` by default, `debug` for this crate with `--debug`; `RUST_LOG` wins.
fn init_logging(debug: bool) {
    let default_filter = if debug { "eator=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Login(args) => cli::auth::login(&opts, &args).await,
        Commands::Signup(args) => cli::auth::signup(&opts, &args).await,
        Commands::Logout => cli::auth::logout(&opts),
        Commands::Status => cli::status::run(&opts),
        Commands::Pin(pin_cmd) => match pin_cmd {
            PinCommands::List { all } => cli::pin::list(&opts, all).await,
            PinCommands::Add {
                description,
                location,
                lat,
                lng,
                duration,
            } => {
                let args = AddArgs {
                    description,
                    location,
                    lat,
                    lng,
                    duration,
                };
                cli::pin::add(&opts, args).await
            }
            PinCommands::Edit {
                id,
                description,
                location,
                expires_in,
                expires_at,
            } => {
                let args = EditArgs {
                    description,
                    location,
                    expires_in,
                    expires_at,
                };
                cli::pin::edit(&opts, &id, args).await
            }
            PinCommands::Delete { id, yes } => cli::pin::delete(&opts, &id, yes).await,
        },
        Commands::Watch { all } => cli::watch::run(&opts, all).await,
        Commands::Version => {
            println!("eator version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "eator", &mut std::io::stdout());
            Ok(())
        }
    }
}
