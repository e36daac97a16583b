//! CLI command definitions and handlers

use clap::{Args, Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod auth;
pub mod context;
pub mod pin;
pub mod status;
pub mod watch;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// Eator - share and find leftover food around campus
#[derive(Parser, Debug)]
#[command(name = "eator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "EATOR_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "EATOR_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the API host
    #[arg(long, global = true, env = "EATOR_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "EATOR_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Username and password, prompted for when omitted
#[derive(Debug, Clone, Args, Default)]
pub struct CredentialArgs {
    /// Account username
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Account password
    #[arg(long, env = "EATOR_PASSWORD", hide_env = true)]
    pub password: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session token
    Login(CredentialArgs),

    /// Create an account
    Signup(CredentialArgs),

    /// Forget the stored session token
    Logout,

    /// Show configuration and session status
    Status,

    /// Manage food pins
    #[command(subcommand)]
    Pin(PinCommands),

    /// Live view of the map with running countdowns
    Watch {
        /// Also show pins that have run out
        #[arg(long)]
        all: bool,
    },

    /// Display version information
    Version,

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   eator completion bash > /etc/bash_completion.d/eator
  zsh:    eator completion zsh > \"${fpath[1]}/_eator\"
  fish:   eator completion fish > ~/.config/fish/completions/eator.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Pin subcommands
#[derive(Subcommand, Debug)]
pub enum PinCommands {
    /// List pins, soonest to expire first
    #[command(visible_alias = "ls")]
    List {
        /// Include pins that have already run out
        #[arg(long)]
        all: bool,
    },

    /// Drop a new pin
    Add {
        /// What food is available
        #[arg(long, short = 'd')]
        description: String,

        /// Building or room
        #[arg(long, short = 'l')]
        location: String,

        /// Latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Minutes until the pin expires (15, 30, 60, 120, up to 360)
        #[arg(long)]
        duration: Option<u32>,
    },

    /// Change one of your pins
    Edit {
        /// Pin ID
        id: String,

        /// New description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// New location name
        #[arg(long, short = 'l')]
        location: Option<String>,

        /// Expire this many minutes from now
        #[arg(long, conflicts_with = "expires_at")]
        expires_in: Option<u32>,

        /// Expire at this RFC 3339 time
        #[arg(long)]
        expires_at: Option<String>,
    },

    /// Remove one of your pins
    #[command(visible_alias = "rm")]
    Delete {
        /// Pin ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
