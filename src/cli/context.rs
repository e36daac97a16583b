//! Command execution context
//!
//! Provides a unified context for command execution, eliminating boilerplate
//! for config loading, session resolution, and client initialization.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::{EatorApi, EatorClient};
use crate::config::{Config, ConfigTokenStore};
use crate::controller::ViewController;
use crate::error::Result;
use crate::repository::PinRepository;
use crate::session::SessionStore;

/// Context for command execution.
///
/// Holds the loaded configuration and a controller wired to the HTTP client,
/// with the session store reading and writing the token in the same config
/// file.
pub struct CommandContext {
    /// Loaded configuration (defaults if the file does not exist yet)
    pub config: Config,
    /// Resolved config file location
    pub config_path: PathBuf,
    /// Resolved API host
    pub api_host: String,
    /// Output format preference
    pub format: OutputFormat,
    /// Pin view controller for this command
    pub controller: ViewController<ConfigTokenStore>,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// # Errors
    /// Returns error if the config file exists but cannot be parsed, or the
    /// HTTP client cannot be built.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_or_default_at(opts.config_ref())?;
        let config_path = Config::resolve_path(opts.config_ref())?;
        let api_host = config.api_host_or(opts.api_host_ref());

        let format = opts
            .format
            .or_else(|| {
                config
                    .preferences
                    .format
                    .as_deref()
                    .and_then(OutputFormat::from_preference)
            })
            .unwrap_or_default();

        let client = EatorClient::with_host(Some(api_host.clone()))?;
        debug!("Using API at {}", client.base_url());

        let refresh_every = match config.preferences.refresh_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let controller = wire_controller(Arc::new(client), ConfigTokenStore::new(opts.config_ref()))
            .with_refresh_interval(refresh_every);

        Ok(Self {
            config,
            config_path,
            api_host,
            format,
            controller,
        })
    }
}

/// Share one API handle between the session store and the repository.
fn wire_controller<A: EatorApi + 'static>(
    api: Arc<A>,
    tokens: ConfigTokenStore,
) -> ViewController<ConfigTokenStore> {
    let sessions = Arc::new(SessionStore::new(tokens, api.clone()));
    ViewController::new(PinRepository::new(api), sessions)
}

/// Spinner on stderr for a single request; hidden when not a terminal.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner());
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
