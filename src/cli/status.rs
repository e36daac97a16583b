//! Status command implementation

use chrono::Utc;
use colored::Colorize;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::config::DEFAULT_API_HOST;
use crate::countdown::remaining;
use crate::error::Result;
use crate::output::json::{SessionRecord, format_json};

/// Display configuration and session status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let session = ctx.controller.session();

    if ctx.format == OutputFormat::Json {
        let record = SessionRecord {
            authenticated: session.is_authenticated(),
            user_id: session.is_authenticated().then(|| session.user_id.clone()),
            username: session.username.clone(),
            role: session.is_authenticated().then(|| session.role.to_string()),
            expires_at: session.expires_at,
            api_host: ctx.api_host.clone(),
        };
        println!("{}", format_json(&record)?);
        return Ok(());
    }

    println!("{}\n", "Eator Status".bold());

    if ctx.config_path.exists() {
        println!("Config file: {}", ctx.config_path.display().to_string().cyan());
    } else {
        println!(
            "Config file: {} {}",
            ctx.config_path.display().to_string().cyan(),
            "(not created yet)".dimmed()
        );
    }

    if ctx.api_host == DEFAULT_API_HOST {
        println!("API host: {}", ctx.api_host);
    } else {
        println!("API host: {} {}", ctx.api_host.cyan(), "(custom)".dimmed());
    }
    println!();

    if session.is_authenticated() {
        println!(
            "{} Logged in as {} ({})",
            "✓".green(),
            session.display_name().bold(),
            session.role
        );
        match session.expires_at {
            Some(exp) => println!(
                "{} Session valid (expires in {})",
                "✓".green(),
                remaining(exp, Utc::now())
            ),
            None => println!("{} Session has no expiry", "○".dimmed()),
        }
    } else {
        println!("{} Not logged in", "○".dimmed());
        println!("  → Run '{}' to sign in", "eator login".cyan());
    }

    println!();
    Ok(())
}
