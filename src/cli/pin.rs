//! Pin commands: list, add, edit, delete

use std::io::IsTerminal;

use chrono::{Duration, Utc};
use colored::Colorize;
use dialoguer::{Confirm, Select, theme::ColorfulTheme};

use crate::cli::auth::prompt_credentials;
use crate::cli::context::spinner;
use crate::cli::{CommandContext, CredentialArgs, GlobalOptions, OutputFormat};
use crate::client::models::{Coordinates, Pin, PinPatch, timestamp};
use crate::controller::Modal;
use crate::countdown::remaining;
use crate::error::{ApiError, Result};
use crate::output::{self, json::format_json};
use crate::repository::{DURATION_PRESETS, NewPin};

/// Arguments for `pin add`
#[derive(Debug, Clone)]
pub struct AddArgs {
    pub description: String,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    pub duration: Option<u32>,
}

/// Arguments for `pin edit`
#[derive(Debug, Clone, Default)]
pub struct EditArgs {
    pub description: Option<String>,
    pub location: Option<String>,
    pub expires_in: Option<u32>,
    pub expires_at: Option<String>,
}

impl EditArgs {
    fn into_patch(self) -> Result<PinPatch> {
        let expires_at = match (self.expires_in, self.expires_at) {
            (Some(minutes), _) => Some(Utc::now() + Duration::minutes(i64::from(minutes))),
            (None, Some(raw)) => Some(timestamp::parse(&raw).ok_or_else(|| {
                ApiError::Validation(format!("Could not read expiry time '{}'.", raw))
            })?),
            (None, None) => None,
        };

        Ok(PinPatch {
            description: self.description,
            location_name: self.location,
            expires_at,
        })
    }
}

/// Report a single pin in the chosen format
fn print_pin(verb: &str, pin: &Pin, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", format_json(pin)?),
        OutputFormat::Table => println!(
            "{} {} pin {}: {} at {} (expires in {})",
            "✓".green(),
            verb,
            pin.id.bold(),
            pin.description,
            pin.location_name,
            remaining(pin.expires_at, Utc::now())
        ),
    }
    Ok(())
}

/// Offer the preset lifetimes, starting on the configured default.
fn choose_duration(default_minutes: u32) -> Result<u32> {
    let labels: Vec<String> = DURATION_PRESETS
        .iter()
        .map(|minutes| format!("{} minutes", minutes))
        .collect();
    let default = DURATION_PRESETS
        .iter()
        .position(|&minutes| minutes == default_minutes)
        .unwrap_or(2);

    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("How long will the food last?")
        .items(&labels)
        .default(default)
        .interact()?;
    Ok(DURATION_PRESETS[choice])
}

fn missing_pin(id: &str) -> ApiError {
    ApiError::NotFound(format!("Pin {} not found", id))
}

fn not_yours() -> ApiError {
    ApiError::Forbidden("You can only change your own pins.".to_string())
}

/// List pins on the map
pub async fn list(opts: &GlobalOptions, all: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let format = ctx.format;
    let mut controller = ctx.controller.include_expired(all);

    let progress = spinner("Fetching pins...");
    let result = controller.refresh().await;
    progress.finish_and_clear();
    result?;

    let snapshot = controller.snapshot();
    output::print(snapshot.rows.as_slice(), format)
}

/// Drop a new pin, logging in first if needed
pub async fn add(opts: &GlobalOptions, args: AddArgs) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;

    if let Modal::Auth(_) = ctx.controller.open_add_pin() {
        if !std::io::stdin().is_terminal() {
            return Err(ApiError::Unauthorized(
                "You must be logged in to add a pin. Run 'eator login' first.".to_string(),
            )
            .into());
        }
        eprintln!("{}", "Log in to add a pin.".yellow());
        let credentials = prompt_credentials(&CredentialArgs::default(), false)?;
        ctx.controller.login(&credentials).await?;
        ctx.controller.open_add_pin();
    }

    let default_minutes = ctx.config.preferences.default_duration_minutes;
    let duration = match args.duration {
        Some(minutes) => minutes,
        None if std::io::stdin().is_terminal() => choose_duration(default_minutes)?,
        None => default_minutes,
    };

    let input = NewPin {
        description: args.description,
        location_name: args.location,
        coordinates: Coordinates {
            lat: args.lat,
            lng: args.lng,
        },
        duration_minutes: Some(duration),
    };

    let progress = spinner("Adding pin...");
    let result = ctx.controller.create_pin(&input).await;
    progress.finish_and_clear();

    print_pin("Added", &result?, ctx.format)
}

/// Change one of the caller's pins
pub async fn edit(opts: &GlobalOptions, id: &str, args: EditArgs) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    ctx.controller.session().require_token("edit a pin")?;
    let patch = args.into_patch()?;

    ctx.controller.refresh().await?;
    if !ctx.controller.open_edit(id) {
        return Err(match ctx.controller.find(id) {
            None => missing_pin(id),
            Some(_) => not_yours(),
        }
        .into());
    }

    let progress = spinner("Saving...");
    let result = ctx.controller.update_pin(id, &patch).await;
    progress.finish_and_clear();

    print_pin("Updated", &result?, ctx.format)
}

/// Remove one of the caller's pins after confirmation
pub async fn delete(opts: &GlobalOptions, id: &str, yes: bool) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    ctx.controller.session().require_token("delete a pin")?;

    ctx.controller.refresh().await?;
    if !ctx.controller.request_delete(id) {
        return Err(match ctx.controller.find(id) {
            None => missing_pin(id),
            Some(_) => not_yours(),
        }
        .into());
    }

    if !yes {
        let Modal::ConfirmDelete(pin) = ctx.controller.view().modal().clone() else {
            return Err(missing_pin(id).into());
        };
        if !std::io::stdin().is_terminal() {
            return Err(ApiError::Validation(
                "Refusing to delete without confirmation; pass --yes.".to_string(),
            )
            .into());
        }
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete \"{}\" at {}?",
                pin.description, pin.location_name
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.controller.close_modal();
            println!("{} Kept pin {}", "○".dimmed(), id);
            return Ok(());
        }
    }

    let progress = spinner("Deleting...");
    let result = ctx.controller.confirm_delete().await;
    progress.finish_and_clear();
    let pin = result?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&pin)?),
        OutputFormat::Table => println!("{} Deleted pin {}", "✓".green(), pin.id.bold()),
    }
    Ok(())
}
