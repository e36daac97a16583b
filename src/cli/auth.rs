//! Login, signup and logout commands

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::cli::context::spinner;
use crate::cli::{CommandContext, CredentialArgs, GlobalOptions};
use crate::client::models::Credentials;
use crate::controller::AuthMode;
use crate::error::Result;

/// Fill in whatever the flags left out by prompting.
pub fn prompt_credentials(args: &CredentialArgs, confirm_password: bool) -> Result<Credentials> {
    let theme = ColorfulTheme::default();

    let username = match &args.username {
        Some(username) => username.clone(),
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Username")
            .interact_text()?,
    };

    let password = match &args.password {
        Some(password) => password.clone(),
        None => {
            let prompt = Password::with_theme(&theme).with_prompt("Password");
            if confirm_password {
                prompt
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()?
            } else {
                prompt.interact()?
            }
        }
    };

    Ok(Credentials::new(username.trim(), &password))
}

/// Log in to an existing account
pub async fn login(opts: &GlobalOptions, args: &CredentialArgs) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    ctx.controller.open_auth(AuthMode::Login);
    let credentials = prompt_credentials(args, false)?;

    let progress = spinner("Logging in...");
    let result = ctx.controller.login(&credentials).await;
    progress.finish_and_clear();
    let session = result?;

    println!(
        "{} Logged in as {} ({})",
        "✓".green(),
        session.display_name().bold(),
        session.role
    );
    Ok(())
}

/// Create an account; the user logs in separately afterwards
pub async fn signup(opts: &GlobalOptions, args: &CredentialArgs) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    ctx.controller.open_auth(AuthMode::Signup);
    let credentials = prompt_credentials(args, true)?;

    let progress = spinner("Creating account...");
    let result = ctx.controller.signup(&credentials).await;
    progress.finish_and_clear();
    result?;

    println!("{} Account {} created", "✓".green(), credentials.username.bold());
    println!("  → Run {} to sign in", "eator login".cyan());
    Ok(())
}

/// Forget the stored token
pub fn logout(opts: &GlobalOptions) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    let was_logged_in = ctx.controller.session().is_authenticated();
    ctx.controller.logout()?;

    if was_logged_in {
        println!("{} Logged out", "✓".green());
    } else {
        println!("{} Not logged in", "○".dimmed());
    }
    Ok(())
}
