//! Table output formatting

use colored::Colorize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::formatters::{format_local, truncate};
use crate::controller::{AuthMode, Modal, PinRow, SyncState, ViewSnapshot};

/// Format data as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No pins on the map.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// One table row per pin
#[derive(Debug, Tabled)]
pub struct PinDisplay {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "FOOD")]
    pub description: String,
    #[tabled(rename = "LOCATION")]
    pub location: String,
    #[tabled(rename = "POSTED BY")]
    pub owner: String,
    #[tabled(rename = "EXPIRES IN")]
    pub remaining: String,
    #[tabled(rename = "EXPIRES AT")]
    pub expires_at: String,
    #[tabled(rename = "YOURS")]
    pub editable: String,
}

impl From<&PinRow> for PinDisplay {
    fn from(row: &PinRow) -> Self {
        let owner = if row.pin.owner_username.is_empty() {
            row.pin.owner_user_id.clone()
        } else {
            row.pin.owner_username.clone()
        };
        Self {
            id: row.pin.id.clone(),
            description: truncate(&row.pin.description, 30),
            location: truncate(&row.pin.location_name, 24),
            owner,
            remaining: row.remaining.to_string(),
            expires_at: format_local(row.pin.expires_at),
            editable: if row.can_modify { "✓".to_string() } else { String::new() },
        }
    }
}

pub fn format_pins(rows: &[PinRow]) -> String {
    let display: Vec<PinDisplay> = rows.iter().map(PinDisplay::from).collect();
    format_table(&display)
}

/// A full `watch` frame: status line, pin table, and the active modal.
pub fn format_frame(snapshot: &ViewSnapshot) -> String {
    let status = match &snapshot.state {
        SyncState::Idle => "idle".dimmed().to_string(),
        SyncState::Loading => "loading…".yellow().to_string(),
        SyncState::Ready => format!("{} pins", snapshot.rows.len()).green().to_string(),
        SyncState::Error(msg) => format!("refresh failed: {}", msg).red().to_string(),
    };

    let mut out = format!(
        "{}  {}  {}\n",
        "eator".bold(),
        format!("signed in as {}", snapshot.viewer).dimmed(),
        status
    );
    out.push_str(&format_pins(&snapshot.rows));
    out.push('\n');

    match &snapshot.modal {
        Modal::None => {}
        Modal::AddPin => out.push_str("\nAdding a pin\n"),
        Modal::Auth(AuthMode::Login) => out.push_str("\nLog in to continue\n"),
        Modal::Auth(AuthMode::Signup) => out.push_str("\nCreate an account\n"),
        Modal::EditPin(pin) => out.push_str(&format!("\nEditing {}\n", pin.id.bold())),
        Modal::ConfirmDelete(pin) => out.push_str(&format!(
            "\nDelete \"{}\" at {}? [y/n]\n",
            pin.description,
            pin.location_name
        )),
    }

    if let Some(err) = &snapshot.form_error {
        out.push_str(&format!("{}\n", err.red()));
    }

    out.push_str(&"r refresh · d <id> delete · q quit".dimmed().to_string());
    out
}
