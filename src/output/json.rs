//! JSON output formatting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::models::Pin;
use crate::controller::PinRow;

/// Wrapper for JSON output with metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T> {
    /// The actual data
    pub data: T,

    /// Metadata about the response
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// Timestamp of the response
    pub timestamp: String,

    /// CLI version
    pub version: String,
}

impl<T> JsonOutput<T> {
    /// Create a new JSON output with metadata
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// A pin plus its client-side countdown and permission
#[derive(Debug, Serialize)]
pub struct PinRecord<'a> {
    #[serde(flatten)]
    pub pin: &'a Pin,
    pub remaining: String,
    pub expired: bool,
    pub can_modify: bool,
}

impl<'a> From<&'a PinRow> for PinRecord<'a> {
    fn from(row: &'a PinRow) -> Self {
        Self {
            pin: &row.pin,
            remaining: row.remaining.to_string(),
            expired: row.remaining.is_expired(),
            can_modify: row.can_modify,
        }
    }
}

/// Session summary for `status`
#[derive(Debug, Serialize)]
pub struct SessionRecord {
    pub authenticated: bool,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub api_host: String,
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    let output = JsonOutput::new(data);
    serde_json::to_string_pretty(&output)
}
