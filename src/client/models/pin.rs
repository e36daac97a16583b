//! Pin models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::timestamp;

/// A time-limited food marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Pin ID (`_id` on the wire)
    #[serde(alias = "_id")]
    pub id: String,

    /// What is on offer, e.g. "Pizza slices"
    pub description: String,

    /// Human-readable place, e.g. "Marston Basement"
    #[serde(default = "unknown_location", alias = "locationName")]
    pub location_name: String,

    /// Map position
    pub coordinates: Coordinates,

    /// ID of the user who dropped the pin
    #[serde(default, alias = "user_id", alias = "userId", alias = "owner")]
    pub owner_user_id: String,

    /// Display name of the owner
    #[serde(default, alias = "username")]
    pub owner_username: String,

    #[serde(
        rename = "createdAt",
        alias = "created_at",
        deserialize_with = "timestamp::deserialize"
    )]
    pub created_at: DateTime<Utc>,

    #[serde(
        rename = "expiresAt",
        alias = "expires_at",
        deserialize_with = "timestamp::deserialize"
    )]
    pub expires_at: DateTime<Utc>,
}

fn unknown_location() -> String {
    "N/A".to_string()
}

/// Latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoordinates {
    Object {
        lat: f64,
        #[serde(alias = "lon")]
        lng: f64,
    },
    Pair([f64; 2]),
}

impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawCoordinates::deserialize(deserializer)? {
            RawCoordinates::Object { lat, lng } => Coordinates { lat, lng },
            RawCoordinates::Pair([lat, lng]) => Coordinates { lat, lng },
        })
    }
}

/// Body for `POST /api/pins`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePinRequest {
    pub description: String,
    pub location_name: String,
    pub coordinates: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// Body for `PUT /api/pins/:id`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatePinRequest {
    pub description: String,
    pub location_name: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

/// Requested changes to a pin's mutable fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinPatch {
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl PinPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.location_name.is_none() && self.expires_at.is_none()
    }

    /// Merge onto the pin's current values to form the full PUT body.
    pub fn apply_to(&self, pin: &Pin) -> UpdatePinRequest {
        UpdatePinRequest {
            description: self
                .description
                .clone()
                .unwrap_or_else(|| pin.description.clone()),
            location_name: self
                .location_name
                .clone()
                .unwrap_or_else(|| pin.location_name.clone()),
            expires_at: self.expires_at.unwrap_or(pin.expires_at),
        }
    }
}
