//! Pin repository
//!
//! Wraps the raw [`PinApi`] with the rules the client enforces before a
//! request leaves: a session for every mutation, ownership for edits and
//! deletes, field limits, and the six hour expiry ceiling. Nothing here
//! retries; callers re-fetch after a successful mutation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::client::PinApi;
use crate::client::models::{Coordinates, CreatePinRequest, Pin, PinPatch};
use crate::error::{ApiError, Result};
use crate::policy::can_modify;
use crate::session::Session;

/// Longest description or location name accepted
pub const MAX_TEXT_LEN: usize = 50;

/// Latest a pin may be set to expire, measured from the edit
pub const MAX_EXPIRY_HOURS: i64 = 6;

/// Longest lifetime a new pin may request
pub const MAX_DURATION_MINUTES: u32 = 360;

/// Lifetimes offered when adding a pin
pub const DURATION_PRESETS: [u32; 4] = [15, 30, 60, 120];

/// Input for creating a pin
#[derive(Debug, Clone, PartialEq)]
pub struct NewPin {
    pub description: String,
    pub location_name: String,
    pub coordinates: Coordinates,
    pub duration_minutes: Option<u32>,
}

/// Policy-enforcing front for the pin endpoints
#[derive(Clone)]
pub struct PinRepository {
    api: Arc<dyn PinApi>,
}

impl PinRepository {
    pub fn new(api: Arc<dyn PinApi>) -> Self {
        Self { api }
    }

    /// Fetch the authoritative pin list.
    pub async fn list_pins(&self) -> Result<Vec<Pin>> {
        let pins = self.api.list_pins().await?;
        debug!("Fetched {} pins", pins.len());
        Ok(pins)
    }

    pub async fn create_pin(&self, session: &Session, input: &NewPin) -> Result<Pin> {
        let token = session.require_token("add a pin")?;

        let request = CreatePinRequest {
            description: validate_text("Description", &input.description)?,
            location_name: validate_text("Location", &input.location_name)?,
            coordinates: validate_coordinates(input.coordinates)?,
            duration_minutes: input.duration_minutes.map(validate_duration).transpose()?,
        };

        let pin = self.api.create_pin(token, &request).await?;
        debug!("Created pin {}", pin.id);
        Ok(pin)
    }

    /// Apply a patch; `now` anchors the expiry ceiling.
    pub async fn update_pin(
        &self,
        session: &Session,
        pin: &Pin,
        patch: &PinPatch,
        now: DateTime<Utc>,
    ) -> Result<Pin> {
        let token = session.require_token("edit a pin")?;
        ensure_can_modify(session, pin)?;

        if patch.is_empty() {
            return Err(ApiError::Validation("Nothing to update.".to_string()).into());
        }

        let mut request = patch.apply_to(pin);
        request.description = validate_text("Description", &request.description)?;
        request.location_name = validate_text("Location", &request.location_name)?;
        if let Some(expires_at) = patch.expires_at {
            validate_expiry(expires_at, now)?;
        }

        let updated = self.api.update_pin(token, &pin.id, &request).await?;
        debug!("Updated pin {}", updated.id);
        Ok(updated)
    }

    pub async fn delete_pin(&self, session: &Session, pin: &Pin) -> Result<()> {
        let token = session.require_token("delete a pin")?;
        ensure_can_modify(session, pin)?;

        self.api.delete_pin(token, &pin.id).await?;
        debug!("Deleted pin {}", pin.id);
        Ok(())
    }
}

fn ensure_can_modify(session: &Session, pin: &Pin) -> Result<()> {
    if can_modify(session, pin) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("You can only change your own pins.".to_string()).into())
    }
}

/// Trim and bound a free-text field.
pub fn validate_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{} is required.", field)).into());
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::Validation(format!(
            "{} must be at most {} characters.",
            field, MAX_TEXT_LEN
        ))
        .into());
    }
    Ok(trimmed.to_string())
}

pub fn validate_coordinates(coordinates: Coordinates) -> Result<Coordinates> {
    let Coordinates { lat, lng } = coordinates;
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(ApiError::Validation(format!("Latitude {} is out of range.", lat)).into());
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(ApiError::Validation(format!("Longitude {} is out of range.", lng)).into());
    }
    Ok(coordinates)
}

pub fn validate_duration(minutes: u32) -> Result<u32> {
    if minutes == 0 || minutes > MAX_DURATION_MINUTES {
        return Err(ApiError::Validation(format!(
            "Duration must be between 1 and {} minutes.",
            MAX_DURATION_MINUTES
        ))
        .into());
    }
    Ok(minutes)
}

/// The new expiry must be in the future and at most six hours out.
pub fn validate_expiry(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if expires_at <= now {
        return Err(ApiError::Validation("Expiration time must be in the future.".to_string()).into());
    }
    if expires_at > now + Duration::hours(MAX_EXPIRY_HOURS) {
        return Err(ApiError::Validation(format!(
            "Expiration time cannot exceed {} hours from now.",
            MAX_EXPIRY_HOURS
        ))
        .into());
    }
    Ok(())
}
