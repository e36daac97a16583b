//! Test fixtures and builders for API model types
//!
//! Import via `use crate::client::fixtures::*` in test modules.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};

use super::models::{Coordinates, Pin};

/// Center of the UF campus, the app's default map position
pub const CAMPUS: Coordinates = Coordinates {
    lat: 29.6436,
    lng: -82.3549,
};

// ============================================================================
// PinBuilder
// ============================================================================

/// Builder for creating test Pin instances.
///
/// # Example
/// ```ignore
/// let pin = PinBuilder::new("pin-1")
///     .owner("u-1")
///     .expires_in(Duration::minutes(30))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct PinBuilder {
    id: String,
    description: String,
    location_name: String,
    coordinates: Coordinates,
    owner_user_id: String,
    owner_username: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl PinBuilder {
    /// Create a new builder; the pin expires an hour from now.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let now = Utc::now();
        Self {
            description: format!("Food for {}", &id),
            id,
            location_name: "Marston Basement".to_string(),
            coordinates: CAMPUS,
            owner_user_id: "u-1".to_string(),
            owner_username: "albert".to_string(),
            created_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location_name = location.into();
        self
    }

    pub fn owner(mut self, user_id: impl Into<String>) -> Self {
        self.owner_user_id = user_id.into();
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = at;
        self
    }

    /// Expire `after` from the builder's creation time.
    pub fn expires_in(mut self, after: Duration) -> Self {
        self.expires_at = self.created_at + after;
        self
    }

    pub fn build(self) -> Pin {
        Pin {
            id: self.id,
            description: self.description,
            location_name: self.location_name,
            coordinates: self.coordinates,
            owner_user_id: self.owner_user_id,
            owner_username: self.owner_username,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

/// Create a list of pins with sequential IDs (`pin-0`, `pin-1`, ...).
pub fn pins(count: usize) -> Vec<Pin> {
    (0..count)
        .map(|i| PinBuilder::new(format!("pin-{}", i)).build())
        .collect()
}
