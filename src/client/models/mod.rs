//! Eator API data models
//!
//! Wire types for the auth and pin endpoints. Pin timestamps are normalized
//! to UTC on the way in; see [`timestamp`].

mod auth;
mod pin;
pub mod timestamp;

pub use auth::{Credentials, LoginResponse};
pub use pin::{Coordinates, CreatePinRequest, Pin, PinPatch, UpdatePinRequest};
