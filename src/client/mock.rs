//! Mock Eator API client for testing
//!
//! Provides an in-memory implementation of the API traits for unit testing
//! without making real API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::api::{AuthApi, PinApi};
use super::models::{CreatePinRequest, Credentials, Pin, UpdatePinRequest};
use crate::error::{ApiError, Result};
use crate::session::decode_token;

/// Mock API client for testing.
///
/// Pins live in an in-memory store, so a create followed by a list returns
/// the new pin, the way the real server behaves.
///
/// # Example
/// ```ignore
/// let mock = MockEatorClient::new().with_pins(fixtures::pins(3)).await;
/// assert_eq!(mock.list_pins().await?.len(), 3);
/// ```
#[derive(Default)]
pub struct MockEatorClient {
    /// Server-side pin store
    pins: Arc<Mutex<Vec<Pin>>>,
    /// Token returned from login
    login_token: Arc<Mutex<Option<String>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Scripted list responses: each list call pops one (delay, pins)
    list_script: Arc<Mutex<VecDeque<(Duration, Vec<Pin>)>>>,
    /// How long a delete takes to answer
    delete_delay: Arc<Mutex<Duration>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Next generated pin number
    next_id: Arc<Mutex<usize>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub login: usize,
    pub signup: usize,
    pub list_pins: usize,
    pub create_pin: usize,
    pub update_pin: usize,
    pub delete_pin: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.login
            + self.signup
            + self.list_pins
            + self.create_pin
            + self.update_pin
            + self.delete_pin
    }

    /// Number of mutating calls.
    pub fn mutations(&self) -> usize {
        self.create_pin + self.update_pin + self.delete_pin
    }
}

impl MockEatorClient {
    /// Create a new mock client with an empty pin store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the server-side pin store.
    pub async fn with_pins(self, pins: Vec<Pin>) -> Self {
        *self.pins.lock().await = pins;
        self
    }

    /// Configure the token returned from login.
    pub async fn with_login_token(self, token: &str) -> Self {
        *self.login_token.lock().await = Some(token.to_string());
        self
    }

    /// Configure an error to return on the next API call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Queue list responses that resolve after a delay, in call order.
    pub async fn with_list_script(self, script: Vec<(Duration, Vec<Pin>)>) -> Self {
        *self.list_script.lock().await = script.into();
        self
    }

    /// Make every delete resolve after a delay.
    pub async fn with_delete_delay(self, delay: Duration) -> Self {
        *self.delete_delay.lock().await = delay;
        self
    }

    /// Arm a one-shot error on an already-built mock.
    pub async fn fail_next(&self, error: ApiError) {
        *self.error.lock().await = Some(error);
    }

    /// Snapshot of the server-side store.
    pub async fn stored_pins(&self) -> Vec<Pin> {
        self.pins.lock().await.clone()
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Check if there's a pending error and consume it.
    async fn check_error(&self) -> Result<()> {
        let mut error = self.error.lock().await;
        if let Some(e) = error.take() {
            return Err(e.into());
        }
        Ok(())
    }

    fn owner_of(token: &str) -> String {
        decode_token(token, Utc::now())
            .map(|s| s.user_id)
            .unwrap_or_else(|_| "mock-user".to_string())
    }
}

// ============================================================================
// AuthApi Implementation
// ============================================================================

#[async_trait]
impl AuthApi for MockEatorClient {
    async fn login(&self, _credentials: &Credentials) -> Result<String> {
        self.call_count.lock().await.login += 1;
        self.check_error().await?;

        let token = self.login_token.lock().await;
        Ok(token.clone().unwrap_or_else(|| "mock.jwt.token".to_string()))
    }

    async fn signup(&self, _credentials: &Credentials) -> Result<()> {
        self.call_count.lock().await.signup += 1;
        self.check_error().await?;
        Ok(())
    }
}

// ============================================================================
// PinApi Implementation
// ============================================================================

#[async_trait]
impl PinApi for MockEatorClient {
    async fn list_pins(&self) -> Result<Vec<Pin>> {
        self.call_count.lock().await.list_pins += 1;
        self.check_error().await?;

        let scripted = self.list_script.lock().await.pop_front();
        if let Some((delay, pins)) = scripted {
            tokio::time::sleep(delay).await;
            return Ok(pins);
        }

        Ok(self.pins.lock().await.clone())
    }

    async fn create_pin(&self, token: &str, request: &CreatePinRequest) -> Result<Pin> {
        self.call_count.lock().await.create_pin += 1;
        self.check_error().await?;

        let id = {
            let mut next = self.next_id.lock().await;
            *next += 1;
            format!("mock-pin-{}", *next)
        };

        let now = Utc::now();
        let minutes = request.duration_minutes.unwrap_or(60);
        let owner = Self::owner_of(token);
        let pin = Pin {
            id,
            description: request.description.clone(),
            location_name: request.location_name.clone(),
            coordinates: request.coordinates,
            owner_username: format!("{}-name", owner),
            owner_user_id: owner,
            created_at: now,
            expires_at: now + chrono::Duration::minutes(i64::from(minutes)),
        };

        self.pins.lock().await.push(pin.clone());
        Ok(pin)
    }

    async fn update_pin(&self, _token: &str, id: &str, request: &UpdatePinRequest) -> Result<Pin> {
        self.call_count.lock().await.update_pin += 1;
        self.check_error().await?;

        let mut pins = self.pins.lock().await;
        let pin = pins
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("Pin {} not found", id)))?;

        pin.description = request.description.clone();
        pin.location_name = request.location_name.clone();
        pin.expires_at = request.expires_at;
        Ok(pin.clone())
    }

    async fn delete_pin(&self, _token: &str, id: &str) -> Result<()> {
        self.call_count.lock().await.delete_pin += 1;
        let delay = *self.delete_delay.lock().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.check_error().await?;

        let mut pins = self.pins.lock().await;
        let before = pins.len();
        pins.retain(|p| p.id != id);
        if pins.len() == before {
            return Err(ApiError::NotFound(format!("Pin {} not found", id)).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::{CAMPUS, pins};

    fn request(description: &str) -> CreatePinRequest {
        CreatePinRequest {
            description: description.to_string(),
            location_name: "Turlington".to_string(),
            coordinates: CAMPUS,
            duration_minutes: Some(15),
        }
    }

    #[tokio::test]
    async fn test_mock_client_default_empty() {
        let mock = MockEatorClient::new();
        assert!(mock.list_pins().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_client_with_pins() {
        let mock = MockEatorClient::new().with_pins(pins(3)).await;
        assert_eq!(mock.list_pins().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_client_with_error_is_one_shot() {
        let mock = MockEatorClient::new()
            .with_error(ApiError::Network("offline".into()))
            .await;

        assert!(mock.list_pins().await.is_err());
        assert!(mock.list_pins().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_create_then_list_includes_pin() {
        let mock = MockEatorClient::new();
        let pin = mock.create_pin("tok", &request("Bagels")).await.unwrap();

        let listed = mock.list_pins().await.unwrap();
        assert!(listed.iter().any(|p| p.id == pin.id));
        assert_eq!(pin.owner_user_id, "mock-user");
        assert_eq!((pin.expires_at - pin.created_at).num_minutes(), 15);
    }

    #[tokio::test]
    async fn test_mock_delete_then_list_excludes_pin() {
        let mock = MockEatorClient::new().with_pins(pins(2)).await;
        mock.delete_pin("tok", "pin-0").await.unwrap();

        let listed = mock.list_pins().await.unwrap();
        assert!(listed.iter().all(|p| p.id != "pin-0"));
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_delete_missing_is_not_found() {
        let mock = MockEatorClient::new();
        let err = mock.delete_pin("tok", "nope").await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_mock_call_counts() {
        let mock = MockEatorClient::new().with_pins(pins(1)).await;
        mock.list_pins().await.unwrap();
        mock.create_pin("tok", &request("Cake")).await.unwrap();
        mock.delete_pin("tok", "pin-0").await.unwrap();

        let counts = mock.call_counts().await;
        assert_eq!(counts.list_pins, 1);
        assert_eq!(counts.mutations(), 2);
        assert_eq!(counts.total(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_list_script_pops_in_order() {
        let mock = MockEatorClient::new()
            .with_list_script(vec![
                (Duration::from_secs(2), pins(1)),
                (Duration::from_millis(10), pins(2)),
            ])
            .await;

        assert_eq!(mock.list_pins().await.unwrap().len(), 1);
        assert_eq!(mock.list_pins().await.unwrap().len(), 2);
        // Script exhausted: falls back to the store
        assert!(mock.list_pins().await.unwrap().is_empty());
    }
}
