//! Pin API trait

use async_trait::async_trait;

use crate::client::models::{CreatePinRequest, Pin, UpdatePinRequest};
use crate::error::Result;

/// Pin CRUD operations for the Eator API
///
/// Every call is single-shot. Mutations need a bearer token; listing does not.
#[async_trait]
pub trait PinApi: Send + Sync {
    /// Fetch every pin the server currently holds
    async fn list_pins(&self) -> Result<Vec<Pin>>;

    async fn create_pin(&self, token: &str, request: &CreatePinRequest) -> Result<Pin>;

    async fn update_pin(&self, token: &str, id: &str, request: &UpdatePinRequest) -> Result<Pin>;

    /// Delete a pin. A missing pin is an error, not a no-op.
    async fn delete_pin(&self, token: &str, id: &str) -> Result<()>;
}
