//! Authentication API trait

use async_trait::async_trait;

use crate::client::models::Credentials;
use crate::error::Result;

/// Account operations for the Eator API
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a raw session token
    async fn login(&self, credentials: &Credentials) -> Result<String>;

    /// Create an account. Does not log in.
    async fn signup(&self, credentials: &Credentials) -> Result<()>;
}
