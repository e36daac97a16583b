//! Eator API client implementation

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::api::{AuthApi, PinApi};
use super::models::{CreatePinRequest, Credentials, LoginResponse, Pin, UpdatePinRequest};
use crate::config::DEFAULT_API_HOST;
use crate::error::{ApiError, ConfigError, Result};

/// Client-side request ceiling; the hosted API runs on a small free tier
const RATE_LIMIT_PER_SECOND: NonZeroU32 = match NonZeroU32::new(10) {
    Some(n) => n,
    None => panic!("rate limit must be non-zero"),
};

/// Eator REST API client
pub struct EatorClient {
    http: HttpClient,
    base_url: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl EatorClient {
    /// Create a client for a custom API host (e.g. `http://localhost:5001`)
    pub fn with_host(api_host: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let host = api_host.unwrap_or_else(|| DEFAULT_API_HOST.to_string());
        let base_url = host.trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(
                RATE_LIMIT_PER_SECOND,
            ))),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let invalid = || ConfigError::Invalid(format!("API host '{}' is not a valid URL", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn builder(&self, method: Method, segments: &[&str], token: Option<&str>) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send a request and map non-2xx statuses onto [`ApiError`].
    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        self.rate_limiter.until_ready().await;

        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, status);
        debug!("Request failed with {}: {}", status, message);

        let err = match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::CONFLICT => ApiError::Conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Validation(message)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                ApiError::RateLimit(Duration::from_secs(retry_after))
            }
            status if status.is_server_error() => ApiError::ServerError(message),
            status => ApiError::InvalidResponse(format!("Unexpected status code: {}", status)),
        };
        Err(err.into())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "Failed to parse response: {}. Body was: {}",
                e, text
            ))
            .into()
        })
    }
}

/// Pull the human message out of an error body.
///
/// The server answers with `{"message": ..}` or `{"error": ..}`; anything
/// else is shown raw, and an empty body falls back to the status reason.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl AuthApi for EatorClient {
    async fn login(&self, credentials: &Credentials) -> Result<String> {
        let response = self
            .execute(
                self.builder(Method::POST, &["api", "login"], None)?
                    .json(credentials),
            )
            .await?;

        let login: LoginResponse = Self::decode(response).await?;
        Ok(login.token)
    }

    async fn signup(&self, credentials: &Credentials) -> Result<()> {
        self.execute(
            self.builder(Method::POST, &["api", "signup"], None)?
                .json(credentials),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PinApi for EatorClient {
    async fn list_pins(&self) -> Result<Vec<Pin>> {
        let response = self
            .execute(self.builder(Method::GET, &["api", "pins"], None)?)
            .await?;
        Self::decode(response).await
    }

    async fn create_pin(&self, token: &str, request: &CreatePinRequest) -> Result<Pin> {
        let response = self
            .execute(
                self.builder(Method::POST, &["api", "pins"], Some(token))?
                    .json(request),
            )
            .await?;
        Self::decode(response).await
    }

    async fn update_pin(&self, token: &str, id: &str, request: &UpdatePinRequest) -> Result<Pin> {
        let response = self
            .execute(self.builder(Method::PUT, &["api", "pins", id], Some(token))?.json(request))
            .await?;
        Self::decode(response).await
    }

    async fn delete_pin(&self, token: &str, id: &str) -> Result<()> {
        self.execute(self.builder(Method::DELETE, &["api", "pins", id], Some(token))?)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::Coordinates;
    use crate::error::{Error, ErrorKind};

    const PIN_JSON: &str = r#"{
        "_id": "pin-1",
        "description": "Pizza slices",
        "location_name": "Marston Basement",
        "coordinates": {"lat": 29.648, "lng": -82.344},
        "user_id": "u-1",
        "username": "albert",
        "createdAt": "2025-10-14T17:00:00Z",
        "expiresAt": "2025-10-14T18:00:00Z"
    }"#;

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let client = EatorClient::with_host(Some("http://localhost:5001/".to_string())).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5001");

        let client = EatorClient::with_host(None).unwrap();
        assert_eq!(client.base_url(), DEFAULT_API_HOST);
    }

    #[test]
    fn test_pin_id_is_one_encoded_path_segment() {
        let client = EatorClient::with_host(Some("http://localhost:5001".to_string())).unwrap();
        let url = client.url(&["api", "pins", "../a/b?x=1#frag"]).unwrap();
        assert_eq!(url.path(), "/api/pins/..%2Fa%2Fb%3Fx=1%23frag");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = EatorClient::with_host(Some("http://localhost:5001/eator/".to_string())).unwrap();
        let url = client.url(&["api", "pins"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5001/eator/api/pins");
    }

    #[test]
    fn test_unparseable_host_is_config_error() {
        let client = EatorClient::with_host(Some("not a host".to_string())).unwrap();
        let err = client.url(&["api", "pins"]).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message": "Username taken"}"#, StatusCode::CONFLICT),
            "Username taken"
        );
        assert_eq!(
            error_message(r#"{"error": "Missing required fields"}"#, StatusCode::BAD_REQUEST),
            "Missing required fields"
        );
        assert_eq!(error_message("  boom ", StatusCode::BAD_GATEWAY), "boom");
        assert_eq!(error_message("", StatusCode::NOT_FOUND), "Not Found");
    }

    #[tokio::test]
    async fn test_list_pins() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/pins")
            .with_status(200)
            .with_body(format!("[{}]", PIN_JSON))
            .create_async()
            .await;

        let client = EatorClient::with_host(Some(server.url())).unwrap();
        let pins = client.list_pins().await.unwrap();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].id, "pin-1");
        assert_eq!(pins[0].owner_username, "albert");
    }

    #[tokio::test]
    async fn test_list_pins_server_error_is_network_kind() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/pins")
            .with_status(500)
            .with_body(r#"{"error": "db down"}"#)
            .create_async()
            .await;

        let client = EatorClient::with_host(Some(server.url())).unwrap();
        let err = client.list_pins().await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Network));
        assert!(err.to_string().contains("db down"));
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/login")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "username": "albert",
                "password": "chomp"
            })))
            .with_status(200)
            .with_body(r#"{"token": "a.b.c"}"#)
            .create_async()
            .await;

        let client = EatorClient::with_host(Some(server.url())).unwrap();
        let token = client
            .login(&Credentials::new("albert", "chomp"))
            .await
            .unwrap();
        assert_eq!(token, "a.b.c");
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/login")
            .with_status(401)
            .with_body(r#"{"message": "Invalid credentials"}"#)
            .create_async()
            .await;

        let client = EatorClient::with_host(Some(server.url())).unwrap();
        let err = client
            .login(&Credentials::new("albert", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Unauthorized(ref m)) if m == "Invalid credentials"));
    }

    #[tokio::test]
    async fn test_signup_conflict() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/signup")
            .with_status(409)
            .with_body(r#"{"message": "Username already exists"}"#)
            .create_async()
            .await;

        let client = EatorClient::with_host(Some(server.url())).unwrap();
        let err = client
            .signup(&Credentials::new("albert", "chomp"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_pin_sends_bearer_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/pins")
            .match_header("authorization", "Bearer tok-123")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "description": "Pizza slices",
                "location_name": "Marston Basement",
                "duration_minutes": 30
            })))
            .with_status(201)
            .with_body(PIN_JSON)
            .create_async()
            .await;

        let client = EatorClient::with_host(Some(server.url())).unwrap();
        let request = CreatePinRequest {
            description: "Pizza slices".into(),
            location_name: "Marston Basement".into(),
            coordinates: Coordinates { lat: 29.648, lng: -82.344 },
            duration_minutes: Some(30),
        };
        let pin = client.create_pin("tok-123", &request).await.unwrap();
        assert_eq!(pin.id, "pin-1");
    }

    #[tokio::test]
    async fn test_update_pin_forbidden() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("PUT", "/api/pins/pin-1")
            .with_status(403)
            .with_body(r#"{"message": "Not your pin"}"#)
            .create_async()
            .await;

        let client = EatorClient::with_host(Some(server.url())).unwrap();
        let request = UpdatePinRequest {
            description: "x".into(),
            location_name: "y".into(),
            expires_at: chrono::Utc::now(),
        };
        let err = client
            .update_pin("tok", "pin-1", &request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Auth));
    }

    #[tokio::test]
    async fn test_update_pin_over_ceiling_is_validation() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("PUT", "/api/pins/pin-1")
            .with_status(400)
            .with_body(r#"{"message": "Expiration cannot exceed 6 hours"}"#)
            .create_async()
            .await;

        let client = EatorClient::with_host(Some(server.url())).unwrap();
        let request = UpdatePinRequest {
            description: "x".into(),
            location_name: "y".into(),
            expires_at: chrono::Utc::now(),
        };
        let err = client
            .update_pin("tok", "pin-1", &request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_delete_pin_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("DELETE", "/api/pins/pin-1")
            .with_status(204)
            .create_async()
            .await;
        let _missing = server
            .mock("DELETE", "/api/pins/gone")
            .with_status(404)
            .create_async()
            .await;

        let client = EatorClient::with_host(Some(server.url())).unwrap();
        client.delete_pin("tok", "pin-1").await.unwrap();

        let err = client.delete_pin("tok", "gone").await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/pins")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = EatorClient::with_host(Some(server.url())).unwrap();
        let err = client.list_pins().await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::InvalidResponse(_))));
    }
}
