//! REST client for the portal backend.
//!
//! ARCHITECTURE
//! ============
//! [`AuthApi`] is the narrow surface the session state machine depends on
//! (login, logout, profile). [`HttpApiClient`] implements it over `reqwest`
//! and also carries the admin user operations and record CRUD.
//!
//! ERROR HANDLING
//! ==============
//! Expected rejections come back as an envelope with `success: false`.
//! Everything else (transport failures, non-2xx statuses, undecodable
//! bodies) is an [`ApiError`]; callers branch on [`ApiError::status`].
//! Status/body classification lives in pure functions for testability.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{ApiEnvelope, ApiError, Collection, LoginPayload, ProfilePayload};
use crate::config::PortalConfig;
use crate::store::{ClientStorage, TokenStore};

pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const PROFILE_PATH: &str = "/auth/profile";
pub const REGISTER_PATH: &str = "/auth/register";
pub const ADMIN_USERS_PATH: &str = "/admin/users";
pub const SEND_CREDENTIALS_PATH: &str = "/admin/send-credentials";

// =============================================================================
// TRAIT
// =============================================================================

/// Session-facing backend operations.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Rejected credentials are `Ok` with `success: false`; an [`ApiError`]
    /// means the request itself failed.
    async fn login(&self, email: &str, password: &str) -> Result<ApiEnvelope<LoginPayload>, ApiError>;

    /// `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the backend could not be reached or refused.
    async fn logout(&self) -> Result<(), ApiError>;

    /// `GET /auth/profile`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`]; status 401 means the token is no longer valid.
    async fn get_profile(&self) -> Result<ApiEnvelope<ProfilePayload>, ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

/// `reqwest` client that attaches the stored token as a bearer credential.
#[derive(Clone, Debug)]
pub struct HttpApiClient<S> {
    http: reqwest::Client,
    config: PortalConfig,
    tokens: TokenStore<S>,
}

impl<S: ClientStorage> HttpApiClient<S> {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: PortalConfig, tokens: TokenStore<S>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config, tokens })
    }

    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<(u16, String), ApiError> {
        let url = self.config.endpoint(path);
        tracing::debug!(%method, %url, "portal request");

        let request = self.http.request(method, &url);
        let request = match self.tokens.read() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let request = match body {
            Some(json) => request.json(json),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok((status, text))
    }

    async fn request_json(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let (status, text) = self.send(method, path, body).await?;
        parse_json_response(status, &text)
    }

    // -------------------------------------------------------------------------
    // Admin users
    // -------------------------------------------------------------------------

    /// `GET /admin/users`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn list_users(&self) -> Result<Value, ApiError> {
        self.request_json(Method::GET, ADMIN_USERS_PATH, None).await
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn register_user(&self, user: &Value) -> Result<Value, ApiError> {
        self.request_json(Method::POST, REGISTER_PATH, Some(user)).await
    }

    /// `PUT /admin/users/:id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn update_user(&self, id: &str, changes: &Value) -> Result<Value, ApiError> {
        self.request_json(Method::PUT, &admin_user_path(id, None), Some(changes))
            .await
    }

    /// `DELETE /admin/users/:id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn delete_user(&self, id: &str) -> Result<Value, ApiError> {
        self.request_json(Method::DELETE, &admin_user_path(id, None), None)
            .await
    }

    /// `PATCH /admin/users/:id/toggle-status`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn toggle_user_status(&self, id: &str) -> Result<Value, ApiError> {
        self.request_json(Method::PATCH, &admin_user_path(id, Some("toggle-status")), None)
            .await
    }

    /// `POST /admin/users/:id/reset-password`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn reset_user_password(&self, id: &str) -> Result<Value, ApiError> {
        self.request_json(Method::POST, &admin_user_path(id, Some("reset-password")), None)
            .await
    }

    /// `POST /admin/send-credentials`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn send_credentials(&self, payload: &Value) -> Result<Value, ApiError> {
        self.request_json(Method::POST, SEND_CREDENTIALS_PATH, Some(payload))
            .await
    }

    // -------------------------------------------------------------------------
    // Records
    // -------------------------------------------------------------------------

    /// `GET /{collection}`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn list_records(&self, collection: Collection) -> Result<Value, ApiError> {
        self.request_json(Method::GET, &record_path(collection, None), None)
            .await
    }

    /// `GET /{collection}/:id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn get_record(&self, collection: Collection, id: &str) -> Result<Value, ApiError> {
        self.request_json(Method::GET, &record_path(collection, Some(id)), None)
            .await
    }

    /// `POST /{collection}`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn create_record(&self, collection: Collection, record: &Value) -> Result<Value, ApiError> {
        self.request_json(Method::POST, &record_path(collection, None), Some(record))
            .await
    }

    /// `PUT /{collection}/:id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn update_record(&self, collection: Collection, id: &str, record: &Value) -> Result<Value, ApiError> {
        self.request_json(Method::PUT, &record_path(collection, Some(id)), Some(record))
            .await
    }

    /// `DELETE /{collection}/:id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn delete_record(&self, collection: Collection, id: &str) -> Result<Value, ApiError> {
        self.request_json(Method::DELETE, &record_path(collection, Some(id)), None)
            .await
    }
}

#[async_trait::async_trait]
impl<S: ClientStorage + 'static> AuthApi for HttpApiClient<S> {
    async fn login(&self, email: &str, password: &str) -> Result<ApiEnvelope<LoginPayload>, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let (status, text) = self.send(Method::POST, LOGIN_PATH, Some(&body)).await?;
        classify_login_response(status, &text)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let (status, text) = self.send(Method::POST, LOGOUT_PATH, None).await?;
        if is_success(status) {
            return Ok(());
        }
        Err(status_error(status, &text))
    }

    async fn get_profile(&self) -> Result<ApiEnvelope<ProfilePayload>, ApiError> {
        let (status, text) = self.send(Method::GET, PROFILE_PATH, None).await?;
        parse_envelope_response(status, &text)
    }
}

// =============================================================================
// PATHS
// =============================================================================

fn admin_user_path(id: &str, action: Option<&str>) -> String {
    match action {
        Some(action) => format!("{ADMIN_USERS_PATH}/{id}/{action}"),
        None => format!("{ADMIN_USERS_PATH}/{id}"),
    }
}

fn record_path(collection: Collection, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("/{collection}/{id}"),
        None => format!("/{collection}"),
    }
}

// =============================================================================
// RESPONSE CLASSIFICATION
// =============================================================================

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Build a status error, preferring the envelope `message` over the raw body.
fn status_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(ToOwned::to_owned))
        .unwrap_or_else(|| body.trim().to_owned());
    ApiError::Status { status, message }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Login treats a decodable `success: false` envelope as a structured
/// rejection regardless of status; the backend answers bad credentials
/// with 400/401 plus such a body.
fn classify_login_response(status: u16, body: &str) -> Result<ApiEnvelope<LoginPayload>, ApiError> {
    if is_success(status) {
        return decode(body);
    }
    match serde_json::from_str::<ApiEnvelope<Value>>(body) {
        Ok(envelope) if !envelope.success => Ok(ApiEnvelope { success: false, data: None, message: envelope.message }),
        _ => Err(status_error(status, body)),
    }
}

fn parse_envelope_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<ApiEnvelope<T>, ApiError> {
    if !is_success(status) {
        return Err(status_error(status, body));
    }
    decode(body)
}

/// Empty 2xx bodies (e.g. 204 on delete) become `Value::Null`.
fn parse_json_response(status: u16, body: &str) -> Result<Value, ApiError> {
    if !is_success(status) {
        return Err(status_error(status, body));
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    decode(body)
}
