//! Wire types shared by the portal client and its backend.
//!
//! DESIGN
//! ======
//! The backend speaks a `{ success, data, message }` envelope and is loose
//! about field naming (`uuid` vs `id`, snake vs camel case). Backend records
//! are decoded into [`BackendUser`] and then mapped onto the session-facing
//! [`User`], whose serialized form is the one persisted by the token store.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend requests.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("server responded with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the bearer credential.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Human-readable message supplied by the backend, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } if !message.trim().is_empty() => Some(message.trim()),
            _ => None,
        }
    }
}

// =============================================================================
// ROLE
// =============================================================================

/// Portal role. Gates which dashboard and which protected views a user reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::Student, Role::Parent];

    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Parent => "parent",
        }
    }

    /// Parse a role name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|role| role.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role string outside the closed `admin | teacher | student | parent` set.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

// =============================================================================
// SESSION USER
// =============================================================================

/// The signed-in user as the session sees it.
///
/// This is also the JSON shape written to client storage, so field names
/// stay stable across releases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity key. Older cached records call it `uuid`.
    #[serde(alias = "uuid", deserialize_with = "deserialize_id")]
    pub id: String,
    /// School-issued identifier shown to users (e.g. `"STU-0042"`).
    #[serde(rename = "userID", default)]
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub access_token: String,
}

impl User {
    /// `"First Last"`, skipping empty parts.
    #[must_use]
    pub fn display_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// =============================================================================
// BACKEND PAYLOADS
// =============================================================================

/// Standard response envelope used by every backend endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// User record as the backend sends it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BackendUser {
    #[serde(alias = "uuid", alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, alias = "userID", alias = "userId", deserialize_with = "deserialize_optional_id")]
    pub user_id: String,
    pub email: String,
    #[serde(default, alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lastName")]
    pub last_name: String,
    /// Raw role name; checked against [`Role`] in [`Self::into_session_user`].
    pub role: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl BackendUser {
    /// Map backend field names onto the session user, attaching the bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownRole`] if the role is outside the portal's role set.
    pub fn into_session_user(self, access_token: &str) -> Result<User, UnknownRole> {
        let role = self.role.parse()?;
        Ok(User {
            id: self.id,
            user_id: self.user_id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role,
            address: self.address.filter(|address| !address.trim().is_empty()),
            access_token: access_token.to_owned(),
        })
    }
}

/// `data` of a successful `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginPayload {
    #[serde(default, alias = "accessToken", alias = "access_token")]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<BackendUser>,
}

/// `data` of a successful `GET /auth/profile`: either `{ user: {...} }` or the
/// bare user record.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProfilePayload {
    Wrapped { user: BackendUser },
    Bare(BackendUser),
}

impl ProfilePayload {
    #[must_use]
    pub fn into_user(self) -> BackendUser {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

// =============================================================================
// RECORD COLLECTIONS
// =============================================================================

/// Backend record collections managed through generic CRUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Courses,
    Assignments,
    Exams,
    Fees,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Courses,
        Collection::Assignments,
        Collection::Exams,
        Collection::Fees,
    ];

    /// Path segment, also accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Courses => "courses",
            Self::Assignments => "assignments",
            Self::Exams => "exams",
            Self::Fees => "fees",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection `{0}` (expected courses, assignments, exams or fees)")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        Self::ALL
            .into_iter()
            .find(|collection| collection.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| UnknownCollection(s.to_owned()))
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Accept identifiers sent either as strings or as integers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(number) if number.is_i64() || number.is_u64() => Ok(number.to_string()),
        other => Err(D::Error::custom(format!("expected string or integer id, got {other}"))),
    }
}

/// Like [`deserialize_id`], but `null` reads as an empty id.
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(value) => deserialize_id(value).map_err(D::Error::custom),
    }
}
