//! Session state shared by views and route guards.

pub mod auth;

pub use auth::{AuthError, AuthManager, AuthPhase, AuthState};
