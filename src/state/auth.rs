//! Auth-session state for the current portal user.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`AuthManager`] is the only writer of the session and of the token store.
//! Views and route guards read snapshots via [`AuthManager::state`] or a
//! `watch` receiver from [`AuthManager::subscribe`].
//!
//! STATES
//! ======
//! `Unresolved` (loading) settles into `Authenticated` or `Anonymous`.
//! Login and logout raise `loading` while in flight.
//!
//! TRADE-OFFS
//! ==========
//! Startup trusts a cached user record without asking the backend, so a
//! flaky network never bounces a signed-in user back to `/login`. The cost:
//! a revoked token keeps its cached identity until the next explicit
//! [`AuthManager::refresh_profile`] sees a 401. Likewise a token with no
//! cached user still counts as authenticated after startup.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use tokio::sync::watch;

use crate::net::api::AuthApi;
use crate::net::types::{ApiError, BackendUser, User};
use crate::store::{ClientStorage, StorageError, TokenStore};
use crate::util::nav::{LOGIN_PATH, Navigator};

// =============================================================================
// STATE
// =============================================================================

/// The client's current belief about who is logged in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub loading: bool,
}

/// Unresolved: nothing is known until startup restoration runs.
impl Default for AuthState {
    fn default() -> Self {
        Self { user: None, token: None, is_authenticated: false, loading: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPhase {
    Unresolved,
    Authenticated,
    Anonymous,
}

impl AuthState {
    #[must_use]
    pub fn anonymous() -> Self {
        Self { loading: false, ..Self::default() }
    }

    #[must_use]
    pub fn authenticated(user: User, token: String) -> Self {
        Self { user: Some(user), token: Some(token), is_authenticated: true, loading: false }
    }

    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        if self.loading {
            AuthPhase::Unresolved
        } else if self.is_authenticated {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Anonymous
        }
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The login request failed for a reason other than rejected credentials.
    #[error("{message}")]
    Login {
        message: String,
        #[source]
        source: ApiError,
    },

    /// The backend accepted the login but the payload is unusable.
    #[error("login response missing {0}")]
    MalformedResponse(&'static str),

    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Prefer the backend's own wording; otherwise describe the cause.
    fn login(source: ApiError) -> Self {
        let message = match source.server_message() {
            Some(message) => message.to_owned(),
            None => format!("Login failed: {source}"),
        };
        Self::Login { message, source }
    }
}

// =============================================================================
// MANAGER
// =============================================================================

/// Session state machine composed from an API client, a token store, and a navigator.
pub struct AuthManager<A, S, N> {
    api: A,
    tokens: TokenStore<S>,
    navigator: N,
    state: watch::Sender<AuthState>,
}

impl<A, S, N> AuthManager<A, S, N>
where
    A: AuthApi,
    S: ClientStorage,
    N: Navigator,
{
    /// A manager in the `Unresolved` phase. Call [`Self::restore`] at bootstrap.
    pub fn new(api: A, tokens: TokenStore<S>, navigator: N) -> Self {
        Self { api, tokens, navigator, state: watch::Sender::new(AuthState::default()) }
    }

    /// Current session snapshot.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore<S> {
        &self.tokens
    }

    #[must_use]
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Startup: settle the session from persisted storage without any request.
    pub fn restore(&self) -> AuthState {
        let next = match self.tokens.read() {
            None => AuthState::anonymous(),
            Some(token) => match self.tokens.read_user() {
                Some(user) => AuthState::authenticated(user, token),
                None => {
                    tracing::debug!("token present without cached user; keeping session");
                    AuthState { user: None, token: Some(token), is_authenticated: true, loading: false }
                }
            },
        };
        tracing::debug!(phase = ?next.phase(), "session restored");
        self.state.send_replace(next.clone());
        next
    }

    /// Returns `Ok(false)` when the backend rejects the credentials; the
    /// session is only changed on `Ok(true)`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] for request failures, unusable payloads (including
    /// an unknown role), or storage failures. The session, in memory and
    /// persisted, is left unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let was_loading = self.state.borrow().loading;
        self.set_loading(true);
        let outcome = self.try_login(email, password).await;
        if !matches!(outcome, Ok(true)) {
            self.set_loading(was_loading);
        }
        outcome
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let envelope = self.api.login(email, password).await.map_err(|error| {
            tracing::warn!(%error, "login request failed");
            AuthError::login(error)
        })?;

        if !envelope.success {
            tracing::info!(message = envelope.message.as_deref().unwrap_or(""), "login rejected");
            return Ok(false);
        }

        let payload = envelope.data.ok_or(AuthError::MalformedResponse("data"))?;
        let token = payload
            .token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MalformedResponse("token"))?;
        let user = payload
            .user
            .ok_or(AuthError::MalformedResponse("user"))?
            .into_session_user(&token)
            .map_err(|error| {
                tracing::warn!(%error, "login response carried an unusable user");
                AuthError::MalformedResponse("user")
            })?;

        self.tokens.save_session(&token, &user).map_err(|error| {
            tracing::warn!(%error, "failed to persist new session; keeping previous one");
            error
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");
        self.state.send_replace(AuthState::authenticated(user, token));
        Ok(true)
    }

    /// Always completes: backend errors are logged, local state is cleared,
    /// and the client is sent to `/login` unless already there.
    pub async fn logout(&self) {
        let token = self.current_token();
        self.set_loading(true);

        if token.is_some() {
            if let Err(error) = self.api.logout().await {
                tracing::warn!(%error, "logout request failed; clearing local session anyway");
            }
        }
        if let Err(error) = self.tokens.clear() {
            tracing::warn!(%error, "failed to clear persisted session");
        }

        self.state.send_replace(AuthState::anonymous());
        tracing::info!("logged out");

        if self.navigator.current_path() != LOGIN_PATH {
            self.navigator.assign(LOGIN_PATH);
        }
    }

    /// Re-fetch the profile. A 401 forces [`Self::logout`]; any other
    /// failure keeps the session and only clears `loading`.
    pub async fn refresh_profile(&self) {
        match self.api.get_profile().await {
            Ok(envelope) if envelope.success => match envelope.data {
                Some(payload) => self.apply_profile(payload.into_user()),
                None => {
                    tracing::warn!("profile response carried no user; keeping session");
                    self.set_loading(false);
                }
            },
            Ok(envelope) => {
                tracing::warn!(message = envelope.message.as_deref().unwrap_or(""), "profile request declined");
                self.set_loading(false);
            }
            Err(error) if error.is_unauthorized() => {
                tracing::warn!(%error, "session rejected by backend; logging out");
                self.logout().await;
            }
            Err(error) => {
                tracing::warn!(%error, "profile refresh failed; keeping session");
                self.set_loading(false);
            }
        }
    }

    fn apply_profile(&self, backend_user: BackendUser) {
        let Some(token) = self.current_token() else {
            tracing::warn!("profile refreshed without a token; keeping session");
            self.set_loading(false);
            return;
        };
        let user = match backend_user.into_session_user(&token) {
            Ok(user) => user,
            Err(error) => {
                tracing::warn!(%error, "profile carried an unusable user; keeping session");
                self.set_loading(false);
                return;
            }
        };
        if let Err(error) = self.tokens.save_user(&user) {
            tracing::warn!(%error, "failed to persist refreshed user");
        }
        self.state.send_replace(AuthState::authenticated(user, token));
    }

    /// In-memory token first, then the persisted one.
    fn current_token(&self) -> Option<String> {
        let in_memory = self.state.borrow().token.clone();
        in_memory.or_else(|| self.tokens.read())
    }

    fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }
}
