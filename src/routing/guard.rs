//! Access control for protected views.
//!
//! SYSTEM CONTEXT
//! ==============
//! A [`RouteGuard`] wraps one protected view. It reads an [`AuthState`]
//! snapshot, never mutates it, and asks a [`Navigator`] to move the client
//! when access is denied.
//!
//! DECISIONS
//! =========
//! - Unresolved session: render a placeholder, navigate nowhere.
//! - No user: redirect to `/login`.
//! - Role outside the allow-list: redirect to the user's own dashboard.
//! - Otherwise: render the view.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::net::types::Role;
use crate::state::auth::AuthState;
use crate::util::nav::{LOGIN_PATH, Navigator};

/// Outcome of checking a session against a guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Loading,
    Redirect(String),
    Allow,
}

/// What a guarded route shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardedView<V> {
    /// Blocking placeholder while the session resolves.
    Loading,
    /// Nothing is rendered while a redirect is in flight.
    Redirecting,
    View(V),
}

impl<V> GuardedView<V> {
    #[must_use]
    pub fn into_view(self) -> Option<V> {
        match self {
            Self::View(view) => Some(view),
            Self::Loading | Self::Redirecting => None,
        }
    }
}

/// Guard for one protected route. `None` allows any authenticated role.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteGuard {
    allowed_roles: Option<Vec<Role>>,
}

impl RouteGuard {
    /// Any signed-in user passes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only users whose role is listed pass.
    #[must_use]
    pub fn allow(roles: impl IntoIterator<Item = Role>) -> Self {
        Self { allowed_roles: Some(roles.into_iter().collect()) }
    }

    #[must_use]
    pub fn allowed_roles(&self) -> Option<&[Role]> {
        self.allowed_roles.as_deref()
    }

    #[must_use]
    pub fn evaluate(&self, state: &AuthState) -> GuardDecision {
        if state.loading {
            return GuardDecision::Loading;
        }
        let Some(user) = state.user.as_ref() else {
            return GuardDecision::Redirect(LOGIN_PATH.to_owned());
        };
        match self.allowed_roles() {
            Some(roles) if !roles.contains(&user.role) => {
                GuardDecision::Redirect(user.role.dashboard_path(Some(&user.id)))
            }
            _ => GuardDecision::Allow,
        }
    }

    /// Evaluate and act. `view` only runs when access is allowed.
    pub fn render<N, V, F>(&self, state: &AuthState, navigator: &N, view: F) -> GuardedView<V>
    where
        N: Navigator + ?Sized,
        F: FnOnce() -> V,
    {
        match self.evaluate(state) {
            GuardDecision::Loading => GuardedView::Loading,
            GuardDecision::Allow => GuardedView::View(view()),
            GuardDecision::Redirect(path) => {
                if navigator.current_path() == path {
                    tracing::debug!(%path, "already at redirect target");
                } else {
                    tracing::debug!(%path, "guard redirect");
                    navigator.navigate(&path);
                }
                GuardedView::Redirecting
            }
        }
    }
}
