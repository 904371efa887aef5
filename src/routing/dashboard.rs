//! Role-specific dashboard paths.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use crate::net::types::Role;

/// Landing path for roles the portal does not recognize.
pub const FALLBACK_DASHBOARD: &str = "/dashboard";

/// Id used when none is supplied.
pub const DEFAULT_DASHBOARD_ID: &str = "1";

/// Map a raw role string and optional user id to a dashboard path.
///
/// Unknown roles land on [`FALLBACK_DASHBOARD`]. A missing or blank id
/// becomes [`DEFAULT_DASHBOARD_ID`].
#[must_use]
pub fn resolve_dashboard(role: &str, id: Option<&str>) -> String {
    match Role::parse(role) {
        Some(role) => role.dashboard_path(id),
        None => FALLBACK_DASHBOARD.to_owned(),
    }
}

impl Role {
    /// `/portal/{role}/{id}/dashboard`.
    #[must_use]
    pub fn dashboard_path(self, id: Option<&str>) -> String {
        let id = id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_DASHBOARD_ID);
        format!("/portal/{}/{id}/dashboard", self.as_str())
    }
}
