//! Client route decisions.
//!
//! SYSTEM CONTEXT
//! ==============
//! `dashboard` maps a role to its landing path; `guard` decides whether a
//! protected view renders, waits, or redirects.

pub mod dashboard;
pub mod guard;

pub use dashboard::resolve_dashboard;
pub use guard::{GuardDecision, GuardedView, RouteGuard};
