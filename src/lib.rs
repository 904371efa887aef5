//! Client-side authentication layer for the school portal.
//!
//! SYSTEM CONTEXT
//! ==============
//! `store` persists the bearer token and cached user, `net` talks to the REST
//! backend, `state` owns the session state machine, and `routing` decides
//! what a protected route shows. `util::nav` abstracts client navigation so
//! the whole layer runs natively and in tests; the `hydrate` feature adds
//! browser-backed storage and navigation.

pub mod config;
pub mod net;
pub mod routing;
pub mod state;
pub mod store;
pub mod util;
