//! Networking modules for the portal REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` issues HTTP requests and classifies responses; `types` defines the
//! wire schema and the session user record.

pub mod api;
pub mod types;
