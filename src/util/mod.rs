//! Utility helpers shared across the auth layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns from session and
//! routing logic to improve reuse and testability.

pub mod nav;
