//! Client-side persistence.
//!
//! SYSTEM CONTEXT
//! ==============
//! `storage` abstracts where bytes live; `token` gives the auth layer typed
//! access to the two entries it persists.

pub mod storage;
pub mod token;

pub use storage::{ClientStorage, FileStorage, MemoryStorage, StorageError};
#[cfg(feature = "hydrate")]
pub use storage::LocalStorage;
pub use token::TokenStore;
