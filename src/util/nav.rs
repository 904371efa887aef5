//! Navigation capability injected into the auth layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session state machine and the route guard decide *where* to go; a
//! [`Navigator`] performs the move. Tests and the CLI use
//! [`MemoryNavigator`], which only records requests.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use std::sync::{Arc, Mutex, PoisonError};

pub const LOGIN_PATH: &str = "/login";

pub trait Navigator: Send + Sync {
    /// Path of the current location (no query or fragment).
    fn current_path(&self) -> String;

    /// Client-side route change that replaces the current entry.
    fn navigate(&self, path: &str);

    /// Full page navigation, discarding in-memory UI state.
    fn assign(&self, path: &str);
}

/// A navigation request recorded by [`MemoryNavigator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Route(String),
    FullPage(String),
}

impl Navigation {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Route(path) | Self::FullPage(path) => path,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryNavState {
    current: String,
    history: Vec<Navigation>,
}

/// Records navigation requests and tracks the resulting path. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct MemoryNavigator {
    inner: Arc<Mutex<MemoryNavState>>,
}

impl MemoryNavigator {
    #[must_use]
    pub fn new(start: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryNavState { current: start.to_owned(), history: Vec::new() })),
        }
    }

    #[must_use]
    pub fn history(&self) -> Vec<Navigation> {
        self.lock().history.clone()
    }

    /// Drain recorded requests, keeping the current path.
    pub fn take_history(&self) -> Vec<Navigation> {
        std::mem::take(&mut self.lock().history)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryNavState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, navigation: Navigation) {
        let mut state = self.lock();
        navigation.path().clone_into(&mut state.current);
        state.history.push(navigation);
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.lock().current.clone()
    }

    fn navigate(&self, path: &str) {
        self.record(Navigation::Route(path.to_owned()));
    }

    fn assign(&self, path: &str) {
        self.record(Navigation::FullPage(path.to_owned()));
    }
}

/// `window.location`-backed navigator.
///
/// Without a client router both moves go through `Location`; `navigate`
/// uses `replace` so the guarded page is not left in history.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

#[cfg(feature = "hydrate")]
impl Navigator for BrowserNavigator {
    fn current_path(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_default()
    }

    fn navigate(&self, path: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().replace(path);
        }
    }

    fn assign(&self, path: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(path);
        }
    }
}
