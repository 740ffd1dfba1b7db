//! # Goto Module
//!
//! Programmatic navigation and the browser-history collaborator.
//!
//! [`Navigator::goto`] resolves an href against the current location. A
//! client route gets a history entry (pushed, or replacing the current one)
//! and is navigated to. Anything else is handed to [`History::assign`] for a
//! full document load, and the returned future never resolves: the document
//! is about to be replaced, so nothing after it should run.

use std::sync::atomic::Ordering;

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::navigation::{NavigationError, Navigator};

/// State stored with each history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub id: u64,
}

/// Options of [`Navigator::goto`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GotoOptions {
    /// Replace the current history entry instead of pushing a new one
    pub replace_state: bool,
}

/// Browser history and location
pub trait History: Send + Sync {
    /// Absolute URL currently shown
    fn location(&self) -> String;
    fn push_state(&self, state: HistoryState, href: &str);
    fn replace_state(&self, state: HistoryState, href: &str);
    /// Full document navigation to `href`
    fn assign(&self, href: &str);
}

/// One entry of a [`MemoryHistory`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub href: String,
    pub state: Option<HistoryState>,
}

#[derive(Debug)]
struct MemoryHistoryState {
    entries: Vec<HistoryEntry>,
    index: usize,
    assigned: Vec<String>,
}

/// In-memory [`History`] for tests and non-browser hosts
#[derive(Debug)]
pub struct MemoryHistory {
    state: Mutex<MemoryHistoryState>,
}

impl MemoryHistory {
    /// History with a single entry at `href`
    #[must_use]
    pub fn new(href: &str) -> Self {
        Self {
            state: Mutex::new(MemoryHistoryState {
                entries: vec![HistoryEntry {
                    href: href.to_string(),
                    state: None,
                }],
                index: 0,
                assigned: Vec::new(),
            }),
        }
    }

    /// Every entry, oldest first
    #[must_use]
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.state.lock().entries.clone()
    }

    /// The entry currently shown
    #[must_use]
    pub fn current(&self) -> Option<HistoryEntry> {
        let state = self.state.lock();
        state.entries.get(state.index).cloned()
    }

    /// Hrefs handed over for full document loads
    #[must_use]
    pub fn assigned(&self) -> Vec<String> {
        self.state.lock().assigned.clone()
    }

    /// Step back one entry, returning the entry now shown
    pub fn back(&self) -> Option<HistoryEntry> {
        let mut state = self.state.lock();
        if state.index == 0 {
            return None;
        }
        state.index -= 1;
        state.entries.get(state.index).cloned()
    }

    fn resolve(state: &MemoryHistoryState, href: &str) -> String {
        state
            .entries
            .get(state.index)
            .and_then(|entry| Url::parse(&entry.href).ok())
            .and_then(|base| base.join(href).ok())
            .map_or_else(|| href.to_string(), String::from)
    }
}

impl History for MemoryHistory {
    fn location(&self) -> String {
        self.current().map(|entry| entry.href).unwrap_or_default()
    }

    fn push_state(&self, history_state: HistoryState, href: &str) {
        let mut state = self.state.lock();
        let href = Self::resolve(&state, href);
        let index = state.index + 1;
        state.entries.truncate(index);
        state.entries.push(HistoryEntry {
            href,
            state: Some(history_state),
        });
        state.index = index;
    }

    fn replace_state(&self, history_state: HistoryState, href: &str) {
        let mut state = self.state.lock();
        let href = Self::resolve(&state, href);
        let index = state.index;
        if let Some(entry) = state.entries.get_mut(index) {
            *entry = HistoryEntry {
                href,
                state: Some(history_state),
            };
        }
    }

    fn assign(&self, href: &str) {
        let mut state = self.state.lock();
        let href = Self::resolve(&state, href);
        state.assigned.push(href);
    }
}

impl Navigator {
    /// Navigate to `href` programmatically.
    ///
    /// # Errors
    ///
    /// [`NavigationError::ConflictingRedirect`] from the navigation. For an
    /// href that is not a client route the future never completes.
    #[must_use]
    pub fn goto(&self, href: &str, options: GotoOptions) -> BoxFuture<'static, Result<(), NavigationError>> {
        let navigator = self.clone();
        let href = href.to_string();

        async move {
            let history = &navigator.inner.history;
            let target = Url::parse(&history.location())
                .and_then(|base| base.join(&href))
                .ok()
                .and_then(|url| navigator.select_target(&url));

            let Some(target) = target else {
                info!(href = %href, "Not a client route, loading document");
                history.assign(&href);
                return future::pending().await;
            };

            let id = navigator.next_history_id();
            let state = HistoryState { id };
            if options.replace_state {
                history.replace_state(state, &target.href);
            } else {
                history.push_state(state, &target.href);
            }
            debug!(href = %target.href, id, replace = options.replace_state, "History updated");

            navigator.navigate(target, Some(id)).await
        }
        .boxed()
    }

    /// Handle a history traversal.
    ///
    /// An entry with state is navigated to as that entry. A state-less entry
    /// (a fragment change) gets a fresh id stamped onto it.
    ///
    /// # Errors
    ///
    /// [`NavigationError::ConflictingRedirect`] from the navigation.
    pub async fn on_popstate(&self, state: Option<HistoryState>) -> Result<(), NavigationError> {
        let history = &self.inner.history;
        let location = history.location();

        match state {
            Some(state) => match self.routes().resolve(&location) {
                Some(target) => self.navigate(target, Some(state.id)).await,
                None => {
                    history.assign(&location);
                    Ok(())
                }
            },
            None => {
                let id = self.next_history_id();
                self.inner.cid.store(id, Ordering::SeqCst);
                history.replace_state(HistoryState { id }, &location);
                Ok(())
            }
        }
    }

    /// History entry id of the page currently shown
    #[must_use]
    pub fn history_id(&self) -> u64 {
        self.inner.cid.load(Ordering::SeqCst)
    }
}
