use std::fmt;

use serde::{Serialize, Serializer};

/// Error raised while hydrating or committing a navigation
///
/// Apart from [`NavigationError::ConflictingRedirect`], these never escape a
/// navigation: they are recorded as the `{status, error}` of the rendered
/// props and shown through the error component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// Two different redirects were requested during one navigation
    ConflictingRedirect {
        /// `(status, location)` requested first
        existing: (u16, String),
        /// `(status, location)` that conflicted with it
        requested: (u16, String),
    },
    /// A preload function failed, or reported an error through its context
    Preload {
        /// HTTP-style status to render
        status: u16,
        message: String,
    },
    /// A component module could not be loaded
    ComponentLoad { component: String, message: String },
    /// A `fetch` issued from a preload failed
    Fetch { url: String, message: String },
}

impl NavigationError {
    /// Build a preload error from any displayable value
    pub fn preload(status: u16, message: impl fmt::Display) -> Self {
        NavigationError::Preload {
            status,
            message: message.to_string(),
        }
    }

    /// Status rendered for this error
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            NavigationError::Preload { status, .. } => *status,
            _ => 500,
        }
    }

    /// Message rendered for this error
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            NavigationError::Preload { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::ConflictingRedirect {
                existing,
                requested,
            } => write!(
                f,
                "Conflicting redirects: {} {} then {} {}",
                existing.0, existing.1, requested.0, requested.1
            ),
            NavigationError::Preload { status, message } => {
                write!(f, "Preload failed ({status}): {message}")
            }
            NavigationError::ComponentLoad { component, message } => {
                write!(f, "Failed to load component {component}: {message}")
            }
            NavigationError::Fetch { url, message } => {
                write!(f, "Fetch {url} failed: {message}")
            }
        }
    }
}

impl std::error::Error for NavigationError {}

impl Serialize for NavigationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.message())
    }
}
