use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::NavigationError;
use crate::fetch::{FetchOptions, FetchResponse, Fetcher};

/// A redirect requested by a preload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub status: u16,
    pub location: String,
}

#[derive(Default)]
struct ContextState {
    redirect: Option<Redirect>,
    conflict: Option<NavigationError>,
    error: Option<NavigationError>,
}

/// Context shared by every preload of one navigation
///
/// Cloning is cheap; all clones record into the same navigation.
#[derive(Clone)]
pub struct PreloadContext {
    fetcher: Arc<dyn Fetcher>,
    state: Arc<Mutex<ContextState>>,
}

impl PreloadContext {
    pub(crate) fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            state: Arc::new(Mutex::new(ContextState::default())),
        }
    }

    /// Issue a request through the navigator's fetcher
    pub fn fetch(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> BoxFuture<'static, Result<FetchResponse, NavigationError>> {
        self.fetcher.fetch(url, options)
    }

    /// Request a redirect instead of rendering this navigation.
    ///
    /// Repeating the same redirect is fine.
    ///
    /// # Errors
    ///
    /// [`NavigationError::ConflictingRedirect`] if a different redirect was
    /// already requested. The conflict is also recorded on the context, so the
    /// navigation fails even if the preload ignores the error.
    pub fn redirect(&self, status: u16, location: impl Into<String>) -> Result<(), NavigationError> {
        let requested = Redirect {
            status,
            location: location.into(),
        };
        let mut state = self.state.lock();

        match state.redirect.clone() {
            Some(existing) if existing != requested => {
                let err = NavigationError::ConflictingRedirect {
                    existing: (existing.status, existing.location),
                    requested: (requested.status, requested.location),
                };
                warn!(error = %err, "Conflicting redirect requested");
                state.conflict.get_or_insert_with(|| err.clone());
                Err(err)
            }
            Some(_) => Ok(()),
            None => {
                debug!(status, location = %requested.location, "Redirect requested");
                state.redirect = Some(requested);
                Ok(())
            }
        }
    }

    /// Record an error to render for this navigation.
    ///
    /// The first error recorded wins; later calls are ignored.
    pub fn error(&self, status: u16, message: impl Into<String>) {
        let mut state = self.state.lock();
        if state.error.is_none() {
            state.error = Some(NavigationError::Preload {
                status,
                message: message.into(),
            });
        }
    }

    pub(crate) fn take_redirect(&self) -> Option<Redirect> {
        self.state.lock().redirect.take()
    }

    pub(crate) fn take_conflict(&self) -> Option<NavigationError> {
        self.state.lock().conflict.take()
    }

    pub(crate) fn take_error(&self) -> Option<NavigationError> {
        self.state.lock().error.take()
    }
}

impl std::fmt::Debug for PreloadContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PreloadContext")
            .field("redirect", &state.redirect)
            .field("error", &state.error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;

    struct NoFetch;

    impl Fetcher for NoFetch {
        fn fetch(
            &self,
            url: &str,
            _options: FetchOptions,
        ) -> BoxFuture<'static, Result<FetchResponse, NavigationError>> {
            let url = url.to_string();
            async move {
                Err(NavigationError::Fetch {
                    url,
                    message: "offline".to_string(),
                })
            }
            .boxed()
        }
    }

    fn context() -> PreloadContext {
        PreloadContext::new(Arc::new(NoFetch))
    }

    #[test]
    fn test_identical_redirects_are_idempotent() {
        let ctx = context();
        ctx.redirect(301, "/x").unwrap();
        ctx.redirect(301, "/x").unwrap();
        assert!(ctx.take_conflict().is_none());
        assert_eq!(
            ctx.take_redirect(),
            Some(Redirect {
                status: 301,
                location: "/x".to_string()
            })
        );
    }

    #[test]
    fn test_conflicting_redirects_fail() {
        let ctx = context();
        ctx.redirect(301, "/x").unwrap();
        let err = ctx.redirect(302, "/y").unwrap_err();
        assert_eq!(
            err,
            NavigationError::ConflictingRedirect {
                existing: (301, "/x".to_string()),
                requested: (302, "/y".to_string()),
            }
        );
        assert_eq!(ctx.take_conflict(), Some(err));
    }

    #[test]
    fn test_first_error_wins() {
        let ctx = context();
        ctx.error(404, "Not found");
        ctx.error(500, "Deeper failure");
        assert_eq!(ctx.take_error(), Some(NavigationError::preload(404, "Not found")));
    }

    #[tokio::test]
    async fn test_fetch_passthrough() {
        let ctx = context();
        let err = ctx.fetch("/data.json", FetchOptions::default()).await.unwrap_err();
        assert_eq!(err.status(), 500);
        assert!(err.to_string().contains("/data.json"));
    }
}
