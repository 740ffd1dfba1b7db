//! # Prefetch Module
//!
//! Single-slot dedupe between speculative loads (a hovered or touched link)
//! and the navigation that usually follows them.
//!
//! [`PrefetchCache`] tracks at most one `{href, hydration}` pair. Prefetching
//! the tracked href again reuses the in-flight hydration; a different href
//! replaces it. A newly tracked hydration is spawned on the current tokio
//! runtime right away. When a navigation starts for the tracked href it
//! takes the shared hydration out of the slot and awaits it instead of
//! hydrating again. There is no eviction, no TTL and no second entry.

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::debug;

use crate::navigation::{HydratedTarget, NavigationError, Navigator};

/// A hydration that several awaiters can share
pub type SharedHydration = Shared<BoxFuture<'static, Result<HydratedTarget, NavigationError>>>;

struct Prefetching {
    href: String,
    hydration: SharedHydration,
}

/// The single prefetch slot
#[derive(Default)]
pub struct PrefetchCache {
    slot: Mutex<Option<Prefetching>>,
}

impl PrefetchCache {
    /// Track `hydration` for `href`, unless `href` is already tracked.
    ///
    /// Returns the hydration now tracked for `href`.
    pub fn set_prefetching(&self, href: &str, hydration: SharedHydration) -> SharedHydration {
        let mut slot = self.slot.lock();
        match slot.as_ref() {
            Some(current) if current.href == href => current.hydration.clone(),
            _ => {
                debug!(href = %href, "Prefetching");
                *slot = Some(Prefetching {
                    href: href.to_string(),
                    hydration: hydration.clone(),
                });
                // Start the work now; awaiters join the same shared future.
                match Handle::try_current() {
                    Ok(runtime) => drop(runtime.spawn(hydration.clone())),
                    Err(_) => debug!(href = %href, "No runtime, prefetch starts when awaited"),
                }
                hydration
            }
        }
    }

    /// Href currently tracked
    #[must_use]
    pub fn href(&self) -> Option<String> {
        self.slot.lock().as_ref().map(|p| p.href.clone())
    }

    /// Take the tracked hydration if it belongs to `href`
    #[must_use]
    pub fn take(&self, href: &str) -> Option<SharedHydration> {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|p| p.href == href) {
            slot.take().map(|p| p.hydration)
        } else {
            None
        }
    }

    /// Drop whatever is tracked
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}

impl std::fmt::Debug for PrefetchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefetchCache")
            .field("href", &self.href())
            .finish()
    }
}

impl Navigator {
    /// Start hydrating `href` ahead of a likely navigation.
    ///
    /// Returns `None` if `href` is not a client route. Repeated calls for the
    /// same href share one hydration, which starts running immediately when
    /// called inside a tokio runtime.
    #[must_use]
    pub fn prefetch(&self, href: &str) -> Option<SharedHydration> {
        let target = self.routes().resolve(href)?;
        let navigator = self.clone();
        let href = target.href.clone();
        let hydration = async move { navigator.hydrate_target(&target).await }
            .boxed()
            .shared();
        Some(self.inner.prefetching.set_prefetching(&href, hydration))
    }

    /// Href of the pending prefetch, if any
    #[must_use]
    pub fn prefetching(&self) -> Option<String> {
        self.inner.prefetching.href()
    }
}
