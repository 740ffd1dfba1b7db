use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::branch::{BranchEntry, PageContext, Props};
use super::error::NavigationError;

/// Applies committed navigation results to the visible UI
///
/// Called synchronously, under the commit lock, only for the live
/// navigation. Implementations must not block on other navigations.
pub trait Renderer: Send + Sync {
    fn render(&self, props: &Props, branch: &[BranchEntry], page: &PageContext);
}

/// Renderer that only logs what would be shown
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRenderer;

impl Renderer for TracingRenderer {
    fn render(&self, props: &Props, branch: &[BranchEntry], page: &PageContext) {
        debug!(
            path = %page.page.path,
            status = props.status,
            depth = branch.len(),
            recomputed = props.levels.len(),
            error = ?props.error,
            "Render"
        );
    }
}

/// Server-rendered state a navigator starts from
///
/// `preloaded[0]` is the root layout's props and `preloaded[i + 1]` the props
/// of branch depth `i`. Until the first commit, seeded levels are used
/// instead of running their preload; `null` entries are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialData {
    pub preloaded: Vec<Value>,
    pub session: Value,
    pub status: Option<u16>,
    /// Error the server rendered; `start` shows the error page for it
    pub error: Option<String>,
}

impl InitialData {
    /// Seeded props at `index`, if any
    #[must_use]
    pub fn preloaded_at(&self, index: usize) -> Option<Value> {
        self.preloaded.get(index).filter(|v| !v.is_null()).cloned()
    }

    /// The seeded error as a navigation error
    #[must_use]
    pub fn error(&self) -> Option<NavigationError> {
        self.error.as_ref().map(|message| NavigationError::Preload {
            status: self.status.unwrap_or(500),
            message: message.clone(),
        })
    }
}
