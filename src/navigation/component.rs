use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use super::context::PreloadContext;
use super::error::NavigationError;
use crate::manifest::PageComponent;
use crate::router::PageInfo;

/// Future returned by a preload function
pub type PreloadFuture = BoxFuture<'static, Result<Value, NavigationError>>;

/// A component's `preload`: page data, shared context and session value in,
/// props out
pub type PreloadFn = Arc<dyn Fn(PageInfo, PreloadContext, Value) -> PreloadFuture + Send + Sync>;

/// Wrap an async closure as a [`PreloadFn`].
///
/// ```rust
/// use fsrouter::navigation::preload;
/// use serde_json::json;
///
/// let preload = preload(|page, _ctx, _session| async move {
///     Ok(json!({ "slug": page.params.get("slug") }))
/// });
/// # let _ = preload;
/// ```
pub fn preload<F, Fut>(f: F) -> PreloadFn
where
    F: Fn(PageInfo, PreloadContext, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, NavigationError>> + Send + 'static,
{
    Arc::new(move |page, ctx, session| f(page, ctx, session).boxed())
}

/// A loaded component module
#[derive(Clone)]
pub struct LoadedComponent {
    pub component: Arc<PageComponent>,
    pub preload: Option<PreloadFn>,
}

impl std::fmt::Debug for LoadedComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedComponent")
            .field("component", &self.component.name)
            .field("preload", &self.preload.is_some())
            .finish()
    }
}

/// Asynchronous lookup of component modules by compiled component
pub trait ComponentLoader: Send + Sync {
    fn load(&self, component: &Arc<PageComponent>) -> BoxFuture<'static, Result<LoadedComponent, NavigationError>>;
}
