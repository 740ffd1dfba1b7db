use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tokio::sync::{watch, OnceCell};

use super::component::ComponentLoader;
use super::engine::{stringify_query, Committed, Inner, Navigator};
use super::render::{InitialData, Renderer, TracingRenderer};
use crate::fetch::{Fetcher, ReqwestFetcher};
use crate::goto::{History, MemoryHistory};
use crate::prefetch::PrefetchCache;
use crate::router::{Query, RouteTable};

/// Builder for [`Navigator`]
///
/// Only the route table and the component loader are required. The
/// defaults are a `reqwest` fetcher on the base URL, an in-memory history
/// positioned at the base URL, and a renderer that only logs.
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use fsrouter::manifest::{create_manifest_data, DEFAULT_EXTENSIONS};
/// use fsrouter::navigation::Navigator;
/// use fsrouter::registry::ComponentRegistry;
/// use fsrouter::router::RouteTable;
/// use url::Url;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let manifest = create_manifest_data("src/routes", DEFAULT_EXTENSIONS)?;
/// let routes = RouteTable::from_manifest(&manifest, &Url::parse("http://localhost:3000/")?);
/// let registry = ComponentRegistry::from_manifest(&manifest);
///
/// let navigator = Navigator::builder(routes, Arc::new(registry)).build();
/// navigator.start().await?;
/// # Ok(())
/// # }
/// ```
pub struct NavigatorBuilder {
    routes: RouteTable,
    loader: Arc<dyn ComponentLoader>,
    fetcher: Option<Arc<dyn Fetcher>>,
    renderer: Option<Arc<dyn Renderer>>,
    history: Option<Arc<dyn History>>,
    initial: InitialData,
}

impl Navigator {
    /// Start building a navigator over `routes`
    #[must_use]
    pub fn builder(routes: RouteTable, loader: Arc<dyn ComponentLoader>) -> NavigatorBuilder {
        NavigatorBuilder {
            routes,
            loader,
            fetcher: None,
            renderer: None,
            history: None,
            initial: InitialData::default(),
        }
    }
}

impl NavigatorBuilder {
    #[must_use]
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    #[must_use]
    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    #[must_use]
    pub fn history(mut self, history: Arc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    /// Seed server-rendered state (preloaded props, session, error)
    #[must_use]
    pub fn initial_data(mut self, initial: InitialData) -> Self {
        self.initial = initial;
        self
    }

    #[must_use]
    pub fn build(self) -> Navigator {
        let base = self.routes.base_url().clone();
        let fetcher = self
            .fetcher
            .unwrap_or_else(|| Arc::new(ReqwestFetcher::new(base.clone())));
        let history = self
            .history
            .unwrap_or_else(|| Arc::new(MemoryHistory::new(base.as_str())));
        let renderer = self.renderer.unwrap_or_else(|| Arc::new(TracingRenderer));

        let (session, _) = watch::channel(self.initial.session.clone());
        let (page, _) = watch::channel(None);
        let (preloading, _) = watch::channel(false);

        Navigator::from_inner(Inner {
            routes: self.routes,
            loader: self.loader,
            fetcher,
            renderer,
            history,
            initial: self.initial,
            token: AtomicU64::new(0),
            uid: AtomicU64::new(1),
            cid: AtomicU64::new(1),
            current: ArcSwap::from_pointee(Committed {
                branch: Vec::new(),
                query: stringify_query(&Query::new()),
            }),
            commit_lock: Mutex::new(()),
            ready: AtomicBool::new(false),
            session_dirty: AtomicBool::new(false),
            session,
            page,
            preloading,
            root_preloaded: OnceCell::new(),
            prefetching: PrefetchCache::default(),
        })
    }
}
