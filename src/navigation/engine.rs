use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{watch, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use super::branch::{Branch, BranchEntry, HydratedTarget, LevelEntry, PageContext, Props};
use super::component::ComponentLoader;
use super::context::PreloadContext;
use super::error::NavigationError;
use super::render::{InitialData, Renderer};
use crate::fetch::Fetcher;
use crate::goto::{History, HistoryState};
use crate::manifest::CaptureVec;
use crate::prefetch::PrefetchCache;
use crate::router::{extract_query, host_of, PageInfo, Params, Query, RouteTable, Target};

/// Last committed navigation, the baseline of the next diff
#[derive(Debug, Clone)]
pub(crate) struct Committed {
    pub(crate) branch: Branch,
    /// Serialized query of the committed page
    pub(crate) query: String,
}

pub(crate) struct Inner {
    pub(crate) routes: RouteTable,
    pub(crate) loader: Arc<dyn ComponentLoader>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) renderer: Arc<dyn Renderer>,
    pub(crate) history: Arc<dyn History>,
    pub(crate) initial: InitialData,
    /// Live navigation token; only a result carrying this value may commit
    pub(crate) token: AtomicU64,
    /// Last history entry id handed out
    pub(crate) uid: AtomicU64,
    /// History entry id of the current page
    pub(crate) cid: AtomicU64,
    pub(crate) current: ArcSwap<Committed>,
    pub(crate) commit_lock: Mutex<()>,
    pub(crate) ready: AtomicBool,
    pub(crate) session_dirty: AtomicBool,
    pub(crate) session: watch::Sender<Value>,
    pub(crate) page: watch::Sender<Option<PageContext>>,
    pub(crate) preloading: watch::Sender<bool>,
    pub(crate) root_preloaded: OnceCell<Value>,
    pub(crate) prefetching: PrefetchCache,
}

/// Client navigation engine
///
/// Resolves URLs against the route table, hydrates their branch (running
/// only the preloads the navigation actually invalidates) and commits the
/// result, provided no newer navigation started in the meantime.
///
/// Cloning is cheap: clones drive the same navigation session.
#[derive(Clone)]
pub struct Navigator {
    pub(crate) inner: Arc<Inner>,
}

impl Navigator {
    pub(crate) fn from_inner(inner: Inner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// The route table this navigator resolves against
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.inner.routes
    }

    /// Resolve `url` against the route table
    #[must_use]
    pub fn select_target(&self, url: &Url) -> Option<Target> {
        self.inner.routes.select_target(url)
    }

    /// True once a navigation has been committed
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::SeqCst)
    }

    /// Current live navigation token
    #[must_use]
    pub fn token(&self) -> u64 {
        self.inner.token.load(Ordering::SeqCst)
    }

    /// Branch of the last committed navigation
    #[must_use]
    pub fn current_branch(&self) -> Branch {
        self.inner.current.load().branch.clone()
    }

    /// Serialized query of the last committed navigation
    #[must_use]
    pub fn current_query(&self) -> String {
        self.inner.current.load().query.clone()
    }

    /// Current session value
    #[must_use]
    pub fn session(&self) -> Value {
        self.inner.session.borrow().clone()
    }

    /// Replace the session value, notifying session subscribers.
    ///
    /// After the first commit this invalidates every level, so the next
    /// hydration reruns all preloads with the new value.
    pub fn set_session(&self, value: Value) {
        let inner = &self.inner;
        inner.session.send_replace(value);
        if self.is_ready() {
            debug!("Session changed, branch marked dirty");
            inner.session_dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Subscribe to session changes
    #[must_use]
    pub fn subscribe_session(&self) -> watch::Receiver<Value> {
        self.inner.session.subscribe()
    }

    /// Subscribe to the committed page
    #[must_use]
    pub fn page_store(&self) -> watch::Receiver<Option<PageContext>> {
        self.inner.page.subscribe()
    }

    /// Subscribe to the preloading flag
    #[must_use]
    pub fn preloading_store(&self) -> watch::Receiver<bool> {
        self.inner.preloading.subscribe()
    }

    pub(crate) fn mint_token(&self) -> u64 {
        self.inner.token.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn is_live(&self, token: u64) -> bool {
        self.inner.token.load(Ordering::SeqCst) == token
    }

    pub(crate) fn next_history_id(&self) -> u64 {
        self.inner.uid.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Hydrate `target` into props and a branch.
    ///
    /// Each branch depth is either reused from the committed branch or
    /// recomputed. A depth is recomputed when the query changed, its segment
    /// or captures changed, the session changed since the last commit, or
    /// there is nothing to reuse; every depth after a recomputed one is
    /// recomputed too. All decisions are made before any preload runs, then
    /// the recomputed depths load concurrently.
    ///
    /// A failing preload aborts the hydration: its error becomes the props'
    /// `{status, error}` and the branch is empty.
    ///
    /// # Errors
    ///
    /// Only [`NavigationError::ConflictingRedirect`]; every other failure is
    /// reported through the returned props.
    pub async fn hydrate_target(&self, target: &Target) -> Result<HydratedTarget, NavigationError> {
        let inner = &self.inner;
        let page = &target.page;
        let path_segments: Vec<&str> = page.path.split('/').filter(|s| !s.is_empty()).collect();
        let segment_at = |i: usize| path_segments.get(i).map(|s| (*s).to_string());

        let mut props = Props::new(segment_at(0));
        let ctx = PreloadContext::new(Arc::clone(&inner.fetcher));
        let session = inner.session.borrow().clone();
        let ready = inner.ready.load(Ordering::SeqCst);
        let session_dirty = inner.session_dirty.load(Ordering::SeqCst);
        let current = inner.current.load_full();
        let query = stringify_query(&page.query);

        let mut pending: Vec<BoxFuture<'static, Result<BranchEntry, NavigationError>>> =
            Vec::with_capacity(target.route.parts.len());
        // (position in `pending`, level number) of every recomputed level
        let mut fresh: Vec<(usize, usize)> = Vec::new();
        let mut segment_dirty = false;
        let mut level = 1;

        for (i, part) in target.route.parts.iter().enumerate() {
            let segment = segment_at(i);
            let owned_params = part.as_ref().map_or(0, |p| p.params.len());
            if part_changed(&current, i, segment.as_deref(), &target.captures, owned_params, &query) {
                segment_dirty = true;
            }

            props.set_segment(level, segment_at(i + 1));

            let Some(part) = part else {
                pending.push(future::ready(Ok(BranchEntry::Placeholder { segment })).boxed());
                continue;
            };

            let j = level;
            level += 1;

            if !session_dirty && !segment_dirty {
                if let Some(BranchEntry::Level(previous)) = current.branch.get(i) {
                    if previous.component.name == part.component.name {
                        debug!(depth = i, component = %part.component.name, "Reusing level");
                        pending.push(
                            future::ready(Ok(BranchEntry::Level(Arc::clone(previous)))).boxed(),
                        );
                        continue;
                    }
                }
            }

            // Everything below a recomputed level is recomputed as well.
            segment_dirty = true;
            debug!(depth = i, component = %part.component.name, "Recomputing level");

            let seeded = if ready {
                None
            } else {
                inner.initial.preloaded_at(i + 1)
            };
            let loader = Arc::clone(&inner.loader);
            let component = Arc::clone(&part.component);
            let input = PageInfo {
                params: part.params(&target.captures),
                ..page.clone()
            };
            let ctx = ctx.clone();
            let session = session.clone();
            let captures = target.captures.clone();

            fresh.push((pending.len(), j));
            pending.push(
                async move {
                    let module = loader.load(&component).await?;
                    let props = match (seeded, &module.preload) {
                        (Some(value), _) => value,
                        (None, Some(preload)) => preload(input, ctx, session).await?,
                        (None, None) => empty_props(),
                    };
                    Ok(BranchEntry::Level(Arc::new(LevelEntry {
                        component,
                        props,
                        segment,
                        captures,
                    })))
                }
                .boxed(),
            );
        }

        let root = self.root_preload(page, &ctx, &session);
        let (root, levels) = future::join(root, future::try_join_all(pending)).await;

        if let Some(conflict) = ctx.take_conflict() {
            return Err(conflict);
        }

        let mut failed = false;
        match root {
            Ok(value) => props.root = value,
            Err(err) => {
                escalate(err.clone())?;
                warn!(error = %err, path = %page.path, "Root preload failed");
                props.fail(err);
                failed = true;
            }
        }

        let branch = match levels {
            Ok(entries) if !failed => {
                for (position, j) in fresh {
                    if let Some(BranchEntry::Level(entry)) = entries.get(position) {
                        props.levels.insert(j, Arc::clone(entry));
                    }
                }
                entries
            }
            Ok(_) => Branch::new(),
            Err(err) => {
                escalate(err.clone())?;
                warn!(error = %err, path = %page.path, "Preload failed");
                if !failed {
                    props.fail(err);
                }
                Branch::new()
            }
        };

        if props.error.is_none() {
            if let Some(err) = ctx.take_error() {
                debug!(error = %err, path = %page.path, "Preload reported an error");
                props.fail(err);
            }
        }

        Ok(HydratedTarget {
            redirect: ctx.take_redirect(),
            props,
            branch,
        })
    }

    /// Root layout props, computed at most once per navigator.
    ///
    /// A failed root preload is not memoized; the next navigation retries.
    async fn root_preload(
        &self,
        page: &PageInfo,
        ctx: &PreloadContext,
        session: &Value,
    ) -> Result<Value, NavigationError> {
        let inner = &self.inner;
        inner
            .root_preloaded
            .get_or_try_init(|| async {
                if let Some(seeded) = inner.initial.preloaded_at(0) {
                    return Ok::<Value, NavigationError>(seeded);
                }
                let root = inner.routes.root();
                if !root.has_preload {
                    return Ok(empty_props());
                }
                let module = inner.loader.load(root).await?;
                match &module.preload {
                    Some(preload) => {
                        let input = PageInfo {
                            params: Params::new(),
                            ..page.clone()
                        };
                        debug!(component = %root.name, "Running root preload");
                        preload(input, ctx.clone(), session.clone()).await
                    }
                    None => Ok(empty_props()),
                }
            })
            .await
            .cloned()
    }

    /// Navigate to a resolved target.
    ///
    /// `id` is the history entry being shown; `None` allocates a new one.
    /// A pending prefetch of the same href is consumed instead of hydrating
    /// again. The result is committed only if no newer navigation started
    /// while it was loading.
    ///
    /// # Errors
    ///
    /// [`NavigationError::ConflictingRedirect`] from the hydration.
    pub async fn navigate(&self, target: Target, id: Option<u64>) -> Result<(), NavigationError> {
        let inner = &self.inner;
        let id = id.unwrap_or_else(|| self.next_history_id());
        inner.cid.store(id, Ordering::SeqCst);

        if self.is_ready() {
            inner.preloading.send_replace(true);
        }

        let hydrating: BoxFuture<'_, Result<HydratedTarget, NavigationError>> = match inner
            .prefetching
            .take(&target.href)
        {
            Some(prefetched) => {
                debug!(href = %target.href, "Using prefetched hydration");
                prefetched.boxed()
            }
            None => self.hydrate_target(&target).boxed(),
        };

        let token = self.mint_token();
        debug!(token, href = %target.href, id, "Navigation started");

        let hydrated = hydrating.await?;
        self.apply(token, hydrated, target.page).await
    }

    /// Follow a redirect or commit, if `token` is still live.
    pub(crate) async fn apply(
        &self,
        token: u64,
        hydrated: HydratedTarget,
        page: PageInfo,
    ) -> Result<(), NavigationError> {
        if !self.is_live(token) {
            debug!(token, live = self.token(), path = %page.path, "Discarding stale navigation");
            return Ok(());
        }

        match hydrated.redirect {
            Some(redirect) => {
                info!(status = redirect.status, location = %redirect.location, "Following redirect");
                self.goto(
                    &redirect.location,
                    crate::goto::GotoOptions {
                        replace_state: true,
                    },
                )
                .await
            }
            None => {
                self.commit(token, hydrated.props, hydrated.branch, page);
                Ok(())
            }
        }
    }

    /// Apply a hydrated navigation to visible state.
    ///
    /// The token is checked again under the commit lock, so of any number of
    /// overlapping navigations only the live one reaches the renderer. The
    /// committed branch and query are stored last, after the renderer saw
    /// them.
    pub(crate) fn commit(&self, token: u64, props: Props, branch: Branch, page: PageInfo) -> bool {
        let inner = &self.inner;
        let _guard = inner.commit_lock.lock();

        if !self.is_live(token) {
            debug!(token, path = %page.path, "Discarding stale commit");
            return false;
        }

        let query = stringify_query(&page.query);
        let context = PageContext {
            page,
            error: props.error.clone(),
        };

        inner.page.send_replace(Some(context.clone()));
        inner.preloading.send_replace(false);
        inner.renderer.render(&props, &branch, &context);

        inner.current.store(Arc::new(Committed { branch, query }));
        inner.ready.store(true, Ordering::SeqCst);
        inner.session_dirty.store(false, Ordering::SeqCst);

        info!(
            path = %context.page.path,
            status = props.status,
            recomputed = props.levels.len(),
            token,
            "Navigation committed"
        );
        true
    }

    /// Render the initial page.
    ///
    /// Shows the seeded error if the server rendered one, otherwise loads the
    /// current location.
    ///
    /// # Errors
    ///
    /// [`NavigationError::ConflictingRedirect`] from the first hydration.
    pub async fn start(&self) -> Result<(), NavigationError> {
        match self.inner.initial.error() {
            Some(error) => {
                self.render_initial_error(error);
                Ok(())
            }
            None => self.load_current_page().await,
        }
    }

    fn render_initial_error(&self, error: NavigationError) {
        let inner = &self.inner;
        let location = inner.history.location();
        let url = inner.routes.base_url().join(&location).ok();

        let root = inner.initial.preloaded_at(0).unwrap_or_else(empty_props);
        if inner.root_preloaded.set(root.clone()).is_err() {
            debug!("Root props already initialised");
        }

        let page = PageInfo {
            host: url.as_ref().map(host_of).unwrap_or_default(),
            path: url.as_ref().map(|u| u.path().to_string()).unwrap_or(location),
            query: url
                .as_ref()
                .map(|u| extract_query(u.query()))
                .unwrap_or_default(),
            params: Params::new(),
        };

        let mut props = Props::new(None);
        props.root = root;
        props.fail(error);

        warn!(path = %page.path, status = props.status, "Rendering server error");
        let token = self.mint_token();
        self.commit(token, props, Branch::new(), page);
    }

    /// Navigate to the location the history currently shows.
    ///
    /// # Errors
    ///
    /// [`NavigationError::ConflictingRedirect`] from the hydration.
    pub async fn load_current_page(&self) -> Result<(), NavigationError> {
        let inner = &self.inner;
        let location = inner.history.location();
        let id = inner.uid.load(Ordering::SeqCst);
        inner.history.replace_state(HistoryState { id }, &location);

        match inner.routes.resolve(&location) {
            Some(target) => self.navigate(target, Some(id)).await,
            None => {
                debug!(location = %location, "Current location is not a client route");
                Ok(())
            }
        }
    }

    /// React to a session change.
    ///
    /// Before the first commit this does nothing: the initial navigation
    /// already reads the latest value. Afterwards the whole branch is marked
    /// dirty and the current location is hydrated again.
    ///
    /// # Errors
    ///
    /// [`NavigationError::ConflictingRedirect`] from the hydration.
    pub async fn on_session_changed(&self) -> Result<(), NavigationError> {
        if !self.is_ready() {
            return Ok(());
        }
        let inner = &self.inner;
        inner.session_dirty.store(true, Ordering::SeqCst);

        let location = inner.history.location();
        let Some(target) = inner.routes.resolve(&location) else {
            return Ok(());
        };

        let token = self.mint_token();
        debug!(token, location = %location, "Session changed, refreshing");
        let hydrated = self.hydrate_target(&target).await?;
        self.apply(token, hydrated, target.page).await
    }

    /// Spawn a task that refreshes the current page on every session change.
    ///
    /// The task runs until aborted.
    #[must_use]
    pub fn watch_session(&self) -> JoinHandle<()> {
        let navigator = self.clone();
        let mut changes = self.inner.session.subscribe();
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                if let Err(err) = navigator.on_session_changed().await {
                    warn!(error = %err, "Session refresh failed");
                }
            }
        })
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("token", &self.token())
            .field("ready", &self.is_ready())
            .field("base_url", &self.inner.routes.base_url().as_str())
            .finish_non_exhaustive()
    }
}

/// Did depth `i` change relative to the committed branch?
///
/// `owned_params` is the number of parameters captured up to this depth;
/// only those capture groups are compared.
fn part_changed(
    current: &Committed,
    i: usize,
    segment: Option<&str>,
    captures: &CaptureVec,
    owned_params: usize,
    query: &str,
) -> bool {
    if query != current.query {
        return true;
    }

    let Some(previous) = current.branch.get(i) else {
        return false;
    };
    if segment != previous.segment() {
        return true;
    }

    match previous.level() {
        Some(level) => {
            capture_window(&level.captures, owned_params) != capture_window(captures, owned_params)
        }
        None => false,
    }
}

/// Capture groups `1..=n`, clamped to what was captured
fn capture_window(captures: &CaptureVec, n: usize) -> &[Option<String>] {
    let end = (n + 1).min(captures.len());
    let start = 1.min(end);
    &captures[start..end]
}

/// Only a conflicting redirect escapes a hydration.
fn escalate(err: NavigationError) -> Result<(), NavigationError> {
    match err {
        NavigationError::ConflictingRedirect { .. } => Err(err),
        _ => Ok(()),
    }
}

pub(crate) fn stringify_query(query: &Query) -> String {
    serde_json::to_string(query).unwrap_or_default()
}

fn empty_props() -> Value {
    Value::Object(serde_json::Map::new())
}
