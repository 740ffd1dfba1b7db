use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use super::query::{decode, extract_query, Query};
use crate::manifest::{CaptureVec, ManifestData, PageComponent, RoutePattern, ServerRoute};

/// Extracted route parameters, keyed by name
pub type Params = BTreeMap<String, String>;

/// One filled level of a client route
#[derive(Debug, Clone)]
pub struct RouteLevel {
    /// Component rendered at this depth
    pub component: Arc<PageComponent>,
    /// Parameter names captured up to this depth, in capture-group order
    pub params: Vec<String>,
}

impl RouteLevel {
    /// Decode this level's parameters out of `captures`.
    ///
    /// The `i`th parameter name maps to capture group `i + 1`.
    #[must_use]
    pub fn params(&self, captures: &CaptureVec) -> Params {
        extract_params(&self.params, captures)
    }
}

/// A page route as seen by the navigation engine
#[derive(Debug, Clone)]
pub struct ClientRoute {
    pub pattern: RoutePattern,
    /// Branch template: one level per path depth, `None` where no component
    /// owns that depth
    pub parts: Vec<Option<RouteLevel>>,
}

impl ClientRoute {
    /// Parameters of the leaf level
    #[must_use]
    pub fn params(&self, captures: &CaptureVec) -> Params {
        match self.parts.last() {
            Some(Some(leaf)) => leaf.params(captures),
            _ => Params::new(),
        }
    }
}

/// Page-level data of a resolved target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub host: String,
    /// Path relative to the base URL
    pub path: String,
    pub query: Query,
    pub params: Params,
}

/// A URL resolved against the page list, before any preloading
#[derive(Debug, Clone)]
pub struct Target {
    /// Absolute URL the target was resolved from
    pub href: String,
    pub route: Arc<ClientRoute>,
    /// Capture groups of the matching pattern; group 0 is the whole path
    pub captures: CaptureVec,
    pub page: PageInfo,
}

/// Result of matching a path against the server-route list
#[derive(Debug, Clone)]
pub struct ServerRouteMatch<'a> {
    pub route: &'a ServerRoute,
    pub params: Params,
}

/// Runtime route table built from a compiled manifest
///
/// Holds the page routes in match-priority order, the list of server-only
/// patterns the client must leave alone, and the base URL every handled URL
/// lives under.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Arc<ClientRoute>>,
    ignore: Vec<RoutePattern>,
    server_routes: Vec<ServerRoute>,
    root: Arc<PageComponent>,
    error: Arc<PageComponent>,
    base: Url,
    base_path: String,
}

impl RouteTable {
    /// Build the table from `manifest`, handling URLs under `base_url`.
    #[must_use]
    pub fn from_manifest(manifest: &ManifestData, base_url: &Url) -> Self {
        let components: Vec<Arc<PageComponent>> =
            manifest.components.iter().cloned().map(Arc::new).collect();

        let routes: Vec<Arc<ClientRoute>> = manifest
            .pages
            .iter()
            .map(|page| {
                let parts = page
                    .parts
                    .iter()
                    .map(|slot| {
                        slot.as_ref().and_then(|slot| {
                            components.get(slot.component).map(|component| RouteLevel {
                                component: Arc::clone(component),
                                params: slot.params.clone(),
                            })
                        })
                    })
                    .collect();
                Arc::new(ClientRoute {
                    pattern: page.pattern.clone(),
                    parts,
                })
            })
            .collect();

        // Server routes that share a page's pattern still belong to the
        // client (they are the page's data endpoint).
        let ignore: Vec<RoutePattern> = manifest
            .server_routes
            .iter()
            .filter(|route| !manifest.pages.iter().any(|p| p.pattern == route.pattern))
            .map(|route| route.pattern.clone())
            .collect();

        let base_path = base_url.path().trim_end_matches('/').to_string();

        info!(
            routes = routes.len(),
            ignored = ignore.len(),
            base_url = %base_url,
            "Route table built"
        );

        Self {
            routes,
            ignore,
            server_routes: manifest.server_routes.clone(),
            root: Arc::new(manifest.root.clone()),
            error: Arc::new(manifest.error.clone()),
            base: base_url.clone(),
            base_path,
        }
    }

    /// Page routes in match-priority order
    #[must_use]
    pub fn routes(&self) -> &[Arc<ClientRoute>] {
        &self.routes
    }

    /// Root layout component
    #[must_use]
    pub fn root(&self) -> &Arc<PageComponent> {
        &self.root
    }

    /// Error component
    #[must_use]
    pub fn error(&self) -> &Arc<PageComponent> {
        &self.error
    }

    /// Base URL every handled URL lives under
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve `href` relative to the base URL and select its target.
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<Target> {
        let url = self.base.join(href).ok()?;
        self.select_target(&url)
    }

    /// Select the first page whose pattern matches `url`.
    ///
    /// Returns `None` when the URL is not handled by the client: a different
    /// origin, a path outside the base path, a server-only route, or no page
    /// match at all. The caller falls back to a full page load.
    #[must_use]
    pub fn select_target(&self, url: &Url) -> Option<Target> {
        if url.origin() != self.base.origin() {
            debug!(url = %url, "Different origin, not handled");
            return None;
        }

        let path = url.path().strip_prefix(self.base_path.as_str())?;
        let path = if path.is_empty() { "/" } else { path };

        if self.ignore.iter().any(|pattern| pattern.is_match(path)) {
            debug!(path = %path, "Server route, not handled");
            return None;
        }

        for route in &self.routes {
            let Some(captures) = route.pattern.exec(path) else {
                continue;
            };

            let page = PageInfo {
                host: host_of(url),
                path: path.to_string(),
                query: extract_query(url.query()),
                params: route.params(&captures),
            };
            debug!(path = %path, pattern = %route.pattern, "Target selected");

            return Some(Target {
                href: url.as_str().to_string(),
                route: Arc::clone(route),
                captures,
                page,
            });
        }

        debug!(path = %path, "No page matches");
        None
    }

    /// First server route matching `path`, with its decoded parameters.
    #[must_use]
    pub fn find_server_route(&self, path: &str) -> Option<ServerRouteMatch<'_>> {
        self.server_routes.iter().find_map(|route| {
            let captures = route.pattern.exec(path)?;
            Some(ServerRouteMatch {
                route,
                params: extract_params(&route.params, &captures),
            })
        })
    }
}

fn extract_params(names: &[String], captures: &CaptureVec) -> Params {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let value = captures
                .get(i + 1)
                .and_then(Option::as_deref)
                .map(|raw| decode(raw).into_owned())
                .unwrap_or_default();
            (name.clone(), value)
        })
        .collect()
}

pub(crate) fn host_of(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}
