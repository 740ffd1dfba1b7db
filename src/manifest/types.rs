use serde::Serialize;

use super::pattern::RoutePattern;

/// Role a component plays in a page tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// A leaf page
    Page,
    /// A directory layout wrapping every page beneath it
    Layout,
    /// The error page rendered when a navigation fails
    Error,
}

/// A compiled component descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageComponent {
    /// Deterministic identifier derived from the file path
    pub name: String,
    /// Source file relative to the routes directory; `None` for the
    /// synthesized defaults
    pub file: Option<String>,
    /// True if the component exports a `preload` function
    pub has_preload: bool,
    pub kind: ComponentKind,
    /// True for the framework-provided fallback layout/error components
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
}

impl PageComponent {
    /// Fallback root layout used when the routes directory has no `_layout`
    #[must_use]
    pub fn default_layout() -> Self {
        Self {
            name: "_default_layout".to_string(),
            file: None,
            has_preload: false,
            kind: ComponentKind::Layout,
            default: true,
        }
    }

    /// Fallback error component used when the routes directory has no `_error`
    #[must_use]
    pub fn default_error() -> Self {
        Self {
            name: "_default_error".to_string(),
            file: None,
            has_preload: false,
            kind: ComponentKind::Error,
            default: true,
        }
    }
}

/// A filled slot of a branch template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSlot {
    /// Index into [`ManifestData::components`]
    pub component: usize,
    /// Names of every parameter captured up to and including this depth,
    /// in capture-group order
    pub params: Vec<String>,
}

/// A page entry of the route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub pattern: RoutePattern,
    /// One slot per path depth; `None` where no layout owns that depth
    pub parts: Vec<Option<PageSlot>>,
}

impl Page {
    /// The leaf slot (the page component itself)
    #[must_use]
    pub fn leaf(&self) -> Option<&PageSlot> {
        self.parts.last().and_then(Option::as_ref)
    }
}

/// A server route entry of the route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerRoute {
    /// Handler binding name, `route_<component name>`
    pub name: String,
    pub pattern: RoutePattern,
    /// Source file relative to the routes directory
    pub file: String,
    /// Parameter names in capture-group order
    pub params: Vec<String>,
}

/// Result of compiling a routes directory
///
/// `pages` and `server_routes` are in match-priority order: the first entry
/// whose pattern matches a path wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestData {
    /// Root layout (or the default layout)
    pub root: PageComponent,
    /// Root error component (or the default error component)
    pub error: PageComponent,
    /// Every page and directory layout, each listed once
    pub components: Vec<PageComponent>,
    pub pages: Vec<Page>,
    pub server_routes: Vec<ServerRoute>,
}

impl ManifestData {
    /// Component referenced by a branch-template slot
    #[must_use]
    pub fn component(&self, slot: &PageSlot) -> Option<&PageComponent> {
        self.components.get(slot.component)
    }

    /// File of a page's leaf component, for diagnostics
    #[must_use]
    pub fn page_file(&self, page: &Page) -> Option<&str> {
        page.leaf()
            .and_then(|slot| self.component(slot))
            .and_then(|c| c.file.as_deref())
    }
}
