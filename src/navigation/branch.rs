use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::context::Redirect;
use super::error::NavigationError;
use crate::manifest::{CaptureVec, PageComponent};
use crate::router::PageInfo;

/// A resolved branch level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelEntry {
    #[serde(serialize_with = "component_name")]
    pub component: Arc<PageComponent>,
    /// Value returned by the component's preload (`{}` without one)
    pub props: Value,
    /// Path segment at this depth
    pub segment: Option<String>,
    /// Capture groups of the navigation that produced this level
    #[serde(skip)]
    pub captures: CaptureVec,
}

/// One depth of a resolved branch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BranchEntry {
    /// No component owns this depth
    Placeholder { segment: Option<String> },
    Level(Arc<LevelEntry>),
}

impl BranchEntry {
    /// Path segment at this depth
    #[must_use]
    pub fn segment(&self) -> Option<&str> {
        match self {
            BranchEntry::Placeholder { segment } => segment.as_deref(),
            BranchEntry::Level(level) => level.segment.as_deref(),
        }
    }

    /// The resolved level, if a component owns this depth
    #[must_use]
    pub fn level(&self) -> Option<&Arc<LevelEntry>> {
        match self {
            BranchEntry::Level(level) => Some(level),
            BranchEntry::Placeholder { .. } => None,
        }
    }
}

/// Ordered branch entries, one per path depth
pub type Branch = Vec<BranchEntry>;

/// Props handed to the renderer for one navigation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Props {
    pub error: Option<NavigationError>,
    pub status: u16,
    /// Child segment visible at each filled level, indexed by level
    pub segments: Vec<Option<String>>,
    /// Root layout props
    pub root: Value,
    /// Levels recomputed by this navigation, keyed by level number (1-based);
    /// reused levels keep the props the renderer already has
    pub levels: BTreeMap<usize, Arc<LevelEntry>>,
}

impl Props {
    pub(crate) fn new(first_segment: Option<String>) -> Self {
        Self {
            error: None,
            status: 200,
            segments: vec![first_segment],
            root: Value::Object(serde_json::Map::new()),
            levels: BTreeMap::new(),
        }
    }

    pub(crate) fn set_segment(&mut self, level: usize, segment: Option<String>) {
        if self.segments.len() <= level {
            self.segments.resize(level + 1, None);
        }
        self.segments[level] = segment;
    }

    pub(crate) fn fail(&mut self, error: NavigationError) {
        self.status = error.status();
        self.error = Some(error);
    }
}

/// Result of hydrating a target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HydratedTarget {
    pub redirect: Option<Redirect>,
    pub props: Props,
    pub branch: Branch,
}

/// Contents of the `page` store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContext {
    #[serde(flatten)]
    pub page: PageInfo,
    pub error: Option<NavigationError>,
}

fn component_name<S: serde::Serializer>(
    component: &Arc<PageComponent>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&component.name)
}
