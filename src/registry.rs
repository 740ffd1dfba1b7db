//! # Component Registry
//!
//! In-process [`ComponentLoader`]: component modules are registered by
//! compiled component name and looked up when a navigation needs them.
//!
//! [`ComponentRegistry::from_manifest`] registers every compiled component
//! without a preload. Preloads are then attached by name:
//!
//! ```rust
//! use fsrouter::navigation::preload;
//! use fsrouter::registry::ComponentRegistry;
//! use serde_json::json;
//!
//! let mut registry = ComponentRegistry::new();
//! registry.register("index");
//! registry.register_preload(
//!     "blog_$slug",
//!     preload(|page, _ctx, _session| async move { Ok(json!({ "slug": page.params.get("slug") })) }),
//! );
//! assert!(registry.contains("blog_$slug"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use tracing::{debug, warn};

use crate::manifest::{ManifestData, PageComponent};
use crate::navigation::{ComponentLoader, LoadedComponent, NavigationError, PreloadFn};

/// Component modules keyed by compiled component name
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    modules: HashMap<String, Option<PreloadFn>>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every component of `manifest` (root, error, pages and
    /// layouts), none with a preload yet.
    #[must_use]
    pub fn from_manifest(manifest: &ManifestData) -> Self {
        let mut registry = Self::new();
        registry.register(&manifest.root.name);
        registry.register(&manifest.error.name);
        for component in &manifest.components {
            registry.register(&component.name);
        }
        debug!(components = registry.len(), "Component registry built");
        registry
    }

    /// Register a component without a preload.
    ///
    /// An existing registration keeps its preload.
    pub fn register(&mut self, name: &str) {
        self.modules.entry(name.to_string()).or_insert(None);
    }

    /// Register a component with `preload`, replacing any previous one
    ///
    /// Names are compiled component names (`private.svelte` is `private_`).
    /// A name not registered yet is still added, with a warning.
    pub fn register_preload(&mut self, name: &str, preload: PreloadFn) {
        if self.modules.contains_key(name) {
            debug!(component = %name, "Registering preload");
        } else {
            warn!(component = %name, "Registering preload for an unknown component");
        }
        self.modules.insert(name.to_string(), Some(preload));
    }

    /// Builder form of [`register_preload`](Self::register_preload)
    #[must_use]
    pub fn with_preload(mut self, name: &str, preload: PreloadFn) -> Self {
        self.register_preload(name, preload);
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Components of `manifest` whose source exports a preload that was never
    /// registered here, sorted by name
    #[must_use]
    pub fn missing_preloads(&self, manifest: &ManifestData) -> Vec<String> {
        let mut missing: Vec<String> = std::iter::once(&manifest.root)
            .chain(std::iter::once(&manifest.error))
            .chain(manifest.components.iter())
            .filter(|c| c.has_preload && !matches!(self.modules.get(&c.name), Some(Some(_))))
            .map(|c| c.name.clone())
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

impl ComponentLoader for ComponentRegistry {
    fn load(
        &self,
        component: &Arc<PageComponent>,
    ) -> BoxFuture<'static, Result<LoadedComponent, NavigationError>> {
        let result = match self.modules.get(&component.name) {
            Some(preload) => Ok(LoadedComponent {
                component: Arc::clone(component),
                preload: preload.clone(),
            }),
            None => {
                warn!(component = %component.name, "Component not registered");
                Err(NavigationError::ComponentLoad {
                    component: component.name.clone(),
                    message: "component is not registered".to_string(),
                })
            }
        };
        future::ready(result).boxed()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.modules.keys().collect();
        names.sort();
        f.debug_struct("ComponentRegistry")
            .field("components", &names)
            .finish()
    }
}
