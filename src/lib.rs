//! # fsrouter
//!
//! **fsrouter** compiles a directory of route files into a route table and
//! drives race-safe client navigation over it.
//!
//! ## Overview
//!
//! A routes directory describes an application's URLs by its layout:
//! `blog/[slug].svelte` is a page matching `/blog/<anything>`,
//! `blog/_layout.svelte` wraps every page under `/blog`, and
//! `blog/[slug].json.js` is a server route answering `/blog/<slug>.json`.
//! fsrouter turns that tree into ordered regex patterns once, then resolves
//! URLs against them and loads each page's data (its *preloads*) while
//! keeping overlapping navigations from clobbering each other.
//!
//! ## Architecture
//!
//! - **[`manifest`]** - Route discovery and pattern compilation
//! - **[`router`]** - Runtime route table: URL to page target, path to server route
//! - **[`navigation`]** - Hydration, change detection and token-guarded commits
//! - **[`prefetch`]** - Single-slot dedupe between prefetch and navigation
//! - **[`goto`]** - Programmatic navigation and the history collaborator
//! - **[`registry`]** - In-process component loader
//! - **[`fetch`]** - The `fetch` passthrough handed to preloads
//! - **[`config`]** - Routes directory, extensions and base URL settings
//! - **[`logging`]** - Tracing subscriber setup
//! - **[`cli`]** - The `fsrouter` inspection command
//!
//! ### Navigation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant App
//!     participant Nav as Navigator
//!     participant Table as RouteTable
//!     participant Loader as ComponentLoader
//!     participant R as Renderer
//!
//!     App->>Nav: goto("/blog/hello")
//!     Nav->>Table: select_target(url)
//!     Table-->>Nav: Target {route, captures, page}
//!     Nav->>Nav: mint token
//!     Nav->>Loader: load changed levels
//!     Loader-->>Nav: preload fns
//!     Nav->>Nav: run preloads concurrently
//!     alt token still live
//!         Nav->>R: render(props, branch, page)
//!     else newer navigation started
//!         Nav->>Nav: discard
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use fsrouter::config::RouterConfig;
//! use fsrouter::goto::GotoOptions;
//! use fsrouter::navigation::{preload, Navigator};
//! use fsrouter::registry::ComponentRegistry;
//! use serde_json::json;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = RouterConfig::from_env();
//! let manifest = config.compile()?;
//! let routes = config.route_table(&manifest)?;
//!
//! let registry = ComponentRegistry::from_manifest(&manifest).with_preload(
//!     "blog_$slug",
//!     preload(|page, _ctx, _session| async move {
//!         Ok(json!({ "slug": page.params.get("slug") }))
//!     }),
//! );
//!
//! let navigator = Navigator::builder(routes, Arc::new(registry)).build();
//! navigator.start().await?;
//! navigator.goto("/blog/hello", GotoOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod fetch;
pub mod goto;
pub mod logging;
pub mod manifest;
pub mod navigation;
pub mod prefetch;
pub mod registry;
pub mod router;

pub use config::RouterConfig;
pub use manifest::{create_manifest_data, CompileError, ManifestData};
pub use navigation::{NavigationError, Navigator};
pub use router::RouteTable;
