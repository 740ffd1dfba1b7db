//! # Manifest Module
//!
//! Route discovery and pattern compilation. A routes directory is walked once
//! and turned into an immutable [`ManifestData`]: the component registry, the
//! ordered page list and the ordered server-route list.
//!
//! ## File Conventions
//!
//! - `[name]` is a parameter matching one path segment
//! - `[name(qualifier)]` restricts the parameter to a sub-pattern, e.g. `[id(\d+)]`
//! - `[...name]` is a spread parameter matching one or more segments
//! - `_layout.<ext>` wraps every page in its directory and below
//! - `_error.<ext>` at the root replaces the default error component
//! - other `_`-prefixed and `.`-prefixed entries are ignored (`.well-known`
//!   excepted)
//! - files with a template extension are pages, every other file is a
//!   server route
//! - `index.<ext>` serves its directory; `index.json.js` serves
//!   `<dir>.json`
//!
//! ## Ordering
//!
//! Siblings are sorted by specificity before recursing, so the final lists
//! are in match-priority order: static before dynamic before spread, longer
//! literals first, qualified parameters before plain ones. The first pattern
//! that matches a path wins.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fsrouter::manifest::{create_manifest_data, DEFAULT_EXTENSIONS};
//!
//! let manifest = create_manifest_data("src/routes", DEFAULT_EXTENSIONS)?;
//! println!("{} pages, {} server routes", manifest.pages.len(), manifest.server_routes.len());
//! # Ok::<(), fsrouter::manifest::CompileError>(())
//! ```

mod build;
mod error;
mod naming;
mod parts;
mod pattern;
mod sort;
mod types;

pub use build::{create_manifest_data, DEFAULT_EXTENSIONS};
pub use error::CompileError;
pub use naming::{component_name, source_has_preload};
pub use parts::{parse, parse_segment, Part};
pub use pattern::{CaptureVec, RoutePattern, MAX_INLINE_CAPTURES};
pub use types::{ComponentKind, ManifestData, Page, PageComponent, PageSlot, ServerRoute};
