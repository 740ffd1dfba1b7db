//! # Navigation Module
//!
//! The client navigation engine. A [`Navigator`] turns a resolved
//! [`Target`](crate::router::Target) into props and a branch (hydration),
//! then commits the result to the renderer and the page store.
//!
//! ## Race Safety
//!
//! Every navigation takes a fresh token when it starts. Only the navigation
//! holding the live token may redirect or commit; older ones finish their
//! preloads and are discarded.
//!
//! ## Partial Re-hydration
//!
//! The committed branch is the baseline of the next navigation. A depth is
//! reused when its segment, its captured parameters, the query and the
//! session are unchanged and the same component owns it. The first changed
//! depth and everything below it run their preloads again, concurrently.
//!
//! ## Preloads
//!
//! A component's preload gets the page data, a [`PreloadContext`] shared by
//! the whole navigation (`fetch`, `redirect`, `error`) and the session value:
//!
//! ```rust
//! use fsrouter::navigation::{preload, NavigationError};
//! use serde_json::json;
//!
//! let post = preload(|page, ctx, session| async move {
//!     if session.get("user").is_none() {
//!         ctx.redirect(302, "/login")?;
//!         return Ok(json!({}));
//!     }
//!     match page.params.get("slug") {
//!         Some(slug) => Ok(json!({ "slug": slug })),
//!         None => Err(NavigationError::preload(404, "Not found")),
//!     }
//! });
//! # let _ = post;
//! ```

mod branch;
mod builder;
mod component;
mod context;
mod engine;
mod error;
mod render;

pub use branch::{Branch, BranchEntry, HydratedTarget, LevelEntry, PageContext, Props};
pub use builder::NavigatorBuilder;
pub use component::{preload, ComponentLoader, LoadedComponent, PreloadFn, PreloadFuture};
pub use context::{PreloadContext, Redirect};
pub use engine::Navigator;
pub use error::NavigationError;
pub use render::{InitialData, Renderer, TracingRenderer};
