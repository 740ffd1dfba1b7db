//! # Router Module
//!
//! Runtime side of the route table. [`RouteTable`] is built once from a
//! compiled [`ManifestData`](crate::manifest::ManifestData) and answers two
//! questions:
//!
//! - which page (if any) a URL navigates to, via [`RouteTable::select_target`]
//! - which server route (if any) handles a request path, via
//!   [`RouteTable::find_server_route`]
//!
//! ## Matching Rules
//!
//! Only URLs on the base URL's origin and under its path are handled. The
//! base path is stripped, then server-only patterns are checked first so a
//! data endpoint is never mistaken for a page. The first page pattern that
//! matches wins; parameters are taken from the leaf level and percent-decoded.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fsrouter::manifest::{create_manifest_data, DEFAULT_EXTENSIONS};
//! use fsrouter::router::RouteTable;
//! use url::Url;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = create_manifest_data("src/routes", DEFAULT_EXTENSIONS)?;
//! let base = Url::parse("http://localhost:3000/")?;
//! let table = RouteTable::from_manifest(&manifest, &base);
//!
//! if let Some(target) = table.resolve("/blog/hello?tag=rust") {
//!     println!("{:?} {:?}", target.page.params, target.page.query);
//! }
//! # Ok(())
//! # }
//! ```

mod core;
mod query;
#[cfg(test)]
mod tests;

pub(crate) use core::host_of;
pub use core::{ClientRoute, PageInfo, Params, RouteLevel, RouteTable, ServerRouteMatch, Target};
pub use query::{extract_query, Query, QueryValue};
