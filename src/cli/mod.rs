//! # CLI Module
//!
//! Command-line inspection of a compiled routes directory.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Print the compiled route table (components, pages, server routes) as JSON:
//!
//! ```bash
//! fsrouter --routes src/routes routes
//! ```
//!
//! ### `match`
//!
//! Resolve a path and print the page or server route it reaches:
//!
//! ```bash
//! fsrouter match '/blog/hello-world?tag=rust'
//! ```
//!
//! ### `check`
//!
//! Compile the tree and print a summary; exits non-zero on compile errors
//! such as clashing routes:
//!
//! ```bash
//! fsrouter check --require-root-layout
//! ```
//!
//! ## Settings
//!
//! `--config <FILE>` reads a TOML [`RouterConfig`](crate::config::RouterConfig);
//! without it the defaults and `FSROUTER_*` environment variables apply.
//! `--routes`, `--extensions` and `--base-url` override either.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{execute, run_cli, Cli, Commands};
