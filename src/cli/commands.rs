use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::debug;

use crate::config::RouterConfig;
use crate::manifest::ManifestData;
use crate::router::RouteTable;

/// Command-line interface for fsrouter
///
/// Compiles a routes directory and inspects the result.
#[derive(Parser, Debug)]
#[command(name = "fsrouter")]
#[command(about = "File-system route compiler", long_about = None)]
pub struct Cli {
    /// TOML config file (defaults plus FSROUTER_* environment otherwise)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Routes directory, overriding the config
    #[arg(short, long, global = true)]
    pub routes: Option<PathBuf>,

    /// Space-separated page template extensions, overriding the config
    #[arg(long, global = true)]
    pub extensions: Option<String>,

    /// Base URL the client is mounted at, overriding the config
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the compiled route table as JSON
    Routes {
        /// Single-line JSON instead of pretty-printed
        #[arg(long, default_value_t = false)]
        compact: bool,
    },
    /// Resolve a path against the compiled table
    ///
    /// Server-only routes are checked first, the same way the client leaves
    /// them to the server.
    Match {
        /// Path (optionally with a query string), e.g. /blog/hello?tag=rust
        path: String,
    },
    /// Compile the routes directory and report what it contains
    Check {
        /// Fail if the routes directory has no root `_layout`
        #[arg(long, default_value_t = false)]
        require_root_layout: bool,
    },
}

impl Cli {
    /// Config file (or environment) with the command-line overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn router_config(&self) -> Result<RouterConfig> {
        let mut config = match &self.config {
            Some(path) => RouterConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
                .with_env_overrides(),
            None => RouterConfig::from_env(),
        };
        if let Some(routes) = &self.routes {
            config.routes_dir = routes.clone();
        }
        if let Some(extensions) = &self.extensions {
            config.extensions = extensions.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        Ok(config)
    }
}

/// Parse the process arguments and execute the command, writing to stdout
///
/// # Errors
///
/// Returns an error if:
/// - The config cannot be loaded
/// - The routes directory fails to compile
/// - `check` finds a problem
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &mut out)
}

/// Execute `cli`, writing command output to `out`
///
/// # Errors
///
/// See [`run_cli`].
pub fn execute(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = cli.router_config()?;
    debug!(routes_dir = %config.routes_dir.display(), "Using routes directory");

    let manifest = config
        .compile()
        .with_context(|| format!("Failed to compile {}", config.routes_dir.display()))?;

    match &cli.command {
        Commands::Routes { compact } => {
            let rendered = if *compact {
                serde_json::to_string(&manifest)?
            } else {
                serde_json::to_string_pretty(&manifest)?
            };
            writeln!(out, "{rendered}")?;
        }
        Commands::Match { path } => {
            let table = config.route_table(&manifest)?;
            let result = match_path(&table, path);
            writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        }
        Commands::Check {
            require_root_layout,
        } => {
            check(&manifest, *require_root_layout, out)?;
        }
    }
    Ok(())
}

fn match_path(table: &RouteTable, path: &str) -> serde_json::Value {
    let bare = path.split(['?', '#']).next().unwrap_or(path);
    if let Some(found) = table.find_server_route(bare) {
        return json!({
            "kind": "server",
            "name": found.route.name,
            "file": found.route.file,
            "pattern": found.route.pattern,
            "params": found.params,
        });
    }

    match table.resolve(path) {
        Some(target) => {
            let components: Vec<Option<&str>> = target
                .route
                .parts
                .iter()
                .map(|part| part.as_ref().map(|level| level.component.name.as_str()))
                .collect();
            json!({
                "kind": "page",
                "pattern": target.route.pattern,
                "components": components,
                "page": target.page,
            })
        }
        None => json!({ "kind": "none", "path": path }),
    }
}

fn check(manifest: &ManifestData, require_root_layout: bool, out: &mut impl Write) -> Result<()> {
    let with_preload = manifest
        .components
        .iter()
        .chain([&manifest.root, &manifest.error])
        .filter(|c| c.has_preload)
        .count();

    writeln!(
        out,
        "{} pages, {} server routes, {} components ({} with preload)",
        manifest.pages.len(),
        manifest.server_routes.len(),
        manifest.components.len(),
        with_preload
    )?;
    writeln!(
        out,
        "root layout: {}{}",
        manifest.root.name,
        if manifest.root.default { " (default)" } else { "" }
    )?;
    writeln!(
        out,
        "error component: {}{}",
        manifest.error.name,
        if manifest.error.default { " (default)" } else { "" }
    )?;

    if require_root_layout && manifest.root.default {
        anyhow::bail!("No _layout at the root of the routes directory");
    }
    Ok(())
}
