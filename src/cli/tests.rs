//! Unit tests for CLI commands

use std::fs;

use clap::Parser;
use serde_json::Value;
use tempfile::TempDir;

use crate::cli::{execute, Cli, Commands};

fn routes_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in [
        "_layout.html",
        "index.html",
        "blog/[slug].html",
        "blog/[slug].json.js",
    ] {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }
    dir
}

fn run(dir: &TempDir, args: &[&str]) -> anyhow::Result<String> {
    let routes = dir.path().to_string_lossy().to_string();
    let mut argv = vec!["fsrouter", "--routes", routes.as_str()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();

    let mut out = Vec::new();
    execute(&cli, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["fsrouter", "routes"],
        vec!["fsrouter", "routes", "--compact"],
        vec!["fsrouter", "match", "/blog/hello"],
        vec!["fsrouter", "check", "--require-root-layout"],
        vec!["fsrouter", "check", "--routes", "app/routes", "--base-url", "http://x/"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
}

#[test]
fn test_match_requires_path() {
    assert!(Cli::try_parse_from(["fsrouter", "match"]).is_err());
}

#[test]
fn test_global_overrides() {
    let cli = Cli::try_parse_from([
        "fsrouter",
        "match",
        "/",
        "--extensions",
        ".svx",
        "--base-url",
        "https://example.com/app/",
    ])
    .unwrap();

    let config = cli.router_config().unwrap();
    assert_eq!(config.extensions, ".svx");
    assert_eq!(config.base_url, "https://example.com/app/");
    match cli.command {
        Commands::Match { path } => assert_eq!(path, "/"),
        _ => panic!("Expected Match command"),
    }
}

#[test]
fn test_routes_prints_manifest() {
    let dir = routes_dir();
    let output = run(&dir, &["routes"]).unwrap();
    let manifest: Value = serde_json::from_str(&output).unwrap();

    assert_eq!(manifest["root"]["name"], "main");
    assert_eq!(manifest["pages"].as_array().unwrap().len(), 2);
    assert_eq!(manifest["server_routes"][0]["name"], "route_blog_$slug_json");
}

#[test]
fn test_match_page_and_server_route() {
    let dir = routes_dir();

    let page: Value = serde_json::from_str(&run(&dir, &["match", "/blog/hello?tag=rust"]).unwrap()).unwrap();
    assert_eq!(page["kind"], "page");
    assert_eq!(page["page"]["params"]["slug"], "hello");
    assert_eq!(page["page"]["query"]["tag"], "rust");
    assert_eq!(page["components"][1], "blog_$slug");

    let server: Value = serde_json::from_str(&run(&dir, &["match", "/blog/hello.json"]).unwrap()).unwrap();
    assert_eq!(server["kind"], "server");
    assert_eq!(server["params"]["slug"], "hello");

    let none: Value = serde_json::from_str(&run(&dir, &["match", "/nope/nope"]).unwrap()).unwrap();
    assert_eq!(none["kind"], "none");
}

#[test]
fn test_check_summary() {
    let dir = routes_dir();
    let output = run(&dir, &["check", "--require-root-layout"]).unwrap();
    assert!(output.starts_with("2 pages, 1 server routes, 2 components (0 with preload)"));
    assert!(output.contains("root layout: main\n"));
    assert!(output.contains("error component: _default_error (default)"));
}

#[test]
fn test_check_reports_compile_errors() {
    let dir = routes_dir();
    fs::write(dir.path().join("blog/[id].html"), "").unwrap();

    let err = run(&dir, &["check"]).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Failed to compile"));
    assert!(message.contains("clash"));
}

#[test]
fn test_check_requires_root_layout() {
    let dir = routes_dir();
    fs::remove_file(dir.path().join("_layout.html")).unwrap();

    assert!(run(&dir, &["check"]).is_ok());
    assert!(run(&dir, &["check", "--require-root-layout"]).is_err());
}
