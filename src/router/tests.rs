use std::fs;

use tempfile::TempDir;
use url::Url;

use super::{extract_query, QueryValue, RouteTable};
use crate::manifest::{create_manifest_data, DEFAULT_EXTENSIONS};

fn table(files: &[&str], base: &str) -> (TempDir, RouteTable) {
    let dir = TempDir::new().unwrap();
    for file in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }
    let manifest = create_manifest_data(dir.path(), DEFAULT_EXTENSIONS).unwrap();
    let table = RouteTable::from_manifest(&manifest, &Url::parse(base).unwrap());
    (dir, table)
}

fn blog() -> (TempDir, RouteTable) {
    table(
        &[
            "index.html",
            "blog/_layout.html",
            "blog/index.html",
            "blog/[slug].html",
            "blog/[slug].json.js",
            "api/status.js",
            "docs/[...path].html",
        ],
        "http://localhost:3000/",
    )
}

#[test]
fn test_select_static_page() {
    let (_dir, table) = blog();
    let target = table.resolve("/").unwrap();
    assert_eq!(target.page.path, "/");
    assert_eq!(target.href, "http://localhost:3000/");
    assert!(target.page.params.is_empty());
    assert_eq!(target.page.host, "localhost:3000");
}

#[test]
fn test_select_dynamic_page() {
    let (_dir, table) = blog();
    let target = table.resolve("/blog/hello-world").unwrap();

    assert_eq!(target.page.params["slug"], "hello-world");
    assert_eq!(target.captures[1].as_deref(), Some("hello-world"));
    assert_eq!(target.route.parts.len(), 2);
    assert_eq!(
        target.route.parts[0].as_ref().unwrap().component.name,
        "blog__layout"
    );
}

#[test]
fn test_params_are_decoded() {
    let (_dir, table) = blog();
    let target = table.resolve("/blog/caf%C3%A9%20au%20lait").unwrap();
    assert_eq!(target.page.params["slug"], "café au lait");
}

#[test]
fn test_spread_params_span_segments() {
    let (_dir, table) = blog();
    let target = table.resolve("/docs/guide/install").unwrap();
    assert_eq!(target.page.params["path"], "guide/install");
}

#[test]
fn test_query_is_extracted() {
    let (_dir, table) = blog();
    let target = table.resolve("/blog/a?tag=rust&tag=web&q=hello+world").unwrap();

    assert_eq!(
        target.page.query["tag"],
        QueryValue::Many(vec!["rust".to_string(), "web".to_string()])
    );
    assert_eq!(target.page.query["q"], QueryValue::One("hello world".to_string()));
}

#[test]
fn test_server_routes_are_ignored() {
    let (_dir, table) = blog();
    assert!(table.resolve("/api/status").is_none());
    // Data endpoints of pages are ignored too; they do not share a pattern.
    assert!(table.resolve("/blog/a.json").is_none());
}

#[test]
fn test_server_route_sharing_page_pattern_is_not_ignored() {
    let (_dir, table) = table(&["feed.html", "feed.js"], "http://localhost:3000/");
    assert!(table.resolve("/feed").is_some());
}

#[test]
fn test_no_match() {
    let (_dir, table) = blog();
    assert!(table.resolve("/nope/deeper").is_none());
}

#[test]
fn test_other_origin_not_handled() {
    let (_dir, table) = blog();
    let url = Url::parse("https://example.com/blog/a").unwrap();
    assert!(table.select_target(&url).is_none());
}

#[test]
fn test_base_path_is_stripped() {
    let (_dir, table) = table(&["index.html", "about.html"], "http://localhost:3000/app/");

    let target = table.resolve("/app/about").unwrap();
    assert_eq!(target.page.path, "/about");

    let target = table.resolve("/app").unwrap();
    assert_eq!(target.page.path, "/");

    assert!(table.resolve("/about").is_none());
}

#[test]
fn test_find_server_route() {
    let (_dir, table) = blog();

    let found = table.find_server_route("/blog/hello.json").unwrap();
    assert_eq!(found.route.file, "blog/[slug].json.js");
    assert_eq!(found.params["slug"], "hello");

    assert!(table.find_server_route("/blog/hello").is_none());
    assert_eq!(table.find_server_route("/api/status").unwrap().route.file, "api/status.js");
}

#[test]
fn test_extract_query() {
    assert!(extract_query(None).is_empty());
    assert!(extract_query(Some("")).is_empty());

    let query = extract_query(Some("a=1&b&c=x%3Dy&a=2&a=3"));
    assert_eq!(
        query["a"],
        QueryValue::Many(vec!["1".to_string(), "2".to_string(), "3".to_string()])
    );
    assert_eq!(query["b"], QueryValue::One(String::new()));
    assert_eq!(query["c"], QueryValue::One("x=y".to_string()));
    assert_eq!(query["a"].first(), Some("1"));
}

#[test]
fn test_query_serializes_untagged() {
    let query = extract_query(Some("a=1&a=2&b=3"));
    let json = serde_json::to_value(&query).unwrap();
    assert_eq!(json, serde_json::json!({"a": ["1", "2"], "b": "3"}));
}
