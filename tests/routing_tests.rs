mod common;

use common::route_tree::{blog, RouteTree};
use fsrouter::manifest::ComponentKind;
use fsrouter::router::QueryValue;
use fsrouter::CompileError;
use url::Url;

const BASE: &str = "http://localhost:3000/";

fn component_names(target: &fsrouter::router::Target) -> Vec<Option<String>> {
    target
        .route
        .parts
        .iter()
        .map(|part| part.as_ref().map(|level| level.component.name.clone()))
        .collect()
}

#[test]
fn test_blog_tree_compiles() {
    let manifest = blog().compile();

    assert_eq!(manifest.root.name, "main");
    assert!(manifest.root.has_preload);
    assert_eq!(manifest.error.name, "error");
    assert!(!manifest.error.default);
    assert_eq!(manifest.error.kind, ComponentKind::Error);
    assert_eq!(manifest.pages.len(), 5);

    let mut routes: Vec<&str> = manifest.server_routes.iter().map(|r| r.name.as_str()).collect();
    routes.sort_unstable();
    assert_eq!(routes, vec!["route_api_health", "route_blog_$slug_json"]);

    let layout = manifest
        .components
        .iter()
        .find(|c| c.name == "blog__layout")
        .unwrap();
    assert_eq!(layout.kind, ComponentKind::Layout);
    assert!(layout.has_preload);
}

#[test]
fn test_static_page_wins_over_parameter() {
    let tree = RouteTree::empty_files(&["blog/[slug].svelte", "blog/archive.svelte"]);
    let table = tree.table(BASE);

    let archive = table.resolve("/blog/archive").unwrap();
    assert!(archive.page.params.is_empty());
    assert_eq!(component_names(&archive), vec![None, Some("blog_archive".to_string())]);

    let post = table.resolve("/blog/anything-else").unwrap();
    assert_eq!(post.page.params["slug"], "anything-else");
}

#[test]
fn test_resolves_nested_branch() {
    let table = blog().table(BASE);

    let post = table.resolve("/blog/hello").unwrap();
    assert_eq!(
        component_names(&post),
        vec![Some("blog__layout".to_string()), Some("blog_$slug".to_string())]
    );
    assert_eq!(post.page.params["slug"], "hello");
    assert_eq!(post.page.host, "localhost:3000");

    let index = table.resolve("/blog").unwrap();
    let names = component_names(&index);
    assert_eq!(names.last().unwrap().as_deref(), Some("blog"));

    assert!(table.resolve("/blog/hello/").is_some());
    assert!(table.resolve("/blog/hello/comments").is_none());
}

#[test]
fn test_server_routes_are_left_to_the_server() {
    let table = blog().table(BASE);

    assert!(table.resolve("/blog/hello.json").is_none());
    assert!(table.resolve("/api/health").is_none());

    let json = table.find_server_route("/blog/hello.json").unwrap();
    assert_eq!(json.route.name, "route_blog_$slug_json");
    assert_eq!(json.params["slug"], "hello");

    let health = table.find_server_route("/api/health").unwrap();
    assert_eq!(health.route.file, "api/health.js");
    assert!(table.find_server_route("/blog/hello").is_none());
}

#[test]
fn test_params_and_query_are_decoded() {
    let table = blog().table(BASE);
    let target = table
        .resolve("/blog/caf%C3%A9?tag=a&tag=b&q=hello+world&flag")
        .unwrap();

    assert_eq!(target.page.params["slug"], "café");
    assert_eq!(
        target.page.query["tag"],
        QueryValue::Many(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(target.page.query["q"].first(), Some("hello world"));
    assert_eq!(target.page.query["flag"], QueryValue::One(String::new()));
}

#[test]
fn test_base_path_is_stripped() {
    let table = blog().table("https://example.com/app/");

    let target = table.resolve("/app/blog/hello").unwrap();
    assert_eq!(target.page.path, "/blog/hello");
    assert_eq!(target.href, "https://example.com/app/blog/hello");

    // Relative hrefs resolve under the base path.
    assert_eq!(table.resolve("about").unwrap().page.path, "/about");
    assert_eq!(table.resolve("/app").unwrap().page.path, "/");

    assert!(table.resolve("/blog/hello").is_none());
}

#[test]
fn test_other_origins_are_not_handled() {
    let table = blog().table(BASE);

    for url in [
        "https://localhost:3000/about",
        "http://localhost:4000/about",
        "http://example.com/about",
    ] {
        assert!(table.select_target(&Url::parse(url).unwrap()).is_none(), "{url}");
    }
    assert!(table
        .select_target(&Url::parse("http://localhost:3000/about").unwrap())
        .is_some());
}

#[test]
fn test_clashing_tree_names_both_files() {
    let tree = RouteTree::empty_files(&["blog/[slug].svelte", "blog/[id].svelte"]);
    let err = fsrouter::create_manifest_data(tree.path(), ".svelte").unwrap_err();

    assert!(matches!(err, CompileError::PageClash { .. }));
    let files = err.files();
    assert!(files.contains(&"blog/[slug].svelte"));
    assert!(files.contains(&"blog/[id].svelte"));
}
