mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::fakes::{OfflineFetcher, RecordingRenderer};
use common::route_tree::{blog, RouteTree};
use fsrouter::goto::{GotoOptions, History, HistoryState, MemoryHistory};
use fsrouter::navigation::{preload, InitialData, Navigator, PreloadFn, Renderer};
use fsrouter::registry::ComponentRegistry;
use parking_lot::Mutex;
use serde_json::json;
use url::Url;

const BASE: &str = "http://localhost:3000/";

#[derive(Default)]
struct Calls(Mutex<HashMap<String, usize>>);

impl Calls {
    fn hit(&self, name: &str) {
        *self.0.lock().entry(name.to_string()).or_insert(0) += 1;
    }

    fn count(&self, name: &str) -> usize {
        self.0.lock().get(name).copied().unwrap_or(0)
    }
}

struct App {
    _tree: RouteTree,
    navigator: Navigator,
    history: Arc<MemoryHistory>,
    renderer: Arc<RecordingRenderer>,
    calls: Arc<Calls>,
}

/// Preload echoing the component name, slug and session user
fn echo(calls: &Arc<Calls>, name: &'static str) -> PreloadFn {
    let calls = Arc::clone(calls);
    preload(move |page, _ctx, session| {
        calls.hit(name);
        async move {
            Ok(json!({
                "component": name,
                "slug": page.params.get("slug"),
                "user": session.get("user"),
            }))
        }
    })
}

fn app_at(location: &str, initial: InitialData) -> App {
    let tree = blog();
    let manifest = tree.compile();
    let routes = fsrouter::RouteTable::from_manifest(&manifest, &Url::parse(BASE).unwrap());

    let calls = Arc::new(Calls::default());
    let registry = ComponentRegistry::from_manifest(&manifest)
        .with_preload("main", echo(&calls, "main"))
        .with_preload("blog__layout", echo(&calls, "blog__layout"))
        .with_preload("blog", echo(&calls, "blog"))
        .with_preload("blog_$slug", echo(&calls, "blog_$slug"));
    assert!(registry.missing_preloads(&manifest).is_empty());

    let history = Arc::new(MemoryHistory::new(location));
    let renderer = Arc::new(RecordingRenderer::default());
    let navigator = Navigator::builder(routes, Arc::new(registry))
        .fetcher(Arc::new(OfflineFetcher))
        .history(Arc::clone(&history) as Arc<dyn History>)
        .renderer(Arc::clone(&renderer) as Arc<dyn Renderer>)
        .initial_data(initial)
        .build();

    App {
        _tree: tree,
        navigator,
        history,
        renderer,
        calls,
    }
}

fn app() -> App {
    app_at(BASE, InitialData::default())
}

#[tokio::test]
async fn test_start_then_goto_pushes_history() {
    let app = app();
    app.navigator.start().await.unwrap();
    assert_eq!(app.renderer.paths(), vec!["/"]);

    app.navigator
        .goto("/blog/hello", GotoOptions::default())
        .await
        .unwrap();

    assert_eq!(app.renderer.paths(), vec!["/", "/blog/hello"]);
    let entries = app.history.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].href, "http://localhost:3000/blog/hello");
    assert_eq!(entries[1].state, Some(HistoryState { id: 2 }));
    assert_eq!(app.navigator.history_id(), 2);

    let leaf = app.renderer.last().unwrap().leaf.unwrap();
    assert_eq!(leaf["slug"], "hello");
}

#[tokio::test]
async fn test_goto_with_replace_state() {
    let app = app();
    app.navigator.start().await.unwrap();

    app.navigator
        .goto("/about", GotoOptions { replace_state: true })
        .await
        .unwrap();

    let entries = app.history.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].href, "http://localhost:3000/about");
    assert_eq!(app.renderer.paths(), vec!["/", "/about"]);
}

#[tokio::test]
async fn test_goto_outside_the_client_loads_the_document() {
    let app = app();
    app.navigator.start().await.unwrap();

    for href in ["/api/health", "https://example.com/elsewhere"] {
        let pending = tokio::time::timeout(
            Duration::from_millis(50),
            app.navigator.goto(href, GotoOptions::default()),
        )
        .await;
        assert!(pending.is_err(), "{href} should never resolve");
    }

    assert_eq!(
        app.history.assigned(),
        vec![
            "http://localhost:3000/api/health",
            "https://example.com/elsewhere",
        ]
    );
    assert_eq!(app.history.entries().len(), 1);
    assert_eq!(app.renderer.paths(), vec!["/"]);
}

#[tokio::test]
async fn test_popstate_returns_to_earlier_entry() {
    let app = app();
    app.navigator.start().await.unwrap();
    app.navigator.goto("/about", GotoOptions::default()).await.unwrap();
    app.navigator.goto("/blog/a", GotoOptions::default()).await.unwrap();

    let entry = app.history.back().unwrap();
    assert_eq!(entry.state, Some(HistoryState { id: 2 }));
    app.navigator.on_popstate(entry.state).await.unwrap();

    assert_eq!(app.renderer.paths(), vec!["/", "/about", "/blog/a", "/about"]);
    assert_eq!(app.navigator.history_id(), 2);
}

#[tokio::test]
async fn test_popstate_without_state_stamps_an_id() {
    let app = app();
    app.navigator.start().await.unwrap();
    app.navigator.goto("/about", GotoOptions::default()).await.unwrap();

    // A fragment change adds an entry with no state.
    app.navigator.on_popstate(None).await.unwrap();

    assert_eq!(app.navigator.history_id(), 3);
    assert_eq!(
        app.history.current().unwrap().state,
        Some(HistoryState { id: 3 })
    );
    assert_eq!(app.renderer.paths(), vec!["/", "/about"]);
}

#[tokio::test]
async fn test_session_watcher_refreshes_current_page() {
    let app = app_at("http://localhost:3000/blog/a", InitialData::default());
    app.navigator.start().await.unwrap();
    assert_eq!(app.calls.count("blog_$slug"), 1);

    let watcher = app.navigator.watch_session();
    app.navigator.set_session(json!({ "user": "grace" }));

    let mut refreshed = false;
    for _ in 0..100 {
        if app.renderer.all().len() == 2 {
            refreshed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    watcher.abort();

    assert!(refreshed, "session change did not re-render");
    assert_eq!(app.calls.count("blog__layout"), 2);
    assert_eq!(app.calls.count("blog_$slug"), 2);
    assert_eq!(app.calls.count("main"), 1);
    let leaf = app.renderer.last().unwrap().leaf.unwrap();
    assert_eq!(leaf["user"], "grace");
}

#[tokio::test]
async fn test_prefetch_is_shared_with_goto() {
    let app = app();
    app.navigator.start().await.unwrap();

    let prefetched = app.navigator.prefetch("/blog/hello").unwrap();
    let warmed = tokio::spawn(prefetched);
    let hydrated = warmed.await.unwrap().unwrap();
    assert_eq!(hydrated.props.status, 200);
    assert_eq!(app.calls.count("blog_$slug"), 1);

    app.navigator
        .goto("/blog/hello", GotoOptions::default())
        .await
        .unwrap();

    assert_eq!(app.calls.count("blog_$slug"), 1);
    assert!(app.navigator.prefetching().is_none());
    assert_eq!(app.renderer.paths(), vec!["/", "/blog/hello"]);

    // The slot was consumed, so the next visit hydrates again.
    app.navigator.goto("/", GotoOptions::default()).await.unwrap();
    app.navigator
        .goto("/blog/hello", GotoOptions::default())
        .await
        .unwrap();
    assert_eq!(app.calls.count("blog_$slug"), 2);
}

#[tokio::test]
async fn test_server_rendered_start() {
    let initial = InitialData {
        preloaded: vec![json!({ "component": "main", "seeded": true })],
        session: json!({ "user": "ada" }),
        ..InitialData::default()
    };
    let app = app_at("http://localhost:3000/about", initial);

    app.navigator.start().await.unwrap();

    assert_eq!(app.calls.count("main"), 0);
    let rendered = app.renderer.last().unwrap();
    assert_eq!(rendered.path, "/about");
    assert_eq!(rendered.root["seeded"], true);
    assert_eq!(app.navigator.session()["user"], "ada");
    assert_eq!(app.history.current().unwrap().state, Some(HistoryState { id: 1 }));
}
