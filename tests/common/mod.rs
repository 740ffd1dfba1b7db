#![allow(dead_code)]

pub mod route_tree {
    use std::fs;
    use std::path::Path;

    use fsrouter::manifest::{create_manifest_data, ManifestData, DEFAULT_EXTENSIONS};
    use fsrouter::router::RouteTable;
    use tempfile::TempDir;
    use url::Url;

    /// Component source that exports a preload
    pub const PRELOAD: &str =
        "<script context=\"module\">\n  export async function preload(page) { return {}; }\n</script>\n";

    /// A routes directory in a temp dir, removed on drop
    pub struct RouteTree {
        dir: TempDir,
    }

    impl RouteTree {
        /// Create a tree of `(relative path, contents)` files
        pub fn new(files: &[(&str, &str)]) -> Self {
            let dir = TempDir::new().unwrap();
            for (file, contents) in files {
                let path = dir.path().join(file);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, contents).unwrap();
            }
            Self { dir }
        }

        /// Create a tree of empty files
        pub fn empty_files(files: &[&str]) -> Self {
            let files: Vec<(&str, &str)> = files.iter().map(|f| (*f, "")).collect();
            Self::new(&files)
        }

        pub fn path(&self) -> &Path {
            self.dir.path()
        }

        pub fn compile(&self) -> ManifestData {
            create_manifest_data(self.path(), DEFAULT_EXTENSIONS).unwrap()
        }

        pub fn table(&self, base: &str) -> RouteTable {
            RouteTable::from_manifest(&self.compile(), &Url::parse(base).unwrap())
        }
    }

    /// A small blog: root layout with a preload, a blog section with its own
    /// layout, a JSON endpoint per post and a couple of static pages.
    pub fn blog() -> RouteTree {
        RouteTree::new(&[
            ("_layout.svelte", PRELOAD),
            ("_error.svelte", "<h1>{status}</h1>"),
            ("index.svelte", ""),
            ("about.svelte", ""),
            ("login.svelte", ""),
            ("blog/_layout.svelte", PRELOAD),
            ("blog/index.svelte", PRELOAD),
            ("blog/[slug].svelte", PRELOAD),
            ("blog/[slug].json.js", "export function get(req, res) {}"),
            ("api/health.js", "export function get(req, res) {}"),
        ])
    }
}

pub mod fakes {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use fsrouter::fetch::{FetchOptions, FetchResponse, Fetcher};
    use fsrouter::navigation::{BranchEntry, NavigationError, PageContext, Props, Renderer};
    use parking_lot::Mutex;
    use serde_json::Value;

    /// Fetcher that fails every request without touching the network
    pub struct OfflineFetcher;

    impl Fetcher for OfflineFetcher {
        fn fetch(
            &self,
            url: &str,
            _options: FetchOptions,
        ) -> BoxFuture<'static, Result<FetchResponse, NavigationError>> {
            let url = url.to_string();
            async move {
                Err(NavigationError::Fetch {
                    url,
                    message: "offline".to_string(),
                })
            }
            .boxed()
        }
    }

    /// What a [`RecordingRenderer`] saw for one commit
    #[derive(Debug, Clone)]
    pub struct Rendered {
        pub path: String,
        pub status: u16,
        pub root: Value,
        pub leaf: Option<Value>,
    }

    /// Renderer that records every commit
    #[derive(Default)]
    pub struct RecordingRenderer {
        renders: Mutex<Vec<Rendered>>,
    }

    impl RecordingRenderer {
        pub fn all(&self) -> Vec<Rendered> {
            self.renders.lock().clone()
        }

        pub fn paths(&self) -> Vec<String> {
            self.all().into_iter().map(|r| r.path).collect()
        }

        pub fn last(&self) -> Option<Rendered> {
            self.renders.lock().last().cloned()
        }
    }

    impl Renderer for RecordingRenderer {
        fn render(&self, props: &Props, branch: &[BranchEntry], page: &PageContext) {
            self.renders.lock().push(Rendered {
                path: page.page.path.clone(),
                status: props.status,
                root: props.root.clone(),
                leaf: branch
                    .last()
                    .and_then(BranchEntry::level)
                    .map(|level| level.props.clone()),
            });
        }
    }
}
