use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error, info};

use super::error::CompileError;
use super::naming::{component_name, source_has_preload};
use super::parts::{parse_segment, Part};
use super::pattern::RoutePattern;
use super::sort::sort_entries;
use super::types::{ComponentKind, ManifestData, Page, PageComponent, PageSlot, ServerRoute};

/// Template extensions recognised when none are configured
pub const DEFAULT_EXTENSIONS: &str = ".svelte .html";

/// Extensions accepted for route files; anything else (editor temp files,
/// `foo.js~`) is skipped
static ROUTE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\.[a-z]+$").expect("route extension regex should be valid"));

/// One directory entry under consideration during the walk
#[derive(Debug, Clone)]
pub(super) struct Entry {
    pub ext: String,
    pub parts: Vec<Part>,
    /// Path relative to the routes directory, `/`-separated
    pub file: String,
    pub is_dir: bool,
    pub is_index: bool,
    pub is_page: bool,
    /// Text between the first dot and the extension (`.json` in `[slug].json.js`)
    pub route_suffix: String,
}

/// Compile a routes directory into a route table.
///
/// `extensions` is a space-separated list of template extensions
/// (e.g. `".svelte .html"`); files with one of them become pages, every
/// other file becomes a server route.
///
/// # Errors
///
/// Fails on a missing directory, unreadable files, bracket syntax errors and
/// pattern clashes. Every syntax or clash error names the offending file(s).
///
/// # Example
///
/// ```rust,no_run
/// use fsrouter::manifest::{create_manifest_data, DEFAULT_EXTENSIONS};
///
/// let manifest = create_manifest_data("src/routes", DEFAULT_EXTENSIONS)?;
/// for page in &manifest.pages {
///     println!("{}", page.pattern);
/// }
/// # Ok::<(), fsrouter::manifest::CompileError>(())
/// ```
pub fn create_manifest_data(
    cwd: impl AsRef<Path>,
    extensions: &str,
) -> Result<ManifestData, CompileError> {
    let cwd = cwd.as_ref();
    if !cwd.is_dir() {
        error!(routes_dir = %cwd.display(), "Routes directory does not exist");
        return Err(CompileError::MissingRoutesDir {
            path: cwd.to_path_buf(),
        });
    }

    info!(routes_dir = %cwd.display(), extensions = %extensions, "Compiling route table");

    let mut compiler = Compiler {
        cwd: cwd.to_path_buf(),
        extensions: extensions.split_whitespace().map(str::to_string).collect(),
        components: Vec::new(),
        pages: Vec::new(),
        server_routes: Vec::new(),
    };

    let root = compiler
        .find_layout("_layout", "main", "", ComponentKind::Layout)?
        .unwrap_or_else(PageComponent::default_layout);
    let error = compiler
        .find_layout("_error", "error", "", ComponentKind::Error)?
        .unwrap_or_else(PageComponent::default_error);

    compiler.walk("", &[], &[], &[])?;

    let manifest = ManifestData {
        root,
        error,
        components: compiler.components,
        pages: compiler.pages,
        server_routes: compiler.server_routes,
    };

    check_clashes(&manifest)?;

    info!(
        components = manifest.components.len(),
        pages = manifest.pages.len(),
        server_routes = manifest.server_routes.len(),
        root_preload = manifest.root.has_preload,
        "Route table compiled"
    );

    Ok(manifest)
}

struct Compiler {
    cwd: PathBuf,
    extensions: Vec<String>,
    components: Vec<PageComponent>,
    pages: Vec<Page>,
    server_routes: Vec<ServerRoute>,
}

impl Compiler {
    fn walk(
        &mut self,
        dir: &str,
        parent_segments: &[Vec<Part>],
        parent_params: &[String],
        stack: &[Option<PageSlot>],
    ) -> Result<(), CompileError> {
        let mut entries = self.read_entries(dir)?;
        sort_entries(&mut entries);

        for entry in entries {
            let mut segments = parent_segments.to_vec();

            if entry.is_index {
                if !entry.route_suffix.is_empty() {
                    match segments.last_mut() {
                        Some(last_segment) => merge_suffix(last_segment, &entry.route_suffix),
                        None => segments.push(entry.parts.clone()),
                    }
                }
            } else {
                segments.push(entry.parts.clone());
            }

            let mut params = parent_params.to_vec();
            params.extend(
                entry
                    .parts
                    .iter()
                    .filter(|p| p.dynamic)
                    .map(|p| p.param_name().to_string()),
            );

            if entry.is_dir {
                let layout_name = format!("{}__layout", component_name(&entry.file));
                let layout =
                    self.find_layout("_layout", &layout_name, &entry.file, ComponentKind::Layout)?;

                let mut child_stack = stack.to_vec();
                child_stack.push(layout.map(|component| {
                    debug!(layout = %component.name, dir = %entry.file, "Layout found");
                    PageSlot {
                        component: self.push_component(component),
                        params: params.clone(),
                    }
                }));

                let child_dir = entry.file.clone();
                self.walk(&child_dir, &segments, &params, &child_stack)?;
            } else if entry.is_page {
                let has_preload = self.has_preload(&entry.file)?;
                let component = PageComponent {
                    name: component_name(&entry.file),
                    file: Some(entry.file.clone()),
                    has_preload,
                    kind: ComponentKind::Page,
                    default: false,
                };
                let slot = PageSlot {
                    component: self.push_component(component),
                    params,
                };

                // An index page takes over its directory's empty slot.
                let mut parts = stack.to_vec();
                if entry.is_index && matches!(parts.last(), Some(None)) {
                    parts.pop();
                }
                parts.push(Some(slot));

                let pattern = compile_pattern(&segments, true, &entry.file)?;
                debug!(file = %entry.file, pattern = %pattern, depth = parts.len(), "Page compiled");
                self.pages.push(Page { pattern, parts });
            } else {
                let pattern = compile_pattern(&segments, entry.route_suffix.is_empty(), &entry.file)?;
                debug!(file = %entry.file, ext = %entry.ext, pattern = %pattern, "Server route compiled");
                self.server_routes.push(ServerRoute {
                    name: format!("route_{}", component_name(&entry.file)),
                    pattern,
                    file: entry.file,
                    params,
                });
            }
        }

        Ok(())
    }

    /// List, filter and parse the entries of `dir` (relative to the routes root).
    fn read_entries(&self, dir: &str) -> Result<Vec<Entry>, CompileError> {
        let abs = self.cwd.join(dir);
        let read = fs::read_dir(&abs).map_err(|source| CompileError::Io {
            path: abs.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for dirent in read {
            let dirent = dirent.map_err(|source| CompileError::Io {
                path: abs.clone(),
                source,
            })?;
            match dirent.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => debug!(dir = %abs.display(), name = ?name, "Skipping non UTF-8 file name"),
            }
        }
        // Directory iteration order is platform dependent; start from a
        // deterministic order so equal-specificity siblings are stable.
        names.sort();

        let mut entries = Vec::with_capacity(names.len());
        for basename in names {
            if basename.starts_with('_') {
                continue;
            }
            if basename.starts_with('.') && basename != ".well-known" {
                continue;
            }

            let resolved = abs.join(&basename);
            let is_dir = fs::metadata(&resolved)
                .map_err(|source| CompileError::Io {
                    path: resolved.clone(),
                    source,
                })?
                .is_dir();

            let ext = if is_dir {
                String::new()
            } else {
                Path::new(&basename)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| format!(".{e}"))
                    .unwrap_or_default()
            };
            if !is_dir && !ROUTE_EXTENSION.is_match(&ext) {
                continue;
            }

            let file = if dir.is_empty() {
                basename.clone()
            } else {
                format!("{dir}/{basename}")
            };

            let segment = if is_dir {
                basename.as_str()
            } else {
                &basename[..basename.len() - ext.len()]
            };
            let parts = parse_segment(segment, &file)?;

            let route_suffix = if is_dir {
                String::new()
            } else {
                basename
                    .find('.')
                    .map(|dot| basename[dot..basename.len() - ext.len()].to_string())
                    .unwrap_or_default()
            };

            entries.push(Entry {
                is_index: !is_dir && basename.starts_with("index."),
                is_page: !is_dir && self.extensions.iter().any(|e| *e == ext),
                ext,
                parts,
                file,
                is_dir,
                route_suffix,
            });
        }

        Ok(entries)
    }

    /// Look for `<file_name><ext>` in `dir` for each template extension.
    fn find_layout(
        &self,
        file_name: &str,
        component_name: &str,
        dir: &str,
        kind: ComponentKind,
    ) -> Result<Option<PageComponent>, CompileError> {
        let found = self.extensions.iter().find(|ext| {
            self.cwd
                .join(dir)
                .join(format!("{file_name}{ext}"))
                .is_file()
        });

        let Some(ext) = found else {
            return Ok(None);
        };

        let file = if dir.is_empty() {
            format!("{file_name}{ext}")
        } else {
            format!("{dir}/{file_name}{ext}")
        };

        Ok(Some(PageComponent {
            name: component_name.to_string(),
            has_preload: self.has_preload(&file)?,
            file: Some(file),
            kind,
            default: false,
        }))
    }

    fn has_preload(&self, file: &str) -> Result<bool, CompileError> {
        let path = self.cwd.join(file);
        let source = fs::read_to_string(&path).map_err(|source| CompileError::Io { path, source })?;
        Ok(source_has_preload(&source))
    }

    fn push_component(&mut self, component: PageComponent) -> usize {
        self.components.push(component);
        self.components.len() - 1
    }
}

/// Fold an index file's route suffix into the parent segment.
///
/// `blog/index.json.js` serves `/blog.json`; `[slug]/index.json.js` serves
/// `/<slug>.json`.
fn merge_suffix(segment: &mut Vec<Part>, suffix: &str) {
    match segment.last_mut() {
        Some(last) if !last.dynamic => last.content.push_str(suffix),
        _ => segment.push(Part::literal(suffix)),
    }
}

fn compile_pattern(
    segments: &[Vec<Part>],
    add_trailing_slash: bool,
    file: &str,
) -> Result<RoutePattern, CompileError> {
    RoutePattern::compile(segments, add_trailing_slash).map_err(|e| {
        let pattern = RoutePattern::source(segments, add_trailing_slash);
        error!(file = %file, pattern = %pattern, error = %e, "Route pattern does not compile");
        CompileError::InvalidPattern {
            file: file.to_string(),
            pattern,
            message: e.to_string(),
        }
    })
}

/// Reject string-identical patterns, pages and server routes independently.
fn check_clashes(manifest: &ManifestData) -> Result<(), CompileError> {
    let mut seen_pages: HashMap<&str, &Page> = HashMap::new();
    for page in &manifest.pages {
        if let Some(other) = seen_pages.insert(page.pattern.as_str(), page) {
            let first = manifest.page_file(other).unwrap_or_default().to_string();
            let second = manifest.page_file(page).unwrap_or_default().to_string();
            error!(pattern = %page.pattern, first = %first, second = %second, "Page patterns clash");
            return Err(CompileError::PageClash { first, second });
        }
    }

    let mut seen_routes: HashMap<&str, &ServerRoute> = HashMap::new();
    for route in &manifest.server_routes {
        if let Some(other) = seen_routes.insert(route.pattern.as_str(), route) {
            error!(pattern = %route.pattern, first = %other.file, second = %route.file, "Server route patterns clash");
            return Err(CompileError::RouteClash {
                first: other.file.clone(),
                second: route.file.clone(),
            });
        }
    }

    Ok(())
}
