use std::fmt;
use std::path::PathBuf;

/// Route compilation error
///
/// Returned by [`create_manifest_data`](super::create_manifest_data) when the
/// routes directory cannot be turned into a route table. Compilation has no
/// partial result: the first error aborts the build.
#[derive(Debug)]
pub enum CompileError {
    /// The routes directory does not exist
    MissingRoutesDir {
        /// The directory that was expected
        path: PathBuf,
    },
    /// Reading the routes tree failed
    Io {
        /// File or directory being read
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },
    /// Two dynamic parameters share a segment without a literal between them
    ///
    /// `[a][b].html` is ambiguous: there is no way to tell where `a` ends.
    AdjacentParameters {
        /// Route file relative to the routes directory
        file: String,
    },
    /// A bracket group has no parameter name, e.g. `[(\d+)]`
    InvalidParameter {
        /// Route file relative to the routes directory
        file: String,
    },
    /// A qualifier contains `(`, `)`, `?` or `:`
    IllegalQualifier {
        /// Route file relative to the routes directory
        file: String,
    },
    /// The compiled pattern is not a valid regular expression
    InvalidPattern {
        /// Route file relative to the routes directory
        file: String,
        /// Compiled pattern source
        pattern: String,
        /// Error reported by the regex engine
        message: String,
    },
    /// Two pages compile to the same pattern
    PageClash {
        /// File of the page registered first
        first: String,
        /// File of the page that collided with it
        second: String,
    },
    /// Two server routes compile to the same pattern
    RouteClash {
        /// File of the route registered first
        first: String,
        /// File of the route that collided with it
        second: String,
    },
}

impl CompileError {
    /// Files named by this error, in the order they appear in the message
    #[must_use]
    pub fn files(&self) -> Vec<&str> {
        match self {
            CompileError::MissingRoutesDir { .. } | CompileError::Io { .. } => Vec::new(),
            CompileError::AdjacentParameters { file }
            | CompileError::InvalidParameter { file }
            | CompileError::IllegalQualifier { file }
            | CompileError::InvalidPattern { file, .. } => vec![file.as_str()],
            CompileError::PageClash { first, second }
            | CompileError::RouteClash { first, second } => vec![first.as_str(), second.as_str()],
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::MissingRoutesDir { path } => {
                write!(f, "Routes directory {} does not exist", path.display())
            }
            CompileError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            CompileError::AdjacentParameters { file } => {
                write!(f, "Invalid route {file}: parameters must be separated")
            }
            CompileError::InvalidParameter { file } => {
                write!(f, "Invalid route {file}: parameters must have a name")
            }
            CompileError::IllegalQualifier { file } => {
                write!(
                    f,
                    "Invalid route {file}: cannot use (, ), ? or : in route qualifiers"
                )
            }
            CompileError::InvalidPattern {
                file,
                pattern,
                message,
            } => {
                write!(
                    f,
                    "Invalid route {file}: pattern '{pattern}' does not compile ({message})"
                )
            }
            CompileError::PageClash { first, second } => {
                write!(f, "The {first} and {second} pages clash")
            }
            CompileError::RouteClash { first, second } => {
                write!(f, "The {first} and {second} routes clash")
            }
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
