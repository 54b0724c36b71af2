use std::path::PathBuf;

use thiserror::Error;

/// Coarse error taxonomy, used by callers that only care which stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// go.mod missing, unreadable or malformed.
    Manifest,
    /// A Go source file failed to parse.
    Parse,
    /// Something expected to exist (module declaration, root package) does not.
    NotFound,
    /// Version lookup failed. Absorbed by the aggregator.
    Lookup,
    /// Template or output failure.
    Render,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read module manifest {}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    ManifestSyntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("no module declaration in {}", path.display())]
    ModuleNotDeclared { path: PathBuf },

    #[error("cannot parse {}: {}", path.display(), diags.join("; "))]
    Parse { path: PathBuf, diags: Vec<String> },

    #[error("no Go package found in {}", path.display())]
    NoPackage { path: PathBuf },

    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("version lookup for {module} failed: {reason}")]
    Lookup { module: String, reason: String },

    #[error("cannot write {}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template error")]
    Template(#[from] tera::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ManifestRead { .. } | Error::ManifestSyntax { .. } => ErrorKind::Manifest,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::ModuleNotDeclared { .. } | Error::NoPackage { .. } | Error::Io { .. } => {
                ErrorKind::NotFound
            }
            Error::Lookup { .. } => ErrorKind::Lookup,
            Error::Render { .. } | Error::Template(_) => ErrorKind::Render,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
