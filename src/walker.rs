//! Sub-package discovery below a module root.

use std::path::{Component, Path};

use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::extract::{extract, parse_dir};
use crate::model::{Package, PackageDoc};

/// Reference given to the package at the module root.
pub const ROOT_REFERENCE: &str = "module";

/// Which directories the walk leaves out, together with everything below
/// them. The default visits every directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// `.git`, `.github`, ...
    pub skip_hidden: bool,
    pub skip_underscore: bool,
    pub skip_testdata: bool,
    pub skip_vendor: bool,
}

impl WalkOptions {
    /// Leave out what the `go` command ignores.
    pub const GO_IGNORED: Self = Self {
        skip_hidden: true,
        skip_underscore: true,
        skip_testdata: true,
        skip_vendor: true,
    };

    fn skips(&self, dir_name: &str) -> bool {
        (self.skip_hidden && dir_name.starts_with('.'))
            || (self.skip_underscore && dir_name.starts_with('_'))
            || (self.skip_testdata && dir_name == "testdata")
            || (self.skip_vendor && dir_name == "vendor")
    }
}

/// The documentation found in one module tree.
#[derive(Debug)]
pub struct Walk {
    /// The package at the module root.
    pub root: PackageDoc,
    /// Sub-packages in depth-first, lexicographic order.
    pub packages: Vec<Package>,
}

/// Walks `root`: documents the root package, then every sub-package.
pub fn walk(root: &Path, opts: WalkOptions) -> Result<Walk> {
    let walker = PackageWalker::new(root, opts);
    Ok(Walk {
        root: walker.root_doc()?,
        packages: walker.packages()?,
    })
}

#[derive(Debug, Clone)]
pub struct PackageWalker<'a> {
    root: &'a Path,
    opts: WalkOptions,
}

impl<'a> PackageWalker<'a> {
    pub fn new(root: &'a Path, opts: WalkOptions) -> Self {
        Self { root, opts }
    }

    /// Documentation of the package at the root itself.
    pub fn root_doc(&self) -> Result<PackageDoc> {
        let pkg = parse_dir(self.root)?.ok_or_else(|| Error::NoPackage {
            path: self.root.to_path_buf(),
        })?;
        Ok(extract(&pkg))
    }

    /// Every directory below the root holding at least one source file,
    /// as a [`Package`]. Directories without sources are still descended.
    ///
    /// The first parse error aborts the walk; nothing is returned.
    pub fn packages(&self) -> Result<Vec<Package>> {
        let opts = self.opts;
        let entries = WalkDir::new(self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| {
                e.file_type().is_dir() && !opts.skips(&e.file_name().to_string_lossy())
            });

        let mut packages = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.walk_error(e))?;
            let dir = entry.path();
            trace!(dir = %dir.display(), "visit");

            let Some(pkg) = parse_dir(dir)? else {
                continue;
            };
            let rel = dir.strip_prefix(self.root).unwrap_or(dir);
            let reference = reference(rel);
            debug!(reference = %reference, package = %pkg.name, "package");

            packages.push(Package {
                documentation: extract(&pkg),
                name: pkg.name,
                reference,
            });
        }
        Ok(packages)
    }

    fn walk_error(&self, err: walkdir::Error) -> Error {
        let path = err
            .path()
            .map_or_else(|| self.root.to_path_buf(), Path::to_path_buf);
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
        Error::io(path, source)
    }
}

/// Slash-separated reference for a path relative to the module root.
pub fn reference(rel: &Path) -> String {
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        ROOT_REFERENCE.to_owned()
    } else {
        parts.join("/")
    }
}
