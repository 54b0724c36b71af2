//! Module aggregation: every piece of a module's documentation in one tree.

use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::extract::source_files;
use crate::model::Module;
use crate::modfile::{GoMod, MANIFEST_FILE};
use crate::version::{self, VersionSource};
use crate::walker::{PackageWalker, WalkOptions};
use crate::{license, readme};

/// Builds the documentation tree for the module rooted at `root`.
///
/// A missing or malformed `go.mod`, a missing root package or any syntax
/// error aborts. A failed version lookup does not: the version is left empty
/// and the release date is the current time. `version_override` replaces the
/// looked-up version when given.
pub fn aggregate(
    root: &Path,
    version_override: Option<&str>,
    versions: &dyn VersionSource,
    walk: WalkOptions,
) -> Result<Module> {
    let manifest = root.join(MANIFEST_FILE);
    let gomod = GoMod::read(&manifest)?;
    let name = gomod.module_path(&manifest)?.to_owned();
    info!(module = %name, root = %root.display(), "documenting module");

    let readme = readme::load(root);

    let walker = PackageWalker::new(root, walk);
    let documentation = walker.root_doc()?;

    let dependencies = gomod.requires;

    let (version, release_date) = version::resolve(versions, &name, version_override);

    let license = license::detect(root);

    let source_files = source_files(root).unwrap_or_else(|err| {
        warn!(error = %err, "cannot list module source files");
        Vec::new()
    });

    let packages = walker.packages()?;
    info!(
        packages = packages.len(),
        dependencies = dependencies.len(),
        %license,
        "module documented"
    );

    Ok(Module {
        name,
        version,
        release_date,
        license,
        readme,
        documentation,
        packages,
        source_files,
        dependencies,
    })
}
