//! Single-page HTML reference for a Go module.
//!
//! - `modfile` reads `go.mod`; `extract` turns parsed Go files into
//!   documentation records; `walker` finds the sub-packages.
//! - `module` puts it together with the README, license and published
//!   version; `render` writes the page through Tera templates.
//!
//! Go parsing lives in the `gomoddoc-parser` crate.

pub mod config;
pub mod error;
pub mod extract;
pub mod license;
pub mod model;
pub mod modfile;
pub mod module;
pub mod readme;
pub mod render;
pub mod version;
pub mod walker;

use std::path::PathBuf;

use tracing::{info, warn};

// Re-exports for convenience
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use model::Module;
pub use module::aggregate;
pub use walker::{walk, WalkOptions};

use render::{write_output, HtmlRenderer, TemplateBundle};
use version::{Offline, ProxyClient, VersionSource};

/// Documents the module described by `config` and writes the page.
///
/// Returns the path written. Nothing is written when any step fails.
pub fn generate(config: &Config) -> Result<PathBuf> {
    let proxy;
    let versions: &dyn VersionSource = if config.offline {
        &Offline
    } else {
        match ProxyClient::new(config.proxy_url.as_str(), config.lookup_timeout) {
            Ok(client) => {
                proxy = client;
                &proxy
            }
            Err(err) => {
                warn!(error = %err, "version lookup disabled");
                &Offline
            }
        }
    };

    let module = aggregate(
        &config.module_path,
        config.version_override.as_deref(),
        versions,
        config.walk,
    )?;

    let html = HtmlRenderer::new(&TemplateBundle::builtin())?.render(&module)?;
    write_output(&config.output, &html)?;
    info!(output = %config.output.display(), "documentation written");

    Ok(config.output.clone())
}
