use std::path::PathBuf;
use std::time::Duration;

use crate::version::DEFAULT_PROXY;
use crate::walker::WalkOptions;

pub const DEFAULT_OUTPUT: &str = "out.html";
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// One documentation run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `go.mod`.
    pub module_path: PathBuf,
    pub output: PathBuf,
    /// Replaces whatever version the proxy reports.
    pub version_override: Option<String>,
    pub proxy_url: String,
    pub lookup_timeout: Duration,
    /// Skip the proxy; the version falls back as if the lookup failed.
    pub offline: bool,
    pub walk: WalkOptions,
}

impl Config {
    pub fn new(module_path: impl Into<PathBuf>) -> Self {
        Self {
            module_path: module_path.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            version_override: None,
            proxy_url: DEFAULT_PROXY.to_owned(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            offline: false,
            walk: WalkOptions::default(),
        }
    }
}
