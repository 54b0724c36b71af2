//! Published version lookup through a Go module proxy.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const DEFAULT_PROXY: &str = "https://proxy.golang.org";

/// Body of `GET {proxy}/{module}/@latest`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Time")]
    pub time: DateTime<Utc>,
}

/// Where the latest published version of a module comes from.
pub trait VersionSource {
    fn latest(&self, module: &str) -> Result<VersionInfo>;
}

/// Blocking client for the module proxy protocol.
#[derive(Debug)]
pub struct ProxyClient {
    base: String,
    client: reqwest::blocking::Client,
}

impl ProxyClient {
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base = base.into().trim_end_matches('/').to_owned();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(format!("gomoddoc/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Lookup {
                module: String::new(),
                reason: format!("cannot create HTTP client: {e}"),
            })?;
        Ok(Self { base, client })
    }

    fn url(&self, module: &str) -> String {
        format!("{}/{}/@latest", self.base, escape_module_path(module))
    }
}

impl VersionSource for ProxyClient {
    fn latest(&self, module: &str) -> Result<VersionInfo> {
        let lookup = |reason: String| Error::Lookup {
            module: module.to_owned(),
            reason,
        };

        let url = self.url(module);
        debug!(%url, "querying module proxy");
        let response = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| lookup(e.to_string()))?;
        response
            .json::<VersionInfo>()
            .map_err(|e| lookup(format!("malformed response: {e}")))
    }
}

/// A source that never answers; used with `--offline`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl VersionSource for Offline {
    fn latest(&self, module: &str) -> Result<VersionInfo> {
        Err(Error::Lookup {
            module: module.to_owned(),
            reason: "offline".into(),
        })
    }
}

/// Proxy path escaping: each uppercase letter becomes `!` and its lowercase.
pub fn escape_module_path(module: &str) -> String {
    let mut out = String::with_capacity(module.len() + 4);
    for c in module.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Version and release date for `module`.
///
/// Lookup failures are logged and fall back to an empty version dated now.
/// An explicit `version` always replaces the looked-up one.
pub fn resolve(
    source: &dyn VersionSource,
    module: &str,
    version: Option<&str>,
) -> (String, DateTime<Utc>) {
    let (found, date) = match source.latest(module) {
        Ok(info) => {
            debug!(module, version = %info.version, "resolved version");
            (info.version, info.time)
        }
        Err(err) => {
            warn!(error = %err, "version lookup failed; using current time");
            (String::new(), Utc::now())
        }
    };
    (version.map_or(found, str::to_owned), date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Fixed(VersionInfo);

    impl VersionSource for Fixed {
        fn latest(&self, _: &str) -> Result<VersionInfo> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn escapes_uppercase() {
        assert_eq!(
            escape_module_path("github.com/BurntSushi/toml"),
            "github.com/!burnt!sushi/toml"
        );
        assert_eq!(escape_module_path("golang.org/x/mod"), "golang.org/x/mod");
    }

    #[test]
    fn parses_proxy_json() {
        let info: VersionInfo =
            serde_json::from_str(r#"{"Version":"v1.2.3","Time":"2024-05-01T10:00:00Z"}"#)
                .unwrap();
        assert_eq!(info.version, "v1.2.3");
        assert_eq!(info.time, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn failure_falls_back_to_now() {
        let before = Utc::now();
        let (version, date) = resolve(&Offline, "example.com/m", None);
        assert_eq!(version, "");
        assert!(date >= before && date <= Utc::now());
    }

    #[test]
    fn explicit_version_wins() {
        let time = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        let source = Fixed(VersionInfo {
            version: "v0.9.0".into(),
            time,
        });
        assert_eq!(
            resolve(&source, "m", Some("v1.0.0")),
            ("v1.0.0".to_owned(), time)
        );
        assert_eq!(resolve(&source, "m", None), ("v0.9.0".to_owned(), time));
        assert_eq!(resolve(&Offline, "m", Some("v2.0.0")).0, "v2.0.0");
    }

    #[test]
    fn proxy_url_trims_trailing_slash() {
        let client = ProxyClient::new("http://localhost:1/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("Example.com/M"), "http://localhost:1/!example.com/!m/@latest");
    }
}
