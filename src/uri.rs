use crate::error::ProxyError;
use crate::message::Endpoint;
use url::Url;

pub const DEFAULT_PORT: u16 = 5683;
pub const DEFAULT_SECURE_PORT: u16 = 5684;

/// Parsed forward-proxy target. Ephemeral; nothing holds one past the
/// round trip it was resolved for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl ResolvedTarget {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

/// Parse an absolute target URI into host, port and a normalized path.
/// Pure parsing, no network access. Callers handle a missing URI as
/// their own Bad Request case before ever calling this.
pub fn resolve(uri: &str) -> Result<ResolvedTarget, ProxyError> {
    let url = Url::parse(uri)?;
    let host = url
        .host_str()
        .ok_or_else(|| ProxyError::Target(format!("no host in '{}'", uri)))?
        .to_string();
    let port = url.port().unwrap_or(match url.scheme() {
        "coaps" => DEFAULT_SECURE_PORT,
        _ => DEFAULT_PORT,
    });
    Ok(ResolvedTarget { host, port, path: normalize_path(url.path()) })
}

/// Collapse any leading slashes to exactly one.
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}
