//! Transport-independent request handling for `<base_path><group>/<key>`.
//!
//! [`HttpPool::serve`] turns a method and an already percent-decoded path into
//! a [`PoolResponse`]. The HTTP server in the binary only moves bytes between
//! the socket and this type.
//!
//! | Outcome | Status |
//! |---------|--------|
//! | value found or loaded | 200, `application/octet-stream` |
//! | path not `<group>/<key>` after the base path | 400 |
//! | path outside the base path, unknown group | 404 |
//! | method other than `GET` | 405 |
//! | loader failure | 500 |

use std::sync::Arc;

use tracing::{debug, info};

use crate::byteview::ByteView;
use crate::error::{CacheError, CacheResult};
use crate::registry::Registry;

/// Default prefix every cache request lives under.
pub const DEFAULT_BASE_PATH: &str = "/_geecache/";

pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Rendered answer to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl PoolResponse {
    fn ok(view: &ByteView) -> Self {
        Self {
            status: 200,
            content_type: CONTENT_TYPE_OCTET_STREAM,
            body: view.byte_slice(),
        }
    }

    fn text(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT,
            body: message.into().into_bytes(),
        }
    }

    fn error(err: &CacheError) -> Self {
        Self::text(err.status_code(), err.to_string())
    }
}

/// Serves cache lookups for one node.
#[derive(Debug, Clone)]
pub struct HttpPool {
    /// This node's address, e.g. `http://127.0.0.1:8001`; used in logs.
    self_addr: String,
    base_path: String,
    registry: Arc<Registry>,
}

impl HttpPool {
    pub fn new(self_addr: impl Into<String>, registry: Arc<Registry>) -> Self {
        Self {
            self_addr: self_addr.into(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            registry,
        }
    }

    /// Serve under a different prefix. It must start and end with `/`.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> CacheResult<Self> {
        let base_path = base_path.into();
        validate_base_path(&base_path)?;
        self.base_path = base_path;
        Ok(self)
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Split a request path into `(group, key)`.
    ///
    /// The key is everything after the group's slash and may itself contain
    /// slashes.
    pub fn parse_path<'a>(&self, path: &'a str) -> CacheResult<(&'a str, &'a str)> {
        let Some(rest) = path.strip_prefix(self.base_path.as_str()) else {
            return Err(CacheError::UnexpectedPath {
                path: path.to_string(),
                base_path: self.base_path.clone(),
            });
        };

        match rest.split_once('/') {
            Some((group, key)) if !group.is_empty() && !key.is_empty() => Ok((group, key)),
            _ => Err(CacheError::Routing {
                path: path.to_string(),
                reason: "expected <group>/<key>".to_string(),
            }),
        }
    }

    /// Resolve a request path to the cached (or freshly loaded) value.
    ///
    /// Blocks for as long as the group's loader does.
    pub fn lookup(&self, path: &str) -> CacheResult<ByteView> {
        let (group_name, key) = self.parse_path(path)?;
        let Some(group) = self.registry.get_group(group_name) else {
            return Err(CacheError::GroupNotFound {
                group: group_name.to_string(),
            });
        };
        group.get(key)
    }

    /// Handle one request.
    pub fn serve(&self, method: &str, path: &str) -> PoolResponse {
        info!("[Server {}] {} {}", self.self_addr, method, path);

        if !method.eq_ignore_ascii_case("GET") {
            return PoolResponse::text(405, format!("method not allowed: {method}"));
        }

        match self.lookup(path) {
            Ok(view) => PoolResponse::ok(&view),
            Err(err) => {
                debug!(path, status = err.status_code(), error = %err, "request failed");
                PoolResponse::error(&err)
            }
        }
    }
}

pub(crate) fn validate_base_path(base_path: &str) -> CacheResult<()> {
    if base_path.len() < 2 || !base_path.starts_with('/') || !base_path.ends_with('/') {
        return Err(CacheError::config(format!(
            "base path {base_path:?} must start and end with '/' and name a prefix"
        )));
    }
    Ok(())
}
