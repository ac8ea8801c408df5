//! Error types for the cache core and its transport boundary.

/// Cache errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Caller passed an argument the cache cannot serve (e.g. an empty key).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The group's loader failed. The loader's error is kept as the source.
    #[error("failed to load key {key:?}: {source}")]
    Load {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Misconfiguration detected while wiring groups or reading config.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Inbound request path could not be mapped to a group/key pair.
    #[error("bad request path {path:?}: {reason}")]
    Routing { path: String, reason: String },

    /// Request path lies outside the served base path.
    #[error("unexpected path {path:?}: not under {base_path:?}")]
    UnexpectedPath { path: String, base_path: String },

    /// Request addressed a group that is not registered.
    #[error("no such group: {group}")]
    GroupNotFound { group: String },
}

impl CacheError {
    /// HTTP status the transport answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Routing { .. } | Self::InvalidArgument { .. } => 400,
            Self::UnexpectedPath { .. } | Self::GroupNotFound { .. } => 404,
            Self::Load { .. } | Self::Config { .. } => 500,
        }
    }

    /// Exit code for the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::InvalidArgument { .. } | Self::GroupNotFound { .. } => 1,
            Self::Routing { .. } | Self::UnexpectedPath { .. } => 1,
            Self::Load { .. } => 3,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
