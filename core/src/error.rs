//! Error types for the Clash of Clans API client.
//!
//! # Design
//! One closed enumeration covers every way a call can fail. `Unauthorized`
//! and `NotFound` get dedicated variants because callers routinely branch on
//! them (private war logs, unknown tags). All other non-2xx responses land in
//! `Api` with the raw status code and body. Only `RateLimitExceeded` and
//! `Network` are ever produced after retrying; everything else is terminal
//! on first occurrence.

use thiserror::Error;

/// Result alias used throughout the client.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by `CocClient` endpoint methods and the request pipeline.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller misuse detected before anything was sent, e.g. conflicting
    /// paging cursors.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The client configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The server returned 401 or 403. Usually a bad token or an IP that is
    /// not whitelisted for the key.
    #[error("unauthorized (HTTP {status}): {body}")]
    Unauthorized { status: u16, body: String },

    /// The server returned 404.
    #[error("resource not found: {body}")]
    NotFound { body: String },

    /// Every attempt was answered with 429.
    #[error("rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    /// The transport failed on every attempt, or failed in a way that
    /// retrying cannot fix.
    #[error("network error after {attempts} attempts: {source}")]
    Network {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// Any other non-2xx status, or a 2xx whose body is not valid JSON.
    #[error("API error (HTTP {status}): {body}")]
    Api {
        status: u16,
        body: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl ApiError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status associated with this error, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::RateLimitExceeded { .. } => Some(429),
            Self::InvalidArgument(_) | Self::Config(_) | Self::Network { .. } => None,
        }
    }

    /// Whether the failure class is transient. The pipeline has already
    /// spent its retry budget by the time one of these reaches the caller,
    /// but a caller with its own schedule may try again later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitExceeded { .. } => true,
            Self::Network { source, .. } => source.is_transient(),
            Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Unauthorized { .. }
            | Self::NotFound { .. }
            | Self::Api { .. } => false,
        }
    }
}

/// Failure reported by a `Transport` before any HTTP status was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The attempt did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The connection could not be established or was dropped mid-flight.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request could not be issued at all (malformed URL, bad header).
    #[error("request could not be sent: {0}")]
    Request(String),
}

impl TransportError {
    /// Timeouts and connection failures are worth retrying.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }
}
