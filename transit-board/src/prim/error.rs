//! PRIM client error types.

use super::config::Endpoint;
use super::schema::ValidationIssues;
use super::transport::TransportError;

/// Longest upstream body excerpt kept in an error.
pub const BODY_EXCERPT_CHARS: usize = 500;

/// Errors from the PRIM client.
#[derive(Debug, thiserror::Error)]
pub enum PrimError {
    /// No response at all (network error, timeout, etc.)
    #[error("failed to fetch {endpoint}: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: TransportError,
    },

    /// Upstream answered with a non-success status
    #[error("PRIM API error {status} on {endpoint}: {body}")]
    Upstream {
        endpoint: Endpoint,
        status: u16,
        /// Truncated body excerpt
        body: String,
    },

    /// Upstream answered 429
    #[error("rate limit exceeded for {endpoint}")]
    RateLimited { endpoint: Endpoint },

    /// Success status but the body is not JSON
    #[error("invalid JSON from {endpoint}: {message}")]
    Json {
        endpoint: Endpoint,
        message: String,
        body: String,
    },

    /// Success status but the payload does not have the expected shape
    #[error("validation error on {endpoint}: {issues}")]
    Validation {
        endpoint: Endpoint,
        issues: ValidationIssues,
    },

    /// The request could not be built from the caller's input
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl PrimError {
    pub(crate) fn upstream(endpoint: Endpoint, status: u16, body: &str) -> Self {
        PrimError::Upstream {
            endpoint,
            status,
            body: excerpt(body),
        }
    }

    /// HTTP status reported by upstream, if there was one.
    ///
    /// Rate limits count as upstream errors with status 429.
    pub fn status(&self) -> Option<u16> {
        match self {
            PrimError::Upstream { status, .. } => Some(*status),
            PrimError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, PrimError::RateLimited { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PrimError::Validation { .. })
    }

    /// Endpoint the failing request was for, if one was reached.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            PrimError::Transport { endpoint, .. }
            | PrimError::Upstream { endpoint, .. }
            | PrimError::RateLimited { endpoint }
            | PrimError::Json { endpoint, .. }
            | PrimError::Validation { endpoint, .. } => Some(*endpoint),
            PrimError::InvalidRequest(_) => None,
        }
    }
}

/// First [`BODY_EXCERPT_CHARS`] characters of a body.
pub(crate) fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
