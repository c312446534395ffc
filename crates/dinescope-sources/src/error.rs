use thiserror::Error;

/// Recoverable failures of a single source call.
///
/// The chain logs these and moves to the next adapter; they never reach the
/// caller of a search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Network failure, timeout, 5xx, rejected credentials, or an exhausted
    /// connection pool.
    #[error("source {source_name} unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    /// HTTP 429 or a vendor quota status.
    #[error("source {source_name} rate limited (retry after {retry_after_secs}s)")]
    RateLimited {
        source_name: String,
        retry_after_secs: u64,
    },

    /// The body could not be decoded into the vendor's expected shape.
    #[error("source {source_name} returned a malformed response: {context}")]
    MalformedResponse {
        source_name: String,
        context: String,
    },
}

impl SourceError {
    pub(crate) fn unavailable(source_name: &str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(source_name: &str, context: impl Into<String>) -> Self {
        Self::MalformedResponse {
            source_name: source_name.to_string(),
            context: context.into(),
        }
    }

    /// Short machine-readable kind for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "unavailable",
            Self::RateLimited { .. } => "rate_limited",
            Self::MalformedResponse { .. } => "malformed_response",
        }
    }
}
