use dinescope_core::InvalidRequest;
use thiserror::Error;

/// Failures surfaced to a search caller.
///
/// Source failures are absorbed by the chain; an empty result is success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequest),

    #[error("search cancelled")]
    Cancelled,
}

impl From<dinescope_sources::ChainCancelled> for DiscoveryError {
    fn from(_: dinescope_sources::ChainCancelled) -> Self {
        Self::Cancelled
    }
}
