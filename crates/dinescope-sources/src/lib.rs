//! Restaurant data sources and the priority fallback chain.
//!
//! Every source implements [`SourceAdapter`] and normalizes its records into
//! [`dinescope_core::RestaurantCandidate`]. [`SourceChain`] runs adapters in
//! priority order and returns the first non-empty result; it never merges.

pub mod adapter;
pub mod chain;
pub mod error;
pub mod local;
pub mod normalize;
pub mod remote;
pub mod synthetic;

pub use adapter::{FetchQuery, SourceAdapter};
pub use chain::{ChainCancelled, ChainOutcome, SourceChain, SourceTrial};
pub use error::SourceError;
pub use local::{LocalStoreAdapter, LOCAL_STORE_SOURCE};
pub use remote::RemotePlacesAdapter;
pub use synthetic::SyntheticAdapter;
