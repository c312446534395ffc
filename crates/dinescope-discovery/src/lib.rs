//! The discovery engine: adaptive radius search over a source chain.
//!
//! [`DiscoveryEngine`] is the only entry point callers need. It validates a
//! [`dinescope_core::SearchRequest`], expands the radius through
//! [`RadiusController`], zones and filters the candidates, and returns one
//! page of results with metrics.

pub mod analytics;
pub mod engine;
pub mod error;
pub mod filter;
pub mod radius;
pub mod zones;

pub use analytics::{
    AnalyticsError, AnalyticsSink, HttpAnalyticsSink, SearchEvent, TracingAnalyticsSink,
};
pub use engine::DiscoveryEngine;
pub use error::DiscoveryError;
pub use filter::ResultFilter;
pub use radius::{ExpansionLimits, ExpansionOutcome, RadiusController, RadiusState};
pub use zones::{zone_counts, zone_for, ZoneClassifier};
