//! Shared domain model for the dinescope discovery engine.
//!
//! Holds the geographic primitives, the normalized restaurant candidate
//! schema, search request/result types, and configuration loading. Nothing in
//! this crate performs I/O beyond reading configuration files.

pub mod app_config;
pub mod config;
pub mod geo;
pub mod request;
pub mod sources;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{bounding_box, distance_km, offset_point, BoundingBox, GeoPoint, EARTH_RADIUS_KM};
pub use request::{InvalidRequest, ResultFilterSpec, SearchRequest};
pub use sources::{load_sources, parse_sources, PlacesVendor, RemoteSourceConfig};
pub use types::{
    AttemptRecord, RestaurantCandidate, SearchMetrics, SearchResult, SourceAttempt, Zone,
    ZoneCounts, ZonedCandidate, SOURCE_NONE, SOURCE_SYNTHETIC,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("sources validation failed: {0}")]
    Validation(String),
}
