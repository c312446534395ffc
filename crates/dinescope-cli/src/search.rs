//! The `search` command: request building, engine wiring, JSON output.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use dinescope_core::request::min_result_count_from_signed;
use dinescope_core::{AppConfig, GeoPoint, InvalidRequest, ResultFilterSpec, SearchRequest};
use dinescope_discovery::{
    AnalyticsSink, DiscoveryEngine, HttpAnalyticsSink, TracingAnalyticsSink,
};
use tokio_util::sync::CancellationToken;

use crate::sources::{build_chain, build_fallback};

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Center latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    /// Center longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,
    /// Initial search radius in km
    #[arg(long)]
    pub radius: Option<f64>,
    /// Upper bound for radius expansion in km
    #[arg(long)]
    pub max_radius: Option<f64>,
    /// Stop expanding once this many candidates are found
    #[arg(long, allow_negative_numbers = true)]
    pub min_results: Option<i64>,
    #[arg(long)]
    pub max_attempts: Option<u32>,
    /// Tolerance band beyond the radius in km
    #[arg(long)]
    pub buffer: Option<f64>,
    /// Place category sent to remote sources
    #[arg(long)]
    pub category: Option<String>,
    /// Case-insensitive cuisine substring
    #[arg(long)]
    pub cuisine: Option<String>,
    /// Highest price tier to include (1-4)
    #[arg(long)]
    pub max_price: Option<u8>,
    /// Lowest rating to include (0-5)
    #[arg(long)]
    pub min_rating: Option<f64>,
    /// Only restaurants offering delivery
    #[arg(long)]
    pub delivery: bool,
    /// Only restaurants offering takeout
    #[arg(long)]
    pub takeout: bool,
    /// Page size
    #[arg(long)]
    pub limit: Option<usize>,
    /// Items to skip before the page starts
    #[arg(long, default_value = "0")]
    pub offset: usize,
}

/// Translate CLI flags into a request; unset flags keep engine defaults.
pub(crate) fn build_request(args: &SearchArgs) -> Result<SearchRequest, InvalidRequest> {
    let mut request = SearchRequest::new(GeoPoint::new(args.lat, args.lng)?);

    if let Some(radius) = args.radius {
        request.initial_radius_km = radius;
    }
    if let Some(max_radius) = args.max_radius {
        request.max_radius_km = max_radius;
    }
    if let Some(min_results) = args.min_results {
        request.min_result_count = min_result_count_from_signed(min_results)?;
    }
    if let Some(max_attempts) = args.max_attempts {
        request.max_attempts = max_attempts;
    }
    if let Some(buffer) = args.buffer {
        request.buffer_km = buffer;
    }
    if let Some(category) = &args.category {
        request.category.clone_from(category);
    }
    if let Some(limit) = args.limit {
        request.page_limit = limit;
    }
    request.page_offset = args.offset;
    request.filters = ResultFilterSpec {
        cuisine: args.cuisine.clone(),
        price_ceiling: args.max_price,
        min_rating: args.min_rating,
        require_delivery: args.delivery,
        require_takeout: args.takeout,
    };

    request.validate()?;
    Ok(request)
}

fn build_analytics(config: &AppConfig) -> Arc<dyn AnalyticsSink> {
    let Some(url) = config.analytics_url.as_deref() else {
        return Arc::new(TracingAnalyticsSink);
    };
    match HttpAnalyticsSink::new(
        url,
        Duration::from_millis(config.analytics_timeout_ms),
        &config.user_agent,
    ) {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            tracing::warn!(error = %e, "analytics endpoint unusable; logging events instead");
            Arc::new(TracingAnalyticsSink)
        }
    }
}

pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs) -> anyhow::Result<()> {
    let request = build_request(args)?;
    let mut engine =
        DiscoveryEngine::new(build_chain(config)?).with_analytics(build_analytics(config));
    if let Some(fallback) = build_fallback(config) {
        engine = engine.with_fallback(fallback);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received; cancelling search");
            on_interrupt.cancel();
        }
    });

    let result = engine.search_with_cancel(&request, &cancel).await?;

    let output = serde_json::json!({
        "result": {
            "items": result.items,
            "total": result.total,
            "zone_counts": result.zone_counts,
            "source_used": result.source_used,
            "is_synthetic": result.is_synthetic,
        },
        "metrics": result.metrics,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
