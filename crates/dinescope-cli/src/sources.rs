//! Source chain assembly from configuration.

use std::sync::Arc;
use std::time::Duration;

use dinescope_core::{AppConfig, RemoteSourceConfig};
use dinescope_db::PoolConfig;
use dinescope_sources::{
    LocalStoreAdapter, RemotePlacesAdapter, SourceAdapter, SourceChain, SyntheticAdapter,
};

/// Remote source entries from the registry file; a missing file means none.
pub(crate) fn load_remote_sources(
    config: &AppConfig,
) -> anyhow::Result<Vec<RemoteSourceConfig>> {
    if !config.sources_path.exists() {
        tracing::warn!(
            path = %config.sources_path.display(),
            "sources file not found; no remote sources configured"
        );
        return Ok(Vec::new());
    }
    Ok(dinescope_core::load_sources(&config.sources_path)?)
}

/// Remote adapters in registry order, then the local store when a database
/// is configured. Synthetic data is never part of the chain.
pub(crate) fn build_chain(config: &AppConfig) -> anyhow::Result<SourceChain> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    for source in load_remote_sources(config)? {
        let name = source.name.clone();
        match RemotePlacesAdapter::new(source, &config.user_agent) {
            Ok(adapter) => adapters.push(Arc::new(adapter)),
            Err(e) => tracing::warn!(source = %name, error = %e, "skipping remote source"),
        }
    }

    if let Some(database_url) = config.database_url.as_deref() {
        let pool =
            dinescope_db::connect_pool_lazy(database_url, PoolConfig::from_app_config(config))?;
        adapters.push(Arc::new(LocalStoreAdapter::new(
            pool,
            Duration::from_millis(config.local_timeout_ms),
        )));
    }

    if adapters.is_empty() {
        tracing::warn!("no data sources configured; only the fallback can answer");
    }

    Ok(SourceChain::new(adapters))
}

/// Synthetic data, consulted only after expansion finds nothing real.
pub(crate) fn build_fallback(config: &AppConfig) -> Option<Arc<dyn SourceAdapter>> {
    config
        .synthetic_fallback
        .then(|| Arc::new(SyntheticAdapter::new()) as Arc<dyn SourceAdapter>)
}

pub(crate) fn run_sources_list(config: &AppConfig) -> anyhow::Result<()> {
    let chain = build_chain(config)?;
    if chain.is_empty() {
        println!("no sources configured");
    }
    for (position, name) in chain.adapter_names().iter().enumerate() {
        println!("{}. {name}", position + 1);
    }
    if let Some(fallback) = build_fallback(config) {
        println!("fallback: {}", fallback.name());
    }
    Ok(())
}
