//! Remote places-source registry loaded from YAML.
//!
//! Entry order in the file is the chain priority. API keys are resolved from
//! the named environment variable once, at load time, and carried in the
//! resulting [`RemoteSourceConfig`] so adapters never read ambient state.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_CONFIDENCE: f64 = 0.9;

/// Response-shape profile of a third-party places API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacesVendor {
    /// Nearby-search style: `results[]`, 0–5 rating, 0–4 `price_level`.
    GooglePlaces,
    /// Place-search style: `results[]`, 0–10 rating, 1–4 `price`.
    Foursquare,
}

impl std::fmt::Display for PlacesVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacesVendor::GooglePlaces => write!(f, "google_places"),
            PlacesVendor::Foursquare => write!(f, "foursquare"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    pub vendor: PlacesVendor,
    pub endpoint_base_url: String,
    pub api_key_env: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// Fully-resolved configuration injected into one remote adapter.
#[derive(Clone)]
pub struct RemoteSourceConfig {
    pub name: String,
    pub vendor: PlacesVendor,
    pub api_key: String,
    pub endpoint_base_url: String,
    pub timeout_ms: u64,
    pub confidence: f64,
    /// Position in the chain; lower runs first.
    pub priority: u16,
}

impl std::fmt::Debug for RemoteSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSourceConfig")
            .field("name", &self.name)
            .field("vendor", &self.vendor)
            .field("api_key", &"[redacted]")
            .field("endpoint_base_url", &self.endpoint_base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("confidence", &self.confidence)
            .field("priority", &self.priority)
            .finish()
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

fn default_enabled() -> bool {
    true
}

/// Load, validate, and resolve the sources registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<Vec<RemoteSourceConfig>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_sources(&content, |key| std::env::var(key))
}

/// Parse and resolve a sources registry using the provided env-var lookup.
///
/// Disabled entries and entries whose key variable is unset are skipped; the
/// latter with a warning.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or an entry is invalid.
pub fn parse_sources<F>(yaml: &str, lookup: F) -> Result<Vec<RemoteSourceConfig>, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let file: SourcesFile = serde_yaml::from_str(yaml)?;
    validate_sources(&file)?;

    let mut resolved = Vec::new();
    for entry in file.sources.into_iter().filter(|s| s.enabled) {
        let Some(api_key) = lookup(&entry.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
        else {
            tracing::warn!(
                source = %entry.name,
                api_key_env = %entry.api_key_env,
                "skipping remote source: API key variable is not set"
            );
            continue;
        };

        let priority = u16::try_from(resolved.len()).unwrap_or(u16::MAX);
        resolved.push(RemoteSourceConfig {
            name: entry.name,
            vendor: entry.vendor,
            api_key,
            endpoint_base_url: entry.endpoint_base_url,
            timeout_ms: entry.timeout_ms,
            confidence: entry.confidence,
            priority,
        });
    }

    Ok(resolved)
}

fn validate_sources(file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for source in &file.sources {
        let name = source.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }
        if matches!(name, "none" | "synthetic" | "local_store") {
            return Err(ConfigError::Validation(format!(
                "source name '{name}' is reserved"
            )));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{name}'"
            )));
        }
        let url = source.endpoint_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "source '{name}' has invalid endpoint_base_url '{url}'"
            )));
        }
        if source.timeout_ms == 0 {
            return Err(ConfigError::Validation(format!(
                "source '{name}' must have timeout_ms > 0"
            )));
        }
        if !(0.0..=1.0).contains(&source.confidence) {
            return Err(ConfigError::Validation(format!(
                "source '{name}' has confidence {} outside [0, 1]",
                source.confidence
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    const TWO_SOURCES: &str = r"
sources:
  - name: google_places
    vendor: google_places
    endpoint_base_url: https://maps.googleapis.com/maps/api/place
    api_key_env: GOOGLE_PLACES_API_KEY
    timeout_ms: 4000
    confidence: 0.95
  - name: foursquare
    vendor: foursquare
    endpoint_base_url: https://api.foursquare.com/v3
    api_key_env: FOURSQUARE_API_KEY
";

    #[test]
    fn resolves_keys_and_assigns_priority_in_file_order() {
        let mut env = HashMap::new();
        env.insert("GOOGLE_PLACES_API_KEY", "g-key");
        env.insert("FOURSQUARE_API_KEY", "f-key");

        let sources = parse_sources(TWO_SOURCES, lookup_from_map(&env)).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].name, "google_places");
        assert_eq!(sources[0].vendor, PlacesVendor::GooglePlaces);
        assert_eq!(sources[0].api_key, "g-key");
        assert_eq!(sources[0].timeout_ms, 4000);
        assert_eq!(sources[0].priority, 0);
        assert_eq!(sources[1].vendor, PlacesVendor::Foursquare);
        assert_eq!(sources[1].timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!((sources[1].confidence - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
        assert_eq!(sources[1].priority, 1);
    }

    #[test]
    fn skips_source_without_api_key() {
        let mut env = HashMap::new();
        env.insert("FOURSQUARE_API_KEY", "f-key");

        let sources = parse_sources(TWO_SOURCES, lookup_from_map(&env)).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "foursquare");
        assert_eq!(sources[0].priority, 0, "priority is dense over kept sources");
    }

    #[test]
    fn skips_disabled_source() {
        let yaml = r"
sources:
  - name: google_places
    vendor: google_places
    endpoint_base_url: https://maps.googleapis.com/maps/api/place
    api_key_env: GOOGLE_PLACES_API_KEY
    enabled: false
";
        let mut env = HashMap::new();
        env.insert("GOOGLE_PLACES_API_KEY", "g-key");
        let sources = parse_sources(yaml, lookup_from_map(&env)).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn empty_file_yields_no_sources() {
        let env = HashMap::new();
        let sources = parse_sources("sources: []", lookup_from_map(&env)).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn rejects_duplicate_names() {
        let yaml = r"
sources:
  - name: places
    vendor: google_places
    endpoint_base_url: https://a.example.com
    api_key_env: A
  - name: Places
    vendor: foursquare
    endpoint_base_url: https://b.example.com
    api_key_env: B
";
        let env = HashMap::new();
        let err = parse_sources(yaml, lookup_from_map(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn rejects_reserved_name() {
        let yaml = r"
sources:
  - name: synthetic
    vendor: google_places
    endpoint_base_url: https://a.example.com
    api_key_env: A
";
        let env = HashMap::new();
        let err = parse_sources(yaml, lookup_from_map(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("reserved")));
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        let yaml = r"
sources:
  - name: places
    vendor: google_places
    endpoint_base_url: https://a.example.com
    api_key_env: A
    confidence: 1.5
";
        let env = HashMap::new();
        assert!(parse_sources(yaml, lookup_from_map(&env)).is_err());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let yaml = r"
sources:
  - name: places
    vendor: google_places
    endpoint_base_url: ftp://a.example.com
    api_key_env: A
";
        let env = HashMap::new();
        assert!(parse_sources(yaml, lookup_from_map(&env)).is_err());
    }

    #[test]
    fn rejects_unknown_vendor() {
        let yaml = r"
sources:
  - name: places
    vendor: yelp
    endpoint_base_url: https://a.example.com
    api_key_env: A
";
        let env = HashMap::new();
        let err = parse_sources(yaml, lookup_from_map(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::SourcesFileParse(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut env = HashMap::new();
        env.insert("GOOGLE_PLACES_API_KEY", "super-secret");
        env.insert("FOURSQUARE_API_KEY", "also-secret");
        let sources = parse_sources(TWO_SOURCES, lookup_from_map(&env)).unwrap();
        let rendered = format!("{:?}", sources[0]);
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn load_sources_reports_missing_file() {
        let err = load_sources(Path::new("/nonexistent/dinescope/sources.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::SourcesFileIo { .. }));
    }
}
