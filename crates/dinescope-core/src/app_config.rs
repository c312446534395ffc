use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Enables the local-store source when set.
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub sources_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub local_timeout_ms: u64,
    pub synthetic_fallback: bool,
    pub analytics_url: Option<String>,
    pub analytics_timeout_ms: u64,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("sources_path", &self.sources_path)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("local_timeout_ms", &self.local_timeout_ms)
            .field("synthetic_fallback", &self.synthetic_fallback)
            .field("analytics_url", &self.analytics_url)
            .field("analytics_timeout_ms", &self.analytics_timeout_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
