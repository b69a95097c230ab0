use std::env;
use std::path::PathBuf;

/// Startup configuration failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown contacts store backend: {0} (expected 'rest' or 'postgres')")]
    UnknownBackend(String),
}

/// Connection settings for the contacts store, present only when fully configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactStoreConfig {
    /// Hosted table API (PostgREST) reached over HTTPS.
    Rest {
        url: String,
        service_key: String,
        timeout_secs: u64,
    },
    /// Direct PostgreSQL connection to the same database.
    Postgres {
        database_url: String,
        max_connections: u32,
        timeout_secs: u64,
    },
}

/// Analytics sink settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    pub endpoint: String,
    pub write_key: Option<String>,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub contacts_store: Option<ContactStoreConfig>,
    pub budget_dataset_path: Option<PathBuf>,
    pub analytics: Option<AnalyticsConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as absent. Missing store credentials are not an
    /// error here: the server still starts and the stats endpoint reports a
    /// configuration error instead.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_secs = get("CONTACTS_STORE_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let backend = get("CONTACTS_STORE_BACKEND").unwrap_or_else(|| "rest".to_string());
        let contacts_store = match backend.to_ascii_lowercase().as_str() {
            "rest" => match (get("SUPABASE_URL"), get("SUPABASE_SERVICE_ROLE_KEY")) {
                (Some(url), Some(service_key)) => Some(ContactStoreConfig::Rest {
                    url: url.trim_end_matches('/').to_string(),
                    service_key,
                    timeout_secs,
                }),
                _ => None,
            },
            "postgres" => get("DATABASE_URL").map(|database_url| ContactStoreConfig::Postgres {
                database_url,
                max_connections: get("DATABASE_MAX_CONNECTIONS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                timeout_secs,
            }),
            _ => return Err(ConfigError::UnknownBackend(backend)),
        };

        Ok(Self {
            host: get("BACKEND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("BACKEND_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            frontend_url: get("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            contacts_store,
            budget_dataset_path: get("BUDGET_DATASET_PATH").map(PathBuf::from),
            analytics: get("ANALYTICS_ENDPOINT").map(|endpoint| AnalyticsConfig {
                endpoint,
                write_key: get("ANALYTICS_WRITE_KEY"),
            }),
        })
    }
}
