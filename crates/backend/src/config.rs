use std::path::PathBuf;

use forecast360_shared::config::DEFAULT_API_BASE_URL;
use forecast360_shared::{ConfigError, DashboardConfig};

#[derive(Debug, thiserror::Error)]
pub enum ServerConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    InvalidVar {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("invalid dashboard configuration: {0}")]
    Dashboard(#[from] ConfigError),
}

/// Everything the server reads from its environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Built frontend bundle (`index.html` plus hashed assets).
    pub dist_dir: PathBuf,
    /// Unhashed static files served under `/static`.
    pub assets_dir: PathBuf,
    /// Published to the browser at `/config.json`.
    pub dashboard: DashboardConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset variables take their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerConfigError> {
        let port = match lookup("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ServerConfigError::InvalidVar {
                name: "PORT",
                expected: "a TCP port",
                value: v,
            })?,
            None => 3000,
        };

        let mut dashboard = DashboardConfig::default();
        dashboard.api_base_url = lookup("PREDICTION_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if let Some(v) = lookup("SNAP_BACK_GRACE_MS") {
            dashboard.viewport.snap_back_grace_ms =
                v.trim().parse().map_err(|_| ServerConfigError::InvalidVar {
                    name: "SNAP_BACK_GRACE_MS",
                    expected: "a duration in milliseconds",
                    value: v,
                })?;
        }
        dashboard.validate()?;

        Ok(ServerConfig {
            port,
            dist_dir: PathBuf::from(lookup("DIST_DIR").unwrap_or_else(|| "dist".to_string())),
            assets_dir: PathBuf::from(lookup("ASSETS_DIR").unwrap_or_else(|| "assets".to_string())),
            dashboard,
        })
    }
}
