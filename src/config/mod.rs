/// Configuration management for relayhook
///
/// Handles server settings from the environment and the action definitions
/// file with `${VAR}` substitution.

// `${VAR}` expansion over JSON trees
pub mod env_subst;

// `config.json` action definitions
pub mod actions;

pub use actions::{ActionEntry, ActionsConfig};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Path to the action definitions file
    pub config_path: String,
    /// Shared secret every request must present as `apiKey`
    ///
    /// When unset (or empty) no request is ever authorized.
    pub api_key: Option<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

impl Default for Config {
    /// Default configuration with ENV_VAR overrides for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("RELAYHOOK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("RELAYHOOK_PORT")
                    .unwrap_or_else(|_| "3112".to_string())
                    .parse()
                    .unwrap_or(3112),
            },
            config_path: std::env::var("RELAYHOOK_CONFIG")
                .unwrap_or_else(|_| "config.json".to_string()),
            api_key: non_empty(std::env::var("API_KEY").ok()),
        }
    }
}

/// An empty secret is treated as no secret
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
