use crate::presentation::config::LoggingSettings;

pub const DEFAULT_LOG_DIRECTIVES: &str = "info,afterword=debug,tower_http=debug";

pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Used when `RUST_LOG` is not set.
    pub default_directives: String,
}

impl TracingConfig {
    pub fn from_settings(environment: &str, logging: &LoggingSettings) -> Self {
        let base = Self::default();
        Self {
            environment: environment.to_string(),
            json_format: base.json_format || logging.enable_json,
            default_directives: format!(
                "{},afterword=debug,tower_http=debug",
                logging.level.trim()
            ),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            default_directives: DEFAULT_LOG_DIRECTIVES.to_string(),
        }
    }
}
