use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::ports::SafetyThreshold;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub llm: LlmSettings,
    pub media: MediaSettings,
    pub storage: StorageSettings,
    pub sweep: SweepSettings,
    pub worker: WorkerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Without a URL the service runs on in-memory repositories.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "lmstudio")]
    LmStudio,
    Azure,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: String,
    pub base_url: Option<String>,
    pub azure_endpoint: Option<String>,
    pub primary_model: String,
    pub fallback_model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub safety_threshold: SafetyThreshold,
    pub sse_keep_alive_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    pub image_endpoint: String,
    pub image_api_key: Option<String>,
    pub sample_count: u32,
    pub aspect_ratio: String,
    pub stock_endpoint: String,
    pub stock_access_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Local,
    Azure,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProvider,
    pub local_path: String,
    pub public_base_url: String,
    pub azure_account: Option<String>,
    pub azure_access_key: Option<String>,
    pub azure_container: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepSettings {
    pub cron_secret: String,
    pub idle_threshold_minutes: i64,
    pub forced_expiry_hours: i64,
    pub claim_lease_minutes: i64,
    pub default_slot: String,
}

impl SweepSettings {
    pub fn idle_threshold_ms(&self) -> i64 {
        self.idle_threshold_minutes * 60 * 1000
    }

    pub fn forced_expiry_ms(&self) -> i64 {
        self.forced_expiry_hours * 60 * 60 * 1000
    }

    pub fn claim_lease_ms(&self) -> i64 {
        self.claim_lease_minutes * 60 * 1000
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    /// Defaults, then `appsettings.{env}` if present, then `APP_*` variables
    /// (`APP_SWEEP__CRON_SECRET` sets `sweep.cron_secret`).
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let file_name = format!("appsettings.{}", environment.as_str());

        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 5)?
            .set_default("llm.provider", "gemini")?
            .set_default("llm.api_key", "")?
            .set_default("llm.primary_model", "gemini-2.5-flash")?
            .set_default("llm.fallback_model", "gemini-2.0-flash")?
            .set_default("llm.max_tokens", 2048)?
            .set_default("llm.temperature", 0.7)?
            .set_default("llm.safety_threshold", "block_medium_and_above")?
            .set_default("llm.sse_keep_alive_seconds", 15)?
            .set_default(
                "media.image_endpoint",
                "https://generativelanguage.googleapis.com/v1beta/models/imagen-3.0-generate-002:predict",
            )?
            .set_default("media.sample_count", 1)?
            .set_default("media.aspect_ratio", "16:9")?
            .set_default("media.stock_endpoint", "https://api.unsplash.com/search/photos")?
            .set_default("storage.provider", "local")?
            .set_default("storage.local_path", "./media")?
            .set_default("storage.public_base_url", "http://localhost:8080/media")?
            .set_default("sweep.cron_secret", "")?
            .set_default("sweep.idle_threshold_minutes", 15)?
            .set_default("sweep.forced_expiry_hours", 24)?
            .set_default("sweep.claim_lease_minutes", 10)?
            .set_default("sweep.default_slot", crate::domain::DEFAULT_SESSION_SLOT)?
            .set_default("worker.queue_capacity", 100)?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", false)?
            .add_source(File::with_name(&file_name).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sweep.cron_secret.trim().is_empty() {
            return Err("sweep.cron_secret must be set".to_string());
        }
        if self.sweep.idle_threshold_minutes <= 0 {
            return Err("sweep.idle_threshold_minutes must be positive".to_string());
        }
        if self.sweep.forced_expiry_ms() <= self.sweep.idle_threshold_ms() {
            return Err(format!(
                "sweep.forced_expiry_hours ({}h) must exceed the idle threshold ({}m)",
                self.sweep.forced_expiry_hours, self.sweep.idle_threshold_minutes
            ));
        }
        if self.sweep.claim_lease_minutes <= 0 {
            return Err("sweep.claim_lease_minutes must be positive".to_string());
        }
        if self.worker.queue_capacity == 0 {
            return Err("worker.queue_capacity must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep(idle_minutes: i64, expiry_hours: i64) -> SweepSettings {
        SweepSettings {
            cron_secret: "secret".to_string(),
            idle_threshold_minutes: idle_minutes,
            forced_expiry_hours: expiry_hours,
            claim_lease_minutes: 10,
            default_slot: "counsel".to_string(),
        }
    }

    #[test]
    fn sweep_windows_convert_to_millis() {
        let settings = sweep(15, 24);
        assert_eq!(settings.idle_threshold_ms(), 900_000);
        assert_eq!(settings.forced_expiry_ms(), 86_400_000);
    }
}
