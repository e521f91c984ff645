use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::reviews::ReviewCriteria;
use crate::models::GradingWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub google: GoogleSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub reviews: ReviewCriteria,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_token_delay_ms")]
    pub page_token_delay_ms: u64,
}

fn default_base_url() -> String { crate::services::google::DEFAULT_BASE_URL.to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_page_token_delay_ms() -> u64 { 2000 }

impl GoogleSettings {
    pub fn page_token_delay(&self) -> Duration {
        Duration::from_millis(self.page_token_delay_ms)
    }
}

/// Defaults applied when an analyze request leaves a field out
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,
    /// Requests asking for more are capped, never rejected
    #[serde(default = "default_max_results_cap")]
    pub max_results_cap: usize,
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
    #[serde(default = "default_grade_threshold")]
    pub grade_threshold: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            radius_m: default_radius_m(),
            default_max_results: default_max_results(),
            max_results_cap: default_max_results_cap(),
            max_distance_km: default_max_distance_km(),
            grade_threshold: default_grade_threshold(),
        }
    }
}

fn default_radius_m() -> u32 { 50_000 }
fn default_max_results() -> usize { 10 }
fn default_max_results_cap() -> usize { crate::core::analysis::MAX_RESULTS_CAP }
fn default_max_distance_km() -> f64 { 50.0 }
fn default_grade_threshold() -> f64 { 50.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            politeness_delay_ms: default_politeness_delay_ms(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

fn default_politeness_delay_ms() -> u64 { 1000 }
fn default_probe_timeout_secs() -> u64 { 5 }

impl PipelineSettings {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: GradingWeights,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_details_capacity")]
    pub details_capacity: u64,
    #[serde(default = "default_details_ttl_secs")]
    pub details_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            details_capacity: default_details_capacity(),
            details_ttl_secs: default_details_ttl_secs(),
        }
    }
}

fn default_details_capacity() -> u64 { 1000 }
fn default_details_ttl_secs() -> u64 { 3600 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LEADS_)
    /// 5. GOOGLE_MAPS_API_KEY, if set
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LEADS__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("LEADS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_api_key_override(settings)?
            .try_deserialize::<Self>()?
            .validated()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("LEADS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_api_key_override(settings)?
            .try_deserialize::<Self>()?
            .validated()
    }

    /// Reject values serde accepts but the grader cannot use
    pub fn validated(self) -> Result<Self, ConfigError> {
        if let Some((name, weight)) = self.scoring.weights.first_invalid() {
            return Err(ConfigError::Message(format!(
                "scoring.weights.{} must be a non-negative number, got {}",
                name, weight
            )));
        }
        self.reviews
            .validate()
            .map_err(|e| ConfigError::Message(format!("reviews: {}", e)))?;
        Ok(self)
    }
}

/// Let the conventional GOOGLE_MAPS_API_KEY variable supply the API key
fn apply_api_key_override(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("GOOGLE_MAPS_API_KEY") {
        Ok(api_key) if !api_key.is_empty() => Config::builder()
            .add_source(settings)
            .set_override("google.api_key", api_key)?
            .build(),
        _ => Ok(settings),
    }
}
