use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub registry: RegistrySettings,
    #[serde(default)]
    pub ranking: RankingSettings,
    #[serde(default)]
    pub dedup: DedupSettings,
    #[serde(default)]
    pub scraping: ScrapingSettings,
    #[serde(default)]
    pub maps: MapsSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// Overall deadline for a whole search job
    #[serde(default = "default_job_timeout")]
    pub job_timeout_secs: u64,
    /// Budget for a single platform scrape
    #[serde(default = "default_platform_timeout")]
    pub platform_timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            job_timeout_secs: default_job_timeout(),
            platform_timeout_secs: default_platform_timeout(),
        }
    }
}

fn default_job_timeout() -> u64 {
    300
}
fn default_platform_timeout() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySettings {
    /// How long finished jobs stay queryable
    #[serde(default = "default_retention")]
    pub retention_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            retention_secs: default_retention(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_retention() -> u64 {
    6 * 3600
}
fn default_sweep_interval() -> u64 {
    600
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_rating_weight")]
    pub rating: f64,
    #[serde(default = "default_reviews_weight")]
    pub reviews: f64,
    #[serde(default = "default_price_weight")]
    pub price: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            rating: default_rating_weight(),
            reviews: default_reviews_weight(),
            price: default_price_weight(),
        }
    }
}

fn default_rating_weight() -> f64 {
    0.5
}
fn default_reviews_weight() -> f64 {
    0.3
}
fn default_price_weight() -> f64 {
    0.2
}

#[derive(Debug, Clone, Deserialize)]
pub struct DedupSettings {
    #[serde(default = "default_geo_tolerance")]
    pub geo_tolerance_km: f64,
    #[serde(default = "default_price_tolerance")]
    pub price_tolerance: f64,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            geo_tolerance_km: default_geo_tolerance(),
            price_tolerance: default_price_tolerance(),
        }
    }
}

fn default_geo_tolerance() -> f64 {
    0.5
}
fn default_price_tolerance() -> f64 {
    0.05
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapingSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ScrapingSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}
fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MapsSettings {
    /// Google Maps API key; distances stay unknown without one
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "results".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Configuration file (config/local.toml, for development overrides)
    /// 4. Environment variables (prefixed with SCOUT_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g. SCOUT_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SCOUT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("SCOUT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Well-known environment variables that override config values
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    // Railway-style PORT beats the config file
    if let Ok(port) = env::var("PORT") {
        builder = builder.set_override("server.port", port)?;
    }

    // The distance API key is usually injected directly
    if let Ok(api_key) = env::var("GOOGLE_MAPS_API_KEY") {
        builder = builder.set_override("maps.api_key", api_key)?;
    }

    builder.build()
}
