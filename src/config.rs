use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub league: LeagueConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the Supabase/PostgREST project
    pub url: String,
    /// Service key sent as `apikey` and bearer token
    #[serde(default)]
    pub api_key: String,
    /// Player dimension table pulled by the refresh scheduler
    #[serde(default = "default_roster_table")]
    pub roster_table: String,
    #[serde(default = "default_skater_table")]
    pub skater_table: String,
    #[serde(default = "default_goalie_table")]
    pub goalie_table: String,
    #[serde(default = "default_standings_table")]
    pub standings_table: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Rows requested per page when a query has no explicit limit
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_roster_table() -> String {
    "test_database".to_string()
}

fn default_skater_table() -> String {
    "skater_stats".to_string()
}

fn default_goalie_table() -> String {
    "goalie_stats".to_string()
}

fn default_standings_table() -> String {
    "team_stats".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> usize {
    1000
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Pause between the end of one refresh cycle and the start of the next
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,
}

fn default_refresh_interval() -> u64 {
    600
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_refresh_interval(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// TTL applied to every derived-result cache
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_ttl() -> u64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    /// Season used for standings (8-digit start/end year, e.g. 20252026)
    #[serde(default = "default_current_season")]
    pub current_season: u32,
    /// Minimum games played for a skater to enter the percentile sample
    #[serde(default = "default_skater_min_games")]
    pub skater_min_games: u32,
    /// Minimum games played for a goalie to enter the percentile sample
    #[serde(default = "default_goalie_min_games")]
    pub goalie_min_games: u32,
}

fn default_current_season() -> u32 {
    20252026
}

fn default_skater_min_games() -> u32 {
    10
}

fn default_goalie_min_games() -> u32 {
    5
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            current_season: default_current_season(),
            skater_min_games: default_skater_min_games(),
            goalie_min_games: default_goalie_min_games(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let environment = std::env::var("RINKSTATS_ENV")
            .unwrap_or_else(|_| "development".to_string());

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("refresh.interval_secs", 600)?
            .set_default("cache.ttl_secs", 600)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(File::from(config_dir.join(environment)).required(false))
            // Override with environment variables (RINKSTATS_STORE__URL, etc.)
            .add_source(
                Environment::with_prefix("RINKSTATS")
                    .separator("__")
                    .try_parsing(true),
            )
            // Supabase deployments export these names directly
            .set_override_option("store.url", std::env::var("SUPABASE_URL").ok())?
            .set_override_option("store.api_key", std::env::var("SUPABASE_KEY").ok())?;

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would stall the scheduler or the caches
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.url.trim().is_empty() {
            return Err(ConfigError::Message("store.url must not be empty".into()));
        }
        if self.store.page_size == 0 {
            return Err(ConfigError::Message("store.page_size must be >= 1".into()));
        }
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::Message(
                "refresh.interval_secs must be >= 1".into(),
            ));
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Message("cache.ttl_secs must be >= 1".into()));
        }
        Ok(())
    }

    /// Configuration pointing at a given store, everything else defaulted
    pub fn for_store(url: &str, api_key: &str) -> Self {
        Self {
            store: StoreConfig {
                url: url.to_string(),
                api_key: api_key.to_string(),
                roster_table: default_roster_table(),
                skater_table: default_skater_table(),
                goalie_table: default_goalie_table(),
                standings_table: default_standings_table(),
                timeout_secs: default_timeout_secs(),
                page_size: default_page_size(),
            },
            refresh: RefreshConfig::default(),
            cache: CacheConfig::default(),
            league: LeagueConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
