//! Configuration infrastructure
//!
//! Contains configuration loading and management for the price watch.
//!
//! Configuration is organized into four sections:
//! 1. General settings (which listing to watch, run mode)
//! 2. Crawling settings (timeouts, politeness delay, selectors)
//! 3. Storage settings (history file location)
//! 4. Logging settings

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use url::Url;

use crate::infrastructure::parsing::WishlistSelectors;

/// Environment variable overriding the configuration file location
pub const CONFIG_PATH_ENV: &str = "PRICEWATCH_CONFIG";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub crawling: CrawlingConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// What to watch and how to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// First page of the public wishlist
    pub listing_url: String,

    /// User agent sent with every page request
    pub user_agent: String,

    /// Deliver a test notification instead of running a crawl
    pub send_test_notification: bool,
}

/// Crawling specific configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlingConfig {
    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Lower bound of the random delay between page fetches
    pub delay_min_ms: u64,

    /// Upper bound of the random delay between page fetches
    pub delay_max_ms: u64,

    /// Abort the crawl if the listing has more pages than this
    pub max_pages: u32,

    /// CSS selectors for listing markup
    pub selectors: WishlistSelectors,
}

/// History persistence settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// History file; defaults to the application data directory
    pub history_path: Option<PathBuf>,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Log directory; defaults to `logs` next to the executable
    pub directory: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            listing_url: defaults::PLACEHOLDER_LISTING_URL.to_string(),
            user_agent: defaults::USER_AGENT.to_string(),
            send_test_notification: false,
        }
    }
}

impl Default for CrawlingConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            delay_min_ms: defaults::DELAY_MIN_MS,
            delay_max_ms: defaults::DELAY_MAX_MS,
            max_pages: defaults::MAX_PAGES,
            selectors: WishlistSelectors::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            max_files: defaults::LOG_MAX_FILES,
            directory: None,
        }
    }
}

impl AppConfig {
    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        let listing_url = self.general.listing_url.trim();
        if listing_url == defaults::PLACEHOLDER_LISTING_URL {
            bail!(
                "Listing URL is still the placeholder. Set general.listing_url to your public \
                 wishlist URL in the configuration file"
            );
        }

        let url = Url::parse(listing_url)
            .with_context(|| format!("Listing URL '{}' is not a valid URL", listing_url))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            bail!("Listing URL '{}' must be an http(s) URL with a host", listing_url);
        }

        if self.general.user_agent.trim().is_empty() {
            bail!("User agent must not be empty");
        }

        if self.crawling.delay_min_ms > self.crawling.delay_max_ms {
            bail!(
                "Crawl delay range is inverted: min {}ms > max {}ms",
                self.crawling.delay_min_ms,
                self.crawling.delay_max_ms
            );
        }

        if self.crawling.delay_max_ms == 0 {
            bail!("Crawl delay cannot be disabled: crawling.delay_max_ms must be above 0");
        }

        if self.crawling.max_pages == 0 {
            bail!("crawling.max_pages must be at least 1");
        }

        Ok(())
    }
}

impl StorageConfig {
    /// Configured history path or the default under the data directory
    pub fn resolve_history_path(&self) -> Result<PathBuf> {
        match &self.history_path {
            Some(path) => Ok(path.clone()),
            None => Ok(ConfigManager::get_app_data_dir()?.join(defaults::HISTORY_FILE_NAME)),
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Get application data directory
    pub fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(data_dir)
    }

    /// Configuration manager at `$PRICEWATCH_CONFIG`, or the user config dir
    pub fn new() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(Self::with_path(path));
        }

        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            info!(
                "Configuration file not found, creating default: {:?}",
                self.config_path
            );
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read configuration file {:?}", self.config_path))?;

        let config = serde_json::from_str::<AppConfig>(&content)
            .with_context(|| format!("Invalid configuration file {:?}", self.config_path))?;

        info!("Loaded configuration from: {:?}", self.config_path);
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default configuration values
pub mod defaults {
    /// Directory name under the user config and data directories
    pub const APP_DIR_NAME: &str = "pricewatch";

    pub const CONFIG_FILE_NAME: &str = "config.json";

    pub const HISTORY_FILE_NAME: &str = "wishlist_items.json";

    /// Written into a fresh configuration file; refused by validation
    pub const PLACEHOLDER_LISTING_URL: &str = "https://www.amazon.co.uk/hz/wishlist/ls/YOUR_LIST_ID";

    pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                                  (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

    /// Default delay range between page fetches in milliseconds
    pub const DELAY_MIN_MS: u64 = 1000;
    pub const DELAY_MAX_MS: u64 = 2000;

    /// Default maximum pages to crawl
    pub const MAX_PAGES: u32 = 200;

    // Log configuration defaults
    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default console output setting
    pub const LOG_CONSOLE_OUTPUT: bool = true;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = true;

    /// Default maximum log files to keep
    pub const LOG_MAX_FILES: u32 = 5;
}
