//! Infrastructure layer for page fetching, parsing, persistence and logging
//!
//! Provides the HTTP fetcher, the wishlist page parser and crawler, the JSON
//! history store, notifier implementations and the configuration and
//! logging setup.

pub mod config; // Configuration file and defaults
pub mod crawler;
pub mod history_store;
pub mod http_client;
pub mod logging;
pub mod notifier;
pub mod parsing; // Selector-driven listing page parsing

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, CrawlingConfig, LoggingConfig};
pub use crawler::{CrawlEnd, CrawlError, CrawlReport, PageDelay, WishlistCrawler};
pub use history_store::{HistoryError, JsonHistoryStore};
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{get_log_directory, init_logging_with_config};
pub use notifier::LogNotifier;
pub use parsing::{PageExtraction, ParsingError, ParsingResult, WishlistParser, WishlistSelectors};
