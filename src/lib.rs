//! Wishlist Price Watch
//!
//! Crawls a public wishlist, remembers the lowest price ever seen for each
//! item and raises an alert whenever an item drops below that low.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod test_utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::application::PriceWatch;
use crate::infrastructure::{ConfigManager, LogNotifier, logging};

/// Run the price watch once with the user's configuration
pub async fn run() -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager
        .load_config()
        .await
        .context("Failed to load configuration")?;

    logging::init_logging_with_config(&config.logging)
        .context("Failed to initialize logging")?;
    logging::log_system_info();
    info!("Configuration file: {:?}", manager.config_path());

    config.validate().with_context(|| {
        format!("Invalid configuration in {:?}", manager.config_path())
    })?;

    let watch = PriceWatch::from_config(&config, Arc::new(LogNotifier::new()))?;

    if config.general.send_test_notification {
        info!("Sending test notification; no crawl will be performed");
        watch
            .send_test_notification()
            .await
            .context("Test notification failed")?;
        return Ok(());
    }

    let summary = watch.run().await?;
    info!(?summary, "Run finished");
    Ok(())
}
