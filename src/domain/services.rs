//! Domain service seams
//!
//! Interfaces the price watch core depends on. Infrastructure provides the
//! production implementations; tests substitute scripted ones.

use async_trait::async_trait;

use crate::domain::errors::{FetchError, NotifyError};
use crate::domain::notification::Notification;

/// Retrieves the raw markup of one listing page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` once. No retries; any transport, timeout or status
    /// failure is returned as a [`FetchError`].
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Delivers a rendered notification over some channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name used in logs
    fn channel(&self) -> &str;

    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}
