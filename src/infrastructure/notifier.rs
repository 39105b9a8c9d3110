//! Notifier implementations

use async_trait::async_trait;
use tracing::info;

use crate::domain::errors::NotifyError;
use crate::domain::notification::Notification;
use crate::domain::services::Notifier;

/// Writes notifications to the log instead of sending them anywhere.
///
/// Used when no delivery transport is wired in; the plain-text body ends up
/// in the console and the rolling log file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn channel(&self) -> &str {
        "log"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            subject = %notification.subject,
            html_bytes = notification.html.len(),
            "Notification:\n{}",
            notification.text
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_always_delivers() {
        let notifier = LogNotifier::new();
        assert_eq!(notifier.channel(), "log");
        assert!(notifier.deliver(&Notification::test()).await.is_ok());
    }
}
