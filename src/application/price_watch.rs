//! Price watch run
//!
//! One run crawls the listing, compares it against the stored history,
//! notifies about new lows and persists the updated history. A crawl
//! failure aborts before anything is persisted.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::domain::comparator::compare;
use crate::domain::errors::NotifyError;
use crate::domain::notification::Notification;
use crate::domain::services::{Notifier, PageFetcher};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::crawler::{CrawlEnd, CrawlError, WishlistCrawler};
use crate::infrastructure::history_store::{HistoryError, JsonHistoryStore};
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig};

/// Failures that abort a run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Crawl failed: {0}")]
    Crawl(#[from] CrawlError),

    #[error("History store failed: {0}")]
    History(#[from] HistoryError),
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub records: usize,
    pub skipped: usize,
    pub alerts: usize,
    pub first_run: bool,
    pub end: CrawlEnd,
    /// The alert notification could not be delivered
    pub notification_failed: bool,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages, {} records ({} skipped), ",
            self.pages_fetched, self.records, self.skipped
        )?;
        if self.first_run {
            write!(f, "first run, nothing compared")?;
        } else {
            write!(f, "{} price alerts", self.alerts)?;
        }
        if self.notification_failed {
            write!(f, " (notification failed)")?;
        }
        Ok(())
    }
}

/// Orchestrates crawl, comparison, notification and persistence
pub struct PriceWatch {
    crawler: WishlistCrawler,
    store: JsonHistoryStore,
    notifier: Arc<dyn Notifier>,
    listing_url: Url,
}

impl PriceWatch {
    pub fn new(
        crawler: WishlistCrawler,
        store: JsonHistoryStore,
        notifier: Arc<dyn Notifier>,
        listing_url: Url,
    ) -> Self {
        Self {
            crawler,
            store,
            notifier,
            listing_url,
        }
    }

    /// Wire a run from configuration using the given fetcher
    pub fn with_fetcher(
        config: &AppConfig,
        fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let listing_url = Url::parse(config.general.listing_url.trim())
            .context("Invalid listing URL")?;
        let crawler = WishlistCrawler::from_config(fetcher, &config.crawling)
            .context("Invalid listing selectors")?;
        let store = JsonHistoryStore::new(config.storage.resolve_history_path()?);

        Ok(Self::new(crawler, store, notifier, listing_url))
    }

    /// Wire a run from configuration with the HTTP fetcher
    pub fn from_config(config: &AppConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let http_config =
            HttpClientConfig::from_crawling_config(&config.general.user_agent, &config.crawling);
        let fetcher = HttpClient::new(http_config).context("Failed to create HTTP client")?;

        Self::with_fetcher(config, Arc::new(fetcher), notifier)
    }

    pub fn store(&self) -> &JsonHistoryStore {
        &self.store
    }

    /// Execute one full run
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        info!("Starting price watch for {}", self.listing_url);

        let report = match self.crawler.crawl(self.listing_url.as_str()).await {
            Ok(report) => report,
            Err(err) => {
                error!("Crawl aborted: {}", err);
                if matches!(err, CrawlError::Fetch(_)) {
                    if let Err(e) = self.deliver(&Notification::failed_request()).await {
                        warn!("Failed to deliver failed request notification: {}", e);
                    }
                }
                return Err(err.into());
            }
        };

        let history = self.store.load().await?;
        let comparison = compare(&report.items, &history);
        let first_run = comparison.is_first_run();
        let (alerts, next_history) = comparison.into_parts();
        let alerts = alerts.unwrap_or_default();

        let mut notification_failed = false;
        if !alerts.is_empty() {
            let notification = Notification::price_alert(&alerts, &self.listing_url);
            if let Err(e) = self.deliver(&notification).await {
                error!("Failed to deliver price alerts: {}", e);
                notification_failed = true;
            }
        }

        self.store.save(&next_history).await?;

        let summary = RunSummary {
            pages_fetched: report.pages_fetched,
            records: report.items.len(),
            skipped: report.skipped,
            alerts: alerts.len(),
            first_run,
            end: report.end,
            notification_failed,
        };
        info!("Price watch complete: {}", summary);
        Ok(summary)
    }

    /// Deliver the configuration check notification; no crawl happens
    pub async fn send_test_notification(&self) -> Result<(), NotifyError> {
        self.deliver(&Notification::test()).await
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            "Sending '{}' via {}",
            notification.subject,
            self.notifier.channel()
        );
        self.notifier.deliver(notification).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::FetchError;
    use crate::domain::record::{ItemMap, Record};
    use crate::domain::notification::{FAILED_REQUEST_SUBJECT, PRICE_ALERT_SUBJECT, TEST_SUBJECT};
    use crate::infrastructure::parsing::WishlistParser;
    use crate::test_utils::{LISTING_URL, RecordingNotifier, ScriptedFetcher, single_item_page};
    use std::time::Duration;
    use tempfile::TempDir;

    struct Harness {
        _temp_dir: TempDir,
        watch: PriceWatch,
        fetcher: Arc<ScriptedFetcher>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness(fetcher: ScriptedFetcher, notifier: RecordingNotifier) -> Harness {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Arc::new(fetcher);
        let notifier = Arc::new(notifier);
        let crawler = WishlistCrawler::new(fetcher.clone(), WishlistParser::new().unwrap());
        let watch = PriceWatch::new(
            crawler,
            JsonHistoryStore::new(temp_dir.path().join("history.json")),
            notifier.clone(),
            Url::parse(LISTING_URL).unwrap(),
        );
        Harness {
            _temp_dir: temp_dir,
            watch,
            fetcher,
            notifier,
        }
    }

    fn history(entries: &[(&str, &str)]) -> ItemMap {
        entries
            .iter()
            .map(|(id, price)| {
                Record::new(*id, None, price, format!("/dp/{id}/?coliid=I{id}"), *id).unwrap()
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_run_persists_without_alerts() {
        let h = harness(
            ScriptedFetcher::new().with_page(LISTING_URL, single_item_page("A", "10.00", None)),
            RecordingNotifier::new(),
        );

        let summary = h.watch.run().await.unwrap();

        assert!(summary.first_run);
        assert_eq!(summary.alerts, 0);
        assert!(h.notifier.delivered().is_empty());
        assert_eq!(h.watch.store().load().await.unwrap(), history(&[("A", "10.00")]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_price_drop_alerts_and_updates_history() {
        let h = harness(
            ScriptedFetcher::new().with_page(LISTING_URL, single_item_page("A", "8.00", None)),
            RecordingNotifier::new(),
        );
        h.watch.store().save(&history(&[("A", "10.00")])).await.unwrap();

        let summary = h.watch.run().await.unwrap();

        assert_eq!(summary.alerts, 1);
        let delivered = h.notifier.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].subject, PRICE_ALERT_SUBJECT);
        assert!(delivered[0].text.contains("https://www.amazon.co.uk/dp/A/"));
        assert!(delivered[0].text.contains("Price: 8.00"));
        assert_eq!(h.watch.store().load().await.unwrap(), history(&[("A", "8.00")]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_default_delay_between_pages() {
        let h = harness(
            ScriptedFetcher::new()
                .with_page(LISTING_URL, single_item_page("A", "1.00", Some("/page/2")))
                .with_page("https://www.amazon.co.uk/page/2", single_item_page("B", "2.00", None)),
            RecordingNotifier::new(),
        );

        let summary = h.watch.run().await.unwrap();

        assert_eq!(summary.pages_fetched, 2);
        let calls = h.fetcher.calls();
        let gap = calls[1].1 - calls[0].1;
        assert!(gap >= Duration::from_millis(1000), "gap too short: {gap:?}");
        assert!(gap <= Duration::from_millis(2000), "gap too long: {gap:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_notifies_and_keeps_history() {
        let h = harness(
            ScriptedFetcher::new().with_error(
                LISTING_URL,
                FetchError::Status {
                    url: LISTING_URL.to_string(),
                    status: 503,
                },
            ),
            RecordingNotifier::new(),
        );
        let before = history(&[("A", "10.00")]);
        h.watch.store().save(&before).await.unwrap();

        let err = h.watch.run().await.unwrap_err();

        assert!(matches!(err, RunError::Crawl(CrawlError::Fetch(_))));
        let delivered = h.notifier.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].subject, FAILED_REQUEST_SUBJECT);
        assert_eq!(h.watch.store().load().await.unwrap(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_failure_still_persists() {
        let h = harness(
            ScriptedFetcher::new().with_page(LISTING_URL, single_item_page("A", "8.00", None)),
            RecordingNotifier::failing(),
        );
        h.watch.store().save(&history(&[("A", "10.00")])).await.unwrap();

        let summary = h.watch.run().await.unwrap();

        assert!(summary.notification_failed);
        assert_eq!(h.watch.store().load().await.unwrap(), history(&[("A", "8.00")]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_corrupt_history_aborts_run() {
        let h = harness(
            ScriptedFetcher::new().with_page(LISTING_URL, single_item_page("A", "8.00", None)),
            RecordingNotifier::new(),
        );
        std::fs::write(h.watch.store().path(), "not json").unwrap();

        let err = h.watch.run().await.unwrap_err();

        assert!(matches!(err, RunError::History(HistoryError::Corrupt { .. })));
        assert!(h.notifier.delivered().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_test_notification() {
        let h = harness(ScriptedFetcher::new(), RecordingNotifier::new());

        h.watch.send_test_notification().await.unwrap();

        let delivered = h.notifier.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].subject, TEST_SUBJECT);
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary {
            pages_fetched: 2,
            records: 30,
            skipped: 1,
            alerts: 3,
            first_run: false,
            end: CrawlEnd::LastPage,
            notification_failed: false,
        };
        assert_eq!(summary.to_string(), "2 pages, 30 records (1 skipped), 3 price alerts");
    }
}
