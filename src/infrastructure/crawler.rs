//! Wishlist crawler
//!
//! Walks every page of one listing through a [`PageFetcher`], sleeping a
//! randomized delay before each page after the first. Fetches are strictly
//! sequential.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::errors::FetchError;
use crate::domain::record::ItemMap;
use crate::domain::services::PageFetcher;
use crate::infrastructure::config::{CrawlingConfig, defaults};
use crate::infrastructure::parsing::{PageExtraction, ParseContext, ParsingResult, WishlistParser};

/// Reasons a crawl aborts without a result
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Invalid listing URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Pagination cycle detected: {url} was already visited")]
    PaginationCycle { url: String },

    #[error("Listing has more than {limit} pages")]
    PageLimitExceeded { limit: u32 },
}

/// How a completed crawl ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEnd {
    /// The last page had no next link
    LastPage,

    /// A page had no item containers
    EmptyPage { url: String },
}

/// Result of a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub items: ItemMap,
    pub pages_fetched: u32,
    /// Item containers skipped across all pages
    pub skipped: usize,
    pub end: CrawlEnd,
}

/// Uniform random delay range applied between page fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDelay {
    min: Duration,
    max: Duration,
}

impl PageDelay {
    /// Bounds are swapped if given in the wrong order
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draw one delay from `[min, max]`
    pub fn sample(&self) -> Duration {
        let min_ms = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(fastrand::u64(min_ms..=max_ms))
    }
}

impl Default for PageDelay {
    fn default() -> Self {
        Self::from_millis(defaults::DELAY_MIN_MS, defaults::DELAY_MAX_MS)
    }
}

/// Drives fetcher and parser across all pages of one listing
pub struct WishlistCrawler {
    fetcher: Arc<dyn PageFetcher>,
    parser: WishlistParser,
    delay: PageDelay,
    max_pages: u32,
}

impl WishlistCrawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, parser: WishlistParser) -> Self {
        Self {
            fetcher,
            parser,
            delay: PageDelay::default(),
            max_pages: defaults::MAX_PAGES,
        }
    }

    /// Build a crawler from the crawling section of the configuration
    pub fn from_config(fetcher: Arc<dyn PageFetcher>, config: &CrawlingConfig) -> ParsingResult<Self> {
        let parser = WishlistParser::with_config(&config.selectors)?;
        Ok(Self::new(fetcher, parser)
            .with_delay(PageDelay::from_millis(config.delay_min_ms, config.delay_max_ms))
            .with_max_pages(config.max_pages))
    }

    pub fn with_delay(mut self, delay: PageDelay) -> Self {
        self.delay = delay;
        self
    }

    /// Values below one are raised to one
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Crawl the listing starting at `start_url`.
    ///
    /// Records from later pages overwrite earlier ones with the same id.
    /// Any fetch error aborts the whole crawl and no partial result is
    /// returned.
    pub async fn crawl(&self, start_url: &str) -> Result<CrawlReport, CrawlError> {
        let base = Url::parse(start_url).map_err(|e| CrawlError::InvalidUrl {
            url: start_url.to_string(),
            reason: e.to_string(),
        })?;

        let mut items = ItemMap::new();
        let mut visited = HashSet::new();
        let mut skipped = 0;
        let mut pages_fetched = 0;
        let mut page_url = base.clone();

        loop {
            if pages_fetched > 0 {
                let delay = self.delay.sample();
                debug!("Waiting {}ms before next page", delay.as_millis());
                sleep(delay).await;
            }

            pages_fetched += 1;
            visited.insert(page_url.to_string());
            info!("Fetching page {}: {}", pages_fetched, page_url);

            let body = self.fetcher.fetch(page_url.as_str()).await?;
            let context = ParseContext::new(pages_fetched, page_url.as_str());

            let next_page = match self.parser.extract(&body, &context) {
                PageExtraction::Empty => {
                    warn!(
                        "No items found on page {} ({}); end of listing or wrong URL?",
                        pages_fetched, page_url
                    );
                    return Ok(CrawlReport {
                        items,
                        pages_fetched,
                        skipped,
                        end: CrawlEnd::EmptyPage {
                            url: page_url.to_string(),
                        },
                    });
                }
                PageExtraction::Items {
                    records,
                    skipped: page_skips,
                    next_page,
                } => {
                    skipped += page_skips.len();
                    for record in records {
                        if let Some(previous) = items.insert(record) {
                            debug!("Duplicate item {} replaced by later page", previous.id());
                        }
                    }
                    next_page
                }
            };

            let Some(href) = next_page else {
                info!(
                    "Crawl complete: {} items from {} pages ({} skipped)",
                    items.len(),
                    pages_fetched,
                    skipped
                );
                return Ok(CrawlReport {
                    items,
                    pages_fetched,
                    skipped,
                    end: CrawlEnd::LastPage,
                });
            };

            let next_url = base.join(&href).map_err(|e| CrawlError::InvalidUrl {
                url: href.clone(),
                reason: e.to_string(),
            })?;

            if visited.contains(next_url.as_str()) {
                return Err(CrawlError::PaginationCycle {
                    url: next_url.to_string(),
                });
            }
            if pages_fetched >= self.max_pages {
                return Err(CrawlError::PageLimitExceeded {
                    limit: self.max_pages,
                });
            }

            page_url = next_url;
        }
    }
}
