//! Test utilities for pricewatch
//!
//! Listing page fixtures plus scripted fakes for the fetch and notify
//! boundaries, so crawler and run tests never touch the network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::domain::errors::{FetchError, NotifyError};
use crate::domain::notification::Notification;
use crate::domain::services::{Notifier, PageFetcher};

/// Listing origin used by fixtures
pub const LISTING_URL: &str = "https://www.amazon.co.uk/hz/wishlist/ls/TESTLIST";

/// One item container in listing markup
pub fn wishlist_item(id: &str, title: &str, price: Option<&str>, byline: Option<&str>) -> String {
    let price_attr = price
        .map(|p| format!(r#" data-price="{p}""#))
        .unwrap_or_default();
    let byline_span = byline
        .map(|b| format!(r#"<span class="a-size-base" id="item-byline-{id}">{b}</span>"#))
        .unwrap_or_default();
    format!(
        r#"<li class="a-spacing-none g-item-sortable"{price_attr}
            data-reposition-action-params='{{"itemExternalId":"ASIN:{id}|A1F83G8C2ARO7P","listType":"wishlist"}}'>
            <a class="a-link-normal" href="/dp/{id}/?coliid=I{id}"><img src="x.jpg"></a>
            <h3><a class="a-link-normal" title="{title}" href="/dp/{id}/?coliid=I{id}">{title}</a></h3>
            {byline_span}
        </li>"#
    )
}

/// A full listing page with an optional "see more" link
pub fn wishlist_page(items: &[String], next: Option<&str>) -> String {
    let next_link = next
        .map(|href| {
            format!(
                r#"<a class="a-size-base a-link-nav-icon a-js g-visible-no-js wl-see-more" href="{href}">See more</a>"#
            )
        })
        .unwrap_or_default();
    format!(
        "<html><body><ul id=\"g-items\">{}</ul>{}</body></html>",
        items.join("\n"),
        next_link
    )
}

/// Page with a single priced item
pub fn single_item_page(id: &str, price: &str, next: Option<&str>) -> String {
    wishlist_page(&[wishlist_item(id, id, Some(price), None)], next)
}

/// Fetcher answering from a fixed url -> response table
///
/// Unknown URLs fail with a 404 status error. Every call is logged with the
/// (possibly paused) tokio clock.
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, Result<String, FetchError>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Ok(body.into()));
        self
    }

    pub fn with_error(mut self, url: impl Into<String>, error: FetchError) -> Self {
        self.pages.insert(url.into(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        self.pages.get(url).cloned().unwrap_or_else(|| {
            Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        })
    }
}

/// Notifier keeping every delivered notification
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose deliveries always fail (nothing is recorded)
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn channel(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Delivery {
                channel: self.channel().to_string(),
                message: "mailbox unavailable".to_string(),
            });
        }
        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
