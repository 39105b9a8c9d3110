//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use pricewatch_lib::domain::{FetchError, Notification, Notifier, NotifyError, PageFetcher};

pub const LISTING_URL: &str = "https://www.amazon.co.uk/hz/wishlist/ls/INTEGRATION";
pub const ORIGIN: &str = "https://www.amazon.co.uk";

/// `(id, title, price)`; `None` price renders an item without `data-price`
pub type Item<'a> = (&'a str, &'a str, Option<&'a str>);

pub fn listing_page(items: &[Item<'_>], next: Option<&str>) -> String {
    let mut body = String::from("<html><body><ul id=\"g-items\">");
    for (id, title, price) in items {
        let price_attr = price
            .map(|p| format!(r#" data-price="{p}""#))
            .unwrap_or_default();
        body.push_str(&format!(
            r#"<li class="a-spacing-none g-item-sortable"{price_attr}
                data-reposition-action-params='{{"itemExternalId":"ASIN:{id}|A1F83G8C2ARO7P"}}'>
                <h3><a class="a-link-normal" title="{title}" href="/dp/{id}/">{title}</a></h3>
                <span class="a-size-base">by Example Author</span>
            </li>"#
        ));
    }
    body.push_str("</ul>");
    if let Some(href) = next {
        body.push_str(&format!(r#"<a class="wl-see-more" href="{href}">See more</a>"#));
    }
    body.push_str("</body></html>");
    body
}

/// Fetcher whose pages can be replaced between runs
#[derive(Default)]
pub struct FakeSite {
    pages: Mutex<HashMap<String, Result<String, FetchError>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: impl Into<String>, body: impl Into<String>) {
        self.pages.lock().unwrap().insert(url.into(), Ok(body.into()));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.pages.lock().unwrap().insert(
            url.to_string(),
            Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
        );
    }

    pub fn clear(&self) {
        self.pages.lock().unwrap().clear();
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.lock().unwrap().get(url).cloned().unwrap_or_else(|| {
            Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        })
    }
}

#[derive(Default)]
pub struct Inbox {
    messages: Mutex<Vec<Notification>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }
}

#[async_trait]
impl Notifier for Inbox {
    fn channel(&self) -> &str {
        "inbox"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
