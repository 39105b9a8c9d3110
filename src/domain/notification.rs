//! Notification content
//!
//! Renders alert batches and status messages into the plain-text and HTML
//! bodies handed to a [`Notifier`](crate::domain::services::Notifier).

use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::info;
use url::Url;

use crate::domain::record::Record;

pub const PRICE_ALERT_SUBJECT: &str = "Wishlist Price Alert";
pub const FAILED_REQUEST_SUBJECT: &str = "Wishlist Request Failed";
pub const TEST_SUBJECT: &str = "Wishlist Price Watch Test";

const FAILED_REQUEST_TEXT: &str = "Failed to request your wishlist page. Your IP may be blocked \
                                   or the wishlist URL could be incorrect.";
const TEST_TEXT: &str = "Test from wishlist price watch.";

/// A message ready for delivery over any channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl Notification {
    /// Plain message with the same content in both renderings
    pub fn message(subject: &str, text: &str) -> Self {
        Self {
            subject: subject.to_string(),
            text: text.to_string(),
            html: format!("<html><body><p>{}</p></body></html>", encode_text(text)),
        }
    }

    pub fn failed_request() -> Self {
        Self::message(FAILED_REQUEST_SUBJECT, FAILED_REQUEST_TEXT)
    }

    pub fn test() -> Self {
        Self::message(TEST_SUBJECT, TEST_TEXT)
    }

    /// Render a batch of price alerts.
    ///
    /// Item links are made absolute against the scheme and host of
    /// `listing_url`. Per item: title, byline (if any), link, price.
    pub fn price_alert(alerts: &[Record], listing_url: &Url) -> Self {
        let mut text = String::new();
        let mut html = String::from("<html><body><p>");

        for (index, record) in alerts.iter().enumerate() {
            let link = absolute_link(listing_url, record.url());

            if index > 0 {
                text.push('\n');
                html.push_str("<br>");
            }

            text.push_str(record.title());
            text.push('\n');
            html.push_str(&encode_text(record.title()));
            html.push_str("<br>");

            if let Some(byline) = record.byline() {
                text.push_str(byline);
                text.push('\n');
                html.push_str(&encode_text(byline));
                html.push_str("<br>");
            }

            text.push_str(&link);
            text.push('\n');
            html.push_str(&format!(
                "<a href=\"{}\">{}</a><br>",
                encode_double_quoted_attribute(&link),
                encode_text(&link)
            ));

            text.push_str(&format!("Price: {}\n", record.price()));
            html.push_str(&format!("Price: {}<br>", record.price()));

            info!("Price alert for {}: {}.", record.title(), record.price());
        }

        html.push_str("</p></body></html>");

        Self {
            subject: PRICE_ALERT_SUBJECT.to_string(),
            text,
            html,
        }
    }
}

/// `https://host` + relative item path
fn absolute_link(listing_url: &Url, path: &str) -> String {
    listing_url.join(path).map(String::from).unwrap_or_else(|_| {
        format!(
            "{}://{}{}",
            listing_url.scheme(),
            listing_url.host_str().unwrap_or_default(),
            path
        )
    })
}
