//! Wishlist page parser
//!
//! Extracts item records and the pagination link from one listing page.
//! A malformed item is skipped and reported; it never aborts the page.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ExtractionSkip, ParseContext, ParsingError, ParsingResult, WishlistSelectors};
use crate::domain::record::Record;

/// Outcome of extracting one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageExtraction {
    /// No item containers at all: end of listing, or the wrong page
    Empty,

    /// The page had item containers
    Items {
        records: Vec<Record>,
        skipped: Vec<ExtractionSkip>,
        /// Relative path of the next page, if any
        next_page: Option<String>,
    },
}

impl PageExtraction {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn records(&self) -> &[Record] {
        match self {
            Self::Empty => &[],
            Self::Items { records, .. } => records,
        }
    }

    pub fn skipped(&self) -> &[ExtractionSkip] {
        match self {
            Self::Empty => &[],
            Self::Items { skipped, .. } => skipped,
        }
    }

    pub fn next_page(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Items { next_page, .. } => next_page.as_deref(),
        }
    }
}

/// Parser for public wishlist pages
pub struct WishlistParser {
    item_selector: Selector,
    title_link_selector: Selector,
    byline_selector: Selector,
    next_page_selector: Selector,
    price_attribute: String,
    payload_attribute: String,
    external_id_key: String,
}

impl WishlistParser {
    /// Create a parser with the default selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&WishlistSelectors::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(selectors: &WishlistSelectors) -> ParsingResult<Self> {
        Ok(Self {
            item_selector: Self::compile_selector(&selectors.item_container)?,
            title_link_selector: Self::compile_selector(&selectors.title_link)?,
            byline_selector: Self::compile_selector(&selectors.byline)?,
            next_page_selector: Self::compile_selector(&selectors.next_page)?,
            price_attribute: selectors.price_attribute.clone(),
            payload_attribute: selectors.payload_attribute.clone(),
            external_id_key: selectors.external_id_key.clone(),
        })
    }

    fn compile_selector(selector: &str) -> ParsingResult<Selector> {
        Selector::parse(selector)
            .map_err(|e| ParsingError::invalid_selector(selector, &e.to_string()))
    }

    /// Extract all records and the next page link from one page
    pub fn extract(&self, page: &str, context: &ParseContext) -> PageExtraction {
        let html = Html::parse_document(page);
        let containers: Vec<ElementRef> = html.select(&self.item_selector).collect();

        if containers.is_empty() {
            debug!("No item containers on page {} ({})", context.page_number, context.page_url);
            return PageExtraction::Empty;
        }

        let mut records = Vec::with_capacity(containers.len());
        let mut skipped = Vec::new();

        for (index, element) in containers.iter().enumerate() {
            match self.extract_record(element) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    warn!(
                        "Failed to parse a wishlist item (page {}, index {}): {}",
                        context.page_number, index, reason
                    );
                    skipped.push(ExtractionSkip { index, reason });
                }
            }
        }

        let next_page = self.find_next_page(&html);

        debug!(
            "Extracted {} records ({} skipped) from page {}",
            records.len(),
            skipped.len(),
            context.page_number
        );

        PageExtraction::Items {
            records,
            skipped,
            next_page,
        }
    }

    fn extract_record(&self, item: &ElementRef) -> ParsingResult<Record> {
        let link = item
            .select(&self.title_link_selector)
            .next()
            .ok_or_else(|| ParsingError::required_field_missing("title"))?;
        let title = non_empty_attr(&link, "title")
            .ok_or_else(|| ParsingError::required_field_missing("title"))?;
        let url = non_empty_attr(&link, "href")
            .ok_or_else(|| ParsingError::required_field_missing("url"))?;

        let byline = item
            .select(&self.byline_selector)
            .next()
            .map(|e| e.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" "));

        let price = non_empty_attr(item, &self.price_attribute)
            .ok_or_else(|| ParsingError::required_field_missing("price"))?;

        let payload = non_empty_attr(item, &self.payload_attribute)
            .ok_or_else(|| ParsingError::required_field_missing("id"))?;
        let id = self.decode_external_id(payload)?;

        Ok(Record::new(title, byline, price, url, id)?)
    }

    /// Recover the bare id from a payload like
    /// `{"itemExternalId":"ASIN:B00KQNDJ22|A1F83G8C2ARO7P", ...}`
    fn decode_external_id(&self, payload: &str) -> ParsingResult<String> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| ParsingError::payload_decode_failed(e.to_string()))?;

        let external_id = value
            .get(&self.external_id_key)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ParsingError::payload_decode_failed(format!("missing '{}'", self.external_id_key))
            })?;

        let namespaced = external_id.split('|').next().unwrap_or_default();
        let id = namespaced
            .split_once(':')
            .map_or(namespaced, |(_, id)| id)
            .trim();

        if id.is_empty() {
            return Err(ParsingError::payload_decode_failed(format!(
                "empty id in '{external_id}'"
            )));
        }
        Ok(id.to_string())
    }

    fn find_next_page(&self, html: &Html) -> Option<String> {
        html.select(&self.next_page_selector)
            .find_map(|link| non_empty_attr(&link, "href"))
            .map(str::to_string)
    }
}

fn non_empty_attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
