//! Parsing context for page extraction

/// Where the page being parsed came from
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// 1-based position of the page in the crawl
    pub page_number: u32,

    /// Absolute URL the page was fetched from
    pub page_url: String,
}

impl ParseContext {
    pub fn new(page_number: u32, page_url: impl Into<String>) -> Self {
        Self {
            page_number,
            page_url: page_url.into(),
        }
    }
}
