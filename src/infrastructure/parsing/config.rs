//! Parsing configuration for wishlist extraction
//!
//! Centralized CSS selectors and attribute names. Update these when the
//! listing markup changes.

use serde::{Deserialize, Serialize};

/// Selectors and attribute names locating item fields in a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WishlistSelectors {
    /// One element per listed item
    pub item_container: String,

    /// Link inside the item carrying the title (`title`) and item path (`href`)
    pub title_link: String,

    /// Optional secondary line, e.g. a book's author
    pub byline: String,

    /// "See more" pagination link
    pub next_page: String,

    /// Container attribute holding the bare numeric price
    pub price_attribute: String,

    /// Container attribute holding the JSON payload with the external id
    pub payload_attribute: String,

    /// Key inside the payload, value shaped `NAMESPACE:ID|MARKETPLACE`
    pub external_id_key: String,
}

impl Default for WishlistSelectors {
    fn default() -> Self {
        Self {
            item_container: "li.g-item-sortable".to_string(),
            title_link: "a.a-link-normal[title]".to_string(),
            byline: "span.a-size-base".to_string(),
            next_page: "a.wl-see-more".to_string(),
            price_attribute: "data-price".to_string(),
            payload_attribute: "data-reposition-action-params".to_string(),
            external_id_key: "itemExternalId".to_string(),
        }
    }
}
