//! HTML parsing infrastructure
//!
//! Selector configuration, parse context, error types and the wishlist
//! page parser.

pub mod config;
pub mod context;
pub mod error;
pub mod wishlist_parser;

// Re-export public types
pub use config::WishlistSelectors;
pub use context::ParseContext;
pub use error::{ExtractionSkip, ParsingError, ParsingResult};
pub use wishlist_parser::{PageExtraction, WishlistParser};
