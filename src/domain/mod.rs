//! Domain module - Core price tracking logic and entities
//!
//! This module contains the listing record types, the lowest-price
//! comparison, notification rendering and the service seams the core
//! depends on.

pub mod comparator;
pub mod errors;
pub mod notification;
pub mod record;
pub mod services;

// Re-export commonly used items
pub use comparator::{ComparisonStats, PriceComparison, compare};
pub use errors::{FetchError, NotifyError, RecordError};
pub use notification::Notification;
pub use record::{ItemMap, Record};
pub use services::{Notifier, PageFetcher};
