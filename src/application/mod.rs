//! Application layer - Use cases and application services
//!
//! Coordinates domain logic and infrastructure into a single price watch
//! run.

pub mod price_watch;

// Re-export commonly used items
pub use price_watch::{PriceWatch, RunError, RunSummary};
