//! Lowest-price comparison between a fresh snapshot and the stored history
//!
//! The comparison is a pure function: it reads the current-run snapshot and
//! the persisted history and returns the alerts together with the history
//! to persist next, without touching either input.

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::domain::record::{ItemMap, Record};

/// Result of comparing one run against the stored history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceComparison {
    /// No stored history existed, so nothing could be compared.
    /// `history` is the current snapshot as-is.
    FirstRun { history: ItemMap },

    /// History existed. `alerts` holds every item whose current price is
    /// strictly below its lowest recorded price; may be empty.
    Compared { alerts: Vec<Record>, history: ItemMap },
}

impl PriceComparison {
    /// Alerts produced by the comparison, `None` on a first run
    pub fn alerts(&self) -> Option<&[Record]> {
        match self {
            Self::FirstRun { .. } => None,
            Self::Compared { alerts, .. } => Some(alerts),
        }
    }

    pub fn is_first_run(&self) -> bool {
        matches!(self, Self::FirstRun { .. })
    }

    /// History to persist for the next run
    pub fn history(&self) -> &ItemMap {
        match self {
            Self::FirstRun { history } | Self::Compared { history, .. } => history,
        }
    }

    pub fn into_parts(self) -> (Option<Vec<Record>>, ItemMap) {
        match self {
            Self::FirstRun { history } => (None, history),
            Self::Compared { alerts, history } => (Some(alerts), history),
        }
    }
}

/// Per-run tallies, logged after each comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComparisonStats {
    pub dropped: usize,
    pub rose: usize,
    pub unchanged: usize,
    pub new_items: usize,
    pub removed: usize,
}

/// Compare `current` against `history`.
///
/// The new history starts from `current`. Ids present in both whose price
/// rose keep the historical low. Ids only in `history` are not carried
/// forward.
pub fn compare(current: &ItemMap, history: &ItemMap) -> PriceComparison {
    if history.is_empty() {
        info!("No previous wishlist to compare against. Probably running for the first time.");
        return PriceComparison::FirstRun {
            history: current.clone(),
        };
    }

    let mut stats = ComparisonStats::default();
    let mut alerts = Vec::new();
    let mut next_history = current.clone();

    for previous in history.records() {
        let Some(latest) = current.get(previous.id()) else {
            debug!("{} removed from wishlist. Skipping.", previous.id());
            stats.removed += 1;
            continue;
        };

        match latest.price().cmp(&previous.price()) {
            Ordering::Less => {
                debug!(
                    "New low for {}: {} -> {}",
                    latest.id(),
                    previous.price(),
                    latest.price()
                );
                stats.dropped += 1;
                alerts.push(latest.clone());
            }
            Ordering::Greater => {
                stats.rose += 1;
                next_history.insert(latest.with_price(previous.price()));
            }
            Ordering::Equal => stats.unchanged += 1,
        }
    }

    stats.new_items = current.ids().filter(|id| !history.contains(id)).count();

    if alerts.is_empty() {
        info!("No reduced prices found ({} items compared).", history.len() - stats.removed);
    } else {
        info!("Success comparing prices. {} reduced prices found.", alerts.len());
    }
    debug!(?stats, "Comparison summary");

    PriceComparison::Compared {
        alerts,
        history: next_history,
    }
}
