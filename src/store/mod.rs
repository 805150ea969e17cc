//! Admin view state.
//!
//! Each store is a single-writer state cell (`tokio::sync::watch`) holding the
//! current filters, pagination, results, loading flag and last error for one
//! admin screen. Actions mutate the state and re-fetch from an injected source;
//! subscribers are notified on every change. Errors are caught and kept as a
//! message instead of being returned.
//!
//! Fetches are not cancelled. Every fetch takes a ticket from a
//! [`RequestSequence`] and its result is applied only if no newer fetch of the
//! same kind started in the meantime, so a slow stale response can never
//! overwrite fresher state.

use crate::core::pagination::{DEFAULT_PAGE_SIZE, PageRequest};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Curated dates screen
pub mod curated_dates;
/// Revenue screen
pub mod revenue;

pub use curated_dates::CuratedDatesStore;
pub use revenue::RevenueStore;

/// Monotonic ticket counter for one kind of fetch.
#[derive(Debug, Default)]
pub struct RequestSequence(AtomicU64);

impl RequestSequence {
    /// Starts a new request; every earlier ticket becomes stale.
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True if `ticket` is still the latest request.
    #[must_use]
    pub fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }
}

/// Paging position of a listing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub page_size: u32,
    /// Size of the whole filtered set
    pub total_count: u64,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_count: 0,
        }
    }
}

impl PaginationState {
    pub(crate) const fn request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            page_size: self.page_size,
        }
    }

    /// Number of pages for the current total.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        self.request().page_count(self.total_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_is_current() {
        let seq = RequestSequence::default();
        let first = seq.begin();
        assert!(seq.is_current(first));

        let second = seq.begin();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }

    #[test]
    fn test_page_count() {
        let state = PaginationState {
            page: 1,
            page_size: 10,
            total_count: 21,
        };
        assert_eq!(state.page_count(), 3);
        assert_eq!(PaginationState::default().page_count(), 0);
    }
}
