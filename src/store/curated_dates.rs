use super::{PaginationState, RequestSequence};
use crate::core::dates::DateStats;
use crate::core::filter::DateFilters;
use crate::core::pagination::PageRequest;
use crate::models::{CuratedDateRecord, DateStatus};
use crate::source::DateCurationSource;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Everything the curated dates screen shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CuratedDatesState {
    /// Current page
    pub dates: Vec<CuratedDateRecord>,
    /// Active filters
    pub filters: DateFilters,
    /// Paging position
    pub pagination: PaginationState,
    /// Headline counts
    pub stats: Option<DateStats>,
    /// Date open in the detail view
    pub selected_date: Option<CuratedDateRecord>,
    /// A listing request is in flight
    pub is_loading: bool,
    /// Last listing or update failure
    pub error: Option<String>,
}

impl CuratedDatesState {
    /// Swaps in an updated record wherever it is shown.
    fn replace(&mut self, updated: &CuratedDateRecord) {
        for date in self.dates.iter_mut().filter(|d| d.id == updated.id) {
            date.clone_from(updated);
        }
        if let Some(selected) = self.selected_date.as_mut().filter(|d| d.id == updated.id) {
            selected.clone_from(updated);
        }
    }
}

/// State container for the curated dates screen.
#[derive(Clone)]
pub struct CuratedDatesStore {
    source: Arc<dyn DateCurationSource>,
    state: Arc<watch::Sender<CuratedDatesState>>,
    listing: Arc<RequestSequence>,
}

impl CuratedDatesStore {
    /// Creates a store with empty state. Nothing is fetched yet.
    pub fn new(source: Arc<dyn DateCurationSource>) -> Self {
        let (state, _) = watch::channel(CuratedDatesState::default());
        Self {
            source,
            state: Arc::new(state),
            listing: Arc::new(RequestSequence::default()),
        }
    }

    /// Watches state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CuratedDatesState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CuratedDatesState {
        self.state.borrow().clone()
    }

    /// Edits the filters, goes back to page 1 and re-fetches.
    pub async fn set_filters(&self, edit: impl FnOnce(&mut DateFilters) + Send) {
        self.state.send_modify(|s| {
            edit(&mut s.filters);
            s.pagination.page = 1;
        });
        self.fetch_dates(None).await;
    }

    /// Loads a page of dates for the current filters.
    pub async fn fetch_dates(&self, page: Option<u32>) {
        let ticket = self.listing.begin();
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        let (filters, request) = {
            let s = self.state.borrow();
            let page = page.unwrap_or(s.pagination.page);
            (
                s.filters.clone(),
                PageRequest::new(page, s.pagination.page_size),
            )
        };

        let result = self.source.list_dates(&filters, request).await;

        if !self.listing.is_current(ticket) {
            debug!(ticket, "Discarding stale date listing");
            return;
        }
        self.state.send_modify(|s| {
            s.is_loading = false;
            match result {
                Ok(page) => {
                    s.dates = page.items;
                    s.pagination.page = request.page;
                    s.pagination.total_count = page.total_count;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load curated dates");
                    s.error = Some(e.to_string());
                }
            }
        });
    }

    /// Loads the headline counts; failures are only logged.
    pub async fn fetch_stats(&self) {
        match self.source.date_stats().await {
            Ok(stats) => self.state.send_modify(|s| s.stats = Some(stats)),
            Err(e) => warn!(error = %e, "Failed to fetch date stats"),
        }
    }

    /// Opens or closes the detail view.
    pub fn select_date(&self, date: Option<CuratedDateRecord>) {
        self.state.send_modify(|s| s.selected_date = date);
    }

    /// Changes the status of a date, patches it in place and refreshes the stats.
    pub async fn update_date_status(&self, id: i64, status: DateStatus, reason: Option<String>) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let result = self
            .source
            .update_date_status(id, status, reason, Utc::now())
            .await;
        let updated = result.is_ok();
        self.apply_update(result, "Failed to update date status");

        if updated {
            self.fetch_stats().await;
        }
    }

    /// Replaces the admin note on a date and patches it in place.
    pub async fn add_note(&self, id: i64, note: String) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        let result = self.source.set_date_note(id, note, Utc::now()).await;
        self.apply_update(result, "Failed to add note");
    }

    fn apply_update(&self, result: crate::errors::Result<CuratedDateRecord>, context: &str) {
        self.state.send_modify(|s| {
            s.is_loading = false;
            match result {
                Ok(record) => s.replace(&record),
                Err(e) => {
                    warn!(error = %e, "{context}");
                    s.error = Some(e.to_string());
                }
            }
        });
    }

    /// Dismisses the last failure.
    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }

    /// Changes the page size and reloads page 1.
    pub async fn set_page_size(&self, page_size: u32) {
        self.state.send_modify(|s| {
            s.pagination.page_size = page_size.max(1);
            s.pagination.page = 1;
        });
        self.fetch_dates(Some(1)).await;
    }

    /// Loads another page.
    pub async fn go_to_page(&self, page: u32) {
        self.fetch_dates(Some(page)).await;
    }

    /// Clears every filter and reloads page 1.
    pub async fn reset_filters(&self) {
        self.state.send_modify(|s| s.filters = DateFilters::default());
        self.fetch_dates(Some(1)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockSource;
    use crate::test_utils::sample_date;

    fn store() -> CuratedDatesStore {
        let dates = (1..=12)
            .map(|id| {
                let status = if id <= 4 {
                    DateStatus::Completed
                } else {
                    DateStatus::Scheduled
                };
                sample_date(id, status)
            })
            .collect();
        CuratedDatesStore::new(Arc::new(MockSource::new(Vec::new(), dates)))
    }

    #[tokio::test]
    async fn test_fetch_and_paginate() {
        let store = store();
        store.fetch_dates(None).await;
        let state = store.snapshot();
        assert_eq!(state.dates.len(), 10);
        assert_eq!(state.pagination.total_count, 12);
        // Latest scheduled first
        assert_eq!(state.dates[0].id, 12);

        store.go_to_page(2).await;
        assert_eq!(store.snapshot().dates.len(), 2);
    }

    #[tokio::test]
    async fn test_status_update_patches_list_selection_and_stats() {
        let store = store();
        store.fetch_dates(None).await;
        let first = store.snapshot().dates[0].clone();
        store.select_date(Some(first.clone()));

        store
            .update_date_status(
                first.id,
                DateStatus::Cancelled,
                Some("Venue closed".to_string()),
            )
            .await;

        let state = store.snapshot();
        assert!(state.error.is_none());
        assert_eq!(state.dates[0].status, DateStatus::Cancelled);
        assert_eq!(
            state
                .selected_date
                .as_ref()
                .and_then(|d| d.cancellation_reason.as_deref()),
            Some("Venue closed")
        );
        assert_eq!(state.stats.map(|s| s.cancelled), Some(1));
    }

    #[tokio::test]
    async fn test_unknown_date_sets_error() {
        let store = store();
        store.update_date_status(404, DateStatus::Completed, None).await;
        let state = store.snapshot();
        assert!(!state.is_loading);
        assert!(state.error.is_some());
        assert!(state.stats.is_none());

        store.clear_error();
        assert!(store.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn test_note_and_filters() {
        let store = store();
        store.fetch_dates(None).await;
        store.add_note(12, "Needs a quieter venue".to_string()).await;
        assert_eq!(
            store.snapshot().dates[0].notes.as_deref(),
            Some("Needs a quieter venue")
        );

        store
            .set_filters(|f| f.status = Some(DateStatus::Completed))
            .await;
        assert_eq!(store.snapshot().pagination.total_count, 4);

        store.set_page_size(3).await;
        let state = store.snapshot();
        assert_eq!(state.dates.len(), 3);
        assert_eq!(state.pagination.page_count(), 2);

        store.reset_filters().await;
        assert_eq!(store.snapshot().pagination.total_count, 12);
    }
}
