use super::{PaginationState, RequestSequence};
use crate::core::filter::TransactionFilters;
use crate::core::pagination::PageRequest;
use crate::core::revenue::{
    DEFAULT_TOP_USERS, DEFAULT_TREND_DAYS, PaymentMethodStats, RevenueByCategory,
    RevenueByPeriod, RevenueMetrics, SubscriptionMetrics, TopUser,
};
use crate::models::TransactionRecord;
use crate::source::RevenueSource;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Everything the revenue screen shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueState {
    /// Current page
    pub transactions: Vec<TransactionRecord>,
    /// Active filters
    pub filters: TransactionFilters,
    /// Paging position
    pub pagination: PaginationState,
    /// Headline numbers
    pub metrics: Option<RevenueMetrics>,
    /// Per-day trend
    pub revenue_by_period: Vec<RevenueByPeriod>,
    /// Revenue per transaction type
    pub revenue_by_category: Vec<RevenueByCategory>,
    /// Biggest spenders
    pub top_users: Vec<TopUser>,
    /// Revenue per payment method
    pub payment_method_stats: Vec<PaymentMethodStats>,
    /// Subscription health
    pub subscription_metrics: Option<SubscriptionMetrics>,
    /// Transaction open in the detail view
    pub selected_transaction: Option<TransactionRecord>,
    /// A listing request is in flight
    pub is_loading: bool,
    /// Last listing or update failure
    pub error: Option<String>,
}

/// State container for the revenue screen.
#[derive(Clone)]
pub struct RevenueStore {
    source: Arc<dyn RevenueSource>,
    state: Arc<watch::Sender<RevenueState>>,
    listing: Arc<RequestSequence>,
    trends: Arc<RequestSequence>,
    monthly_price: i64,
}

impl RevenueStore {
    /// Creates a store with empty state. Nothing is fetched yet.
    pub fn new(source: Arc<dyn RevenueSource>, monthly_price: i64) -> Self {
        let (state, _) = watch::channel(RevenueState::default());
        Self {
            source,
            state: Arc::new(state),
            listing: Arc::new(RequestSequence::default()),
            trends: Arc::new(RequestSequence::default()),
            monthly_price,
        }
    }

    /// Receiver that sees every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RevenueState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> RevenueState {
        self.state.borrow().clone()
    }

    /// Edits the filters, goes back to page 1 and re-fetches.
    pub async fn set_filters(&self, edit: impl FnOnce(&mut TransactionFilters) + Send) {
        self.state.send_modify(|s| {
            edit(&mut s.filters);
            s.pagination.page = 1;
        });
        self.fetch_transactions(None).await;
    }

    /// Loads a page of transactions for the current filters.
    ///
    /// `page` defaults to the current page. Failures are kept in `error`.
    pub async fn fetch_transactions(&self, page: Option<u32>) {
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

        let result = self.source.list_transactions(&filters, request).await;

        if !self.listing.is_current(ticket) {
            debug!(ticket, "Discarding stale transaction listing");
            return;
        }
        self.state.send_modify(|s| {
            s.is_loading = false;
            match result {
                Ok(page) => {
                    s.transactions = page.items;
                    s.pagination.page = request.page;
                    s.pagination.total_count = page.total_count;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load transactions");
                    s.error = Some(e.to_string());
                }
            }
        });
    }

    /// Loads the headline numbers.
    pub async fn fetch_metrics(&self) {
        match self.source.overview(Utc::now()).await {
            Ok(metrics) => self.state.send_modify(|s| s.metrics = Some(metrics)),
            Err(e) => warn!(error = %e, "Failed to fetch metrics"),
        }
    }

    /// Loads the last `days` days of revenue, dropping stale answers.
    pub async fn fetch_revenue_by_period(&self, days: u32) {
        let ticket = self.trends.begin();
        let result = self.source.revenue_trends(days, Utc::now()).await;
        if !self.trends.is_current(ticket) {
            debug!(ticket, "Discarding stale revenue trend");
            return;
        }
        match result {
            Ok(series) => self.state.send_modify(|s| s.revenue_by_period = series),
            Err(e) => warn!(error = %e, "Failed to fetch revenue by period"),
        }
    }

    /// Loads the per-type split.
    pub async fn fetch_revenue_by_category(&self) {
        match self.source.revenue_by_category().await {
            Ok(categories) => self
                .state
                .send_modify(|s| s.revenue_by_category = categories),
            Err(e) => warn!(error = %e, "Failed to fetch revenue by category"),
        }
    }

    /// Loads the top spenders.
    pub async fn fetch_top_users(&self) {
        match self.source.top_users(DEFAULT_TOP_USERS as usize).await {
            Ok(users) => self.state.send_modify(|s| s.top_users = users),
            Err(e) => warn!(error = %e, "Failed to fetch top users"),
        }
    }

    /// Loads the per-method split.
    pub async fn fetch_payment_method_stats(&self) {
        match self.source.payment_methods().await {
            Ok(stats) => self.state.send_modify(|s| s.payment_method_stats = stats),
            Err(e) => warn!(error = %e, "Failed to fetch payment method stats"),
        }
    }

    /// Loads subscription health.
    pub async fn fetch_subscription_metrics(&self) {
        match self
            .source
            .subscriptions(Utc::now(), self.monthly_price)
            .await
        {
            Ok(metrics) => self
                .state
                .send_modify(|s| s.subscription_metrics = Some(metrics)),
            Err(e) => warn!(error = %e, "Failed to fetch subscription metrics"),
        }
    }

    /// Loads the listing and every analytics panel concurrently.
    pub async fn fetch_all(&self) {
        tokio::join!(
            self.fetch_transactions(None),
            self.fetch_metrics(),
            self.fetch_revenue_by_period(DEFAULT_TREND_DAYS),
            self.fetch_revenue_by_category(),
            self.fetch_top_users(),
            self.fetch_payment_method_stats(),
            self.fetch_subscription_metrics(),
        );
    }

    /// Opens or closes the detail view.
    pub fn select_transaction(&self, transaction: Option<TransactionRecord>) {
        self.state
            .send_modify(|s| s.selected_transaction = transaction);
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
        self.fetch_transactions(Some(1)).await;
    }

    /// Loads another page.
    pub async fn go_to_page(&self, page: u32) {
        self.fetch_transactions(Some(page)).await;
    }

    /// Clears every filter and reloads page 1.
    pub async fn reset_filters(&self) {
        self.state
            .send_modify(|s| s.filters = TransactionFilters::default());
        self.fetch_transactions(Some(1)).await;
    }
}
