//! Data sources.
//!
//! The API and the stores never know where records live. They talk to a
//! [`RevenueSource`] and a [`DateCurationSource`], which are implemented by an
//! in-memory [`mock::MockSource`] and by [`database::DbSource`] over `SeaORM`.
//! Analytics are provided methods that reduce the full record set with the
//! functions in [`crate::core`], so both sources report identical numbers.

use crate::core::dates::{self, DateStats};
use crate::core::filter::{DateFilters, TransactionFilters};
use crate::core::pagination::{Page, PageRequest};
use crate::core::revenue::{
    self, PaymentMethodStats, RevenueByCategory, RevenueByPeriod, RevenueMetrics,
    SubscriptionMetrics, TopUser,
};
use crate::errors::Result;
use crate::models::{
    CuratedDateRecord, DateStatus, NewCuratedDate, ParticipantFeedback, ParticipantSlot,
    TransactionRecord, TransactionStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Database-backed sources
pub mod database;
/// In-memory sources over generated data
pub mod mock;

pub use database::DbSource;
pub use mock::MockSource;

/// Read and update access to payment transactions.
#[async_trait]
pub trait RevenueSource: Send + Sync {
    /// One page of transactions matching `filters`, newest first.
    async fn list_transactions(
        &self,
        filters: &TransactionFilters,
        request: PageRequest,
    ) -> Result<Page<TransactionRecord>>;

    /// Every transaction, in no particular order.
    async fn all_transactions(&self) -> Result<Vec<TransactionRecord>>;

    /// Applies a lifecycle transition and returns the updated record.
    async fn update_transaction_status(
        &self,
        id: i64,
        status: TransactionStatus,
        at: DateTime<Utc>,
    ) -> Result<TransactionRecord>;

    /// Headline revenue numbers at `now`.
    async fn overview(&self, now: DateTime<Utc>) -> Result<RevenueMetrics> {
        Ok(revenue::compute_metrics(&self.all_transactions().await?, now))
    }

    /// Per-day revenue for the last `days` days.
    async fn revenue_trends(&self, days: u32, now: DateTime<Utc>) -> Result<Vec<RevenueByPeriod>> {
        Ok(revenue::revenue_by_period(
            &self.all_transactions().await?,
            days,
            now,
        ))
    }

    /// Revenue split by transaction type.
    async fn revenue_by_category(&self) -> Result<Vec<RevenueByCategory>> {
        Ok(revenue::revenue_by_category(&self.all_transactions().await?))
    }

    /// Biggest spenders first.
    async fn top_users(&self, limit: usize) -> Result<Vec<TopUser>> {
        Ok(revenue::top_users(&self.all_transactions().await?, limit))
    }

    /// Usage and success rate per payment method.
    async fn payment_methods(&self) -> Result<Vec<PaymentMethodStats>> {
        Ok(revenue::payment_method_stats(
            &self.all_transactions().await?,
        ))
    }

    /// Subscription counts, churn and recurring revenue.
    async fn subscriptions(
        &self,
        now: DateTime<Utc>,
        monthly_price: i64,
    ) -> Result<SubscriptionMetrics> {
        Ok(revenue::subscription_metrics(
            &self.all_transactions().await?,
            now,
            monthly_price,
        ))
    }
}

/// Read and update access to curated dates.
#[async_trait]
pub trait DateCurationSource: Send + Sync {
    /// One page of dates matching `filters`, latest scheduled first.
    async fn list_dates(
        &self,
        filters: &DateFilters,
        request: PageRequest,
    ) -> Result<Page<CuratedDateRecord>>;

    /// Every curated date, in no particular order.
    async fn all_dates(&self) -> Result<Vec<CuratedDateRecord>>;

    /// One date with its feedback.
    async fn get_date(&self, id: i64) -> Result<CuratedDateRecord>;

    /// Schedules a new date and returns it with its assigned id and reference.
    async fn create_date(
        &self,
        new: NewCuratedDate,
        at: DateTime<Utc>,
    ) -> Result<CuratedDateRecord>;

    /// Removes a date and its feedback.
    async fn delete_date(&self, id: i64) -> Result<()>;

    /// Records one participant's feedback on a completed date.
    async fn submit_feedback(
        &self,
        id: i64,
        slot: ParticipantSlot,
        entry: ParticipantFeedback,
    ) -> Result<CuratedDateRecord>;

    /// Sets the status of a date. The reason is kept only for cancellations.
    async fn update_date_status(
        &self,
        id: i64,
        status: DateStatus,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<CuratedDateRecord>;

    /// Replaces the admin note on a date.
    async fn set_date_note(
        &self,
        id: i64,
        note: String,
        at: DateTime<Utc>,
    ) -> Result<CuratedDateRecord>;

    /// Counts, success rate and average rating over every date.
    async fn date_stats(&self) -> Result<DateStats> {
        Ok(dates::compute_stats(&self.all_dates().await?))
    }
}
