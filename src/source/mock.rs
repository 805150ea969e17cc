use super::{DateCurationSource, RevenueSource};
use crate::config::settings::DataConfig;
use crate::core::filter::{DateFilters, TransactionFilters};
use crate::core::pagination::{Page, PageRequest, select_page};
use crate::errors::{Error, Result};
use crate::generator::MockDataGenerator;
use crate::models::{
    CuratedDateRecord, DateStatus, NewCuratedDate, ParticipantFeedback, ParticipantSlot,
    TransactionRecord, TransactionStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Records held in memory. Updates are kept for the life of the process.
pub struct MockSource {
    transactions: RwLock<Vec<TransactionRecord>>,
    dates: RwLock<Vec<CuratedDateRecord>>,
}

impl MockSource {
    /// Wraps existing records.
    #[must_use]
    pub fn new(transactions: Vec<TransactionRecord>, dates: Vec<CuratedDateRecord>) -> Self {
        Self {
            transactions: RwLock::new(transactions),
            dates: RwLock::new(dates),
        }
    }

    /// Generates records as configured in the `[data]` section.
    #[must_use]
    pub fn generate(config: &DataConfig, now: DateTime<Utc>) -> Self {
        let mut generator = MockDataGenerator::new(config.seed, now);
        let transactions = generator.transactions(config.mock_transactions);
        let dates = generator.curated_dates(config.mock_dates);
        info!(
            transactions = transactions.len(),
            dates = dates.len(),
            seed = config.seed,
            "Generated mock data"
        );
        Self::new(transactions, dates)
    }
}

fn transaction_not_found(id: i64) -> Error {
    Error::NotFound {
        entity: "Transaction",
        id: id.to_string(),
    }
}

fn date_not_found(id: i64) -> Error {
    Error::NotFound {
        entity: "Curated date",
        id: id.to_string(),
    }
}

#[async_trait]
impl RevenueSource for MockSource {
    async fn list_transactions(
        &self,
        filters: &TransactionFilters,
        request: PageRequest,
    ) -> Result<Page<TransactionRecord>> {
        let transactions = self.transactions.read().await;
        let page = select_page(&transactions, filters, request);
        debug!(
            total = page.total_count,
            returned = page.items.len(),
            "Listed mock transactions"
        );
        Ok(page)
    }

    async fn all_transactions(&self) -> Result<Vec<TransactionRecord>> {
        Ok(self.transactions.read().await.clone())
    }

    async fn update_transaction_status(
        &self,
        id: i64,
        status: TransactionStatus,
        at: DateTime<Utc>,
    ) -> Result<TransactionRecord> {
        let mut transactions = self.transactions.write().await;
        let tx = transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| transaction_not_found(id))?;
        tx.transition_to(status, at)?;
        Ok(tx.clone())
    }
}

#[async_trait]
impl DateCurationSource for MockSource {
    async fn list_dates(
        &self,
        filters: &DateFilters,
        request: PageRequest,
    ) -> Result<Page<CuratedDateRecord>> {
        let dates = self.dates.read().await;
        Ok(select_page(&dates, filters, request))
    }

    async fn all_dates(&self) -> Result<Vec<CuratedDateRecord>> {
        Ok(self.dates.read().await.clone())
    }

    async fn get_date(&self, id: i64) -> Result<CuratedDateRecord> {
        self.dates
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| date_not_found(id))
    }

    async fn create_date(
        &self,
        new: NewCuratedDate,
        at: DateTime<Utc>,
    ) -> Result<CuratedDateRecord> {
        let mut dates = self.dates.write().await;
        let id = dates.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        let record = CuratedDateRecord::schedule(id, new, at);
        dates.push(record.clone());
        info!(id, date_ref = %record.date_ref, "Created curated date");
        Ok(record)
    }

    async fn delete_date(&self, id: i64) -> Result<()> {
        let mut dates = self.dates.write().await;
        let index = dates
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| date_not_found(id))?;
        dates.remove(index);
        Ok(())
    }

    async fn submit_feedback(
        &self,
        id: i64,
        slot: ParticipantSlot,
        entry: ParticipantFeedback,
    ) -> Result<CuratedDateRecord> {
        let mut dates = self.dates.write().await;
        let date = dates
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| date_not_found(id))?;
        date.add_feedback(slot, entry)?;
        Ok(date.clone())
    }

    async fn update_date_status(
        &self,
        id: i64,
        status: DateStatus,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<CuratedDateRecord> {
        let mut dates = self.dates.write().await;
        let date = dates
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| date_not_found(id))?;
        date.set_status(status, reason, at);
        Ok(date.clone())
    }

    async fn set_date_note(
        &self,
        id: i64,
        note: String,
        at: DateTime<Utc>,
    ) -> Result<CuratedDateRecord> {
        let mut dates = self.dates.write().await;
        let date = dates
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| date_not_found(id))?;
        date.set_note(note, at);
        Ok(date.clone())
    }
}
