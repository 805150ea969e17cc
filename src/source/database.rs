use super::{DateCurationSource, RevenueSource};
use crate::core::filter::{DateFilters, DateRange, TransactionFilters};
use crate::core::pagination::{Page, PageRequest, select_page};
use crate::entities::{
    CuratedDate, DateFeedback, Transaction, curated_date, date_feedback, transaction,
};
use crate::errors::{Error, Result};
use crate::models::{
    CuratedDateRecord, DateStatus, NewCuratedDate, ParticipantFeedback, ParticipantSlot,
    TransactionRecord, TransactionStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Query, SimpleExpr};
use sea_orm::{
    Condition, LoaderTrait, PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::*,
};
use tracing::{debug, info, instrument};

/// Rows per `INSERT` when seeding, well under `SQLite`'s bound-variable limit.
const SEED_CHUNK: usize = 50;

/// Sources backed by the `SQLite` database.
///
/// Structured criteria are applied in SQL. A free-text search is matched in
/// memory with the same Unicode case folding as the mock source, after SQL
/// has narrowed the rows by every other criterion.
#[derive(Clone)]
pub struct DbSource {
    db: DatabaseConnection,
}

impl DbSource {
    /// Wraps an open connection whose tables already exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts the given records into tables that are still empty.
    ///
    /// # Returns
    /// The number of transactions and dates inserted.
    #[instrument(skip_all)]
    pub async fn seed_if_empty(
        &self,
        transactions: &[TransactionRecord],
        dates: &[CuratedDateRecord],
    ) -> Result<(usize, usize)> {
        let mut inserted = (0, 0);
        let txn = self.db.begin().await?;

        if Transaction::find().count(&txn).await? == 0 {
            for chunk in transactions.chunks(SEED_CHUNK) {
                Transaction::insert_many(chunk.iter().map(transaction::ActiveModel::from))
                    .exec(&txn)
                    .await?;
            }
            inserted.0 = transactions.len();
        }

        if CuratedDate::find().count(&txn).await? == 0 {
            for chunk in dates.chunks(SEED_CHUNK) {
                CuratedDate::insert_many(chunk.iter().map(curated_date::ActiveModel::from))
                    .exec(&txn)
                    .await?;
            }
            let feedback: Vec<date_feedback::ActiveModel> =
                dates.iter().flat_map(date_feedback::rows_for).collect();
            for chunk in feedback.chunks(SEED_CHUNK) {
                DateFeedback::insert_many(chunk.to_vec()).exec(&txn).await?;
            }
            inserted.1 = dates.len();
        }

        txn.commit().await?;
        info!(
            transactions = inserted.0,
            dates = inserted.1,
            "Seeded database"
        );
        Ok(inserted)
    }

    async fn load_date(&self, id: i64) -> Result<(curated_date::Model, CuratedDateRecord)> {
        let model = CuratedDate::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "Curated date",
                id: id.to_string(),
            })?;
        let feedback = model.find_related(DateFeedback).all(&self.db).await?;
        let record = model.clone().into_record(feedback)?;
        Ok((model, record))
    }

    async fn with_feedback(
        &self,
        models: Vec<curated_date::Model>,
    ) -> Result<Vec<CuratedDateRecord>> {
        let feedback = models.load_many(DateFeedback, &self.db).await?;
        models
            .into_iter()
            .zip(feedback)
            .map(|(model, feedback)| model.into_record(feedback))
            .collect()
    }
}

fn has_search(search: &str) -> bool {
    !search.trim().is_empty()
}

fn range_condition<C: ColumnTrait>(column: C, range: Option<DateRange>) -> Option<SimpleExpr> {
    range.map(|r| column.between(r.from, r.to))
}

fn transaction_condition(filters: &TransactionFilters) -> Condition {
    use transaction::Column;

    let mut cond = Condition::all()
        .add_option(filters.status.map(|s| Column::Status.eq(s.as_str())))
        .add_option(filters.kind.map(|k| Column::TransactionType.eq(k.as_str())))
        .add_option(
            filters
                .payment_method
                .map(|m| Column::PaymentMethod.eq(m.as_str())),
        )
        .add_option(range_condition(Column::CreatedAt, filters.date_range));

    // Bounds apply to |amount|
    if let Some(min) = filters.min_amount {
        cond = cond.add(
            Condition::any()
                .add(Column::Amount.gte(min))
                .add(Column::Amount.lte(-min)),
        );
    }
    if let Some(max) = filters.max_amount {
        cond = cond
            .add(Column::Amount.lte(max))
            .add(Column::Amount.gte(-max));
    }
    cond
}

fn date_condition(filters: &DateFilters) -> Condition {
    use curated_date::Column;

    let mut cond = Condition::all()
        .add_option(filters.status.map(|s| Column::Status.eq(s.as_str())))
        .add_option(filters.date_type.map(|t| Column::DateType.eq(t.as_str())))
        .add_option(filters.city.as_deref().map(|c| Column::User1City.eq(c)))
        .add_option(range_condition(Column::ScheduledAt, filters.date_range));

    if filters.has_issues {
        let low_rated = Query::select()
            .column(date_feedback::Column::DateId)
            .from(DateFeedback)
            .and_where(date_feedback::Column::Rating.lt(3))
            .to_owned();
        cond = cond.add(
            Condition::any()
                .add(Column::Status.is_in([
                    DateStatus::Cancelled.as_str(),
                    DateStatus::NoShow.as_str(),
                ]))
                .add(Column::Id.in_subquery(low_rated)),
        );
    }
    cond
}

#[async_trait]
impl RevenueSource for DbSource {
    async fn list_transactions(
        &self,
        filters: &TransactionFilters,
        request: PageRequest,
    ) -> Result<Page<TransactionRecord>> {
        let query = Transaction::find()
            .filter(transaction_condition(filters))
            .order_by_desc(transaction::Column::CreatedAt)
            .order_by_asc(transaction::Column::Id);

        if has_search(&filters.search) {
            let candidates = query
                .all(&self.db)
                .await?
                .into_iter()
                .map(TransactionRecord::try_from)
                .collect::<Result<Vec<_>>>()?;
            let page = select_page(&candidates, filters, request);
            debug!(
                candidates = candidates.len(),
                total = page.total_count,
                "Searched transactions"
            );
            return Ok(page);
        }

        let total_count = query.clone().count(&self.db).await?;
        let rows = query
            .offset(request.offset() as u64)
            .limit(u64::from(request.page_size))
            .all(&self.db)
            .await?;
        debug!(total = total_count, returned = rows.len(), "Listed transactions");

        let items = rows
            .into_iter()
            .map(TransactionRecord::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page { items, total_count })
    }

    async fn all_transactions(&self) -> Result<Vec<TransactionRecord>> {
        Transaction::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(TransactionRecord::try_from)
            .collect()
    }

    #[instrument(skip(self))]
    async fn update_transaction_status(
        &self,
        id: i64,
        status: TransactionStatus,
        at: DateTime<Utc>,
    ) -> Result<TransactionRecord> {
        let model = Transaction::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "Transaction",
                id: id.to_string(),
            })?;
        let previous = model.status.clone();
        let mut record = TransactionRecord::try_from(model)?;
        record.transition_to(status, at)?;

        // Only applies if nobody changed the status since it was read
        let result = Transaction::update_many()
            .col_expr(transaction::Column::Status, Expr::value(record.status.as_str()))
            .col_expr(transaction::Column::CompletedAt, Expr::value(record.completed_at))
            .col_expr(transaction::Column::RefundedAt, Expr::value(record.refunded_at))
            .filter(transaction::Column::Id.eq(id))
            .filter(transaction::Column::Status.eq(previous.as_str()))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(Error::InvalidTransition {
                from: previous,
                to: status.to_string(),
            });
        }

        info!(id, %status, "Updated transaction status");
        Ok(record)
    }
}

#[async_trait]
impl DateCurationSource for DbSource {
    async fn list_dates(
        &self,
        filters: &DateFilters,
        request: PageRequest,
    ) -> Result<Page<CuratedDateRecord>> {
        let query = CuratedDate::find()
            .filter(date_condition(filters))
            .order_by_desc(curated_date::Column::ScheduledAt)
            .order_by_asc(curated_date::Column::Id);

        if has_search(&filters.search) {
            let candidates = self.with_feedback(query.all(&self.db).await?).await?;
            return Ok(select_page(&candidates, filters, request));
        }

        let total_count = query.clone().count(&self.db).await?;
        let models = query
            .offset(request.offset() as u64)
            .limit(u64::from(request.page_size))
            .all(&self.db)
            .await?;

        let items = self.with_feedback(models).await?;
        Ok(Page { items, total_count })
    }

    async fn all_dates(&self) -> Result<Vec<CuratedDateRecord>> {
        let models = CuratedDate::find().all(&self.db).await?;
        self.with_feedback(models).await
    }

    async fn get_date(&self, id: i64) -> Result<CuratedDateRecord> {
        let (_, record) = self.load_date(id).await?;
        Ok(record)
    }

    #[instrument(skip_all)]
    async fn create_date(
        &self,
        new: NewCuratedDate,
        at: DateTime<Utc>,
    ) -> Result<CuratedDateRecord> {
        let txn = self.db.begin().await?;
        let last = CuratedDate::find()
            .order_by_desc(curated_date::Column::Id)
            .one(&txn)
            .await?;
        let id = last.map_or(1, |m| m.id + 1);

        let record = CuratedDateRecord::schedule(id, new, at);
        CuratedDate::insert(curated_date::ActiveModel::from(&record))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(id, date_ref = %record.date_ref, "Created curated date");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn delete_date(&self, id: i64) -> Result<()> {
        let txn = self.db.begin().await?;
        DateFeedback::delete_many()
            .filter(date_feedback::Column::DateId.eq(id))
            .exec(&txn)
            .await?;
        let deleted = CuratedDate::delete_by_id(id).exec(&txn).await?;
        if deleted.rows_affected == 0 {
            return Err(Error::NotFound {
                entity: "Curated date",
                id: id.to_string(),
            });
        }
        txn.commit().await?;

        info!(id, "Deleted curated date");
        Ok(())
    }

    #[instrument(skip(self, entry))]
    async fn submit_feedback(
        &self,
        id: i64,
        slot: ParticipantSlot,
        entry: ParticipantFeedback,
    ) -> Result<CuratedDateRecord> {
        let (model, mut record) = self.load_date(id).await?;
        let row = date_feedback::row(id, slot, &entry);
        record.add_feedback(slot, entry)?;

        let txn = self.db.begin().await?;
        DateFeedback::insert(row).exec(&txn).await?;
        let mut active: curated_date::ActiveModel = model.into();
        active.last_updated_at = Set(record.last_updated_at);
        active.update(&txn).await?;
        txn.commit().await?;

        info!(id, %slot, "Recorded date feedback");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn update_date_status(
        &self,
        id: i64,
        status: DateStatus,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<CuratedDateRecord> {
        let (model, mut record) = self.load_date(id).await?;
        record.set_status(status, reason, at);

        let mut active: curated_date::ActiveModel = model.into();
        active.status = Set(record.status.to_string());
        active.cancellation_reason = Set(record.cancellation_reason.clone());
        active.last_updated_at = Set(record.last_updated_at);
        active.update(&self.db).await?;

        info!(id, %status, "Updated curated date status");
        Ok(record)
    }

    #[instrument(skip(self, note))]
    async fn set_date_note(
        &self,
        id: i64,
        note: String,
        at: DateTime<Utc>,
    ) -> Result<CuratedDateRecord> {
        let (model, mut record) = self.load_date(id).await?;
        record.set_note(note, at);

        let mut active: curated_date::ActiveModel = model.into();
        active.notes = Set(record.notes.clone());
        active.last_updated_at = Set(record.last_updated_at);
        active.update(&self.db).await?;

        Ok(record)
    }
}
