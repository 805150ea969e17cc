//! Filter stage.
//!
//! A filter is a conjunction of optional criteria; an absent criterion (or the
//! `all` sentinel at the API boundary) matches everything, so a default filter
//! is the identity. Filtering only ever borrows the input collection.

use crate::models::{
    CuratedDateRecord, DateStatus, DateType, PaymentMethod, TransactionRecord, TransactionStatus,
    TransactionType,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Something that can accept or reject a record of type `T`.
pub trait RecordFilter<T> {
    /// True if every present criterion matches `record`.
    fn matches(&self, record: &T) -> bool;

    /// True if no criterion is set.
    fn is_empty(&self) -> bool;
}

/// Inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First instant in the window
    pub from: DateTime<Utc>,
    /// Last instant in the window
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Both ends are inclusive.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at <= self.to
    }
}

/// Criteria for the revenue transaction table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    /// Case-insensitive substring over user name, user email and transaction ref
    pub search: String,
    /// Exact status
    pub status: Option<TransactionStatus>,
    /// Exact transaction type
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    /// Exact payment method
    pub payment_method: Option<PaymentMethod>,
    /// Creation time window
    pub date_range: Option<DateRange>,
    /// Lower bound on `|amount|`, inclusive
    pub min_amount: Option<i64>,
    /// Upper bound on `|amount|`, inclusive
    pub max_amount: Option<i64>,
}

/// Criteria for the curated dates table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFilters {
    /// Case-insensitive substring over both participants' names and the date ref
    pub search: String,
    /// Exact status
    pub status: Option<DateStatus>,
    /// Online or offline
    pub date_type: Option<DateType>,
    /// Exact match on the first participant's city
    pub city: Option<String>,
    /// Scheduled time window
    pub date_range: Option<DateRange>,
    /// Only dates with low ratings or a cancellation reason
    pub has_issues: bool,
}

/// Trimmed, lowercased search needle, or `None` when blank.
fn search_needle(search: &str) -> Option<String> {
    let trimmed = search.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

impl RecordFilter<TransactionRecord> for TransactionFilters {
    fn matches(&self, tx: &TransactionRecord) -> bool {
        if let Some(needle) = search_needle(&self.search) {
            let hit = contains_ci(&tx.user_name, &needle)
                || contains_ci(&tx.user_email, &needle)
                || contains_ci(&tx.transaction_ref, &needle);
            if !hit {
                return false;
            }
        }

        self.status.is_none_or(|s| tx.status == s)
            && self.kind.is_none_or(|k| tx.kind == k)
            && self.payment_method.is_none_or(|m| tx.payment_method == m)
            && self.date_range.is_none_or(|r| r.contains(tx.created_at))
            && self.min_amount.is_none_or(|min| tx.amount.abs() >= min)
            && self.max_amount.is_none_or(|max| tx.amount.abs() <= max)
    }

    fn is_empty(&self) -> bool {
        search_needle(&self.search).is_none()
            && self.status.is_none()
            && self.kind.is_none()
            && self.payment_method.is_none()
            && self.date_range.is_none()
            && self.min_amount.is_none()
            && self.max_amount.is_none()
    }
}

impl RecordFilter<CuratedDateRecord> for DateFilters {
    fn matches(&self, date: &CuratedDateRecord) -> bool {
        if let Some(needle) = search_needle(&self.search) {
            let hit = [
                &date.user1.first_name,
                &date.user1.last_name,
                &date.user2.first_name,
                &date.user2.last_name,
                &date.date_ref,
            ]
            .into_iter()
            .any(|field| contains_ci(field, &needle));
            if !hit {
                return false;
            }
        }

        self.status.is_none_or(|s| date.status == s)
            && self.date_type.is_none_or(|t| date.date_type == t)
            && self
                .city
                .as_deref()
                .is_none_or(|city| date.user1.city == city)
            && self.date_range.is_none_or(|r| r.contains(date.scheduled_at))
            && (!self.has_issues || date.has_issues())
    }

    fn is_empty(&self) -> bool {
        search_needle(&self.search).is_none()
            && self.status.is_none()
            && self.date_type.is_none()
            && self.city.is_none()
            && self.date_range.is_none()
            && !self.has_issues
    }
}

/// Returns references to the records accepted by `filter`, in input order.
pub fn apply<'a, T, F>(records: &'a [T], filter: &F) -> Vec<&'a T>
where
    F: RecordFilter<T>,
{
    if filter.is_empty() {
        return records.iter().collect();
    }
    records.iter().filter(|r| filter.matches(r)).collect()
}
