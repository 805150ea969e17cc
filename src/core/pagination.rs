//! Pagination stage.
//!
//! Pages are 1-indexed. A page past the end is an empty slice, never an error.

use crate::core::filter::{self, RecordFilter};
use crate::models::{CuratedDateRecord, TransactionRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page size the API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Which slice of a collection to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Builds a request, lifting a zero page or size to 1.
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Index of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1).saturating_mul(self.page_size as usize)
    }

    /// Number of pages needed for `total` items.
    #[must_use]
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size.max(1)))
    }
}

/// One page of results plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Size of the whole filtered set
    pub total_count: u64,
}

impl<T> Page<T> {
    /// Transforms every item, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
        }
    }
}

/// Slices `[(page-1)*size, page*size)` out of an already sorted collection.
pub fn paginate<T: Clone>(sorted: &[T], request: PageRequest) -> Page<T> {
    let items = sorted
        .iter()
        .skip(request.offset())
        .take(request.page_size as usize)
        .cloned()
        .collect();
    Page {
        items,
        total_count: sorted.len() as u64,
    }
}

/// Records that list newest first.
pub trait Chronological {
    /// Timestamp the listing is ordered by.
    fn listed_at(&self) -> DateTime<Utc>;
}

impl Chronological for TransactionRecord {
    fn listed_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Chronological for CuratedDateRecord {
    fn listed_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }
}

/// Filter, sort newest first, then paginate, cloning only the returned page.
pub fn select_page<T, F>(records: &[T], filters: &F, request: PageRequest) -> Page<T>
where
    T: Chronological + Clone,
    F: RecordFilter<T>,
{
    let mut matched = filter::apply(records, filters);
    matched.sort_by_key(|r| std::cmp::Reverse(r.listed_at()));
    paginate(&matched, request).map(Clone::clone)
}
