//! Revenue analytics.
//!
//! Every function here is a pure reduction over a slice of transactions and an
//! explicit `now`, so the same numbers come out of the mock and database
//! sources. Only completed transactions with a positive amount count as
//! revenue (see [`TransactionRecord::is_revenue`]).

use crate::core::{percentage, round_to_tenth};
use crate::models::{PaymentMethod, TransactionRecord, TransactionStatus, TransactionType};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Headline numbers for the revenue dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueMetrics {
    /// All-time revenue
    pub total_revenue: i64,
    /// Revenue since the start of the day 30 days ago
    pub monthly_revenue: i64,
    /// Revenue since the start of the day 7 days ago
    pub weekly_revenue: i64,
    /// Revenue since the start of today (UTC)
    pub daily_revenue: i64,
    /// Mean revenue per revenue transaction
    pub average_transaction_value: i64,
    /// Every transaction, any status
    pub total_transactions: u64,
    /// Completed transactions
    pub successful_transactions: u64,
    /// Failed transactions
    pub failed_transactions: u64,
    /// Sum of refunds as a positive amount
    pub refunded_amount: i64,
    /// Last 30 days against the 30 days before, in percent with one decimal
    pub growth_rate: f64,
}

/// Revenue for a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueByPeriod {
    /// Calendar day (UTC)
    pub date: NaiveDate,
    /// Revenue on that day
    pub revenue: i64,
    /// Transactions created that day
    pub transactions: u64,
    /// Refunds created that day
    pub refunds: u64,
}

/// Revenue share of one transaction type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueByCategory {
    /// Transaction type
    pub category: TransactionType,
    /// Revenue from this type
    pub revenue: i64,
    /// Share of all revenue, whole percent
    pub percentage: u32,
    /// Revenue transactions of this type
    pub transactions: u64,
}

/// Revenue share of one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodStats {
    /// Payment method
    pub method: PaymentMethod,
    /// Revenue through this method
    pub revenue: i64,
    /// Transactions of any status
    pub transactions: u64,
    /// Share of all revenue, whole percent
    pub percentage: u32,
}

/// A user ranked by money spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUser {
    /// Platform user id
    pub user_id: String,
    /// Display name
    pub user_name: String,
    /// Contact address
    pub user_email: String,
    /// Sum of revenue transactions
    pub total_spent: i64,
    /// Revenue transactions
    pub transaction_count: u64,
    /// Most recent revenue transaction
    pub last_purchase: DateTime<Utc>,
    /// Love tokens bought in total
    pub love_tokens_purchased: i64,
}

/// Subscription health.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionMetrics {
    /// Completed subscription charges
    pub active_subscriptions: u64,
    /// Active ones started in the last 30 days
    pub new_subscriptions: u64,
    /// Refunded subscription charges
    pub cancelled_subscriptions: u64,
    /// Active subscriptions times the monthly price
    pub monthly_recurring_revenue: i64,
    /// Cancelled share of all subscriptions ever started, whole percent
    pub churn_rate: u32,
}

/// Days shown by the revenue trend unless asked otherwise.
pub const DEFAULT_TREND_DAYS: u32 = 30;

/// Entries in the top spenders list unless asked otherwise.
pub const DEFAULT_TOP_USERS: u32 = 10;

/// Transaction types that can bring money in, in dashboard order.
pub const REVENUE_CATEGORIES: [TransactionType; 3] = [
    TransactionType::Purchase,
    TransactionType::Subscription,
    TransactionType::Bonus,
];

/// Midnight UTC of the day `days` before `now`.
fn start_of_day(now: DateTime<Utc>, days_back: i64) -> DateTime<Utc> {
    (now - Duration::days(days_back))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}

fn revenue_since(records: &[TransactionRecord], since: DateTime<Utc>) -> i64 {
    records
        .iter()
        .filter(|t| t.is_revenue() && t.created_at >= since)
        .map(|t| t.amount)
        .sum()
}

fn revenue_between(records: &[TransactionRecord], from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    records
        .iter()
        .filter(|t| t.is_revenue() && t.created_at >= from && t.created_at < to)
        .map(|t| t.amount)
        .sum()
}

fn total_revenue(records: &[TransactionRecord]) -> i64 {
    records
        .iter()
        .filter(|t| t.is_revenue())
        .map(|t| t.amount)
        .sum()
}

/// Computes the dashboard headline numbers.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn compute_metrics(records: &[TransactionRecord], now: DateTime<Utc>) -> RevenueMetrics {
    let revenue: Vec<&TransactionRecord> = records.iter().filter(|t| t.is_revenue()).collect();
    let total = total_revenue(records);

    let average_transaction_value = if revenue.is_empty() {
        0
    } else {
        (total as f64 / revenue.len() as f64).round() as i64
    };

    let current = revenue_between(records, now - Duration::days(30), now + Duration::seconds(1));
    let previous = revenue_between(
        records,
        now - Duration::days(60),
        now - Duration::days(30),
    );
    let growth_rate = if previous > 0 {
        round_to_tenth((current - previous) as f64 / previous as f64 * 100.0)
    } else {
        0.0
    };

    RevenueMetrics {
        total_revenue: total,
        monthly_revenue: revenue_since(records, start_of_day(now, 30)),
        weekly_revenue: revenue_since(records, start_of_day(now, 7)),
        daily_revenue: revenue_since(records, start_of_day(now, 0)),
        average_transaction_value,
        total_transactions: records.len() as u64,
        successful_transactions: count_status(records, TransactionStatus::Completed),
        failed_transactions: count_status(records, TransactionStatus::Failed),
        refunded_amount: records
            .iter()
            .filter(|t| t.status == TransactionStatus::Refunded)
            .map(|t| t.amount.abs())
            .sum(),
        growth_rate,
    }
}

fn count_status(records: &[TransactionRecord], status: TransactionStatus) -> u64 {
    records.iter().filter(|t| t.status == status).count() as u64
}

/// Per-day revenue for the last `days` days, oldest first, today included.
#[must_use]
pub fn revenue_by_period(
    records: &[TransactionRecord],
    days: u32,
    now: DateTime<Utc>,
) -> Vec<RevenueByPeriod> {
    let mut by_day: HashMap<NaiveDate, RevenueByPeriod> = HashMap::new();
    for tx in records {
        let date = tx.created_at.date_naive();
        let entry = by_day.entry(date).or_insert_with(|| RevenueByPeriod {
            date,
            revenue: 0,
            transactions: 0,
            refunds: 0,
        });
        if tx.is_revenue() {
            entry.revenue += tx.amount;
            entry.transactions += 1;
        }
        if tx.kind == TransactionType::Refund {
            entry.refunds += 1;
        }
    }

    (0..i64::from(days))
        .rev()
        .map(|back| {
            let date = (now - Duration::days(back)).date_naive();
            by_day.remove(&date).unwrap_or(RevenueByPeriod {
                date,
                revenue: 0,
                transactions: 0,
                refunds: 0,
            })
        })
        .collect()
}

/// Revenue split by transaction type.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn revenue_by_category(records: &[TransactionRecord]) -> Vec<RevenueByCategory> {
    let total = total_revenue(records);
    REVENUE_CATEGORIES
        .iter()
        .map(|&category| {
            let (revenue, transactions) = records
                .iter()
                .filter(|t| t.is_revenue() && t.kind == category)
                .fold((0_i64, 0_u64), |(sum, n), t| (sum + t.amount, n + 1));
            RevenueByCategory {
                category,
                revenue,
                percentage: percentage(revenue as f64, total as f64),
                transactions,
            }
        })
        .collect()
}

/// Revenue split by payment method.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn payment_method_stats(records: &[TransactionRecord]) -> Vec<PaymentMethodStats> {
    let total = total_revenue(records);
    PaymentMethod::ALL
        .iter()
        .map(|&method| {
            let (revenue, transactions) = records
                .iter()
                .filter(|t| t.is_revenue() && t.payment_method == method)
                .fold((0_i64, 0_u64), |(sum, n), t| (sum + t.amount, n + 1));
            PaymentMethodStats {
                method,
                revenue,
                transactions,
                percentage: percentage(revenue as f64, total as f64),
            }
        })
        .collect()
}

/// Biggest spenders, highest first. Ties are broken by user id.
#[must_use]
pub fn top_users(records: &[TransactionRecord], limit: usize) -> Vec<TopUser> {
    let mut by_user: BTreeMap<&str, TopUser> = BTreeMap::new();
    for tx in records.iter().filter(|t| t.is_revenue()) {
        let user = by_user.entry(tx.user_id.as_str()).or_insert_with(|| TopUser {
            user_id: tx.user_id.clone(),
            user_name: tx.user_name.clone(),
            user_email: tx.user_email.clone(),
            total_spent: 0,
            transaction_count: 0,
            last_purchase: tx.created_at,
            love_tokens_purchased: 0,
        });
        user.total_spent += tx.amount;
        user.transaction_count += 1;
        user.love_tokens_purchased += tx.love_tokens.unwrap_or(0);
        user.last_purchase = user.last_purchase.max(tx.created_at);
    }

    let mut ranked: Vec<TopUser> = by_user.into_values().collect();
    // BTreeMap order gives the user-id tie break; the sort is stable.
    ranked.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
    ranked.truncate(limit);
    ranked
}

/// Subscription health. `monthly_price` is the plan price used for MRR.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
pub fn subscription_metrics(
    records: &[TransactionRecord],
    now: DateTime<Utc>,
    monthly_price: i64,
) -> SubscriptionMetrics {
    let month_start = start_of_day(now, 30);
    let subscriptions = records
        .iter()
        .filter(|t| t.kind == TransactionType::Subscription);

    let mut active = 0_u64;
    let mut new = 0_u64;
    let mut cancelled = 0_u64;
    for sub in subscriptions {
        match sub.status {
            TransactionStatus::Completed => {
                active += 1;
                if sub.created_at >= month_start {
                    new += 1;
                }
            }
            TransactionStatus::Refunded => cancelled += 1,
            TransactionStatus::Pending | TransactionStatus::Failed => {}
        }
    }

    SubscriptionMetrics {
        active_subscriptions: active,
        new_subscriptions: new,
        cancelled_subscriptions: cancelled,
        monthly_recurring_revenue: (active as i64).saturating_mul(monthly_price),
        churn_rate: percentage(cancelled as f64, (active + cancelled) as f64),
    }
}
