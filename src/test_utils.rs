//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and building records with sensible defaults.

use crate::{
    errors::{Error, Result},
    mail::{Mailer, OutgoingEmail},
    models::{
        CuratedDateRecord, DateLocation, DateStatus, DateType, Participant, PaymentMethod,
        TransactionRecord, TransactionStatus, TransactionType,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Creates a transaction with sensible defaults.
///
/// # Arguments
/// * `id` - Record id; also used for the `TXN{id:08}` reference
/// * `status` - Lifecycle state
/// * `amount` - Signed amount
///
/// # Defaults
/// * type: purchase, paid by card in INR
/// * user: `"u{id}"`, `"Test User"`, `"test{id}@example.com"`
/// * `created_at`: 2025-06-01 10:00 UTC plus `id` minutes
/// * `completed_at` / `refunded_at`: set to match `status`
pub fn sample_transaction(id: i64, status: TransactionStatus, amount: i64) -> TransactionRecord {
    let created_at = base_time() + Duration::minutes(id);
    TransactionRecord {
        id,
        transaction_ref: format!("TXN{id:08}"),
        user_id: format!("u{id}"),
        user_name: "Test User".to_string(),
        user_email: format!("test{id}@example.com"),
        kind: TransactionType::Purchase,
        amount,
        currency: "INR".to_string(),
        status,
        payment_method: PaymentMethod::Card,
        description: format!("Purchase of {} Love Tokens", amount / 100 * 10),
        love_tokens: Some(amount / 100 * 10),
        promo_code: None,
        created_at,
        completed_at: (status == TransactionStatus::Completed)
            .then(|| created_at + Duration::minutes(5)),
        refunded_at: (status == TransactionStatus::Refunded).then(|| created_at + Duration::days(1)),
    }
}

/// Creates a curated date with sensible defaults.
///
/// # Defaults
/// * James Smith and Emma Miller, both in Bangalore
/// * offline at The Coffee House, no genie, no feedback
/// * `scheduled_at`: 2025-06-10 10:00 UTC plus `id` hours
/// * a cancellation reason only when `status` is cancelled
pub fn sample_date(id: i64, status: DateStatus) -> CuratedDateRecord {
    let scheduled_at = base_time() + Duration::days(9) + Duration::hours(id);
    CuratedDateRecord {
        id,
        date_ref: format!("DATE{id:06}"),
        user1: Participant {
            id: format!("u{}", id * 2 - 1),
            first_name: "James".to_string(),
            last_name: "Smith".to_string(),
            email: format!("user{}@example.com", id * 2 - 1),
            age: 28,
            city: "Bangalore".to_string(),
        },
        user2: Participant {
            id: format!("u{}", id * 2),
            first_name: "Emma".to_string(),
            last_name: "Miller".to_string(),
            email: format!("user{}@example.com", id * 2),
            age: 27,
            city: "Bangalore".to_string(),
        },
        date_type: DateType::Offline,
        scheduled_at,
        status,
        location: Some(DateLocation {
            name: "The Coffee House".to_string(),
            address: "Indiranagar, 100 Feet Road".to_string(),
            city: "Bangalore".to_string(),
        }),
        genie: None,
        feedback: None,
        match_score: 85,
        created_at: scheduled_at - Duration::days(7),
        created_by: "Admin User".to_string(),
        last_updated_at: scheduled_at,
        cancellation_reason: (status == DateStatus::Cancelled)
            .then(|| "User requested cancellation".to_string()),
        notes: None,
    }
}

/// Mailer that keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

/// Mailer that always fails, like an unreachable mail API.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &OutgoingEmail) -> Result<()> {
        Err(Error::Mail {
            message: "mail API unavailable".to_string(),
        })
    }
}
