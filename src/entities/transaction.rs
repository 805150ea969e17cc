//! Transaction entity - A payment made by a platform user.
//!
//! Enumerated fields (`transaction_type`, `status`, `payment_method`) are stored
//! as their lowercase wire strings and parsed back when a row is turned into a
//! [`TransactionRecord`].
use crate::errors::Error;
use crate::models::TransactionRecord;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public reference shown to admins, e.g. `TXN00000042`
    #[sea_orm(unique)]
    pub transaction_ref: String,
    /// ID of the paying user
    pub user_id: String,
    /// Display name of the paying user at the time of payment
    pub user_name: String,
    /// E-mail of the paying user
    pub user_email: String,
    /// One of `"purchase"`, `"refund"`, `"subscription"`, `"bonus"`
    pub transaction_type: String,
    /// Signed amount in whole currency units, negative for refunds
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// One of `"pending"`, `"completed"`, `"failed"`, `"refunded"`
    pub status: String,
    /// One of `"card"`, `"upi"`, `"netbanking"`, `"wallet"`
    pub payment_method: String,
    /// Human-readable description
    pub description: String,
    /// Love tokens credited by a purchase
    pub love_tokens: Option<i64>,
    /// Promo code applied at checkout
    pub promo_code: Option<String>,
    /// When the payment was started
    pub created_at: DateTimeUtc,
    /// When the payment completed
    pub completed_at: Option<DateTimeUtc>,
    /// When the payment was refunded
    pub refunded_at: Option<DateTimeUtc>,
}

/// Transaction has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for TransactionRecord {
    type Error = Error;

    fn try_from(model: Model) -> crate::errors::Result<Self> {
        Ok(Self {
            id: model.id,
            transaction_ref: model.transaction_ref,
            user_id: model.user_id,
            user_name: model.user_name,
            user_email: model.user_email,
            kind: model.transaction_type.parse()?,
            amount: model.amount,
            currency: model.currency,
            status: model.status.parse()?,
            payment_method: model.payment_method.parse()?,
            description: model.description,
            love_tokens: model.love_tokens,
            promo_code: model.promo_code,
            created_at: model.created_at,
            completed_at: model.completed_at,
            refunded_at: model.refunded_at,
        })
    }
}

impl From<&TransactionRecord> for ActiveModel {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            id: Set(record.id),
            transaction_ref: Set(record.transaction_ref.clone()),
            user_id: Set(record.user_id.clone()),
            user_name: Set(record.user_name.clone()),
            user_email: Set(record.user_email.clone()),
            transaction_type: Set(record.kind.to_string()),
            amount: Set(record.amount),
            currency: Set(record.currency.clone()),
            status: Set(record.status.to_string()),
            payment_method: Set(record.payment_method.to_string()),
            description: Set(record.description.clone()),
            love_tokens: Set(record.love_tokens),
            promo_code: Set(record.promo_code.clone()),
            created_at: Set(record.created_at),
            completed_at: Set(record.completed_at),
            refunded_at: Set(record.refunded_at),
        }
    }
}
