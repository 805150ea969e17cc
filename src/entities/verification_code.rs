//! Verification code entity - A one-time code e-mailed to a user.
//!
//! A code is accepted once, and only before `expires_at`. Too many wrong
//! guesses retire it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Verification code database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_codes")]
pub struct Model {
    /// Unique identifier for the code
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Normalised e-mail address the code was sent to
    pub email: String,
    /// Six decimal digits
    pub code: String,
    /// Last instant the code is accepted
    pub expires_at: DateTimeUtc,
    /// Set once the code has been used or retired
    pub consumed: bool,
    /// Wrong guesses made against this code
    pub attempts: i32,
    /// When the code was issued
    pub created_at: DateTimeUtc,
}

/// Verification codes have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// True if the code can still be redeemed at `now`.
    #[must_use]
    pub fn is_redeemable(&self, now: DateTimeUtc) -> bool {
        !self.consumed && now <= self.expires_at
    }
}
