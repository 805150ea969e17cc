//! Waitlist entry entity - A pre-launch signup.
//!
//! E-mail addresses are unique; they are stored trimmed and lowercased.

use crate::errors::Error;
use crate::models::WaitlistEntry;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Waitlist entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "waitlist_entries")]
pub struct Model {
    /// Unique identifier for the signup
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name the person signed up with
    pub name: String,
    /// Normalised e-mail address
    #[sea_orm(unique)]
    pub email: String,
    /// One of `"waiting"`, `"invited"`, `"joined"`
    pub status: String,
    /// When the person signed up
    pub created_at: DateTimeUtc,
}

/// Waitlist entries have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for WaitlistEntry {
    type Error = Error;

    fn try_from(model: Model) -> crate::errors::Result<Self> {
        Ok(Self {
            id: model.id,
            name: model.name,
            email: model.email,
            status: model.status.parse()?,
            created_at: model.created_at,
        })
    }
}
