//! Date feedback entity - What one participant said after a curated date.
//!
//! Each date has at most one row per participant slot (`"user1"` or `"user2"`).

use crate::models::{CuratedDateRecord, ParticipantFeedback, ParticipantSlot};
use sea_orm::{ActiveValue::NotSet, Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Date feedback database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "date_feedback")]
pub struct Model {
    /// Unique identifier for the feedback row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the curated date this feedback belongs to
    pub date_id: i64,
    /// Which participant answered: `"user1"` or `"user2"`
    pub participant: String,
    /// Rating from 1 to 5
    pub rating: i32,
    /// Whether the participant wants a second date
    pub interested: bool,
    /// Free-form remarks
    pub comments: Option<String>,
    /// When the answer was recorded
    pub submitted_at: DateTimeUtc,
}

/// Defines relationships between feedback and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each feedback row belongs to one curated date
    #[sea_orm(
        belongs_to = "super::curated_date::Entity",
        from = "Column::DateId",
        to = "super::curated_date::Column::Id"
    )]
    CuratedDate,
}

impl Related<super::curated_date::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CuratedDate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Builds the row for one participant's answer.
#[must_use]
pub fn row(date_id: i64, slot: ParticipantSlot, feedback: &ParticipantFeedback) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        date_id: Set(date_id),
        participant: Set(slot.to_string()),
        rating: Set(i32::from(feedback.rating)),
        interested: Set(feedback.interested),
        comments: Set(feedback.comments.clone()),
        submitted_at: Set(feedback.submitted_at),
    }
}

/// Builds the feedback rows to insert for a date, zero to two of them.
#[must_use]
pub fn rows_for(record: &CuratedDateRecord) -> Vec<ActiveModel> {
    let Some(feedback) = &record.feedback else {
        return Vec::new();
    };
    let mut rows = Vec::with_capacity(2);
    if let Some(entry) = &feedback.user1 {
        rows.push(row(record.id, ParticipantSlot::User1, entry));
    }
    if let Some(entry) = &feedback.user2 {
        rows.push(row(record.id, ParticipantSlot::User2, entry));
    }
    rows
}
