//! Curated date entity - An admin-arranged date between two users.
//!
//! Both participants are flattened into `user1_*` and `user2_*` columns. The
//! venue and genie are optional groups of columns that are only present for
//! offline dates. Feedback lives in its own table (see [`super::date_feedback`]).

use crate::errors::Error;
use crate::models::{
    CuratedDateRecord, DateFeedback, DateLocation, Genie, Participant, ParticipantFeedback,
    ParticipantSlot,
};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Curated date database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "curated_dates")]
pub struct Model {
    /// Unique identifier for the date
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public reference shown to admins, e.g. `DATE000042`
    #[sea_orm(unique)]
    pub date_ref: String,
    /// First participant's user id
    pub user1_id: String,
    /// First participant's first name
    pub user1_first_name: String,
    /// First participant's last name
    pub user1_last_name: String,
    /// First participant's e-mail
    pub user1_email: String,
    /// First participant's age
    pub user1_age: i32,
    /// First participant's city, used by the city filter
    pub user1_city: String,
    /// Second participant's user id
    pub user2_id: String,
    /// Second participant's first name
    pub user2_first_name: String,
    /// Second participant's last name
    pub user2_last_name: String,
    /// Second participant's e-mail
    pub user2_email: String,
    /// Second participant's age
    pub user2_age: i32,
    /// Second participant's city
    pub user2_city: String,
    /// `"online"` or `"offline"`
    pub date_type: String,
    /// When the date takes place
    pub scheduled_at: DateTimeUtc,
    /// One of `"scheduled"`, `"ongoing"`, `"completed"`, `"cancelled"`, `"no_show"`
    pub status: String,
    /// Venue name
    pub location_name: Option<String>,
    /// Venue street address
    pub location_address: Option<String>,
    /// Venue city
    pub location_city: Option<String>,
    /// Accompanying genie's id
    pub genie_id: Option<String>,
    /// Accompanying genie's name
    pub genie_name: Option<String>,
    /// Accompanying genie's e-mail
    pub genie_email: Option<String>,
    /// Compatibility score, 0 to 100
    pub match_score: i32,
    /// When the date was arranged
    pub created_at: DateTimeUtc,
    /// Admin who arranged the date
    pub created_by: String,
    /// Last admin change
    pub last_updated_at: DateTimeUtc,
    /// Only set while the date is cancelled
    pub cancellation_reason: Option<String>,
    /// Free-form admin note
    pub notes: Option<String>,
}

/// Defines relationships between a curated date and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One date has up to two feedback rows
    #[sea_orm(has_many = "super::date_feedback::Entity")]
    Feedback,
}

impl Related<super::date_feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedback.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn small_int<T: TryFrom<i32>>(value: i32, column: &str) -> crate::errors::Result<T> {
    T::try_from(value).map_err(|_| Error::CorruptRecord {
        message: format!("{column} out of range: {value}"),
    })
}

impl Model {
    /// Joins the row with its feedback rows into a domain record.
    ///
    /// # Arguments
    /// * `feedback` - Feedback rows belonging to this date, in any order
    pub fn into_record(
        self,
        feedback: Vec<super::date_feedback::Model>,
    ) -> crate::errors::Result<CuratedDateRecord> {
        let feedback = collect_feedback(feedback)?;

        let location = match (self.location_name, self.location_address, self.location_city) {
            (Some(name), Some(address), Some(city)) => Some(DateLocation {
                name,
                address,
                city,
            }),
            _ => None,
        };
        let genie = match (self.genie_id, self.genie_name, self.genie_email) {
            (Some(id), Some(name), Some(email)) => Some(Genie { id, name, email }),
            _ => None,
        };

        Ok(CuratedDateRecord {
            id: self.id,
            date_ref: self.date_ref,
            user1: Participant {
                id: self.user1_id,
                first_name: self.user1_first_name,
                last_name: self.user1_last_name,
                email: self.user1_email,
                age: small_int(self.user1_age, "user1_age")?,
                city: self.user1_city,
            },
            user2: Participant {
                id: self.user2_id,
                first_name: self.user2_first_name,
                last_name: self.user2_last_name,
                email: self.user2_email,
                age: small_int(self.user2_age, "user2_age")?,
                city: self.user2_city,
            },
            date_type: self.date_type.parse()?,
            scheduled_at: self.scheduled_at,
            status: self.status.parse()?,
            location,
            genie,
            feedback,
            match_score: small_int(self.match_score, "match_score")?,
            created_at: self.created_at,
            created_by: self.created_by,
            last_updated_at: self.last_updated_at,
            cancellation_reason: self.cancellation_reason,
            notes: self.notes,
        })
    }
}

fn collect_feedback(
    rows: Vec<super::date_feedback::Model>,
) -> crate::errors::Result<Option<DateFeedback>> {
    let mut feedback = DateFeedback::default();
    for row in rows {
        let entry = ParticipantFeedback {
            rating: small_int(row.rating, "rating")?,
            interested: row.interested,
            comments: row.comments,
            submitted_at: row.submitted_at,
        };
        match row.participant.parse()? {
            ParticipantSlot::User1 => feedback.user1 = Some(entry),
            ParticipantSlot::User2 => feedback.user2 = Some(entry),
        }
    }
    Ok((!feedback.is_empty()).then_some(feedback))
}

impl From<&CuratedDateRecord> for ActiveModel {
    fn from(record: &CuratedDateRecord) -> Self {
        let location = record.location.as_ref();
        let genie = record.genie.as_ref();
        Self {
            id: Set(record.id),
            date_ref: Set(record.date_ref.clone()),
            user1_id: Set(record.user1.id.clone()),
            user1_first_name: Set(record.user1.first_name.clone()),
            user1_last_name: Set(record.user1.last_name.clone()),
            user1_email: Set(record.user1.email.clone()),
            user1_age: Set(i32::from(record.user1.age)),
            user1_city: Set(record.user1.city.clone()),
            user2_id: Set(record.user2.id.clone()),
            user2_first_name: Set(record.user2.first_name.clone()),
            user2_last_name: Set(record.user2.last_name.clone()),
            user2_email: Set(record.user2.email.clone()),
            user2_age: Set(i32::from(record.user2.age)),
            user2_city: Set(record.user2.city.clone()),
            date_type: Set(record.date_type.to_string()),
            scheduled_at: Set(record.scheduled_at),
            status: Set(record.status.to_string()),
            location_name: Set(location.map(|l| l.name.clone())),
            location_address: Set(location.map(|l| l.address.clone())),
            location_city: Set(location.map(|l| l.city.clone())),
            genie_id: Set(genie.map(|g| g.id.clone())),
            genie_name: Set(genie.map(|g| g.name.clone())),
            genie_email: Set(genie.map(|g| g.email.clone())),
            match_score: Set(i32::from(record.match_score)),
            created_at: Set(record.created_at),
            created_by: Set(record.created_by.clone()),
            last_updated_at: Set(record.last_updated_at),
            cancellation_reason: Set(record.cancellation_reason.clone()),
            notes: Set(record.notes.clone()),
        }
    }
}
