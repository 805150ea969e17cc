//! Domain records shared by the data sources, the analytics core and the API.
//!
//! These are the framework-agnostic shapes of a transaction and a curated date.
//! Database rows (see [`crate::entities`]) are converted into these before any
//! filtering or aggregation happens, so the mock and database sources feed the
//! exact same logic.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Declares a closed set of lowercase string values with parsing and display.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire/database representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(Error::CorruptRecord {
                        message: format!("unknown {} value '{other}'", stringify!($name)),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// What a transaction was for.
    TransactionType {
        /// Love token purchase
        Purchase => "purchase",
        /// Money returned to the user
        Refund => "refund",
        /// Premium subscription charge
        Subscription => "subscription",
        /// Referral or promotional credit
        Bonus => "bonus",
    }
}

string_enum! {
    /// Lifecycle state of a payment.
    TransactionStatus {
        /// Awaiting the payment provider
        Pending => "pending",
        /// Paid
        Completed => "completed",
        /// Declined or abandoned
        Failed => "failed",
        /// Paid and returned
        Refunded => "refunded",
    }
}

string_enum! {
    /// How the user paid.
    PaymentMethod {
        /// Debit or credit card
        Card => "card",
        /// UPI transfer
        Upi => "upi",
        /// Net banking
        Netbanking => "netbanking",
        /// Wallet balance
        Wallet => "wallet",
    }
}

string_enum! {
    /// Lifecycle state of a curated date. Admins may set any value at any time.
    DateStatus {
        /// Arranged, not started
        Scheduled => "scheduled",
        /// Happening now
        Ongoing => "ongoing",
        /// Took place
        Completed => "completed",
        /// Called off
        Cancelled => "cancelled",
        /// One side did not turn up
        NoShow => "no_show",
    }
}

string_enum! {
    /// Whether the date happens over video or in person.
    DateType {
        /// Video call
        Online => "online",
        /// In person
        Offline => "offline",
    }
}

string_enum! {
    /// Which side of a curated date a participant is on.
    ParticipantSlot {
        /// First participant
        User1 => "user1",
        /// Second participant
        User2 => "user2",
    }
}

string_enum! {
    /// Position of a signup in the pre-launch queue.
    WaitlistStatus {
        /// In the queue
        Waiting => "waiting",
        /// Invite sent
        Invited => "invited",
        /// Signed up for the app
        Joined => "joined",
    }
}

impl TransactionStatus {
    /// Returns true if a payment in `self` may move to `next`.
    ///
    /// Only `pending → completed`, `pending → failed` and `completed → refunded`
    /// are allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed | Self::Failed) | (Self::Completed, Self::Refunded)
        )
    }
}

/// A payment made by a platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Database id
    pub id: i64,
    /// Public reference such as `TXN00000042`
    pub transaction_ref: String,
    /// Paying user
    pub user_id: String,
    /// Paying user name
    pub user_name: String,
    /// Paying user address
    pub user_email: String,
    /// What was bought
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Signed amount in whole currency units; refunds are negative
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Lifecycle state
    pub status: TransactionStatus,
    /// How it was paid
    pub payment_method: PaymentMethod,
    /// Human readable line item
    pub description: String,
    /// Tokens granted by a purchase
    pub love_tokens: Option<i64>,
    /// Promo code applied at checkout
    pub promo_code: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// When it was paid
    pub completed_at: Option<DateTime<Utc>>,
    /// When it was refunded
    pub refunded_at: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    /// Completed, money-in transactions are the only ones that count as revenue.
    #[must_use]
    pub fn is_revenue(&self) -> bool {
        self.status == TransactionStatus::Completed && self.amount > 0
    }

    /// Moves the record to `next`, stamping the matching timestamp.
    pub fn transition_to(&mut self, next: TransactionStatus, at: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        match next {
            TransactionStatus::Completed => self.completed_at = Some(at),
            TransactionStatus::Refunded => self.refunded_at = Some(at),
            TransactionStatus::Pending | TransactionStatus::Failed => {}
        }
        self.status = next;
        Ok(())
    }
}

/// One of the two people on a curated date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Platform user id
    pub id: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Contact address
    pub email: String,
    /// Age in years
    pub age: u8,
    /// Home city
    pub city: String,
}

/// Venue for an offline date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateLocation {
    /// Venue name
    pub name: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
}

/// Staff member accompanying an offline date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genie {
    /// Staff id
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact address
    pub email: String,
}

/// What one participant said after the date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantFeedback {
    /// 1 to 5
    pub rating: u8,
    /// Wants to meet again
    pub interested: bool,
    /// Free-form remarks
    pub comments: Option<String>,
    /// When the feedback came in
    pub submitted_at: DateTime<Utc>,
}

/// Post-date feedback; either side may not have answered yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFeedback {
    /// First participant's answer
    pub user1: Option<ParticipantFeedback>,
    /// Second participant's answer
    pub user2: Option<ParticipantFeedback>,
}

impl DateFeedback {
    /// Iterates over whichever feedback entries exist.
    pub fn entries(&self) -> impl Iterator<Item = &ParticipantFeedback> {
        self.user1.iter().chain(self.user2.iter())
    }

    /// At least one participant wants to see the other again.
    #[must_use]
    pub fn anyone_interested(&self) -> bool {
        self.entries().any(|f| f.interested)
    }

    /// True if there is no feedback at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.user1.is_none() && self.user2.is_none()
    }
}

/// Everything an admin supplies when arranging a new date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCuratedDate {
    /// First participant
    pub user1: Participant,
    /// Second participant, never the same user as `user1`
    pub user2: Participant,
    /// Online or offline
    pub date_type: DateType,
    /// When the date takes place
    pub scheduled_at: DateTime<Utc>,
    /// Venue, present for offline dates
    pub location: Option<DateLocation>,
    /// Accompanying staff member
    pub genie: Option<Genie>,
    /// Compatibility score, 0 to 100
    pub match_score: u8,
    /// Admin who arranged the date
    pub created_by: String,
    /// Free-form admin note
    pub notes: Option<String>,
}

/// An admin-arranged date between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuratedDateRecord {
    /// Database id
    pub id: i64,
    /// Public reference such as `DATE000042`
    pub date_ref: String,
    /// First participant
    pub user1: Participant,
    /// Second participant
    pub user2: Participant,
    /// Online or offline
    pub date_type: DateType,
    /// When the date takes place
    pub scheduled_at: DateTime<Utc>,
    /// Lifecycle state
    pub status: DateStatus,
    /// Venue for offline dates
    pub location: Option<DateLocation>,
    /// Accompanying staff member
    pub genie: Option<Genie>,
    /// Post-date feedback
    pub feedback: Option<DateFeedback>,
    /// Opaque compatibility score, 0 to 100
    pub match_score: u8,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Admin who arranged the date
    pub created_by: String,
    /// Last change of any kind
    pub last_updated_at: DateTime<Utc>,
    /// Why the date was called off
    pub cancellation_reason: Option<String>,
    /// Admin note
    pub notes: Option<String>,
}

impl CuratedDateRecord {
    /// Builds a freshly scheduled date with reference `DATE{id:06}`.
    #[must_use]
    pub fn schedule(id: i64, new: NewCuratedDate, at: DateTime<Utc>) -> Self {
        Self {
            id,
            date_ref: format!("DATE{id:06}"),
            user1: new.user1,
            user2: new.user2,
            date_type: new.date_type,
            scheduled_at: new.scheduled_at,
            status: DateStatus::Scheduled,
            location: new.location,
            genie: new.genie,
            feedback: None,
            match_score: new.match_score,
            created_at: at,
            created_by: new.created_by,
            last_updated_at: at,
            cancellation_reason: None,
            notes: new.notes,
        }
    }

    /// Records what one participant said about the date.
    ///
    /// Only completed dates take feedback, and each participant answers once.
    pub fn add_feedback(&mut self, slot: ParticipantSlot, entry: ParticipantFeedback) -> Result<()> {
        if self.status != DateStatus::Completed {
            return Err(Error::InvalidState {
                message: format!(
                    "Feedback can only be submitted for completed dates, {} is {}",
                    self.date_ref, self.status
                ),
            });
        }
        let feedback = self.feedback.get_or_insert_with(DateFeedback::default);
        let answer = match slot {
            ParticipantSlot::User1 => &mut feedback.user1,
            ParticipantSlot::User2 => &mut feedback.user2,
        };
        if answer.is_some() {
            return Err(Error::AlreadyExists {
                entity: "Feedback",
                key: format!("{} {slot}", self.date_ref),
            });
        }
        self.last_updated_at = entry.submitted_at;
        *answer = Some(entry);
        Ok(())
    }

    /// Applies an admin status change. No transition is forbidden.
    pub fn set_status(&mut self, status: DateStatus, reason: Option<String>, at: DateTime<Utc>) {
        self.status = status;
        self.cancellation_reason = if status == DateStatus::Cancelled {
            reason
        } else {
            None
        };
        self.last_updated_at = at;
    }

    /// Replaces the admin note.
    pub fn set_note(&mut self, note: String, at: DateTime<Utc>) {
        self.notes = Some(note);
        self.last_updated_at = at;
    }

    /// Cancelled, no-show, or somebody rated it below 3.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        matches!(self.status, DateStatus::Cancelled | DateStatus::NoShow)
            || self
                .feedback
                .as_ref()
                .is_some_and(|f| f.entries().any(|e| e.rating < 3))
    }
}

/// A pre-launch signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    /// Database id
    pub id: i64,
    /// Name given at signup
    pub name: String,
    /// Contact address, unique ignoring case
    pub email: String,
    /// Queue position
    pub status: WaitlistStatus,
    /// Signup time
    pub created_at: DateTime<Utc>,
}
