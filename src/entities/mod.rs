//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

/// Admin-arranged dates
pub mod curated_date;
/// Per-participant feedback rows
pub mod date_feedback;
/// Payments
pub mod transaction;
/// E-mail verification codes
pub mod verification_code;
/// Pre-launch signups
pub mod waitlist_entry;

// Re-export specific types to avoid conflicts
pub use curated_date::{
    Column as CuratedDateColumn, Entity as CuratedDate, Model as CuratedDateModel,
};
pub use date_feedback::{
    Column as DateFeedbackColumn, Entity as DateFeedback, Model as DateFeedbackModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use verification_code::{
    Column as VerificationCodeColumn, Entity as VerificationCode, Model as VerificationCodeModel,
};
pub use waitlist_entry::{
    Column as WaitlistEntryColumn, Entity as WaitlistEntry, Model as WaitlistEntryModel,
};
