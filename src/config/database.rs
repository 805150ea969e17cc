//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs.

use crate::entities::{CuratedDate, DateFeedback, Transaction, VerificationCode, WaitlistEntry};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::info;

/// Default location of the `SQLite` file when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://datifyy_admin.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to [`DEFAULT_DATABASE_URL`] if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    info!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates every table that does not exist yet.
///
/// Safe to call on every startup.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = [
        schema.create_table_from_entity(Transaction),
        schema.create_table_from_entity(CuratedDate),
        schema.create_table_from_entity(DateFeedback),
        schema.create_table_from_entity(WaitlistEntry),
        schema.create_table_from_entity(VerificationCode),
    ];

    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(builder.build(&*statement)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        CuratedDateModel, DateFeedbackModel, TransactionModel, VerificationCodeModel,
        WaitlistEntryModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<TransactionModel> = Transaction::find().limit(1).all(&db).await?;
        let _: Vec<CuratedDateModel> = CuratedDate::find().limit(1).all(&db).await?;
        let _: Vec<DateFeedbackModel> = DateFeedback::find().limit(1).all(&db).await?;
        let _: Vec<WaitlistEntryModel> = WaitlistEntry::find().limit(1).all(&db).await?;
        let _: Vec<VerificationCodeModel> = VerificationCode::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
