//! Waitlist business logic - pre-launch signup CRUD.
//!
//! All functions are async and return Result types for error handling.

use crate::{
    core::{
        normalize_email,
        pagination::{Page, PageRequest},
    },
    entities::{WaitlistEntry as WaitlistTable, waitlist_entry},
    errors::{Error, FieldError, Result},
    models::{WaitlistEntry, WaitlistStatus},
};
use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Set, SqlErr, prelude::*};
use serde::Serialize;
use tracing::{info, instrument};

/// Longest accepted display name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Number of signups per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistCounts {
    /// Every signup
    pub total: u64,
    /// Still queued
    pub waiting: u64,
    /// Invite sent
    pub invited: u64,
    /// Signed up for the app
    pub joined: u64,
}

fn validate_signup(name: &str, email: &str) -> Result<(String, String)> {
    let mut errors = Vec::new();

    let name = name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.push(FieldError::new(
            "name",
            format!("Name must be at most {MAX_NAME_LENGTH} characters"),
        ));
    }

    let email = match normalize_email(email) {
        Ok(email) => Some(email),
        Err(Error::Validation { errors: mut e }) => {
            errors.append(&mut e);
            None
        }
        Err(other) => return Err(other),
    };

    match email {
        Some(email) if errors.is_empty() => Ok((name.to_string(), email)),
        _ => Err(Error::Validation { errors }),
    }
}

/// Adds a signup in the `waiting` state.
///
/// # Arguments
/// * `db` - Database connection
/// * `name` - Display name, trimmed
/// * `email` - E-mail address, normalised; must not already be on the list
/// * `now` - Signup time
///
/// # Returns
/// The stored entry, or [`Error::AlreadyExists`] for a duplicate address
#[instrument(skip(db))]
pub async fn add_entry(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    now: DateTime<Utc>,
) -> Result<WaitlistEntry> {
    let (name, email) = validate_signup(name, email)?;

    let entry = waitlist_entry::ActiveModel {
        name: Set(name),
        email: Set(email.clone()),
        status: Set(WaitlistStatus::Waiting.to_string()),
        created_at: Set(now),
        ..Default::default()
    };

    let saved = entry.insert(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::AlreadyExists {
            entity: "Waitlist entry",
            key: email,
        },
        _ => Error::Database(e),
    })?;

    info!(id = saved.id, "Added waitlist entry");
    saved.try_into()
}

/// Lists signups newest first, optionally restricted to one status.
pub async fn list_entries(
    db: &DatabaseConnection,
    status: Option<WaitlistStatus>,
    request: PageRequest,
) -> Result<Page<WaitlistEntry>> {
    let mut query = WaitlistTable::find()
        .order_by_desc(waitlist_entry::Column::CreatedAt)
        .order_by_desc(waitlist_entry::Column::Id);
    if let Some(status) = status {
        query = query.filter(waitlist_entry::Column::Status.eq(status.as_str()));
    }

    let paginator = query.paginate(db, u64::from(request.page_size.max(1)));
    let total_count = paginator.num_items().await?;
    let rows = paginator
        .fetch_page(u64::from(request.page.max(1) - 1))
        .await?;

    let items = rows
        .into_iter()
        .map(WaitlistEntry::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(Page { items, total_count })
}

/// Total number of signups.
pub async fn count_entries(db: &DatabaseConnection) -> Result<u64> {
    WaitlistTable::find().count(db).await.map_err(Into::into)
}

/// Number of signups in each status.
pub async fn counts_by_status(db: &DatabaseConnection) -> Result<WaitlistCounts> {
    let mut counts = WaitlistCounts::default();
    for &status in WaitlistStatus::ALL {
        let n = WaitlistTable::find()
            .filter(waitlist_entry::Column::Status.eq(status.as_str()))
            .count(db)
            .await?;
        match status {
            WaitlistStatus::Waiting => counts.waiting = n,
            WaitlistStatus::Invited => counts.invited = n,
            WaitlistStatus::Joined => counts.joined = n,
        }
        counts.total += n;
    }
    Ok(counts)
}

/// Moves a signup to `status`. Any status may follow any other.
#[instrument(skip(db))]
pub async fn update_status(
    db: &DatabaseConnection,
    id: i64,
    status: WaitlistStatus,
) -> Result<WaitlistEntry> {
    let existing = WaitlistTable::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "Waitlist entry",
            id: id.to_string(),
        })?;

    let mut entry: waitlist_entry::ActiveModel = existing.into();
    entry.status = Set(status.to_string());
    let updated = entry.update(db).await?;

    info!(id, %status, "Updated waitlist entry");
    updated.try_into()
}

/// Removes a signup.
#[instrument(skip(db))]
pub async fn delete_entry(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = WaitlistTable::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Waitlist entry",
            id: id.to_string(),
        });
    }
    info!(id, "Deleted waitlist entry");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use chrono::Duration;

    #[tokio::test]
    async fn test_add_and_list_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        add_entry(&db, "Rahul", "rahul@example.com", now).await?;
        add_entry(&db, "Priya", "priya@example.com", now + Duration::minutes(1)).await?;
        add_entry(&db, "Amit", "amit@example.com", now + Duration::minutes(2)).await?;

        let page = list_entries(&db, None, PageRequest::new(1, 2)).await?;
        assert_eq!(page.total_count, 3);
        let names: Vec<&str> = page.items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Amit", "Priya"]);

        let rest = list_entries(&db, None, PageRequest::new(2, 2)).await?;
        assert_eq!(rest.items.len(), 1);
        assert_eq!(rest.items[0].status, WaitlistStatus::Waiting);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        add_entry(&db, "Rahul", "rahul@example.com", now).await?;

        let result = add_entry(&db, "Rahul again", " RAHUL@example.com ", now).await;
        assert!(matches!(result, Err(Error::AlreadyExists { .. })));
        assert_eq!(count_entries(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_signup_reports_every_field() -> Result<()> {
        let db = setup_test_db().await?;
        let result = add_entry(&db, "  ", "nope", Utc::now()).await;
        match result {
            Err(Error::Validation { errors }) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_status_counts_and_updates() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        let a = add_entry(&db, "A", "a@example.com", now).await?;
        add_entry(&db, "B", "b@example.com", now).await?;

        let invited = update_status(&db, a.id, WaitlistStatus::Invited).await?;
        assert_eq!(invited.status, WaitlistStatus::Invited);

        let counts = counts_by_status(&db).await?;
        assert_eq!(
            counts,
            WaitlistCounts {
                total: 2,
                waiting: 1,
                invited: 1,
                joined: 0
            }
        );

        let only_invited =
            list_entries(&db, Some(WaitlistStatus::Invited), PageRequest::default()).await?;
        assert_eq!(only_invited.total_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_entry_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let update = update_status(&db, 99, WaitlistStatus::Joined).await;
        assert!(matches!(update, Err(Error::NotFound { .. })));

        let delete = delete_entry(&db, 99).await;
        assert!(matches!(delete, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_entry() -> Result<()> {
        let db = setup_test_db().await?;
        let entry = add_entry(&db, "A", "a@example.com", Utc::now()).await?;
        delete_entry(&db, entry.id).await?;
        assert_eq!(count_entries(&db).await?, 0);
        Ok(())
    }
}
