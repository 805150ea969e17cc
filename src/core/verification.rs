//! E-mail verification codes.
//!
//! Codes are six random digits, stored with an expiry and redeemable once.
//! Issuing a new code for an address retires every earlier unused one, and a
//! code is retired after [`MAX_ATTEMPTS`] wrong guesses.

use crate::{
    core::normalize_email,
    entities::{VerificationCode, verification_code},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument, warn};

/// Number of digits in a code.
pub const CODE_LENGTH: usize = 6;

/// Wrong guesses allowed before a code stops working.
pub const MAX_ATTEMPTS: i32 = 5;

/// Draws a zero-padded six digit code.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:06}", rng.gen_range(0..1_000_000))
}

fn validate_code(code: &str) -> Result<&str> {
    let code = code.trim();
    if code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(code)
    } else {
        Err(Error::invalid_field(
            "code",
            "Verification code must be 6 digits",
        ))
    }
}

/// Issues a fresh code for `email` and stores it.
///
/// # Arguments
/// * `db` - Database connection
/// * `email` - Address the code will be mailed to; normalised before storing
/// * `ttl` - How long the code stays valid
/// * `now` - Issue time
///
/// # Returns
/// The stored code row. The caller is responsible for sending it.
#[instrument(skip(db))]
pub async fn issue_code(
    db: &DatabaseConnection,
    email: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<verification_code::Model> {
    let email = normalize_email(email)?;
    let code = generate_code(&mut rand::thread_rng());

    // Retire earlier codes so only the latest one works
    let retired = VerificationCode::update_many()
        .col_expr(verification_code::Column::Consumed, Expr::value(true))
        .filter(verification_code::Column::Email.eq(email.as_str()))
        .filter(verification_code::Column::Consumed.eq(false))
        .exec(db)
        .await?;
    if retired.rows_affected > 0 {
        debug!(retired = retired.rows_affected, "Retired earlier codes");
    }

    let model = verification_code::ActiveModel {
        email: Set(email),
        code: Set(code),
        expires_at: Set(now + ttl),
        consumed: Set(false),
        attempts: Set(0),
        created_at: Set(now),
        ..Default::default()
    };
    let saved = model.insert(db).await?;
    info!(id = saved.id, "Issued verification code");
    Ok(saved)
}

/// Redeems `code` for `email`.
///
/// Only the latest live code for the address is considered. Fails with
/// [`Error::InvalidVerificationCode`] if the code is wrong, expired, already
/// used or out of attempts. A wrong guess counts against the live code; a
/// successful call consumes it.
#[instrument(skip(db, code))]
pub async fn verify_code(
    db: &DatabaseConnection,
    email: &str,
    code: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let email = normalize_email(email)?;
    let code = validate_code(code)?;

    let live = VerificationCode::find()
        .filter(verification_code::Column::Email.eq(email.as_str()))
        .filter(verification_code::Column::Consumed.eq(false))
        .order_by_desc(verification_code::Column::CreatedAt)
        .order_by_desc(verification_code::Column::Id)
        .one(db)
        .await?
        .filter(|c| c.is_redeemable(now))
        .ok_or(Error::InvalidVerificationCode)?;

    if live.code != code {
        record_failed_attempt(db, live.id).await?;
        return Err(Error::InvalidVerificationCode);
    }

    // Conditional update so two concurrent redemptions cannot both succeed
    let consumed = VerificationCode::update_many()
        .col_expr(verification_code::Column::Consumed, Expr::value(true))
        .filter(verification_code::Column::Id.eq(live.id))
        .filter(verification_code::Column::Consumed.eq(false))
        .filter(verification_code::Column::Attempts.lt(MAX_ATTEMPTS))
        .exec(db)
        .await?;
    if consumed.rows_affected == 0 {
        return Err(Error::InvalidVerificationCode);
    }

    info!(id = live.id, "Verification code redeemed");
    Ok(())
}

/// Counts a wrong guess and retires the code once it runs out of attempts.
async fn record_failed_attempt(db: &DatabaseConnection, id: i64) -> Result<()> {
    VerificationCode::update_many()
        .col_expr(
            verification_code::Column::Attempts,
            Expr::col(verification_code::Column::Attempts).add(1),
        )
        .filter(verification_code::Column::Id.eq(id))
        .exec(db)
        .await?;

    let retired = VerificationCode::update_many()
        .col_expr(verification_code::Column::Consumed, Expr::value(true))
        .filter(verification_code::Column::Id.eq(id))
        .filter(verification_code::Column::Consumed.eq(false))
        .filter(verification_code::Column::Attempts.gte(MAX_ATTEMPTS))
        .exec(db)
        .await?;
    if retired.rows_affected > 0 {
        warn!(id, "Verification code retired after too many attempts");
    } else {
        debug!(id, "Wrong verification code");
    }
    Ok(())
}
