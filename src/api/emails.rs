use super::AppState;
use super::response::{ApiResult, ok};
use super::validation::json_body;
use crate::core::verification;
use crate::mail::verification_email;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Reply to a send request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSent {
    /// Normalised address the code went to
    pub email: String,
    /// Last instant the code is accepted
    pub expires_at: DateTime<Utc>,
}

/// `POST /emails/:email/verify-code` body.
#[derive(Debug, Default, Deserialize)]
pub struct CodeAttempt {
    /// The six digits from the e-mail
    #[serde(default)]
    pub code: String,
}

/// Reply to a successful verification.
#[derive(Debug, Serialize)]
pub struct Verified {
    /// Always true; failures are errors
    pub verified: bool,
}

/// Issues a fresh code for `email` and mails it.
///
/// A mail API failure is reported as a server error; the stored code stays
/// valid and is retired by the next request.
pub async fn send_verification_code(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<CodeSent> {
    let ttl_minutes = state.config.mail.code_ttl_minutes;
    let issued = verification::issue_code(
        &state.db,
        &email,
        Duration::minutes(ttl_minutes),
        Utc::now(),
    )
    .await?;

    let message = verification_email(&issued.email, &issued.code, ttl_minutes);
    state.mailer.send(&message).await?;
    info!(id = issued.id, "Verification code sent");

    Ok(ok(CodeSent {
        email: issued.email,
        expires_at: issued.expires_at,
    }))
}

/// Redeems a code for `email`. Wrong guesses count against the live code.
pub async fn verify_code(
    State(state): State<AppState>,
    Path(email): Path<String>,
    payload: Result<Json<CodeAttempt>, JsonRejection>,
) -> ApiResult<Verified> {
    let attempt = json_body(payload)?;
    verification::verify_code(&state.db, &email, &attempt.code, Utc::now()).await?;
    Ok(ok(Verified { verified: true }))
}
