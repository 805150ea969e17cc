use super::AppState;
use super::response::{ApiResult, ok};
use super::validation::{WaitlistQuery, json_body, parse_id, parse_required, query_params};
use crate::core::waitlist::{self, WaitlistCounts};
use crate::models::{WaitlistEntry, WaitlistStatus};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// `POST /waitlist` body.
#[derive(Debug, Default, Deserialize)]
pub struct Signup {
    /// Name to sign up with
    #[serde(default)]
    pub name: String,
    /// Contact address, unique on the waitlist
    #[serde(default)]
    pub email: String,
}

/// `PUT /waitlist/:id/status` body.
#[derive(Debug, Default, Deserialize)]
pub struct StatusUpdate {
    /// New queue position
    #[serde(default)]
    pub status: String,
}

/// One page of signups plus per-status counts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistData {
    /// Signups per status, ignoring the filter
    pub counts: WaitlistCounts,
    /// Signups on this page
    pub data: Vec<WaitlistEntry>,
    /// Size of the whole filtered set
    pub total_count: u64,
}

/// Reply to `GET /waitlist-count`.
#[derive(Debug, Serialize)]
pub struct WaitlistCount {
    /// Every signup
    pub count: u64,
}

/// Reply to a delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    /// Id of the removed signup
    pub id: i64,
}

/// Adds a signup in the `waiting` state.
pub async fn join(
    State(state): State<AppState>,
    payload: Result<Json<Signup>, JsonRejection>,
) -> ApiResult<WaitlistEntry> {
    let signup = json_body(payload)?;
    let entry = waitlist::add_entry(&state.db, &signup.name, &signup.email, Utc::now()).await?;
    Ok(ok(entry))
}

/// Paginated signups, optionally filtered by status.
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<WaitlistQuery>, QueryRejection>,
) -> ApiResult<WaitlistData> {
    let query = query_params(query)?;
    let (status, request) = query.parse(state.config.pagination.default_page_size)?;
    let counts = waitlist::counts_by_status(&state.db).await?;
    let page = waitlist::list_entries(&state.db, status, request).await?;
    Ok(ok(WaitlistData {
        counts,
        data: page.items,
        total_count: page.total_count,
    }))
}

/// Total number of signups.
pub async fn count(State(state): State<AppState>) -> ApiResult<WaitlistCount> {
    let count = waitlist::count_entries(&state.db).await?;
    Ok(ok(WaitlistCount { count }))
}

/// Moves a signup to another queue position.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<WaitlistEntry> {
    let id = parse_id("id", &id)?;
    let body = json_body(payload)?;
    let status = parse_required("status", &body.status, WaitlistStatus::ALL)?;
    Ok(ok(waitlist::update_status(&state.db, id, status).await?))
}

/// Deletes a signup.
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Deleted> {
    let id = parse_id("id", &id)?;
    waitlist::delete_entry(&state.db, id).await?;
    Ok(ok(Deleted { id }))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{call, state_with};
    use crate::errors::Result;
    use crate::test_utils::RecordingMailer;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_signup_list_and_count() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;

        for (name, email) in [("Rahul", "rahul@example.com"), ("Sneha", "sneha@example.com")] {
            let (status, body) = call(
                &state,
                "POST",
                "/waitlist",
                Some(json!({ "name": name, "email": email })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["response"]["status"], "waiting");
        }

        let (status, body) = call(
            &state,
            "POST",
            "/waitlist",
            Some(json!({ "name": "Rahul again", "email": "RAHUL@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        let (_, body) = call(&state, "GET", "/waitlist-count", None).await;
        assert_eq!(body["response"]["count"], 2);

        let (_, body) = call(&state, "GET", "/waitlist-data?pageSize=1", None).await;
        assert_eq!(body["response"]["totalCount"], 2);
        assert_eq!(body["response"]["counts"]["waiting"], 2);
        assert_eq!(body["response"]["data"].as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_signup_validation() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;
        let (status, body) = call(
            &state,
            "POST",
            "/waitlist",
            Some(json!({ "name": " ", "email": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"].as_array().map(Vec::len), Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_query_string_uses_envelope() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;
        let (status, body) = call(&state, "GET", "/waitlist-data?page=1&page=2", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        Ok(())
    }

    #[tokio::test]
    async fn test_status_update_and_delete() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;
        let (_, body) = call(
            &state,
            "POST",
            "/waitlist",
            Some(json!({ "name": "Vikram", "email": "vikram@example.com" })),
        )
        .await;
        let id = body["response"]["id"].as_i64().unwrap_or_default();

        let (status, body) = call(
            &state,
            "PUT",
            &format!("/waitlist/{id}/status"),
            Some(json!({ "status": "invited" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["status"], "invited");

        let (_, body) = call(&state, "GET", "/waitlist-data?status=invited", None).await;
        assert_eq!(body["response"]["totalCount"], 1);

        let (status, _) = call(&state, "DELETE", &format!("/waitlist/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&state, "DELETE", &format!("/waitlist/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }
}
