use super::AppState;
use super::response::{ApiResult, ok};
use super::validation::{
    DateQuery, FeedbackBody, MAX_NOTE_LENGTH, NewDateBody, json_body, parse_id, parse_required,
    query_params,
};
use crate::core::dates::DateStats;
use crate::errors::Error;
use crate::models::{CuratedDateRecord, DateStatus};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One page of the curated dates table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateList {
    /// Dates on this page, latest scheduled first
    pub dates: Vec<CuratedDateRecord>,
    /// Size of the whole filtered set
    pub total_count: u64,
}

/// `PUT /admin/date-curation/curated-dates/:id` body.
#[derive(Debug, Default, Deserialize)]
pub struct DateStatusUpdate {
    /// New status
    #[serde(default)]
    pub status: String,
    /// Cancellation reason, kept only when cancelling
    pub reason: Option<String>,
}

/// `PUT /admin/date-curation/curated-dates/:id/notes` body.
#[derive(Debug, Default, Deserialize)]
pub struct NoteUpdate {
    /// Replacement note
    #[serde(default)]
    pub note: String,
}

/// Reply to a delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    /// Id of the removed date
    pub id: i64,
}

/// Filtered, paginated curated dates.
pub async fn list_dates(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<DateList> {
    let query = query_params(query)?;
    let (filters, request) = query.parse(state.config.pagination.default_page_size)?;
    let page = state.dates.list_dates(&filters, request).await?;
    Ok(ok(DateList {
        dates: page.items,
        total_count: page.total_count,
    }))
}

/// Schedules a new date.
pub async fn create_date(
    State(state): State<AppState>,
    payload: Result<Json<NewDateBody>, JsonRejection>,
) -> ApiResult<CuratedDateRecord> {
    let now = Utc::now();
    let new = json_body(payload)?.parse(now)?;
    Ok(ok(state.dates.create_date(new, now).await?))
}

/// One date with its feedback.
pub async fn get_date(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CuratedDateRecord> {
    let id = parse_id("id", &id)?;
    Ok(ok(state.dates.get_date(id).await?))
}

/// Removes a date and its feedback.
pub async fn delete_date(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let id = parse_id("id", &id)?;
    state.dates.delete_date(id).await?;
    Ok(ok(Deleted { id }))
}

/// Records one participant's feedback on a completed date.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<FeedbackBody>, JsonRejection>,
) -> ApiResult<CuratedDateRecord> {
    let id = parse_id("id", &id)?;
    let (slot, entry) = json_body(payload)?.parse(Utc::now())?;
    Ok(ok(state.dates.submit_feedback(id, slot, entry).await?))
}

/// Sets the status of a date. Any status may follow any other.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<DateStatusUpdate>, JsonRejection>,
) -> ApiResult<CuratedDateRecord> {
    let id = parse_id("id", &id)?;
    let body = json_body(payload)?;
    let status = parse_required("status", &body.status, DateStatus::ALL)?;
    let reason = body
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let updated = state
        .dates
        .update_date_status(id, status, reason, Utc::now())
        .await?;
    info!(id, %status, "Curated date status changed");
    Ok(ok(updated))
}

/// Replaces the admin note, trimmed and at most 2000 characters.
pub async fn set_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NoteUpdate>, JsonRejection>,
) -> ApiResult<CuratedDateRecord> {
    let id = parse_id("id", &id)?;
    let note = json_body(payload)?.note.trim().to_string();
    if note.is_empty() {
        return Err(Error::invalid_field("note", "Note is required"));
    }
    if note.chars().count() > MAX_NOTE_LENGTH {
        return Err(Error::invalid_field(
            "note",
            format!("Note must be at most {MAX_NOTE_LENGTH} characters"),
        ));
    }

    let updated = state.dates.set_date_note(id, note, Utc::now()).await?;
    info!(id, "Curated date note saved");
    Ok(ok(updated))
}

/// Dashboard summary over every date.
pub async fn stats(State(state): State<AppState>) -> ApiResult<DateStats> {
    Ok(ok(state.dates.date_stats().await?))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{call, state_with};
    use crate::errors::Result;
    use crate::test_utils::RecordingMailer;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_with_filters() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;

        let (status, body) = call(&state, "GET", "/admin/date-curation/curated-dates", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["totalCount"], 3);
        assert_eq!(body["response"]["dates"][0]["dateRef"], "DATE000003");

        let (_, body) = call(
            &state,
            "GET",
            "/admin/date-curation/curated-dates?hasIssues=true&dateType=all",
            None,
        )
        .await;
        assert_eq!(body["response"]["totalCount"], 1);
        assert_eq!(body["response"]["dates"][0]["status"], "cancelled");

        let (_, body) = call(
            &state,
            "GET",
            "/admin/date-curation/curated-dates?search=emma&city=Bangalore&page=2&pageSize=2",
            None,
        )
        .await;
        assert_eq!(body["response"]["totalCount"], 3);
        assert_eq!(body["response"]["dates"].as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_query_is_rejected() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;
        let (status, body) = call(
            &state,
            "GET",
            "/admin/date-curation/curated-dates?status=postponed&hasIssues=maybe",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"].as_array().map(Vec::len), Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn test_status_update_and_stats() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;

        let (status, body) = call(
            &state,
            "PUT",
            "/admin/date-curation/curated-dates/1",
            Some(json!({ "status": "cancelled", "reason": "Venue closed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["status"], "cancelled");
        assert_eq!(body["response"]["cancellationReason"], "Venue closed");

        let (_, body) = call(&state, "GET", "/admin/date-curation/analytics/overview", None).await;
        assert_eq!(body["response"]["total"], 3);
        assert_eq!(body["response"]["cancelled"], 2);
        assert_eq!(body["response"]["completed"], 1);

        let (status, body) = call(
            &state,
            "PUT",
            "/admin/date-curation/curated-dates/42",
            Some(json!({ "status": "completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = call(
            &state,
            "PUT",
            "/admin/date-curation/curated-dates/abc",
            Some(json!({ "status": "completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_query_string_uses_envelope() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;
        let (status, body) = call(
            &state,
            "GET",
            "/admin/date-curation/curated-dates?status=completed&status=cancelled",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["response"].is_null());
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"][0]["field"], "query");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_get_and_delete() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;
        let scheduled_at = (Utc::now() + Duration::days(5)).to_rfc3339();
        let person = |id: &str, name: &str| {
            json!({
                "id": id,
                "firstName": name,
                "lastName": "Kapoor",
                "email": format!("{}@example.com", name.to_lowercase()),
                "age": 29,
                "city": "Delhi",
            })
        };

        let (status, body) = call(
            &state,
            "POST",
            "/admin/date-curation/curated-dates",
            Some(json!({
                "user1": person("u10", "Kabir"),
                "user2": person("u11", "Meera"),
                "dateType": "offline",
                "scheduledAt": scheduled_at,
                "location": {
                    "name": "Blue Tokai",
                    "address": "Connaught Place",
                    "city": "Delhi",
                },
                "matchScore": 88,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["id"], 4);
        assert_eq!(body["response"]["dateRef"], "DATE000004");
        assert_eq!(body["response"]["status"], "scheduled");

        let (status, body) = call(&state, "GET", "/admin/date-curation/curated-dates/4", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["user2"]["firstName"], "Meera");
        assert_eq!(body["response"]["location"]["name"], "Blue Tokai");

        let (status, body) = call(
            &state,
            "POST",
            "/admin/date-curation/curated-dates",
            Some(json!({
                "user1": person("u10", "Kabir"),
                "user2": person("u10", "Kabir"),
                "dateType": "offline",
                "scheduledAt": scheduled_at,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"].as_array().map(Vec::len), Some(2));

        let (status, body) = call(&state, "DELETE", "/admin/date-curation/curated-dates/4", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["id"], 4);
        let (status, _) = call(&state, "GET", "/admin/date-curation/curated-dates/4", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_feedback() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;
        let feedback = |participant: &str, rating: i64| {
            json!({ "participant": participant, "rating": rating, "interested": true })
        };

        let (status, body) = call(
            &state,
            "POST",
            "/admin/date-curation/dates/2/submit-feedback",
            Some(feedback("user1", 4)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["feedback"]["user1"]["rating"], 4);

        let (_, body) = call(&state, "GET", "/admin/date-curation/analytics/overview", None).await;
        assert_eq!(body["response"]["averageRating"], 4.0);
        assert_eq!(body["response"]["successRate"], 100);

        let (status, body) = call(
            &state,
            "POST",
            "/admin/date-curation/dates/2/submit-feedback",
            Some(feedback("user1", 5)),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        // Scheduled dates take no feedback yet
        let (status, _) = call(
            &state,
            "POST",
            "/admin/date-curation/dates/1/submit-feedback",
            Some(feedback("user2", 5)),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = call(
            &state,
            "POST",
            "/admin/date-curation/dates/2/submit-feedback",
            Some(feedback("user2", 0)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"][0]["field"], "rating");
        Ok(())
    }

    #[tokio::test]
    async fn test_notes() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;

        let (status, body) = call(
            &state,
            "PUT",
            "/admin/date-curation/curated-dates/2/notes",
            Some(json!({ "note": "  Both want a second date  " })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["notes"], "Both want a second date");

        let (status, body) = call(
            &state,
            "PUT",
            "/admin/date-curation/curated-dates/2/notes",
            Some(json!({ "note": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"][0]["field"], "note");
        Ok(())
    }
}
