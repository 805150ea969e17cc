use super::AppState;
use super::response::{ApiResult, ok};
use super::validation::{
    CountQuery, TransactionQuery, Validator, json_body, parse_id, parse_required, query_params,
};
use crate::core::revenue::{
    DEFAULT_TOP_USERS, DEFAULT_TREND_DAYS, PaymentMethodStats, RevenueByCategory,
    RevenueByPeriod, RevenueMetrics, SubscriptionMetrics, TopUser,
};
use crate::models::{TransactionRecord, TransactionStatus};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One page of the transaction table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionList {
    /// Transactions on this page, newest first
    pub transactions: Vec<TransactionRecord>,
    /// Size of the whole filtered set
    pub total_count: u64,
}

/// `PUT /admin/revenue/transactions/:id/status` body.
#[derive(Debug, Default, Deserialize)]
pub struct StatusUpdate {
    /// Requested status
    #[serde(default)]
    pub status: String,
}

/// Filtered, paginated transactions.
pub async fn list_transactions(
    State(state): State<AppState>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> ApiResult<TransactionList> {
    let query = query_params(query)?;
    let (filters, request) = query.parse(state.config.pagination.default_page_size)?;
    let page = state.revenue.list_transactions(&filters, request).await?;
    Ok(ok(TransactionList {
        transactions: page.items,
        total_count: page.total_count,
    }))
}

/// Headline revenue numbers.
pub async fn overview(State(state): State<AppState>) -> ApiResult<RevenueMetrics> {
    Ok(ok(state.revenue.overview(Utc::now()).await?))
}

/// Per-day revenue for the last `days` (default 30) days.
pub async fn trends(
    State(state): State<AppState>,
    query: Result<Query<CountQuery>, QueryRejection>,
) -> ApiResult<Vec<RevenueByPeriod>> {
    let query = query_params(query)?;
    let mut v = Validator::default();
    let days = v.bounded(
        "days",
        query.days.as_deref(),
        1..=365,
        DEFAULT_TREND_DAYS,
        "Days must be between 1 and 365",
    );
    let days = v.finish(days)?;
    Ok(ok(state.revenue.revenue_trends(days, Utc::now()).await?))
}

/// Revenue split by transaction type.
pub async fn by_category(State(state): State<AppState>) -> ApiResult<Vec<RevenueByCategory>> {
    Ok(ok(state.revenue.revenue_by_category().await?))
}

/// Biggest spenders, `limit` (default 10) of them.
pub async fn top_users(
    State(state): State<AppState>,
    query: Result<Query<CountQuery>, QueryRejection>,
) -> ApiResult<Vec<TopUser>> {
    let query = query_params(query)?;
    let mut v = Validator::default();
    let limit = v.bounded(
        "limit",
        query.limit.as_deref(),
        1..=100,
        DEFAULT_TOP_USERS,
        "Limit must be between 1 and 100",
    );
    let limit = v.finish(limit)?;
    Ok(ok(state.revenue.top_users(limit as usize).await?))
}

/// Usage and success rate per payment method.
pub async fn payment_methods(State(state): State<AppState>) -> ApiResult<Vec<PaymentMethodStats>> {
    Ok(ok(state.revenue.payment_methods().await?))
}

/// Subscription counts, churn and recurring revenue.
pub async fn subscriptions(State(state): State<AppState>) -> ApiResult<SubscriptionMetrics> {
    let price = state.config.subscriptions.monthly_price;
    Ok(ok(state.revenue.subscriptions(Utc::now(), price).await?))
}

/// Applies a lifecycle transition to one transaction.
pub async fn update_transaction_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<TransactionRecord> {
    let id = parse_id("id", &id)?;
    let body = json_body(payload)?;
    let status = parse_required("status", &body.status, TransactionStatus::ALL)?;

    let updated = state
        .revenue
        .update_transaction_status(id, status, Utc::now())
        .await?;
    info!(id, %status, "Transaction status changed");
    Ok(ok(updated))
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
    async fn test_list_transactions_envelope() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;
        let (status, body) = call(
            &state,
            "GET",
            "/admin/revenue/transactions?status=completed&pageSize=2",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["error"].is_null());
        assert_eq!(body["response"]["totalCount"], 3);
        assert_eq!(body["response"]["transactions"].as_array().map(Vec::len), Some(2));
        // Newest first
        assert_eq!(body["response"]["transactions"][0]["id"], 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_query_is_400_with_details() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;
        let (status, body) = call(
            &state,
            "GET",
            "/admin/revenue/transactions?page=0&paymentMethod=cash",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["response"].is_null());
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        let details = body["error"]["details"].as_array().cloned().unwrap_or_default();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0]["field"], "paymentMethod");
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_query_string_uses_envelope() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;
        let (status, body) = call(
            &state,
            "GET",
            "/admin/revenue/transactions?status=completed&status=failed",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["response"].is_null());
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"][0]["field"], "query");

        let (status, body) = call(
            &state,
            "GET",
            "/admin/revenue/analytics/top-users?limit=5&limit=6",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        Ok(())
    }

    #[tokio::test]
    async fn test_overview_and_analytics() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;

        let (status, body) = call(&state, "GET", "/admin/revenue/overview", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["totalRevenue"], 600);
        assert_eq!(body["response"]["averageTransactionValue"], 200);

        let (_, body) = call(&state, "GET", "/admin/revenue/analytics/trends?days=7", None).await;
        assert_eq!(body["response"].as_array().map(Vec::len), Some(7));

        let (status, _) = call(&state, "GET", "/admin/revenue/analytics/trends?days=400", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&state, "GET", "/admin/revenue/analytics/top-users?limit=2", None).await;
        assert_eq!(body["response"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["response"][0]["totalSpent"], 300);

        let (status, _) = call(&state, "GET", "/admin/revenue/analytics/by-category", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&state, "GET", "/admin/revenue/analytics/payment-methods", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(&state, "GET", "/admin/revenue/analytics/subscriptions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["activeSubscriptions"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_transitions() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;

        let (status, body) = call(
            &state,
            "PUT",
            "/admin/revenue/transactions/4/status",
            Some(json!({ "status": "completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["status"], "completed");

        let (status, body) = call(
            &state,
            "PUT",
            "/admin/revenue/transactions/5/status",
            Some(json!({ "status": "completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        let (status, _) = call(
            &state,
            "PUT",
            "/admin/revenue/transactions/99/status",
            Some(json!({ "status": "failed" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &state,
            "PUT",
            "/admin/revenue/transactions/4/status",
            Some(json!({ "status": "settled" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }
}
