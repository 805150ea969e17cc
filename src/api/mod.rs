//! HTTP surface.
//!
//! Routes are grouped per area. Each handler parses its input, calls a data
//! source or a core function and wraps the result in the `{response, error}`
//! envelope. Failures are rendered by [`crate::errors::Error`].

/// Date curation admin endpoints
pub mod date_curation;
/// Verification code e-mails
pub mod emails;
/// `{response, error}` envelope
pub mod response;
/// Revenue admin endpoints
pub mod revenue;
/// Query-string and body parsing
pub mod validation;
/// Pre-launch waitlist endpoints
pub mod waitlist;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::mail::Mailer;
use crate::source::{DateCurationSource, RevenueSource};
use axum::Router;
use axum::http::{Method, StatusCode};
use axum::routing::{delete, get, post, put};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    /// Transactions and revenue analytics
    pub revenue: Arc<dyn RevenueSource>,
    /// Curated dates and their statistics
    pub dates: Arc<dyn DateCurationSource>,
    /// Waitlist and verification codes always live in the database
    pub db: DatabaseConnection,
    /// Sends verification e-mails
    pub mailer: Arc<dyn Mailer>,
    /// Loaded settings
    pub config: Arc<AppConfig>,
}

/// Builds the router (separated from [`serve`] for testing).
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(
            "/admin/revenue/transactions",
            get(revenue::list_transactions),
        )
        .route(
            "/admin/revenue/transactions/:id/status",
            put(revenue::update_transaction_status),
        )
        .route("/admin/revenue/overview", get(revenue::overview))
        .route("/admin/revenue/analytics/trends", get(revenue::trends))
        .route(
            "/admin/revenue/analytics/by-category",
            get(revenue::by_category),
        )
        .route("/admin/revenue/analytics/top-users", get(revenue::top_users))
        .route(
            "/admin/revenue/analytics/payment-methods",
            get(revenue::payment_methods),
        )
        .route(
            "/admin/revenue/analytics/subscriptions",
            get(revenue::subscriptions),
        )
        .route(
            "/admin/date-curation/curated-dates",
            get(date_curation::list_dates).post(date_curation::create_date),
        )
        .route(
            "/admin/date-curation/curated-dates/:id",
            get(date_curation::get_date)
                .put(date_curation::update_status)
                .delete(date_curation::delete_date),
        )
        .route(
            "/admin/date-curation/curated-dates/:id/notes",
            put(date_curation::set_note),
        )
        .route(
            "/admin/date-curation/dates/:id/submit-feedback",
            post(date_curation::submit_feedback),
        )
        .route(
            "/admin/date-curation/analytics/overview",
            get(date_curation::stats),
        )
        .route(
            "/emails/:email/send-verification-codes",
            post(emails::send_verification_code),
        )
        .route("/emails/:email/verify-code", post(emails::verify_code))
        .route("/waitlist", post(waitlist::join))
        .route("/waitlist-data", get(waitlist::list))
        .route("/waitlist-count", get(waitlist::count))
        .route("/waitlist/:id/status", put(waitlist::update_status))
        .route("/waitlist/:id", delete(waitlist::remove))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Binds the configured address and serves until Ctrl-C.
///
/// # Errors
/// Returns [`crate::errors::Error::Io`] if the address cannot be bound.
pub async fn serve(state: AppState) -> Result<()> {
    let address = state.config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(address = %listener.local_addr()?, "Admin API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Admin API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}


#[cfg(test)]
mod tests {
    use super::test_support::{call, state_with};
    use super::*;
    use crate::test_utils::RecordingMailer;

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;
        let (status, _) = call(&state, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() -> Result<()> {
        let state = state_with(Arc::new(RecordingMailer::default())).await?;
        let (status, _) = call(&state, "GET", "/admin/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }
}
