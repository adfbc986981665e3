// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{get, patch, post};
use parcelhub_config::model::ServerConfig;
use parcelhub_core::{IdentityVerifier, ParcelError, PaymentProcessor, StorageAdapter};
use parcelhub_lifecycle::Services;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, parcels, payments, riders, trackings, users};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Held for health reporting only; writes go through `services`.
    pub storage: Arc<dyn StorageAdapter>,
    pub processor: Arc<dyn PaymentProcessor>,
    pub started_at: Instant,
}

/// Builds the full route table.
pub fn router(state: AppState, permissive_cors: bool) -> Router {
    let app = Router::new()
        .route("/", get(handlers::banner))
        .route("/health", get(handlers::health))
        // Parcels
        .route("/parcels", post(parcels::create).get(parcels::list))
        .route("/parcels/{id}", get(parcels::get_one).delete(parcels::delete))
        .route("/parcels/{id}/status", patch(parcels::advance_status))
        .route("/parcels/{id}/assign", patch(parcels::assign_rider))
        // Rider-scoped deliveries
        .route("/rider/parcels", get(parcels::rider_active))
        .route("/rider/completed-deliveries", get(parcels::rider_completed))
        .route(
            "/rider/completed-deliveries/{id}/cashout",
            patch(parcels::cash_out),
        )
        .route("/rider/update-status/{id}", patch(parcels::rider_update_status))
        // Payments
        .route("/create-payment-intent", post(payments::create_intent))
        .route("/payments", post(payments::confirm).get(payments::history))
        // Riders
        .route("/riders", post(riders::apply))
        .route("/riders/pending", get(riders::pending))
        .route("/riders/active", get(riders::active))
        .route("/riders/available", get(riders::available))
        .route("/riders/{id}/status", patch(riders::review))
        // Tracking
        .route("/trackings", post(trackings::append))
        .route("/trackings/{tracking_id}/logs", get(trackings::logs))
        // Users
        .route("/auth/save-user", post(users::save_user))
        // GET takes an email, PATCH a user id; one path since both share the segment.
        .route("/users/{user}/role", get(users::role_of).patch(users::set_role))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if permissive_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Binds the configured address and serves until `shutdown` resolves.
pub async fn serve<F>(config: &ServerConfig, state: AppState, shutdown: F) -> Result<(), ParcelError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state, config.permissive_cors);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ParcelError::Internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, "parcel server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ParcelError::Internal(format!("server error: {e}")))?;

    tracing::info!("parcel server stopped");
    Ok(())
}
