pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod offers;
pub mod services;
pub mod state;
pub mod storage;
pub mod store;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Assemble the full router. Authenticated routes sit behind the JWT
/// middleware; the admin surface additionally requires the admin role.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(application_routes())
        .merge(document_routes())
        .merge(admin_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn application_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::{loans, offers};

    Router::new()
        .route(
            "/api/applications",
            post(loans::application_post).get(loans::application_list),
        )
        .route("/api/offers", get(offers::offers_get))
        .layer(axum::middleware::from_fn(
            middleware::auth::jwt_auth_middleware,
        ))
}

fn document_routes() -> Router<AppState> {
    use axum::routing::{delete, post};
    use handlers::documents;

    Router::new()
        .route("/api/documents", get(documents::collection_list))
        .route("/api/documents/upload", post(documents::upload_post))
        .route("/api/documents/delete", delete(documents::file_delete))
        .route(
            "/api/documents/additional",
            get(documents::additional_get).post(documents::additional_post),
        )
        .route(
            "/api/documents/additional/upload",
            post(documents::additional_upload_post),
        )
        .route(
            "/api/documents/:loan_info_id",
            get(documents::collection_get)
                .post(documents::collection_post)
                .put(documents::collection_put),
        )
        .layer(DefaultBodyLimit::max(
            config::config().api.max_upload_bytes,
        ))
        .layer(axum::middleware::from_fn(
            middleware::auth::jwt_auth_middleware,
        ))
}

fn admin_routes() -> Router<AppState> {
    use axum::routing::{patch, put};
    use handlers::admin;

    Router::new()
        .route(
            "/api/admin/documents/additional/verify",
            put(admin::additional_verify_put),
        )
        .route(
            "/api/admin/applications/:id/documents/:doc_id",
            patch(admin::file_status_patch),
        )
        .route(
            "/api/admin/applications/:id/additional/:doc_id",
            patch(admin::additional_status_patch),
        )
        // Innermost first: the JWT layer (added last) runs before the gate.
        .layer(axum::middleware::from_fn(middleware::auth::require_admin))
        .layer(axum::middleware::from_fn(
            middleware::auth::jwt_auth_middleware,
        ))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "name": "Loandocs API",
        "version": version,
        "description": "Loan-refinancing document collection and verification API",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "applications": "/api/applications (authenticated)",
            "offers": "/api/offers (authenticated)",
            "documents": "/api/documents[/:loanInfoId] (authenticated)",
            "uploads": "/api/documents/upload, /api/documents/additional/upload (authenticated)",
            "admin": "/api/admin/* (admin role)",
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store_ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "status": "degraded",
                "timestamp": now,
                "store_error": e.to_string()
            })),
        ),
    }
}
