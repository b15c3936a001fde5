use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, patch, post},
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::set_header::response::SetResponseHeaderLayer;

use crate::auth::Auth;

pub mod auth_handlers;
pub mod dto;
pub mod jwt;
pub mod maintenance_handlers;
pub mod work_center_handlers;

// ---------- shared state ----------

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Auth>,
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

// ---------- error type ----------

/// Error half of the response envelope:
/// `{"success": false, "message": "..."}` with an HTTP status.
pub struct ApiError(StatusCode, String);

impl ApiError {
    /// Malformed, missing, or contradictory input.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(StatusCode::UNAUTHORIZED, msg.into())
    }

    /// Role or membership violation.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self(StatusCode::FORBIDDEN, msg.into())
    }

    /// Referenced entity absent.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(StatusCode::NOT_FOUND, msg.into())
    }

    /// Duplicate or state-incompatible operation.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self(StatusCode::CONFLICT, msg.into())
    }

    /// Unexpected storage/runtime failure.
    pub fn internal(e: impl std::fmt::Display) -> Self {
        Self(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "success": false, "message": self.1 });
        (self.0, Json(body)).into_response()
    }
}

// ---------- router ----------

pub fn api_router(state: AppState) -> Router {
    let allowed_origins: Vec<HeaderValue> = std::env::var("MP_CORS_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let cors = if allowed_origins.is_empty() {
        CorsLayer::new() // no origins allowed = same-origin only
    } else {
        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    };

    Router::new()
        .route("/api/health", get(health))
        .nest("/api", routes())
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(NormalizePathLayer::trim_trailing_slash())
        .with_state(state)
}

fn routes() -> Router<AppState> {
    Router::new()
        // auth
        .route("/auth/signup", post(auth_handlers::signup))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/me", get(auth_handlers::me))
        // maintenance requests
        .route(
            "/maintenance",
            get(maintenance_handlers::list_requests).post(maintenance_handlers::create_request),
        )
        .route("/maintenance/calendar", get(maintenance_handlers::calendar))
        .route(
            "/maintenance/{id}",
            get(maintenance_handlers::get_request)
                .put(maintenance_handlers::update_request)
                .delete(maintenance_handlers::delete_request),
        )
        .route(
            "/maintenance/{id}/assign",
            patch(maintenance_handlers::assign_request),
        )
        .route(
            "/maintenance/{id}/status",
            patch(maintenance_handlers::update_status),
        )
        .route(
            "/maintenance/{id}/notes",
            post(maintenance_handlers::add_note),
        )
        // work centers
        .route(
            "/work-centers",
            get(work_center_handlers::list_work_centers)
                .post(work_center_handlers::create_work_center),
        )
        .route(
            "/work-centers/{id}",
            get(work_center_handlers::get_work_center)
                .put(work_center_handlers::update_work_center)
                .delete(work_center_handlers::deactivate_work_center),
        )
        .route(
            "/work-centers/{id}/alternatives",
            get(work_center_handlers::list_alternatives)
                .post(work_center_handlers::add_alternative),
        )
        .route(
            "/work-centers/{id}/alternatives/{alt_id}",
            delete(work_center_handlers::remove_alternative),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "Server is running",
        "timestamp": Utc::now(),
    }))
}
