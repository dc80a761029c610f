//! quill-api - HTTP API server for quill

mod handlers;
mod password;
mod validate;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use quill_core::defaults::SERVER_PORT;
use quill_core::{Error, Notifier, SessionRepository, User};
use quill_db::{log_pool_metrics, Database, PoolConfig};

use handlers::{
    collaborators::{add_collaborator, remove_collaborator},
    labels::{
        attach_label, create_label, delete_label, detach_label, get_label, list_labels,
        rename_label,
    },
    notes::{
        archive_note, archived_notes, colour_note, create_note, delete_note, get_note, list_notes,
        pin_note, pinned_notes, search_notes, unarchive_note, unpin_note, update_note,
    },
    users::{forgot_password, login, logout, me, register, reset_password},
};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically, which keeps
/// log correlation cheap when debugging production incidents.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Outbound notification delivery (invitations, reset links).
    pub notifier: Arc<dyn Notifier>,
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// API-level error with a canonical HTTP status taxonomy:
/// validation 400, auth 401, not-found 404, conflict 409, everything
/// unexpected 500 with a generic body.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    /// Field-level validation failures, keyed by field name.
    Validation(BTreeMap<String, String>),
    Internal(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(_) | Error::NoteNotFound(_) | Error::LabelNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::InvalidColour(_) | Error::InvalidInput(_) => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message, fields) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                "validation",
                "Validation failed".to_string(),
                Some(fields),
            ),
            ApiError::Internal(err) => {
                // Log the detail, return a generic body.
                error!(subsystem = "api", error = %err, "Unhandled internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let mut body = serde_json::json!({
            "error": message,
            "code": code,
        });
        if let Some(fields) = fields {
            body["fields"] = serde_json::json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// AUTHENTICATION EXTRACTOR
// =============================================================================

/// Extractor that resolves the bearer token to its user.
///
/// Every authenticated endpoint takes this as an argument; a missing,
/// malformed, expired, or revoked token rejects with 401 before the handler
/// body runs, so no operation has partial side effects under a bad token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// The presented token, kept so logout can revoke it.
    pub token: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                header.trim_start_matches("Bearer ").trim().to_string()
            }
            _ => {
                return Err(ApiError::Unauthorized(
                    "Missing authorization token".to_string(),
                ))
            }
        };

        match state.db.sessions.resolve(&token).await {
            Ok(Some(user)) => Ok(AuthUser { user, token }),
            Ok(None) => Err(ApiError::Unauthorized(
                "Invalid authorization token".to_string(),
            )),
            Err(e) => Err(ApiError::from(e)),
        }
    }
}

// =============================================================================
// ROUTER & STARTUP
// =============================================================================

fn app_router(state: AppState) -> Router {
    Router::new()
        // Accounts & sessions
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/user", get(me))
        .route("/api/forgot-password", post(forgot_password))
        .route("/api/reset-password", post(reset_password))
        // Notes
        .route("/api/notes", post(create_note).get(list_notes))
        .route("/api/notes/pinned", get(pinned_notes))
        .route("/api/notes/archived", get(archived_notes))
        .route("/api/notes/search", get(search_notes))
        .route(
            "/api/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/api/notes/:id/pin", post(pin_note))
        .route("/api/notes/:id/unpin", post(unpin_note))
        .route("/api/notes/:id/archive", post(archive_note))
        .route("/api/notes/:id/unarchive", post(unarchive_note))
        .route("/api/notes/:id/colour", post(colour_note))
        // Labels & attachment
        .route("/api/labels", post(create_label).get(list_labels))
        .route(
            "/api/labels/:id",
            get(get_label).put(rename_label).delete(delete_label),
        )
        .route(
            "/api/notes/:id/labels/:label_id",
            post(attach_label).delete(detach_label),
        )
        // Collaborators
        .route(
            "/api/notes/:id/collaborators",
            post(add_collaborator).delete(remove_collaborator),
        )
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter (default: "quill_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quill_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/quill".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(SERVER_PORT);
    let mail_gateway_url = std::env::var("MAIL_GATEWAY_URL").ok();

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect_with_config(&database_url, PoolConfig::from_env()).await?;
    log_pool_metrics(db.pool());
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    let notifier = quill_notify::from_config(mail_gateway_url.as_deref());
    if mail_gateway_url.is_none() {
        info!("No MAIL_GATEWAY_URL configured; outbound notifications are dropped");
    }

    let state = AppState { db, notifier };
    let app = app_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!(%addr, "quill-api listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_error_status_taxonomy() {
        assert_eq!(
            status_of(ApiError::Unauthorized("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ApiError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::BadRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Conflict("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ApiError::Validation(BTreeMap::new())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_core_errors_map_to_statuses() {
        assert_eq!(
            status_of(ApiError::from(Error::NoteNotFound(Uuid::nil()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::from(Error::LabelNotFound(Uuid::nil()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::from(Error::Conflict("dup".into()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ApiError::from(Error::InvalidColour("neon".into()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::from(Error::Unauthorized("token".into()))),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ApiError::from(Error::Internal("boom".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
