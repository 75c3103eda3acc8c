//! JSON HTTP API under `/api`.

mod admin;
mod auth;
mod error;
mod extract;
mod identity;
mod plans;

pub use admin::{BackupCreated, HealthStatus};
pub use auth::{ApiUser, AuthResponse, MeResponse, SessionToken, UserMetadata};
pub use error::{ApiError, ApiResult};
pub use extract::{JsonBody, QueryParams};
pub use identity::{resolve_identity, Caller, SignedIn};
pub use plans::DeleteResponse;

use std::sync::Arc;

use axum::{
    http::{header, request::Parts, HeaderValue, Method},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AuthConfig;
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: Arc<AuthConfig>,
}

pub fn create_router(db: Database, auth_config: AuthConfig) -> Router {
    let state = AppState {
        db,
        auth: Arc::new(auth_config),
    };

    let api = Router::new()
        .merge(admin::router())
        .merge(auth::router())
        .merge(plans::router());

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}

/// Browser clients are served from `http://localhost:<port>` during
/// development.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _: &Parts| {
            origin.to_str().is_ok_and(is_localhost_origin)
        }))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

fn is_localhost_origin(origin: &str) -> bool {
    origin
        .strip_prefix("http://localhost:")
        .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_localhost_ports_are_allowed() {
        assert!(is_localhost_origin("http://localhost:5173"));
        assert!(!is_localhost_origin("http://localhost"));
        assert!(!is_localhost_origin("http://localhost:"));
        assert!(!is_localhost_origin("https://localhost:5173"));
        assert!(!is_localhost_origin("http://localhost:5173.evil.com"));
        assert!(!is_localhost_origin("http://example.com:5173"));
    }
}
