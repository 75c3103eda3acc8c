use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::{blocking, ApiError, ApiResult};
use super::extract::JsonBody;
use super::identity::SignedIn;
use super::AppState;
use crate::auth::{hash_password, issue_token, verify_password};
use crate::models::{CreateUserInput, UserWithProfile};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// The user shape clients see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiUser {
    pub id: String,
    pub email: String,
    pub user_metadata: UserMetadata,
}

impl From<UserWithProfile> for ApiUser {
    fn from(user: UserWithProfile) -> Self {
        Self {
            id: user.id,
            email: user.email,
            user_metadata: UserMetadata {
                full_name: user.full_name,
                avatar_url: user.avatar_url,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: ApiUser,
    pub session: SessionToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: ApiUser,
}

fn credentials(email: Option<String>, password: Option<String>) -> ApiResult<(String, String)> {
    match (email, password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok((email, password))
        }
        _ => Err(ApiError::BadRequest("email and password are required".into())),
    }
}

fn signed_response(state: &AppState, user: UserWithProfile) -> ApiResult<Json<AuthResponse>> {
    let access_token = issue_token(&state.auth, &user.id).map_err(anyhow::Error::from)?;
    Ok(Json(AuthResponse {
        user: user.into(),
        session: SessionToken { access_token },
    }))
}

async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (email, password) = credentials(req.email, req.password)?;

    if state.db.find_user_by_email(&email)?.is_some() {
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let cost = state.auth.bcrypt_cost;
    let password_hash = blocking(move || hash_password(&password, cost))
        .await?
        .map_err(anyhow::Error::from)?;

    // Re-checked under the store lock in case of a concurrent registration.
    let user = state
        .db
        .register_user(CreateUserInput {
            email,
            password_hash,
            full_name: req.full_name.filter(|n| !n.is_empty()),
        })?
        .ok_or_else(|| ApiError::Conflict("email already registered".into()))?;

    signed_response(&state, user)
}

async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (email, password) = credentials(req.email, req.password)?;
    let rejected = || ApiError::Unauthorized("unknown user or wrong password".into());

    let user = state.db.find_user_by_email(&email)?.ok_or_else(rejected)?;
    let hash = user.password_hash.clone();
    let matches = match blocking(move || verify_password(&password, &hash)).await? {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(id = %user.id, error = %e, "stored password hash is unreadable");
            false
        }
    };
    if !matches {
        return Err(rejected());
    }

    let profile = state.db.get_user_with_profile(&user.id)?.ok_or_else(rejected)?;
    tracing::debug!(id = %profile.id, "user logged in");
    signed_response(&state, profile)
}

/// Tokens are stateless; the client discards its copy.
async fn logout() -> Json<Value> {
    Json(json!({ "success": true }))
}

async fn me(State(state): State<AppState>, SignedIn(uid): SignedIn) -> ApiResult<Json<MeResponse>> {
    let user = state
        .db
        .get_user_with_profile(&uid)?
        .ok_or_else(|| ApiError::Unauthorized("invalid token".into()))?;
    Ok(Json(MeResponse { user: user.into() }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}
