//! Who a request acts for.
//!
//! A verified bearer token names a user. Without one, the client-supplied
//! `sessionId` names an anonymous session; session ids are never issued or
//! checked by the server.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use super::{error::ApiError, AppState};
use crate::auth::verify_token;
use crate::models::Identity;

/// The user id from a valid bearer token, if the request carried one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Option<String>);

/// Like [`Caller`] but rejects anonymous requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn(pub String);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Self(None));
        };
        match verify_token(&state.auth, token) {
            Ok(claims) => Ok(Self(Some(claims.uid))),
            Err(e) => {
                tracing::debug!(error = %e, "rejected bearer token");
                Err(ApiError::Unauthorized("invalid token".into()))
            }
        }
    }
}

impl FromRequestParts<AppState> for SignedIn {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Caller::from_request_parts(parts, state).await? {
            Caller(Some(uid)) => Ok(Self(uid)),
            Caller(None) => Err(ApiError::Unauthorized("not signed in".into())),
        }
    }
}

/// Decide the identity for a plan request.
///
/// A `userId` parameter must match the caller's token. Empty parameters
/// count as absent.
pub fn resolve_identity(
    caller: &Caller,
    user_id: Option<&str>,
    session_id: Option<&str>,
) -> Result<Identity, ApiError> {
    let user_id = user_id.filter(|s| !s.is_empty());
    match (&caller.0, user_id) {
        (Some(uid), Some(requested)) if uid != requested => Err(ApiError::Unauthorized(
            "token does not belong to userId".into(),
        )),
        (Some(uid), _) => Ok(Identity::User(uid.clone())),
        (None, Some(_)) => Err(ApiError::Unauthorized(
            "userId requires a bearer token".into(),
        )),
        (None, None) => Identity::from_parts(None, session_id)
            .ok_or_else(|| ApiError::BadRequest("missing userId or sessionId".into())),
    }
}
