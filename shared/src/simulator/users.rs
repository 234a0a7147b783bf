use lambda_http::{http::HeaderMap, Body, Error, Response};

use super::response::respond;
use crate::config::CurrentUserMode;
use crate::error::ApiError;
use crate::token::SessionToken;
use crate::types::{CurrentUserData, CurrentUserResponse, UserProfile, UserRecord};
use crate::AppState;

pub const TOKEN_MISSING: &str = "Access token not provided";
pub const TOKEN_UNRECOGNIZED: &str = "Access token not recognized";
pub const USER_NOT_FOUND: &str = "User not found";

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(SessionToken::from)
}

/// Get the current user.
///
/// The token is only required to be present. Which record comes back is a
/// configurable stand-in, see [`CurrentUserMode`].
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> Result<Response<Body>, Error> {
    tracing::info!("👤 Current user request received");
    respond(lookup(state, headers).await, None)
}

async fn lookup(state: &AppState, headers: &HeaderMap) -> Result<CurrentUserResponse, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| {
        tracing::warn!("❌ Missing or malformed Authorization header");
        ApiError::Auth(TOKEN_MISSING.to_string())
    })?;

    let user = match state.config.current_user {
        CurrentUserMode::FirstSeeded => first_seeded(state).await?,
        CurrentUserMode::TokenSubject => token_subject(state, &token).await?,
    };

    tracing::info!("✅ Returning current user: {}", user.email);
    Ok(CurrentUserResponse {
        data: CurrentUserData {
            user: UserProfile::from(&user),
        },
    })
}

async fn first_seeded(state: &AppState) -> Result<UserRecord, ApiError> {
    state
        .store
        .first()
        .await
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))
}

async fn token_subject(state: &AppState, token: &SessionToken) -> Result<UserRecord, ApiError> {
    let claims = token.claims().ok_or_else(|| {
        tracing::warn!("❌ Could not decode token payload");
        ApiError::Auth(TOKEN_UNRECOGNIZED.to_string())
    })?;

    state.store.find_by_id(&claims.user_id).await.ok_or_else(|| {
        tracing::warn!("❌ Token names unknown user: {}", claims.user_id);
        ApiError::Auth(TOKEN_UNRECOGNIZED.to_string())
    })
}
