use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::SessionData;
use super::INVALID_TOKEN_MESSAGE;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::bearer_token;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Re-issue a token from a still valid one.
///
/// The presented token is not revoked and stays valid until its own expiry.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let token = bearer_token(&headers)?;

    let (jwt, claims) = state.authenticator.refresh_token(token).map_err(|e| {
        tracing::warn!(kind = %e, "Token refresh rejected");
        ApiError::from(e)
    })?;

    let user_id = UserId::from_string(&claims.user_id).map_err(UserError::from)?;

    let user = state
        .user_service
        .get_user(&user_id)
        .await
        .map_err(|e| match e {
            UserError::NotFound(_) => {
                tracing::warn!("Token refresh for deleted user {}", user_id);
                ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
            }
            _ => ApiError::from(e),
        })?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        SessionData {
            jwt,
            user: (&user).into(),
        },
    ))
}
