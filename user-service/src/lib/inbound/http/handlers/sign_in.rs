use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use super::SessionData;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn sign_in(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignInRequest>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let email = EmailAddress::new(body.email).map_err(UserError::from)?;
    if body.password.is_empty() {
        return Err(ApiError::UnprocessableEntity(
            "Password must not be empty".to_string(),
        ));
    }

    let user = match state.user_service.get_user_by_email(&email).await {
        Ok(user) => user,
        Err(UserError::NotFoundByEmail(_)) => {
            tracing::info!("Sign-in for unknown email {}", email);
            let authenticator = state.authenticator.clone();
            let decoy_hash = state.decoy_hash.clone();
            let rejection = tokio::task::spawn_blocking(move || {
                authenticator.reject_unknown_account(&body.password, &decoy_hash)
            })
            .await
            .map_err(|e| ApiError::InternalServerError(format!("Sign-in task failed: {}", e)))?;
            return Err(ApiError::from(rejection));
        }
        Err(e) => return Err(ApiError::from(e)),
    };

    // Verify password and generate token off the request task
    let authenticator = state.authenticator.clone();
    let stored_hash = user.password_hash.clone();
    let user_id = user.id.to_string();
    let role = user.role;
    let result = tokio::task::spawn_blocking(move || {
        authenticator.authenticate(&body.password, &stored_hash, &user_id, role)
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("Sign-in task failed: {}", e)))?
    .map_err(|e| {
        if matches!(e, auth::AuthenticationError::InvalidCredentials) {
            tracing::info!("Wrong password for user {}", user.id);
        }
        ApiError::from(e)
    })?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        SessionData {
            jwt: result.access_token,
            user: (&user).into(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignInRequest {
    email: String,
    password: String,
}
