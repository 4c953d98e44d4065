use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use super::SessionData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::SignUpCommand;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Register a member account and sign it in.
pub async fn sign_up(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignUpRequest>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let user = state.user_service.sign_up(body.try_into_command()?).await?;
    let jwt = state
        .authenticator
        .issue_token(&user.id.to_string(), user.role)?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        SessionData {
            jwt,
            user: (&user).into(),
        },
    ))
}

/// HTTP request body for signing up (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
}

impl SignUpRequest {
    fn try_into_command(self) -> Result<SignUpCommand, UserError> {
        Ok(SignUpCommand {
            email: EmailAddress::new(self.email)?,
            password: Password::new(self.password)?,
            first_name: PersonName::new(self.first_name)?,
            last_name: PersonName::new(self.last_name)?,
        })
    }
}
