use auth::Role;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::INVALID_TOKEN_MESSAGE;
use crate::inbound::http::router::AppState;

/// Identity decoded from a verified bearer token, stored in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Allow the caller to address `user_id` if it is their own account or
    /// they hold the admin role.
    pub fn ensure_self_or_admin(&self, user_id: &UserId) -> Result<(), ApiError> {
        if self.user_id == *user_id || self.role.satisfies(Role::Admin) {
            Ok(())
        } else {
            tracing::warn!(
                caller = %self.user_id,
                target = %user_id,
                "Rejected access to another user's account"
            );
            Err(ApiError::Unauthorized("Invalid user ID".to_string()))
        }
    }

    /// Allow the caller to address `user_id` only if it is their own account.
    pub fn ensure_self(&self, user_id: &UserId) -> Result<(), ApiError> {
        if self.user_id == *user_id {
            Ok(())
        } else {
            tracing::warn!(
                caller = %self.user_id,
                target = %user_id,
                "Rejected access to another user's account"
            );
            Err(ApiError::Unauthorized("Invalid user ID".to_string()))
        }
    }
}

/// Middleware that validates JWT tokens and adds user info to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let claims = state.authenticator.validate_token(token).map_err(|e| {
        tracing::warn!(kind = %e, "JWT validation failed");
        ApiError::from(e)
    })?;

    let user_id = UserId::from_string(&claims.user_id).map_err(|e| {
        tracing::warn!("Token carries an invalid user ID: {}", e);
        ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
    })?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Middleware that only lets admin tokens through. Runs after `authenticate`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let role = req
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.role)
        .ok_or_else(|| ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string()))?;

    match role {
        Role::Admin => Ok(next.run(req).await),
        Role::Member => {
            tracing::warn!("Rejected member token on an admin route");
            Err(ApiError::Unauthorized("Admin role required".to_string()))
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let rejection = |reason: &str| {
        tracing::warn!("{}", reason);
        ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
    };

    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| rejection("Missing Authorization header"))?
        .to_str()
        .map_err(|_| rejection("Invalid Authorization header"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| rejection("Authorization header is not a bearer token"))
}
