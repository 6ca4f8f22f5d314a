//! Authentication routes: signin and first-run signup.

use axum::{Json, Router, extract::State, routing::post};
use memos_core::{Role, User};
use memos_store::NewUser;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

fn credentials(username: Option<String>, password: Option<String>) -> ApiResult<(String, String)> {
    match (username, password) {
        (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => Ok((u.trim().to_string(), p)),
        _ => Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        )),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/auth/signin
async fn signin(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (username, password) = credentials(request.username, request.password)?;

    let user = state
        .store()
        .find_user_by_username(&username)
        .await?
        .filter(User::is_active)
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    if !auth::verify_password(&password, &user.password_hash)? {
        tracing::info!(username = %username, "Sign-in rejected");
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let access_token = auth::issue_token(&state, &user)?;

    tracing::info!(user_id = user.id, username = %user.username, "User signed in");

    Ok(Json(AuthResponse { access_token, user }))
}

/// POST /api/auth/signup - only while the instance has no active user.
async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (username, password) = credentials(request.username, request.password)?;
    let store = state.store();

    if store.count_active_users().await? > 0 {
        return Err(ApiError::SignupDisabled);
    }

    let user = store
        .create_user(&NewUser {
            username,
            password_hash: auth::hash_password(&password)?,
            role: Role::Host,
            nickname: request.nickname,
            email: request.email.filter(|e| !e.is_empty()),
        })
        .await?;

    let access_token = auth::issue_token(&state, &user)?;

    tracing::info!(user_id = user.id, username = %user.username, "Host account created");

    Ok(Json(AuthResponse { access_token, user }))
}

/// Build auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signin", post(signin))
        .route("/api/auth/signup", post(signup))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_validation() {
        assert!(credentials(Some("a".into()), Some("b".into())).is_ok());
        assert!(credentials(None, Some("b".into())).is_err());
        assert!(credentials(Some("  ".into()), Some("b".into())).is_err());
        assert!(credentials(Some("a".into()), Some(String::new())).is_err());
        assert_eq!(
            credentials(Some(" alice ".into()), Some("pw".into())).unwrap().0,
            "alice"
        );
    }

    #[test]
    fn test_signin_request_tolerates_missing_fields() {
        let request: SignInRequest = serde_json::from_str(r#"{"username": "admin"}"#).unwrap();
        assert_eq!(request.username.as_deref(), Some("admin"));
        assert!(request.password.is_none());
    }
}
