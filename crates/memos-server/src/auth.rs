//! Authentication: bearer token extraction and password hashing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use memos_core::{User, now_ts};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Caller identified by a valid bearer token.
///
/// Extraction fails with 401 when the header is missing, the token does
/// not verify, or it names a user who no longer exists or is archived.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    /// Check if user is the instance host.
    pub fn is_host(&self) -> bool {
        self.user.is_host()
    }

    /// Check if user is the given user or is host.
    pub fn is_self_or_host(&self, user_id: i64) -> bool {
        self.user.id == user_id || self.is_host()
    }

    /// Fail with 403 unless the caller is `user_id` or host.
    pub fn require_self_or_host(&self, user_id: i64) -> ApiResult<()> {
        if self.is_self_or_host(user_id) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("not allowed for this user".to_string()))
        }
    }

    /// Fail with 403 unless the caller is host.
    pub fn require_host(&self) -> ApiResult<()> {
        if self.is_host() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("host only".to_string()))
        }
    }
}

/// Caller who may or may not be signed in.
///
/// A missing or invalid token yields an anonymous caller rather than an
/// error.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl MaybeUser {
    /// Caller's user id, for visibility checks.
    pub fn viewer(&self) -> Option<i64> {
        self.0.as_ref().map(AuthenticatedUser::id)
    }

    pub fn is_host(&self) -> bool {
        self.0.as_ref().is_some_and(AuthenticatedUser::is_host)
    }
}

/// Issue an access token for `user`.
pub fn issue_token(state: &AppState, user: &User) -> ApiResult<String> {
    let (token, _claims) = state
        .tokens()
        .issue(&user.uid, &user.username, user.role, now_ts())?;
    Ok(token)
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(password_hash.to_string())
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn bearer_token(parts: &Parts) -> ApiResult<&str> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized("Authorization header must be Bearer <token>".to_string())
    })
}

async fn authenticate(parts: &Parts, state: &AppState) -> ApiResult<AuthenticatedUser> {
    let token = bearer_token(parts)?;

    let claims = state
        .tokens()
        .verify(token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    let user = state
        .store()
        .find_user_by_uid(&claims.sub)
        .await?
        .filter(User::is_active)
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    Ok(AuthenticatedUser { user })
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(Self(None));
        }

        match authenticate(parts, state).await {
            Ok(user) => Ok(Self(Some(user))),
            Err(ApiError::Unauthorized(reason)) => {
                tracing::debug!(%reason, "treating request as anonymous");
                Ok(Self(None))
            }
            Err(e) => Err(e),
        }
    }
}
