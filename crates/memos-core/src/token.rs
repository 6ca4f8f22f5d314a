//! Stateless bearer tokens.
//!
//! Tokens are compact JWTs: `header.payload.signature`, each segment
//! base64url-encoded without padding, signed with HMAC-SHA256 over
//! `header.payload`. The header is always `{"typ":"JWT","alg":"HS256"}`.
//!
//! Verification never reports *why* a token was rejected. Malformed tokens,
//! bad signatures, unparsable claims and expired tokens all come back as
//! `None`; the cause is only traced at debug level.
//!
//! # Example
//!
//! ```
//! use memos_core::token::{Claims, TokenAuthenticator};
//! use memos_core::Role;
//!
//! let auth = TokenAuthenticator::new("secret");
//! let claims = Claims::new("user-uid", "alice", Role::Host, 1_700_000_000);
//! let token = auth.sign(&claims).unwrap();
//!
//! assert_eq!(auth.verify_at(&token, 1_700_000_100), Some(claims));
//! assert_eq!(TokenAuthenticator::new("other").verify_at(&token, 1_700_000_100), None);
//! ```

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::types::{Role, now_ts};

/// Default token lifetime: seven days.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's uid.
    pub sub: String,
    pub username: String,
    pub role: Role,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration time (unix seconds).
    pub exp: i64,
}

impl Claims {
    /// Claims issued at `issued_at` that expire after the default lifetime.
    pub fn new(sub: impl Into<String>, username: impl Into<String>, role: Role, issued_at: i64) -> Self {
        Self::with_ttl(sub, username, role, issued_at, DEFAULT_TOKEN_TTL_SECS)
    }

    /// Claims with an explicit lifetime in seconds.
    pub fn with_ttl(
        sub: impl Into<String>,
        username: impl Into<String>,
        role: Role,
        issued_at: i64,
        ttl_secs: i64,
    ) -> Self {
        Self {
            sub: sub.into(),
            username: username.into(),
            role,
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp < now
    }
}

/// Errors raised while *issuing* a token.
///
/// Verification has no error type; see [`TokenAuthenticator::verify`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Signs and verifies tokens for one shared secret.
#[derive(Clone)]
pub struct TokenAuthenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenAuthenticator {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, DEFAULT_TOKEN_TTL_SECS)
    }

    /// Authenticator whose [`issue`](Self::issue) uses `ttl_secs`.
    pub fn with_ttl(secret: &str, ttl_secs: i64) -> Self {
        // Expiry is checked against an explicit clock in `verify_at`, so the
        // library's own wall-clock check is switched off.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Build claims for a user at `now` and sign them.
    pub fn issue(
        &self,
        sub: &str,
        username: &str,
        role: Role,
        now: i64,
    ) -> Result<(String, Claims), TokenError> {
        let claims = Claims::with_ttl(sub, username, role, now, self.ttl_secs);
        let token = self.sign(&claims)?;
        Ok((token, claims))
    }

    /// Sign claims into `header.payload.signature`.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding,
        )?)
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        self.verify_at(token, now_ts())
    }

    /// Verify a token as of `now` (unix seconds).
    ///
    /// Returns `None` for any defect: fewer than three segments, signature
    /// mismatch, unparsable payload, or `exp < now`.
    pub fn verify_at(&self, token: &str, now: i64) -> Option<Claims> {
        let data = match jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(error = %e, "token rejected");
                return None;
            }
        };

        if data.claims.is_expired_at(now) {
            tracing::debug!(exp = data.claims.exp, now, "token expired");
            return None;
        }

        Some(data.claims)
    }
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

/// Sign `claims` with `secret`.
pub fn sign(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    TokenAuthenticator::new(secret).sign(claims)
}

/// Verify `token` with `secret` against the current time.
pub fn verify(token: &str, secret: &str) -> Option<Claims> {
    TokenAuthenticator::new(secret).verify(token)
}
