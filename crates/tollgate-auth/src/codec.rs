//! Signing and verification of access and refresh tokens.
//!
//! Tokens are HS256 JWTs. Access and refresh tokens use separate secrets and
//! separate lifetimes, both taken from [`JwtConfig`]. A token is valid iff its
//! signature checks out and `iat <= now < exp` on the verifier's clock, with
//! no leeway.
//!
//! Verification never panics or throws: every failure is a [`TokenError`].
//! The variants exist for logging; HTTP callers must collapse them into one
//! generic response.
//!
//! Every operation has an `_at` form that takes the clock reading
//! explicitly, which is what the tests use to step past expiry.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use tollgate_config::JwtConfig;

use crate::claims::{Claims, Principal};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is not yet valid")]
    NotYetValid,
    #[error("token lifetime of {0} seconds is out of range")]
    LifetimeOutOfRange(i64),
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::Malformed,
        }
    }
}

/// A freshly minted token and its validity window.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Lifetime in seconds, as reported to clients.
    pub expires_in: i64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: i64,
}

impl TokenKeys {
    fn new(secret: &str, lifetime: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = Duration::try_seconds(self.lifetime)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(TokenError::LifetimeOutOfRange(self.lifetime))?;
        let claims = Claims::for_principal(principal, now.timestamp(), expires_at.timestamp());

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken {
            token,
            expires_in: self.lifetime,
            issued_at: now,
            expires_at,
        })
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked below against the caller's clock.
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

fn decode_claims(token: &str, key: &DecodingKey, now: DateTime<Utc>) -> Result<Claims, TokenError> {
    let claims = decode::<Claims>(token, key, &validation())?.claims;

    let now = now.timestamp();
    if claims.iat > now {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

/// Verifies a token against an arbitrary secret using the current time.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<Principal, TokenError> {
    verify_token_at(token, secret, Utc::now())
}

/// Verifies a token against an arbitrary secret at a given instant.
pub fn verify_token_at(
    token: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<Principal, TokenError> {
    decode_claims(token, &DecodingKey::from_secret(secret), now)?.principal()
}

/// Issues and verifies access and refresh tokens.
///
/// Built once from [`JwtConfig`] at startup and shared read-only.
#[derive(Clone)]
pub struct TokenCodec {
    access: TokenKeys,
    refresh: TokenKeys,
}

impl TokenCodec {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access: TokenKeys::new(&config.access_secret, config.access_token_expiry),
            refresh: TokenKeys::new(&config.refresh_secret, config.refresh_token_expiry),
        }
    }

    pub fn issue_access(&self, principal: &Principal) -> Result<IssuedToken, TokenError> {
        self.issue_access_at(principal, Utc::now())
    }

    pub fn issue_access_at(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        self.access.issue(principal, now)
    }

    pub fn issue_refresh(&self, principal: &Principal) -> Result<IssuedToken, TokenError> {
        self.issue_refresh_at(principal, Utc::now())
    }

    pub fn issue_refresh_at(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        self.refresh.issue(principal, now)
    }

    pub fn verify_access(&self, token: &str) -> Result<Principal, TokenError> {
        self.verify_access_at(token, Utc::now())
    }

    pub fn verify_access_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Principal, TokenError> {
        decode_claims(token, &self.access.decoding, now)?.principal()
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Principal, TokenError> {
        self.verify_refresh_at(token, Utc::now())
    }

    pub fn verify_refresh_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Principal, TokenError> {
        decode_claims(token, &self.refresh.decoding, now)?.principal()
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_lifetime", &self.access.lifetime)
            .field("refresh_lifetime", &self.refresh.lifetime)
            .finish_non_exhaustive()
    }
}
