use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MAX_TOKEN_TTL_SECS;

pub mod cookie;

pub use cookie::{CookiePolicy, TOKEN_COOKIE};

/// The identity a client presents at login and carries in its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(identity: &Identity, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            email: identity.email.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self { email: claims.email }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token generation failed: {0}")]
    Signing(String),
}

impl TokenError {
    /// Short machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Malformed(_) => "malformed",
            TokenError::BadSignature => "bad-signature",
            TokenError::Expired => "expired",
            TokenError::Signing(_) => "signing",
        }
    }
}

/// Issues and verifies HS256 identity tokens signed with the process-wide secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// `ttl_secs` is clamped to `1..=MAX_TOKEN_TTL_SECS`.
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs.clamp(1, MAX_TOKEN_TTL_SECS))
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Duration::hours(1));

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    #[cfg(test)]
    fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issues a token whose validity window starts at `issued_at`.
    pub fn issue_at(&self, identity: &Identity, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(identity, issued_at, self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Returns the embedded identity if the token is well formed, unexpired and correctly signed.
    ///
    /// Expiry is checked before the signature: a token past its expiry is
    /// reported as `Expired` even when its signature has been tampered with.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let mut expiry_only = self.validation();
        expiry_only.insecure_disable_signature_validation();
        decode::<Claims>(token, &self.decoding_key, &expiry_only).map_err(classify)?;

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation()).map_err(classify)?;
        Ok(data.claims.into())
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
        _ => TokenError::Malformed(err.to_string()),
    }
}
