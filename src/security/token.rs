//! Signed identity tokens.
//!
//! # Responsibilities
//! - Issue HS256-signed, time-bounded identity tokens
//! - Verify tokens into a three-way outcome: valid, expired, invalid
//! - Distinguish short-lived access tokens from long-lived refresh tokens
//!
//! # Design Decisions
//! - Stateless: claims live inside the token, nothing is stored server-side
//! - Signature and structure are checked before expiry; a forged token is
//!   never reported as merely expired
//! - Zero clock leeway: a token is dead the instant `exp` passes
//! - Refresh tokens are reusable until natural expiry. There is no
//!   revocation store; rotating the signing secret invalidates everything
//!   outstanding.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Issuer claim pinned on every token this service signs.
pub const ISSUER: &str = "memorial-api";

/// Which session role a token plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived credential authorizing ordinary requests.
    Access,
    /// Long-lived credential used solely to mint new access tokens.
    Refresh,
}

/// Identity facts carried inside a signed token. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id.
    pub sub: i64,
    pub username: String,
    pub is_admin: bool,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
    pub iss: String,
    pub kind: TokenKind,
}

/// Outcome of token verification. Callers must branch on all three:
/// an expired-but-well-signed token is a recoverable case (the client
/// should re-authenticate), a tampered one is not.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Valid(Claims),
    Expired,
    Invalid,
}

/// Issues and verifies tokens against the process-wide signing secret.
///
/// Pure aside from reading the clock; safe to share across any number
/// of concurrent requests without locking.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue a token of the given kind for the given identity, using the
    /// configured TTL for that kind.
    pub fn issue(
        &self,
        subject_id: i64,
        username: &str,
        is_admin: bool,
        kind: TokenKind,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        self.issue_at(subject_id, username, is_admin, kind, ttl, now_secs())
    }

    /// Issue with an explicit TTL and clock. Tests use this to produce
    /// already-expired tokens without sleeping.
    pub(crate) fn issue_at(
        &self,
        subject_id: i64,
        username: &str,
        is_admin: bool,
        kind: TokenKind,
        ttl: Duration,
        now: u64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: subject_id,
            username: username.to_string(),
            is_admin,
            iat: now,
            exp: now + ttl.as_secs(),
            iss: ISSUER.to_string(),
            kind,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Decode and check a token: signature, structure, algorithm and
    /// issuer first, then expiry.
    pub fn verify(&self, token: &str) -> Verification {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Verification::Valid(data.claims),
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Verification::Expired,
                _ => Verification::Invalid,
            },
        }
    }

    /// The refresh flow: a valid, non-expired refresh token mints a new
    /// access token carrying the same identity. Access-kind tokens are
    /// rejected here so a stolen short-lived token cannot extend itself.
    pub fn refresh_access(&self, refresh_token: &str) -> Result<String, Verification> {
        match self.verify(refresh_token) {
            Verification::Valid(claims) if claims.kind == TokenKind::Refresh => self
                .issue(claims.sub, &claims.username, claims.is_admin, TokenKind::Access)
                .map_err(|_| Verification::Invalid),
            Verification::Valid(_) => Err(Verification::Invalid),
            other => Err(other),
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
