use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::clock::Clock;
use crate::types::{Platform, SponsorId, UserId};

/// Token codec failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TokenError {
    /// No token was supplied (absent or blank).
    #[error("token not found")]
    Missing,
    /// The token decoded but its `exp` claim is absent or not in the future.
    #[error("token expired")]
    Expired,
    /// The token could not be decoded into the expected claim shape.
    #[error("malformed token: {0}")]
    Malformed(String),
}

/// A decodable claim shape.
pub trait Claims: DeserializeOwned {
    /// Expiry as seconds since the unix epoch, if the token carries one.
    fn expires_at_unix(&self) -> Option<i64>;
}

/// Claims carried by the portal's access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct AccessClaims {
    /// Issuing app/bot.
    pub iss: String,
    pub sub: UserId,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub platform_id: Option<String>,
    #[serde(default)]
    pub platform_handle: Option<String>,
    /// Present when another user pays for this user's usage.
    #[serde(default)]
    pub sponsored_by: Option<SponsorId>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub version: Option<String>,
}

impl AccessClaims {
    /// Create claims with only the required fields.
    #[must_use]
    pub fn new(iss: impl Into<String>, sub: impl Into<UserId>) -> Self {
        Self {
            iss: iss.into(),
            sub: sub.into(),
            platform: Platform::Unknown,
            platform_id: None,
            platform_handle: None,
            sponsored_by: None,
            iat: None,
            exp: None,
            version: None,
        }
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn with_platform_handle(mut self, handle: impl Into<String>) -> Self {
        self.platform_handle = Some(handle.into());
        self
    }

    #[must_use]
    pub fn with_sponsor(mut self, sponsor: impl Into<SponsorId>) -> Self {
        self.sponsored_by = Some(sponsor.into());
        self
    }

    #[must_use]
    pub fn with_expiry(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    #[must_use]
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    #[must_use]
    pub fn is_sponsored(&self) -> bool {
        self.sponsored_by.is_some()
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.exp.and_then(|s| OffsetDateTime::from_unix_timestamp(s).ok())
    }

    #[must_use]
    pub fn issued_at(&self) -> Option<OffsetDateTime> {
        self.iat.and_then(|s| OffsetDateTime::from_unix_timestamp(s).ok())
    }
}

impl Claims for AccessClaims {
    fn expires_at_unix(&self) -> Option<i64> {
        self.exp
    }
}

/// Claims of the older chat-scoped tokens.
///
/// Still issued for some links; kept separate from [`AccessClaims`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct LegacyClaims {
    pub iss: String,
    pub sub: UserId,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub telegram_user_id: Option<i64>,
    #[serde(default)]
    pub telegram_username: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims for LegacyClaims {
    fn expires_at_unix(&self) -> Option<i64> {
        self.exp
    }
}

/// A raw token together with its decoded claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken<C> {
    raw: String,
    claims: C,
}

impl<C> DecodedToken<C> {
    /// The raw token, as sent in the `Authorization` header.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn claims(&self) -> &C {
        &self.claims
    }

    #[must_use]
    pub fn into_parts(self) -> (String, C) {
        (self.raw, self.claims)
    }
}

/// Decodes a token and checks that it has not expired.
///
/// The signature is not verified: the token is a bearer credential and the
/// API server is the one that authenticates it.
///
/// # Errors
///
/// - [`TokenError::Missing`] if `raw` is empty or blank.
/// - [`TokenError::Malformed`] if the token is not a decodable JWT of shape `C`.
/// - [`TokenError::Expired`] if `exp` is absent or not after `clock.now()`.
pub fn decode<C: Claims>(raw: &str, clock: &impl Clock) -> Result<DecodedToken<C>, TokenError> {
    let token = decode_unchecked::<C>(raw)?;
    if is_expired(&token.claims, clock) {
        return Err(TokenError::Expired);
    }
    Ok(token)
}

/// Decodes a token without checking expiry.
///
/// # Errors
///
/// [`TokenError::Missing`] or [`TokenError::Malformed`], as for [`decode`].
pub fn decode_unchecked<C: Claims>(raw: &str) -> Result<DecodedToken<C>, TokenError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TokenError::Missing);
    }

    let payload = extract_payload(raw)?;
    let claims: C = serde_json::from_slice(&payload)
        .map_err(|e| TokenError::Malformed(format!("invalid claims: {e}")))?;

    Ok(DecodedToken {
        raw: raw.to_owned(),
        claims,
    })
}

/// Whether the claims are expired at the clock's current time.
///
/// Claims without `exp` are treated as expired. Computed on every call.
#[must_use]
pub fn is_expired<C: Claims>(claims: &C, clock: &impl Clock) -> bool {
    match claims.expires_at_unix() {
        Some(exp) => exp <= clock.now().unix_timestamp(),
        None => true,
    }
}

/// Extracts and base64url-decodes the payload segment of a JWT.
fn extract_payload(raw: &str) -> Result<Vec<u8>, TokenError> {
    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Malformed(format!(
            "expected 3 segments, got {}",
            parts.len()
        )));
    }

    let payload_b64 = parts[1].trim_end_matches('=');
    if payload_b64.is_empty() {
        return Err(TokenError::Malformed("empty payload".into()));
    }

    URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|e| TokenError::Malformed(format!("invalid payload encoding: {e}")))
}

/// Builds an unsigned JWT carrying `claims`. For tests and local tooling.
///
/// # Errors
///
/// Returns [`TokenError::Malformed`] if the claims cannot be serialized.
pub fn encode_unsigned<C: Serialize>(claims: &C) -> Result<String, TokenError> {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = serde_json::to_vec(claims)
        .map_err(|e| TokenError::Malformed(format!("invalid claims: {e}")))?;
    Ok(format!("{header}.{}.", URL_SAFE_NO_PAD.encode(payload)))
}
