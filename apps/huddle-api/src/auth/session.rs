//! Session token validation.
//!
//! The identity provider signs a short-lived JWT for every signed-in browser session. This
//! module verifies it and exposes the identity claims.

use jsonwebtoken::Validation;
use serde::{Deserialize, Serialize};

use crate::auth::jwks::JwksClient;
use crate::error::ApiError;
use crate::models::profile::ProfileSeed;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub iss: String,
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl SessionClaims {
    /// Attributes for the profile created on first sign-in.
    pub fn profile_seed(&self) -> ProfileSeed {
        let email = self.email.clone().unwrap_or_default();
        let name = self
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| email.split('@').next().map(str::to_string))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.sub.clone());

        ProfileSeed {
            user_id: self.sub.clone(),
            name,
            image_url: self.picture.clone().unwrap_or_default(),
            email,
        }
    }
}

/// Validate a session JWT and return its claims.
///
/// Checks:
///   1. Signature via the provider's JWKS, with the algorithm bound to the key
///   2. `exp` (jsonwebtoken handles this)
///   3. `iss` matches the configured issuer
///   4. `aud` matches, when an audience is configured
pub async fn validate_session(
    token: &str,
    jwks: &JwksClient,
    expected_issuer: &str,
    expected_audience: Option<&str>,
) -> Result<SessionClaims, ApiError> {
    let header = jsonwebtoken::decode_header(token).map_err(|e| {
        tracing::debug!(?e, "session header decode failed");
        ApiError::unauthorized()
    })?;

    let kid = header.kid.ok_or_else(|| {
        tracing::debug!("session token missing kid");
        ApiError::unauthorized()
    })?;

    let key = jwks.get_key(&kid).await?;
    if header.alg != key.algorithm {
        tracing::debug!(alg = ?header.alg, expected = ?key.algorithm, "session token algorithm mismatch");
        return Err(ApiError::unauthorized());
    }

    let mut validation = Validation::new(key.algorithm);
    validation.set_issuer(&[expected_issuer]);
    match expected_audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }

    let token_data =
        jsonwebtoken::decode::<SessionClaims>(token, &key.key, &validation).map_err(|e| {
            tracing::debug!(?e, "session validation failed");
            ApiError::unauthorized()
        })?;

    Ok(token_data.claims)
}
