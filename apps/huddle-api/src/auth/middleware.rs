//! Identity resolution extractors.
//!
//! A session token is read from `Authorization: Bearer <jwt>` or, for browser page loads,
//! from the `__session` cookie.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::StatusCode;

use crate::auth::session::{self, SessionClaims};
use crate::error::ApiError;
use crate::models::profile::Profile;
use crate::AppState;

/// Cookie the identity provider's frontend SDK stores the session token in.
pub const SESSION_COOKIE: &str = "__session";

/// Find the raw session token on a request.
pub fn session_token(parts: &Parts) -> Option<&str> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

/// Validated session claims. Rejects with 401 when the token is missing or invalid.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub claims: SessionClaims,
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or_else(ApiError::unauthorized)?;
        let claims = session::validate_session(
            token,
            &state.jwks,
            &state.config.identity_issuer,
            state.config.identity_audience.as_deref(),
        )
        .await?;

        Ok(SessionUser { claims })
    }
}

/// Resolve the profile behind a request, if any.
///
/// A missing, invalid or expired token, or a subject with no profile yet, resolves to
/// `None`. Provider or store outages are errors.
pub async fn resolve_profile(parts: &mut Parts, state: &AppState) -> Result<Option<Profile>, ApiError> {
    let user = match SessionUser::from_request_parts(parts, state).await {
        Ok(user) => user,
        Err(err) if err.status == StatusCode::UNAUTHORIZED => return Ok(None),
        Err(err) => return Err(err),
    };

    let profile = state
        .store
        .find_profile_by_user_id(&user.claims.sub)
        .await
        .map_err(|err| ApiError::from_store("CURRENT_PROFILE", err))?;

    if profile.is_none() {
        tracing::debug!(sub = %user.claims.sub, "signed in without a profile");
    }

    Ok(profile)
}

/// The requesting profile. Rejects with 401 "Unauthorized" when none resolves.
#[derive(Debug, Clone)]
pub struct CurrentProfile(pub Profile);

impl FromRequestParts<AppState> for CurrentProfile {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_profile(parts, state)
            .await?
            .map(CurrentProfile)
            .ok_or_else(ApiError::unauthorized)
    }
}

/// The requesting profile for page routes, which redirect instead of rejecting.
#[derive(Debug, Clone)]
pub struct MaybeProfile(pub Option<Profile>);

impl FromRequestParts<AppState> for MaybeProfile {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeProfile(resolve_profile(parts, state).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_wins() {
        let p = parts(&[
            ("authorization", "Bearer abc.def.ghi"),
            ("cookie", "__session=cookie.token"),
        ]);
        assert_eq!(session_token(&p), Some("abc.def.ghi"));
    }

    #[test]
    fn session_cookie_is_used_without_bearer() {
        let p = parts(&[("cookie", "theme=dark; __session=cookie.token; other=1")]);
        assert_eq!(session_token(&p), Some("cookie.token"));
    }

    #[test]
    fn no_token() {
        let p = parts(&[("cookie", "__session=")]);
        assert_eq!(session_token(&p), None);
        assert_eq!(session_token(&parts(&[("authorization", "Basic xyz")])), None);
    }
}
