//! Navigation outcomes for page-style routes.
//!
//! Workflows return a [`PageOutcome`] and stay free of HTTP; the route layer turns it into a
//! response with [`PageOutcome::respond`].

use axum::response::{IntoResponse, Redirect, Response};

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome<T> {
    /// No signed-in profile. `return_to` is where to come back after signing in.
    SignInRequired { return_to: String },
    /// Navigate elsewhere.
    Redirect(String),
    /// Render the page with this data.
    Rendered(T),
}

impl<T> PageOutcome<T> {
    pub fn redirect(target: impl Into<String>) -> Self {
        PageOutcome::Redirect(target.into())
    }
}

impl<T: IntoResponse> PageOutcome<T> {
    pub fn respond(self, sign_in_url: &str) -> Response {
        match self {
            PageOutcome::SignInRequired { return_to } => {
                Redirect::temporary(&sign_in_location(sign_in_url, &return_to)).into_response()
            }
            PageOutcome::Redirect(target) => Redirect::temporary(&target).into_response(),
            PageOutcome::Rendered(body) => body.into_response(),
        }
    }
}

/// `/sign-in` + `/invite/abc` → `/sign-in?redirect_url=%2Finvite%2Fabc`
pub fn sign_in_location(sign_in_url: &str, return_to: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
    let separator = if sign_in_url.contains('?') { '&' } else { '?' };
    format!("{sign_in_url}{separator}redirect_url={encoded}")
}
