use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diesel_async::pooled_connection::deadpool::PoolError;

/// Failure reported by a [`Store`](crate::db::store::Store) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row matched the lookup, including lookups scoped to an owner.
    #[error("record not found")]
    NotFound,
    /// A unique value (such as an invite code) is already taken.
    #[error("unique value already in use")]
    Conflict,
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
}

/// Application-level error type that converts into a plain-text HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized".to_string(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal Error".to_string(),
        }
    }

    /// Map a store failure at an endpoint boundary.
    ///
    /// `NotFound` becomes a 404. Anything else is logged under `tag` and reported as an
    /// opaque 500.
    pub fn from_store(tag: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::not_found("Not Found"),
            StoreError::Conflict => {
                tracing::warn!(tag, "unique value conflict");
                Self::conflict("Conflict")
            }
            err => {
                tracing::error!(tag, error = %err, "store failure");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::from_store("STORE", err)
    }
}
