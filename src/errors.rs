use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

// Error body sent to clients: a single "detail" string.

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// Failures surfaced by the market endpoints.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The provider has no usable data for the requested ticker/period.
    #[error("{0}")]
    NotFound(String),

    /// Any other failure while contacting or parsing the provider response.
    #[error("{0}")]
    Upstream(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}

/// Transport and decode failures from the provider client.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed provider payload: {0}")]
    Decode(#[from] serde_json::Error),
}
