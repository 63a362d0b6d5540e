//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use bursary_core::completion::CompletionError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("admin access required")]
  Forbidden,
  #[error("bursary pack generation is currently disabled")]
  FeatureDisabled,
  #[error("not found")]
  NotFound,
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error(transparent)]
  Completion(#[from] CompletionError),
  #[error("prompt error: {0}")]
  Prompt(#[from] bursary_ai::Error),
  #[error("core error: {0}")]
  Core(#[from] bursary_core::Error),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// Box a backend error.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Store(Box::new(e))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::FeatureDisabled => StatusCode::SERVICE_UNAVAILABLE,
      Error::NotFound => StatusCode::NOT_FOUND,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      Error::Completion(CompletionError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
      Error::Completion(CompletionError::QuotaExhausted) => StatusCode::PAYMENT_REQUIRED,
      Error::Completion(_) | Error::Prompt(_) | Error::Core(_) | Error::Store(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
      tracing::error!(error = %self, "request failed");
    }

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if let Error::Unauthorized = self {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"bursary\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn body_of(res: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn unauthorized_carries_challenge() {
    let res = Error::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let challenge = res.headers().get(header::WWW_AUTHENTICATE).unwrap().to_str().unwrap();
    assert!(challenge.starts_with("Bearer"));
    assert_eq!(body_of(res).await["error"], "unauthorized");
  }

  #[tokio::test]
  async fn rate_limit_message_reaches_the_caller() {
    let res = Error::from(CompletionError::RateLimited).into_response();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_of(res).await["error"], "rate limit exceeded, please try again later");
  }

  #[test]
  fn completion_failures_map_to_statuses() {
    assert_eq!(Error::from(CompletionError::QuotaExhausted).status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(Error::from(CompletionError::Timeout).status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
      Error::from(CompletionError::Upstream { status: 503 }).status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn gate_errors_map_to_statuses() {
    assert_eq!(Error::FeatureDisabled.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(Error::Forbidden.status(), StatusCode::FORBIDDEN);
    assert_eq!(Error::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
  }
}
