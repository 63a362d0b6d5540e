//! Async HTTP client wrapping the bursary JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use bursary_core::{
  ledger::{RequestRecord, RequestStatus},
  pack::PackResponse,
  preferences::Preferences,
};
use reqwest::{Client, Response};
use serde::Deserialize;

/// Connection settings for the bursary API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub token:    String,
}

/// Async HTTP client for the bursary JSON API.
///
/// Generation can take as long as the server's completion timeout, so the
/// request timeout here is generous.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(120))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.token.is_empty() {
      req
    } else {
      req.bearer_auth(&self.config.token)
    }
  }

  /// `POST /api/bursary-pack`
  pub async fn generate_pack(&self, prefs: &Preferences) -> Result<PackResponse> {
    let resp = self
      .auth(self.client.post(self.url("/bursary-pack")))
      .json(prefs)
      .send()
      .await
      .context("POST /bursary-pack failed")?;

    let resp = ensure_success(resp, "POST /bursary-pack").await?;
    resp.json().await.context("deserialising pack response")
  }

  /// `GET /api/requests[?status=<s>&limit=<n>]`
  pub async fn list_requests(
    &self,
    status: Option<RequestStatus>,
    limit: usize,
  ) -> Result<Vec<RequestRecord>> {
    let mut query = vec![("limit", limit.to_string())];
    if let Some(status) = status {
      query.push(("status", status.to_string()));
    }

    let resp = self
      .auth(self.client.get(self.url("/requests")))
      .query(&query)
      .send()
      .await
      .context("GET /requests failed")?;

    let resp = ensure_success(resp, "GET /requests").await?;
    resp.json().await.context("deserialising request history")
  }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn ensure_success(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  tracing::debug!(%status, "{what} rejected");

  let message = match resp.json::<ErrorBody>().await {
    Ok(body) => body.error,
    Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
  };
  Err(anyhow!("{what} → {status}: {message}"))
}

#[cfg(test)]
mod tests {
  use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
  };
  use serde_json::json;
  use tokio::net::TcpListener;

  use super::*;

  async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr     = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  fn client(base_url: String) -> ApiClient {
    ApiClient::new(ApiConfig { base_url, token: "tok".into() }).unwrap()
  }

  #[tokio::test]
  async fn pack_response_is_decoded() {
    let app = Router::new().route(
      "/api/bursary-pack",
      post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
        assert_eq!(headers["authorization"], "Bearer tok");
        assert_eq!(body["city"], "Durban");
        Json(json!({ "pack": [{ "packName": "Coastal" }], "fromCache": true }))
      }),
    );
    let url   = serve(app).await;
    let prefs = Preferences { city: Some("Durban".into()), ..Default::default() };

    let resp = client(url).generate_pack(&prefs).await.unwrap();
    assert!(resp.from_cache);
    assert_eq!(resp.pack.packs()[0].pack_name.as_deref(), Some("Coastal"));
  }

  #[tokio::test]
  async fn server_error_message_is_surfaced() {
    let app = Router::new().route(
      "/api/bursary-pack",
      post(|| async {
        (
          StatusCode::TOO_MANY_REQUESTS,
          Json(json!({ "error": "rate limit exceeded, please try again later" })),
        )
          .into_response()
      }),
    );
    let url = serve(app).await;

    let err = client(url).generate_pack(&Preferences::default()).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("429"), "{msg}");
    assert!(msg.contains("rate limit exceeded"), "{msg}");
  }

  #[tokio::test]
  async fn history_sends_filters() {
    let app = Router::new().route(
      "/api/requests",
      get(|axum::extract::RawQuery(q): axum::extract::RawQuery| async move {
        let q = q.unwrap_or_default();
        assert!(q.contains("limit=5"), "{q}");
        assert!(q.contains("status=failed"), "{q}");
        Json(json!([]))
      }),
    );
    let url = serve(app).await;

    let records = client(url).list_requests(Some(RequestStatus::Failed), 5).await.unwrap();
    assert!(records.is_empty());
  }
}
