//! HTTP client for a hosted, OpenAI-compatible chat-completion endpoint.

use std::time::Duration;

use bursary_core::completion::{ChatMessage, CompletionError, CompletionProvider};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Connection settings for the completion provider.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
  /// Base URL up to and including the API version, e.g. `https://api.openai.com/v1`.
  pub base_url: String,
  /// Bearer credential. Held server-side only.
  pub api_key:  String,
  pub model:    String,
  pub timeout:  Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:    &'a str,
  messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

/// Chat-completion client.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based. Performs no
/// retries; every failure is reported as a [`CompletionError`].
#[derive(Clone)]
pub struct HttpCompletionClient {
  client: Client,
  config: CompletionConfig,
}

impl HttpCompletionClient {
  pub fn new(config: CompletionConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
  }
}

fn transport_error(e: reqwest::Error) -> CompletionError {
  if e.is_timeout() {
    CompletionError::Timeout
  } else {
    CompletionError::Transport(e.to_string())
  }
}

impl CompletionProvider for HttpCompletionClient {
  async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
    let body = ChatRequest { model: &self.config.model, messages };

    let resp = self
      .client
      .post(self.url())
      .bearer_auth(&self.config.api_key)
      .json(&body)
      .send()
      .await
      .map_err(transport_error)?;

    match resp.status() {
      StatusCode::TOO_MANY_REQUESTS => return Err(CompletionError::RateLimited),
      StatusCode::PAYMENT_REQUIRED => return Err(CompletionError::QuotaExhausted),
      status if !status.is_success() => {
        let detail = resp.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), %detail, "completion provider error");
        return Err(CompletionError::Upstream { status: status.as_u16() });
      }
      _ => {}
    }

    let parsed: ChatResponse = resp.json().await.map_err(transport_error)?;
    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or(CompletionError::EmptyResponse)
  }
}
