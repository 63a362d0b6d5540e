//! The `CompletionProvider` trait, implemented by hosted chat-completion backends.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
}

/// A single message in a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role:    Role,
  pub content: String,
}

impl ChatMessage {
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: Role::System, content: content.into() }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self { role: Role::User, content: content.into() }
  }
}

/// Failure modes of a completion call. None of them are retried by the
/// provider itself.
#[derive(Debug, Error)]
pub enum CompletionError {
  /// HTTP 429. Try again later.
  #[error("rate limit exceeded, please try again later")]
  RateLimited,

  /// HTTP 402. Credits are exhausted and an operator has to top them up.
  #[error("AI credits exhausted, please contact support")]
  QuotaExhausted,

  #[error("completion provider returned status {status}")]
  Upstream { status: u16 },

  #[error("completion request timed out")]
  Timeout,

  #[error("completion response contained no message content")]
  EmptyResponse,

  #[error("completion transport error: {0}")]
  Transport(String),
}

/// Abstraction over a chat-completion backend.
pub trait CompletionProvider: Send + Sync {
  /// Send `messages` and return the text content of the first choice.
  fn complete<'a>(
    &'a self,
    messages: &'a [ChatMessage],
  ) -> impl Future<Output = Result<String, CompletionError>> + Send + 'a;
}
