//! Test doubles shared by the unit tests in this crate.

use std::{
  collections::VecDeque,
  path::PathBuf,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use bursary_core::completion::{ChatMessage, CompletionError, CompletionProvider};

use crate::ServerConfig;

/// A completion provider that replays canned replies in order and records
/// what it was asked. Once the script runs out it answers `EmptyResponse`.
#[derive(Default)]
pub struct ScriptedCompletion {
  replies:  Mutex<VecDeque<Result<String, CompletionError>>>,
  calls:    AtomicUsize,
  last_ask: Mutex<Vec<ChatMessage>>,
}

impl ScriptedCompletion {
  pub fn new(replies: impl IntoIterator<Item = Result<String, CompletionError>>) -> Self {
    Self { replies: Mutex::new(replies.into_iter().collect()), ..Default::default() }
  }

  /// Reply with `text` to every call, up to `times` times.
  pub fn replying(text: &str, times: usize) -> Self {
    Self::new((0..times).map(|_| Ok(text.to_owned())))
  }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

  /// The user message of the most recent call.
  pub fn last_user_message(&self) -> Option<String> {
    self.last_ask.lock().unwrap().get(1).map(|m| m.content.clone())
  }
}

impl CompletionProvider for ScriptedCompletion {
  async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    *self.last_ask.lock().unwrap() = messages.to_vec();
    self
      .replies
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or(Err(CompletionError::EmptyResponse))
  }
}

/// A pack array as a model would wrap it.
pub const FENCED_PACKS: &str = "Here you go:\n```json\n[{\"packName\":\"Hatfield + NSFAS\",\"whyMatch\":\"within budget\"}]\n```";

pub fn test_config() -> ServerConfig {
  ServerConfig {
    host:                      "127.0.0.1".to_string(),
    port:                      8080,
    store_path:                PathBuf::from(":memory:"),
    completion_base_url:       "http://127.0.0.1:9/v1".to_string(),
    completion_api_key:        "sk-test".to_string(),
    completion_model:          "test-model".to_string(),
    completion_timeout_secs:   60,
    cache_ttl_hours:           24,
    feature_name:              "bursary_pack".to_string(),
    prompt_max_accommodations: 25,
    prompt_max_bursaries:      25,
  }
}
