//! Packs: bundled accommodation and bursary recommendations.
//!
//! Packs come from a language model, so their shape is only loosely enforced:
//! every field is optional, text fields accept any JSON value, and unknown
//! fields are carried through untouched. Consumers render missing fields as
//! `N/A`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Message attached to [`PackResult::RawFallback`].
pub const FALLBACK_MESSAGE: &str = "AI generated a text response instead of structured data";

/// One recommendation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub pack_name:            Option<String>,
  /// Denormalised snapshot of the chosen accommodation.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub accommodation:        Option<Value>,
  /// Denormalised snapshot of the chosen bursary.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bursary:              Option<Value>,
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub financial_breakdown:  Option<String>,
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub application_strategy: Option<String>,
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub why_match:            Option<String>,
  /// Anything else the model decided to include.
  #[serde(flatten)]
  pub extra:                Map<String, Value>,
}

/// Accept a string as-is, `null` as `None`, and any other JSON value as its
/// compact textual form.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::Null => None,
    Value::String(s) => Some(s),
    other => Some(other.to_string()),
  })
}

/// The normalised outcome of a generation.
///
/// Untagged on the wire: valid packs serialise as a JSON array, the fallback
/// as an object with `raw_response` and `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PackResult {
  ValidPacks(Vec<Pack>),
  RawFallback {
    raw_response: String,
    message:      String,
  },
}

impl PackResult {
  /// Build the fallback variant for an unparseable completion.
  pub fn fallback(raw_response: impl Into<String>) -> Self {
    Self::RawFallback {
      raw_response: raw_response.into(),
      message:      FALLBACK_MESSAGE.to_owned(),
    }
  }

  pub fn is_fallback(&self) -> bool { matches!(self, Self::RawFallback { .. }) }

  /// The packs, or an empty slice for the fallback variant.
  pub fn packs(&self) -> &[Pack] {
    match self {
      Self::ValidPacks(packs) => packs,
      Self::RawFallback { .. } => &[],
    }
  }
}

/// What a successful generation returns to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackResponse {
  pub pack:       PackResult,
  pub from_cache: bool,
}
