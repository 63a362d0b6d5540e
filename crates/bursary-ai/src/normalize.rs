//! Tolerant extraction of packs from a completion's text.

use bursary_core::pack::{Pack, PackResult};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Normalise raw completion text into a [`PackResult`].
///
/// When the text contains a fenced block labelled `json`, only the fenced
/// content is parsed; otherwise the whole text is. A JSON array of pack
/// objects yields [`PackResult::ValidPacks`]. Anything else yields
/// [`PackResult::RawFallback`] carrying the original text. Never fails.
pub fn normalize(raw: &str) -> PackResult {
  let candidate = fenced_json(raw).unwrap_or(raw).trim();

  match serde_json::from_str::<Vec<Pack>>(candidate) {
    Ok(packs) => PackResult::ValidPacks(packs),
    Err(e) => {
      tracing::warn!(error = %e, "completion is not a JSON pack array, keeping raw text");
      PackResult::fallback(raw)
    }
  }
}

/// The content of the first ```` ```json ```` block, if it is closed.
fn fenced_json(text: &str) -> Option<&str> {
  let start = text.find(JSON_FENCE)? + JSON_FENCE.len();
  let rest  = &text[start..];
  let end   = rest.find(FENCE)?;
  Some(&rest[..end])
}
