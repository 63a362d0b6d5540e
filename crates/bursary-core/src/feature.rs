//! Feature flags. Shared booleans that gate whole capabilities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the flag gating pack generation.
pub const BURSARY_PACK_FEATURE: &str = "bursary_pack";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSetting {
  pub feature_name: String,
  pub is_enabled:   bool,
  pub updated_at:   DateTime<Utc>,
}
