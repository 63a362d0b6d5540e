//! The request ledger: one audit row per pack generation attempt.
//!
//! A record is created in [`RequestStatus::Processing`] before any expensive
//! work and terminated exactly once, as either `Completed` or `Failed`.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, pack::PackResult, preferences::Preferences};

/// Lifecycle state of a [`RequestRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
  Processing,
  Completed,
  Failed,
}

impl RequestStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Processing => "processing",
      Self::Completed => "completed",
      Self::Failed => "failed",
    }
  }

  pub fn is_terminal(self) -> bool { !matches!(self, Self::Processing) }
}

impl fmt::Display for RequestStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RequestStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "processing" => Ok(Self::Processing),
      "completed" => Ok(Self::Completed),
      "failed" => Ok(Self::Failed),
      other => Err(Error::UnknownRequestStatus(other.to_owned())),
    }
  }
}

/// One generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
  pub id:            Uuid,
  pub user_id:       Uuid,
  pub request_data:  Preferences,
  pub status:        RequestStatus,
  pub response_data: Option<PackResult>,
  /// Whether the response was served from the cache. Unset until completed.
  pub from_cache:    Option<bool>,
  /// Error message for `Failed` records.
  pub error:         Option<String>,
  pub created_at:    DateTime<Utc>,
  pub completed_at:  Option<DateTime<Utc>>,
}
