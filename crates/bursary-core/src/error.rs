//! Error types for `bursary-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown request status: {0:?}")]
  UnknownRequestStatus(String),

  #[error("unknown listing status: {0:?}")]
  UnknownListingStatus(String),

  #[error("unknown academic performance: {0:?}")]
  UnknownAcademicPerformance(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
