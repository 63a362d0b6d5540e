//! Error type for `bursary-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] bursary_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A ledger update targeted a record that is missing or already terminal.
  #[error("request {0} is not awaiting completion")]
  RequestNotProcessing(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
