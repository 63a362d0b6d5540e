//! JSON route handlers.
//!
//! Extractor rejections are folded into [`Error::BadRequest`] so every error
//! response carries the same `{"error": …}` body.

pub mod cache;
pub mod health;
pub mod packs;
pub mod requests;
pub mod settings;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};

use crate::error::Error;

/// Page size when the caller does not ask for one.
pub(super) const DEFAULT_PAGE_SIZE: usize = 50;
/// Largest page a caller may request.
pub(super) const MAX_PAGE_SIZE: usize = 200;

pub(super) fn page_size(limit: Option<usize>) -> usize {
  limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
}

impl From<JsonRejection> for Error {
  fn from(r: JsonRejection) -> Self { Error::BadRequest(r.body_text()) }
}

impl From<QueryRejection> for Error {
  fn from(r: QueryRejection) -> Self { Error::BadRequest(r.body_text()) }
}

impl From<PathRejection> for Error {
  fn from(r: PathRejection) -> Self { Error::BadRequest(r.body_text()) }
}
