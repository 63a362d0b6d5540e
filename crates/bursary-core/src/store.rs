//! The `PackStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `bursary-store-sqlite`).
//! The server and the pipeline depend on this abstraction, not on any concrete
//! backend, which also lets tests substitute stores that fail loudly when an
//! operation must not be reached.

use std::future::Future;

use uuid::Uuid;

use crate::{
  cache::CacheEntry,
  feature::FeatureSetting,
  identity::Principal,
  ledger::{RequestRecord, RequestStatus},
  listing::{Accommodation, Bursary},
  pack::PackResult,
  preferences::Preferences,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Filters for [`PackStore::list_accommodations`].
///
/// Only active listings are ever returned. Each present field adds one
/// AND-combined clause; absent fields add none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccommodationQuery {
  pub university: Option<String>,
  pub city:       Option<String>,
  /// `monthly_cost <= max_budget`.
  pub max_budget: Option<f64>,
  pub limit:      Option<usize>,
}

impl AccommodationQuery {
  /// The filters implied by a student's preferences.
  pub fn from_preferences(prefs: &Preferences) -> Self {
    Self {
      university: prefs.university.clone(),
      city:       prefs.city.clone(),
      max_budget: prefs.max_budget,
      limit:      None,
    }
  }

  pub fn with_limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }
}

/// Filters for [`PackStore::list_requests`]. Results are newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestQuery {
  pub user_id: Option<Uuid>,
  pub status:  Option<RequestStatus>,
  pub limit:   Option<usize>,
  pub offset:  Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the data store backing the pack pipeline.
///
/// Every write targets a single row keyed by its own identifier, so backends
/// need no application-level locking.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PackStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identity ──────────────────────────────────────────────────────────

  /// Resolve the SHA-256 hex digest of a bearer token to its principal.
  fn resolve_token(
    &self,
    token_hash: String,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + '_;

  // ── Feature flags ─────────────────────────────────────────────────────

  /// Whether `feature` is enabled. A missing flag reads as disabled.
  fn feature_enabled(
    &self,
    feature: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Create or update a flag.
  fn set_feature(
    &self,
    feature: String,
    enabled: bool,
  ) -> impl Future<Output = Result<FeatureSetting, Self::Error>> + Send + '_;

  fn list_features(
    &self,
  ) -> impl Future<Output = Result<Vec<FeatureSetting>, Self::Error>> + Send + '_;

  // ── Cache ─────────────────────────────────────────────────────────────

  /// Return the entry under `key` if one exists and has not expired.
  fn cache_get(
    &self,
    key: String,
  ) -> impl Future<Output = Result<Option<CacheEntry>, Self::Error>> + Send + '_;

  /// Insert `entry`, overwriting any existing entry with the same key.
  fn cache_put(
    &self,
    entry: CacheEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete every expired entry and return how many were removed.
  fn cache_evict_expired(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Request ledger ────────────────────────────────────────────────────

  /// Record a new attempt in `processing` state.
  fn create_request(
    &self,
    user_id: Uuid,
    request_data: Preferences,
  ) -> impl Future<Output = Result<RequestRecord, Self::Error>> + Send + '_;

  /// Mark a record `completed` with its payload.
  fn complete_request(
    &self,
    id: Uuid,
    response: PackResult,
    from_cache: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Mark a record `failed` with the reason.
  fn fail_request(
    &self,
    id: Uuid,
    reason: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_request(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<RequestRecord>, Self::Error>> + Send + '_;

  fn list_requests<'a>(
    &'a self,
    query: &'a RequestQuery,
  ) -> impl Future<Output = Result<Vec<RequestRecord>, Self::Error>> + Send + 'a;

  // ── Listings (read-only) ──────────────────────────────────────────────

  /// Active accommodations matching `query`, cheapest first.
  fn list_accommodations<'a>(
    &'a self,
    query: &'a AccommodationQuery,
  ) -> impl Future<Output = Result<Vec<Accommodation>, Self::Error>> + Send + 'a;

  /// Active bursaries, largest amount first.
  fn list_bursaries(
    &self,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Bursary>, Self::Error>> + Send + '_;
}
