//! Cache entries and cache-key derivation.
//!
//! Entries are never deleted on read. Expiry is a read-time predicate
//! (`expires_at > now`); dead rows linger until overwritten by an upsert with
//! the same key or evicted explicitly.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, pack::PackResult, preferences::Preferences};

/// Default lifetime of a cache entry, in hours.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// A previously generated result, keyed by the serialised preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
  pub cache_key:  String,
  pub pack_data:  PackResult,
  pub expires_at: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
}

impl CacheEntry {
  /// A fresh entry created now and living for `ttl`.
  pub fn new(cache_key: String, pack_data: PackResult, ttl: TimeDelta) -> Self {
    let created_at = Utc::now();
    Self { cache_key, pack_data, expires_at: created_at + ttl, created_at }
  }

  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool { self.expires_at <= now }
}

/// Derive the cache key for `prefs`.
///
/// The key is the JSON serialisation of the preferences, fields in declaration
/// order with absent fields omitted. Two requests that differ only in the key
/// order of their JSON bodies therefore share an entry.
pub fn cache_key(prefs: &Preferences) -> Result<String> {
  Ok(serde_json::to_string(prefs)?)
}
