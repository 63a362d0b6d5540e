//! [`SqliteStore`]: the SQLite implementation of [`PackStore`].

use std::path::Path;

use bursary_core::{
  cache::CacheEntry,
  feature::FeatureSetting,
  identity::Principal,
  ledger::{RequestRecord, RequestStatus},
  listing::{Accommodation, Bursary},
  pack::PackResult,
  preferences::Preferences,
  store::{AccommodationQuery, PackStore, RequestQuery},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawAccommodation, RawBursary, RawCacheEntry, RawFeature, RawPrincipal, RawRequest,
    encode_dt, encode_json, encode_uuid,
  },
  schema::SCHEMA,
};

const ACCOMMODATION_COLUMNS: &str = "id, property_name, property_type, address, city, province,
  university, monthly_cost, rooms_available, amenities, nsfas_accredited, status, created_at";

const BURSARY_COLUMNS: &str =
  "id, name, provider, amount, criteria, requirements, status, created_at";

const REQUEST_COLUMNS: &str = "id, user_id, request_data, status, response_data, from_cache,
  error, created_at, completed_at";

fn read_accommodation(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAccommodation> {
  Ok(RawAccommodation {
    id:               row.get(0)?,
    property_name:    row.get(1)?,
    property_type:    row.get(2)?,
    address:          row.get(3)?,
    city:             row.get(4)?,
    province:         row.get(5)?,
    university:       row.get(6)?,
    monthly_cost:     row.get(7)?,
    rooms_available:  row.get(8)?,
    amenities:        row.get(9)?,
    nsfas_accredited: row.get(10)?,
    status:           row.get(11)?,
    created_at:       row.get(12)?,
  })
}

fn read_bursary(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawBursary> {
  Ok(RawBursary {
    id:           row.get(0)?,
    name:         row.get(1)?,
    provider:     row.get(2)?,
    amount:       row.get(3)?,
    criteria:     row.get(4)?,
    requirements: row.get(5)?,
    status:       row.get(6)?,
    created_at:   row.get(7)?,
  })
}

fn read_request(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRequest> {
  Ok(RawRequest {
    id:            row.get(0)?,
    user_id:       row.get(1)?,
    request_data:  row.get(2)?,
    status:        row.get(3)?,
    response_data: row.get(4)?,
    from_cache:    row.get(5)?,
    error:         row.get(6)?,
    created_at:    row.get(7)?,
    completed_at:  row.get(8)?,
  })
}

/// SQLite's "no limit" sentinel for `LIMIT`.
fn sql_limit(limit: Option<usize>) -> i64 {
  limit.map_or(-1, |l| l as i64)
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// A batch of listings to load, e.g. from a JSON export of the admin
/// back-office.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingImport {
  #[serde(default)]
  pub accommodations: Vec<Accommodation>,
  #[serde(default)]
  pub bursaries:      Vec<Bursary>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A bursary pack store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Register the SHA-256 hex digest of a bearer token for `principal`.
  pub async fn register_token(&self, token_hash: String, principal: Principal) -> Result<()> {
    let user_id_str = encode_uuid(principal.user_id);
    let at_str      = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO api_tokens (token_hash, user_id, is_admin, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_hash, user_id_str, principal.is_admin, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or replace an accommodation listing by id.
  pub async fn upsert_accommodation(&self, a: &Accommodation) -> Result<()> {
    let id_str        = encode_uuid(a.id);
    let amenities_str = encode_json(&a.amenities)?;
    let status_str    = a.status.as_str();
    let created_str   = encode_dt(a.created_at);
    let a             = a.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accommodations (
             id, property_name, property_type, address, city, province,
             university, monthly_cost, rooms_available, amenities,
             nsfas_accredited, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
           ON CONFLICT(id) DO UPDATE SET
             property_name    = excluded.property_name,
             property_type    = excluded.property_type,
             address          = excluded.address,
             city             = excluded.city,
             province         = excluded.province,
             university       = excluded.university,
             monthly_cost     = excluded.monthly_cost,
             rooms_available  = excluded.rooms_available,
             amenities        = excluded.amenities,
             nsfas_accredited = excluded.nsfas_accredited,
             status           = excluded.status",
          rusqlite::params![
            id_str,
            a.property_name,
            a.property_type,
            a.address,
            a.city,
            a.province,
            a.university,
            a.monthly_cost,
            i64::from(a.rooms_available),
            amenities_str,
            a.nsfas_accredited,
            status_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or replace a bursary by id.
  pub async fn upsert_bursary(&self, b: &Bursary) -> Result<()> {
    let id_str      = encode_uuid(b.id);
    let status_str  = b.status.as_str();
    let created_str = encode_dt(b.created_at);
    let b           = b.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO bursaries (
             id, name, provider, amount, criteria, requirements, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT(id) DO UPDATE SET
             name         = excluded.name,
             provider     = excluded.provider,
             amount       = excluded.amount,
             criteria     = excluded.criteria,
             requirements = excluded.requirements,
             status       = excluded.status",
          rusqlite::params![
            id_str,
            b.name,
            b.provider,
            b.amount,
            b.criteria,
            b.requirements,
            status_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Upsert every listing in `import`. Returns `(accommodations, bursaries)`
  /// counts.
  pub async fn import_listings(&self, import: &ListingImport) -> Result<(usize, usize)> {
    for a in &import.accommodations {
      self.upsert_accommodation(a).await?;
    }
    for b in &import.bursaries {
      self.upsert_bursary(b).await?;
    }
    tracing::info!(
      accommodations = import.accommodations.len(),
      bursaries = import.bursaries.len(),
      "imported listings"
    );
    Ok((import.accommodations.len(), import.bursaries.len()))
  }

  /// Shared body of `complete_request` / `fail_request`: update a record that
  /// is still `processing`, or report that it is not.
  async fn terminate_request(
    &self,
    id: Uuid,
    status: RequestStatus,
    response: Option<String>,
    from_cache: Option<bool>,
    error: Option<String>,
  ) -> Result<()> {
    let id_str     = encode_uuid(id);
    let status_str = status.as_str();
    let at_str     = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE ai_pack_requests
           SET status = ?2, response_data = ?3, from_cache = ?4, error = ?5, completed_at = ?6
           WHERE id = ?1 AND status = 'processing'",
          rusqlite::params![id_str, status_str, response, from_cache, error, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::RequestNotProcessing(id));
    }
    Ok(())
  }
}

// ─── PackStore impl ──────────────────────────────────────────────────────────

impl PackStore for SqliteStore {
  type Error = Error;

  // ── Identity ──────────────────────────────────────────────────────────────

  async fn resolve_token(&self, token_hash: String) -> Result<Option<Principal>> {
    let raw: Option<RawPrincipal> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, is_admin FROM api_tokens WHERE token_hash = ?1",
            rusqlite::params![token_hash],
            |row| Ok(RawPrincipal { user_id: row.get(0)?, is_admin: row.get(1)? }),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPrincipal::into_principal).transpose()
  }

  // ── Feature flags ─────────────────────────────────────────────────────────

  async fn feature_enabled(&self, feature: String) -> Result<bool> {
    let enabled: Option<bool> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT is_enabled FROM ai_settings WHERE feature_name = ?1",
            rusqlite::params![feature],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(enabled.unwrap_or(false))
  }

  async fn set_feature(&self, feature: String, enabled: bool) -> Result<FeatureSetting> {
    let setting = FeatureSetting {
      feature_name: feature,
      is_enabled:   enabled,
      updated_at:   Utc::now(),
    };

    let name   = setting.feature_name.clone();
    let at_str = encode_dt(setting.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ai_settings (feature_name, is_enabled, updated_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(feature_name) DO UPDATE SET
             is_enabled = excluded.is_enabled,
             updated_at = excluded.updated_at",
          rusqlite::params![name, enabled, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(setting)
  }

  async fn list_features(&self) -> Result<Vec<FeatureSetting>> {
    let raws: Vec<RawFeature> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT feature_name, is_enabled, updated_at FROM ai_settings ORDER BY feature_name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawFeature {
              feature_name: row.get(0)?,
              is_enabled:   row.get(1)?,
              updated_at:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFeature::into_setting).collect()
  }

  // ── Cache ─────────────────────────────────────────────────────────────────

  async fn cache_get(&self, key: String) -> Result<Option<CacheEntry>> {
    let now_str = encode_dt(Utc::now());

    let raw: Option<RawCacheEntry> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT cache_key, pack_data, expires_at, created_at
             FROM ai_pack_cache
             WHERE cache_key = ?1 AND expires_at > ?2",
            rusqlite::params![key, now_str],
            |row| {
              Ok(RawCacheEntry {
                cache_key:  row.get(0)?,
                pack_data:  row.get(1)?,
                expires_at: row.get(2)?,
                created_at: row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCacheEntry::into_entry).transpose()
  }

  async fn cache_put(&self, entry: CacheEntry) -> Result<()> {
    let data_str    = encode_json(&entry.pack_data)?;
    let expires_str = encode_dt(entry.expires_at);
    let created_str = encode_dt(entry.created_at);
    let key         = entry.cache_key;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ai_pack_cache (cache_key, pack_data, expires_at, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(cache_key) DO UPDATE SET
             pack_data  = excluded.pack_data,
             expires_at = excluded.expires_at,
             created_at = excluded.created_at",
          rusqlite::params![key, data_str, expires_str, created_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn cache_evict_expired(&self) -> Result<u64> {
    let now_str = encode_dt(Utc::now());

    let evicted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM ai_pack_cache WHERE expires_at <= ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;

    if evicted > 0 {
      tracing::info!(evicted, "evicted expired pack cache entries");
    }
    Ok(evicted as u64)
  }

  // ── Request ledger ────────────────────────────────────────────────────────

  async fn create_request(
    &self,
    user_id:      Uuid,
    request_data: Preferences,
  ) -> Result<RequestRecord> {
    let record = RequestRecord {
      id: Uuid::new_v4(),
      user_id,
      request_data,
      status: RequestStatus::Processing,
      response_data: None,
      from_cache: None,
      error: None,
      created_at: Utc::now(),
      completed_at: None,
    };

    let id_str      = encode_uuid(record.id);
    let user_id_str = encode_uuid(user_id);
    let data_str    = encode_json(&record.request_data)?;
    let status_str  = record.status.as_str();
    let at_str      = encode_dt(record.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ai_pack_requests (id, user_id, request_data, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, user_id_str, data_str, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn complete_request(
    &self,
    id:         Uuid,
    response:   PackResult,
    from_cache: bool,
  ) -> Result<()> {
    let response_str = encode_json(&response)?;
    self
      .terminate_request(id, RequestStatus::Completed, Some(response_str), Some(from_cache), None)
      .await
  }

  async fn fail_request(&self, id: Uuid, reason: String) -> Result<()> {
    self
      .terminate_request(id, RequestStatus::Failed, None, None, Some(reason))
      .await
  }

  async fn get_request(&self, id: Uuid) -> Result<Option<RequestRecord>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawRequest> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {REQUEST_COLUMNS} FROM ai_pack_requests WHERE id = ?1"),
            rusqlite::params![id_str],
            read_request,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRequest::into_record).transpose()
  }

  async fn list_requests(&self, query: &RequestQuery) -> Result<Vec<RequestRecord>> {
    let user_id_str = query.user_id.map(encode_uuid);
    let status_str  = query.status.map(RequestStatus::as_str);
    let limit_val   = sql_limit(query.limit);
    let offset_val  = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawRequest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REQUEST_COLUMNS}
           FROM ai_pack_requests
           WHERE (?1 IS NULL OR user_id = ?1)
             AND (?2 IS NULL OR status = ?2)
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![user_id_str, status_str, limit_val, offset_val],
            read_request,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRequest::into_record).collect()
  }

  // ── Listings ──────────────────────────────────────────────────────────────

  async fn list_accommodations(&self, query: &AccommodationQuery) -> Result<Vec<Accommodation>> {
    let university = query.university.clone();
    let city       = query.city.clone();
    let max_budget = query.max_budget;
    let limit_val  = sql_limit(query.limit);

    tracing::debug!(?query, "listing accommodations");

    // A NULL parameter disables its clause entirely.
    let raws: Vec<RawAccommodation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ACCOMMODATION_COLUMNS}
           FROM accommodations
           WHERE status = 'active'
             AND (?1 IS NULL OR university = ?1)
             AND (?2 IS NULL OR city = ?2)
             AND (?3 IS NULL OR monthly_cost <= ?3)
           ORDER BY monthly_cost ASC, property_name ASC
           LIMIT ?4"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![university, city, max_budget, limit_val],
            read_accommodation,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccommodation::into_accommodation).collect()
  }

  async fn list_bursaries(&self, limit: Option<usize>) -> Result<Vec<Bursary>> {
    let limit_val = sql_limit(limit);

    let raws: Vec<RawBursary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {BURSARY_COLUMNS}
           FROM bursaries
           WHERE status = 'active'
           ORDER BY amount IS NULL, amount DESC, name ASC
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], read_bursary)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBursary::into_bursary).collect()
  }
}
