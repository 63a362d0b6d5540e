//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that string comparison in SQL orders them chronologically.
//! Structured fields (preferences, pack results, amenities) are stored as
//! compact JSON. UUIDs are stored as hyphenated lowercase strings.

use bursary_core::{
  cache::CacheEntry,
  feature::FeatureSetting,
  identity::Principal,
  ledger::RequestRecord,
  listing::{Accommodation, Bursary},
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JSON columns ─────────────────────────────────────────────────────────────

pub fn encode_json<T: Serialize>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_json<T: DeserializeOwned>(s: &str) -> Result<T> {
  Ok(serde_json::from_str(s)?)
}

// ─── Raw row types ────────────────────────────────────────────────────────────
//
// Rows are read into these plain structs inside the `tokio_rusqlite` closure
// (which may only return rusqlite errors) and decoded afterwards.

pub struct RawAccommodation {
  pub id:               String,
  pub property_name:    String,
  pub property_type:    String,
  pub address:          String,
  pub city:             String,
  pub province:         String,
  pub university:       Option<String>,
  pub monthly_cost:     f64,
  pub rooms_available:  i64,
  pub amenities:        String,
  pub nsfas_accredited: bool,
  pub status:           String,
  pub created_at:       String,
}

impl RawAccommodation {
  pub fn into_accommodation(self) -> Result<Accommodation> {
    Ok(Accommodation {
      id:               decode_uuid(&self.id)?,
      property_name:    self.property_name,
      property_type:    self.property_type,
      address:          self.address,
      city:             self.city,
      province:         self.province,
      university:       self.university,
      monthly_cost:     self.monthly_cost,
      rooms_available:  u32::try_from(self.rooms_available).unwrap_or(0),
      amenities:        decode_json(&self.amenities)?,
      nsfas_accredited: self.nsfas_accredited,
      status:           self.status.parse()?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawBursary {
  pub id:           String,
  pub name:         String,
  pub provider:     String,
  pub amount:       Option<f64>,
  pub criteria:     Option<String>,
  pub requirements: Option<String>,
  pub status:       String,
  pub created_at:   String,
}

impl RawBursary {
  pub fn into_bursary(self) -> Result<Bursary> {
    Ok(Bursary {
      id:           decode_uuid(&self.id)?,
      name:         self.name,
      provider:     self.provider,
      amount:       self.amount,
      criteria:     self.criteria,
      requirements: self.requirements,
      status:       self.status.parse()?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawCacheEntry {
  pub cache_key:  String,
  pub pack_data:  String,
  pub expires_at: String,
  pub created_at: String,
}

impl RawCacheEntry {
  pub fn into_entry(self) -> Result<CacheEntry> {
    Ok(CacheEntry {
      cache_key:  self.cache_key,
      pack_data:  decode_json(&self.pack_data)?,
      expires_at: decode_dt(&self.expires_at)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawRequest {
  pub id:            String,
  pub user_id:       String,
  pub request_data:  String,
  pub status:        String,
  pub response_data: Option<String>,
  pub from_cache:    Option<bool>,
  pub error:         Option<String>,
  pub created_at:    String,
  pub completed_at:  Option<String>,
}

impl RawRequest {
  pub fn into_record(self) -> Result<RequestRecord> {
    Ok(RequestRecord {
      id:            decode_uuid(&self.id)?,
      user_id:       decode_uuid(&self.user_id)?,
      request_data:  decode_json(&self.request_data)?,
      status:        self.status.parse()?,
      response_data: self.response_data.as_deref().map(decode_json).transpose()?,
      from_cache:    self.from_cache,
      error:         self.error,
      created_at:    decode_dt(&self.created_at)?,
      completed_at:  self.completed_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

pub struct RawFeature {
  pub feature_name: String,
  pub is_enabled:   bool,
  pub updated_at:   String,
}

impl RawFeature {
  pub fn into_setting(self) -> Result<FeatureSetting> {
    Ok(FeatureSetting {
      feature_name: self.feature_name,
      is_enabled:   self.is_enabled,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawPrincipal {
  pub user_id:  String,
  pub is_admin: bool,
}

impl RawPrincipal {
  pub fn into_principal(self) -> Result<Principal> {
    Ok(Principal { user_id: decode_uuid(&self.user_id)?, is_admin: self.is_admin })
  }
}
