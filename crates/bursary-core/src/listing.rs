//! Accommodation and bursary listings.
//!
//! Both collections are owned by the admin back-office; the pack pipeline only
//! ever reads them, and only sees rows whose status is [`ListingStatus::Active`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Publication state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
  #[default]
  Active,
  Inactive,
  Pending,
}

impl ListingStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Inactive => "inactive",
      Self::Pending => "pending",
    }
  }
}

impl FromStr for ListingStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "active" => Ok(Self::Active),
      "inactive" => Ok(Self::Inactive),
      "pending" => Ok(Self::Pending),
      other => Err(Error::UnknownListingStatus(other.to_owned())),
    }
  }
}

/// A student accommodation listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accommodation {
  pub id:               Uuid,
  pub property_name:    String,
  /// Free-form, e.g. `"apartment"`, `"commune"`, `"residence"`.
  pub property_type:    String,
  pub address:          String,
  pub city:             String,
  pub province:         String,
  /// The university this listing is advertised to.
  pub university:       Option<String>,
  /// Rent per month, in rand.
  pub monthly_cost:     f64,
  pub rooms_available:  u32,
  #[serde(default)]
  pub amenities:        Vec<String>,
  #[serde(default)]
  pub nsfas_accredited: bool,
  #[serde(default)]
  pub status:           ListingStatus,
  #[serde(default = "Utc::now")]
  pub created_at:       DateTime<Utc>,
}

/// A bursary on offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bursary {
  pub id:           Uuid,
  pub name:         String,
  pub provider:     String,
  /// Value in rand; `None` when the provider does not publish it.
  pub amount:       Option<f64>,
  pub criteria:     Option<String>,
  pub requirements: Option<String>,
  #[serde(default)]
  pub status:       ListingStatus,
  #[serde(default = "Utc::now")]
  pub created_at:   DateTime<Utc>,
}
