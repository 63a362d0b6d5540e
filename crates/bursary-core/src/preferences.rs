//! Student preferences: the caller-supplied input driving a pack request.
//!
//! Every field is optional. Present fields narrow the accommodation query and
//! are interpolated into the prompt; absent fields are simply left out.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Self-reported academic standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcademicPerformance {
  Excellent,
  Good,
  Average,
  BelowAverage,
}

impl AcademicPerformance {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Excellent => "excellent",
      Self::Good => "good",
      Self::Average => "average",
      Self::BelowAverage => "below-average",
    }
  }
}

impl fmt::Display for AcademicPerformance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for AcademicPerformance {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "excellent" => Ok(Self::Excellent),
      "good" => Ok(Self::Good),
      "average" => Ok(Self::Average),
      "below-average" => Ok(Self::BelowAverage),
      other => Err(Error::UnknownAcademicPerformance(other.to_owned())),
    }
  }
}

/// Filters and context supplied by the student.
///
/// Serialises in camelCase with absent fields omitted, so the serialised
/// form doubles as the cache key (see [`crate::cache::cache_key`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub university:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub city:                 Option<String>,
  /// Upper bound on monthly rent, in rand.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_budget:           Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub field_of_study:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub academic_performance: Option<AcademicPerformance>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub nsfas_eligible:       Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub diversity:            Option<String>,
}
