//! Caller identity resolved from a bearer credential.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
  pub user_id:  Uuid,
  /// Admins may toggle feature flags and inspect every user's ledger.
  pub is_admin: bool,
}
