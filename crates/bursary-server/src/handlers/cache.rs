//! `POST /api/admin/cache/evict`: purge expired cache rows.

use axum::{Json, extract::State};
use bursary_core::{completion::CompletionProvider, store::PackStore};
use serde_json::{Value, json};

use crate::{
  AppState,
  auth::AdminUser,
  error::{Error, Result},
};

pub async fn evict<S, C>(
  State(state): State<AppState<S, C>>,
  AdminUser(admin): AdminUser,
) -> Result<Json<Value>>
where
  S: PackStore + 'static,
  C: CompletionProvider + 'static,
{
  let evicted = state.store.cache_evict_expired().await.map_err(Error::store)?;
  tracing::info!(admin = %admin.user_id, evicted, "evicted expired cache entries");
  Ok(Json(json!({ "evicted": evicted })))
}
