//! Admin feature-flag endpoints.

use axum::{
  Json,
  extract::{Path, State, rejection::{JsonRejection, PathRejection}},
};
use bursary_core::{completion::CompletionProvider, feature::FeatureSetting, store::PackStore};
use serde::Deserialize;

use crate::{
  AppState,
  auth::AdminUser,
  error::{Error, Result},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSetting {
  pub is_enabled: bool,
}

/// `GET /api/admin/settings`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  AdminUser(_): AdminUser,
) -> Result<Json<Vec<FeatureSetting>>>
where
  S: PackStore + 'static,
  C: CompletionProvider + 'static,
{
  let settings = state.store.list_features().await.map_err(Error::store)?;
  Ok(Json(settings))
}

/// `PUT /api/admin/settings/{feature}`
///
/// Takes effect on the next generation request; nothing caches the flag.
pub async fn update<S, C>(
  State(state): State<AppState<S, C>>,
  AdminUser(admin): AdminUser,
  feature: Result<Path<String>, PathRejection>,
  payload: Result<Json<UpdateSetting>, JsonRejection>,
) -> Result<Json<FeatureSetting>>
where
  S: PackStore + 'static,
  C: CompletionProvider + 'static,
{
  let Path(feature) = feature?;
  let Json(update)  = payload?;

  let setting = state
    .store
    .set_feature(feature, update.is_enabled)
    .await
    .map_err(Error::store)?;
  tracing::info!(
    admin = %admin.user_id,
    feature = %setting.feature_name,
    enabled = setting.is_enabled,
    "feature flag updated"
  );
  Ok(Json(setting))
}
