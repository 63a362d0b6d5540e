//! `POST /api/bursary-pack`: generate packs for the caller's preferences.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use bursary_core::{
  completion::CompletionProvider,
  pack::PackResponse,
  preferences::Preferences,
  store::PackStore,
};

use crate::{AppState, auth::CurrentUser, error::Result};

pub async fn generate<S, C>(
  State(state): State<AppState<S, C>>,
  CurrentUser(principal): CurrentUser,
  payload: Result<Json<Preferences>, JsonRejection>,
) -> Result<Json<PackResponse>>
where
  S: PackStore + 'static,
  C: CompletionProvider + 'static,
{
  let Json(prefs) = payload?;
  tracing::debug!(user_id = %principal.user_id, ?prefs, "pack requested");
  let response = state.pipeline.generate(&principal, prefs).await?;
  Ok(Json(response))
}
