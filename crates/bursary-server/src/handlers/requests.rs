//! Request ledger endpoints.

use axum::{
  Json,
  extract::{Path, Query, State, rejection::{PathRejection, QueryRejection}},
};
use bursary_core::{
  completion::CompletionProvider,
  ledger::{RequestRecord, RequestStatus},
  store::{PackStore, RequestQuery},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AdminUser, CurrentUser},
  error::{Error, Result},
  handlers::page_size,
};

/// Query string of `GET /api/requests`.
#[derive(Debug, Default, Deserialize)]
pub struct OwnParams {
  pub status: Option<RequestStatus>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// Query string of `GET /api/admin/requests`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminParams {
  pub status:  Option<RequestStatus>,
  pub user_id: Option<Uuid>,
  pub limit:   Option<usize>,
  pub offset:  Option<usize>,
}

/// `GET /api/requests`: the caller's own history, newest first.
pub async fn list_own<S, C>(
  State(state): State<AppState<S, C>>,
  CurrentUser(principal): CurrentUser,
  params: Result<Query<OwnParams>, QueryRejection>,
) -> Result<Json<Vec<RequestRecord>>>
where
  S: PackStore + 'static,
  C: CompletionProvider + 'static,
{
  let Query(params) = params?;
  let query = RequestQuery {
    user_id: Some(principal.user_id),
    status:  params.status,
    limit:   Some(page_size(params.limit)),
    offset:  params.offset,
  };
  let records = state.store.list_requests(&query).await.map_err(Error::store)?;
  Ok(Json(records))
}

/// `GET /api/requests/{id}`
///
/// Other users' records read as missing, except to admins.
pub async fn get_own<S, C>(
  State(state): State<AppState<S, C>>,
  CurrentUser(principal): CurrentUser,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<RequestRecord>>
where
  S: PackStore + 'static,
  C: CompletionProvider + 'static,
{
  let Path(id) = id?;
  let record = state
    .store
    .get_request(id)
    .await
    .map_err(Error::store)?
    .filter(|r| r.user_id == principal.user_id || principal.is_admin)
    .ok_or(Error::NotFound)?;
  Ok(Json(record))
}

/// `GET /api/admin/requests`: every user's records.
pub async fn list_all<S, C>(
  State(state): State<AppState<S, C>>,
  AdminUser(_): AdminUser,
  params: Result<Query<AdminParams>, QueryRejection>,
) -> Result<Json<Vec<RequestRecord>>>
where
  S: PackStore + 'static,
  C: CompletionProvider + 'static,
{
  let Query(params) = params?;
  let query = RequestQuery {
    user_id: params.user_id,
    status:  params.status,
    limit:   Some(page_size(params.limit)),
    offset:  params.offset,
  };
  let records = state.store.list_requests(&query).await.map_err(Error::store)?;
  Ok(Json(records))
}
