//! Bearer-token extractors.
//!
//! Tokens are opaque random strings. Only their SHA-256 hex digest is stored,
//! so a leaked database does not leak usable credentials.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bursary_core::{completion::CompletionProvider, identity::Principal, store::PackStore};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::{AppState, error::Error};

/// Number of random bytes in a freshly issued token.
const TOKEN_BYTES: usize = 32;

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Principal);

/// An authenticated caller holding the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub Principal);

/// Generate a new random bearer token.
pub fn generate_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

/// The digest under which `token` is stored.
pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Pull the token out of an `Authorization: Bearer …` header. The scheme
/// name is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split_once(' '))
    .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
    .map(|(_, token)| token.trim())
    .ok_or(Error::Unauthorized)?;

  if token.is_empty() {
    return Err(Error::Unauthorized);
  }
  Ok(token)
}

/// Resolve the principal behind the request's bearer token.
pub async fn verify_bearer<S: PackStore>(headers: &HeaderMap, store: &S) -> Result<Principal, Error> {
  let token = bearer_token(headers)?;
  store
    .resolve_token(hash_token(token))
    .await
    .map_err(Error::store)?
    .ok_or(Error::Unauthorized)
}

impl<S, C> FromRequestParts<AppState<S, C>> for CurrentUser
where
  S: PackStore + 'static,
  C: CompletionProvider + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, C>,
  ) -> Result<Self, Self::Rejection> {
    let principal = verify_bearer(&parts.headers, state.store.as_ref()).await?;
    Ok(CurrentUser(principal))
  }
}

impl<S, C> FromRequestParts<AppState<S, C>> for AdminUser
where
  S: PackStore + 'static,
  C: CompletionProvider + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, C>,
  ) -> Result<Self, Self::Rejection> {
    let CurrentUser(principal) = CurrentUser::from_request_parts(parts, state).await?;
    if !principal.is_admin {
      tracing::warn!(user_id = %principal.user_id, "non-admin attempted an admin operation");
      return Err(Error::Forbidden);
    }
    Ok(AdminUser(principal))
  }
}
