//! HTTP layer for the bursary pack service.
//!
//! Exposes an axum [`Router`] serving the pack generation endpoint, the
//! caller's request history and the admin surface, backed by any
//! [`PackStore`] and any [`CompletionProvider`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pipeline;

#[cfg(test)]
mod testing;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post, put},
};
use bursary_ai::CompletionConfig;
use bursary_core::{
  cache::DEFAULT_TTL_HOURS,
  completion::CompletionProvider,
  feature::BURSARY_PACK_FEATURE,
  store::PackStore,
};
use chrono::TimeDelta;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{cache, health, packs, requests, settings};
use pipeline::{PackPipeline, PipelineConfig};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `BURSARY_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                      String,
  #[serde(default = "default_port")]
  pub port:                      u16,
  pub store_path:                PathBuf,
  /// OpenAI-compatible API root.
  #[serde(default = "default_completion_base_url")]
  pub completion_base_url:       String,
  /// Never sent to clients.
  #[serde(default)]
  pub completion_api_key:        String,
  #[serde(default = "default_completion_model")]
  pub completion_model:          String,
  #[serde(default = "default_completion_timeout_secs")]
  pub completion_timeout_secs:   u64,
  #[serde(default = "default_cache_ttl_hours")]
  pub cache_ttl_hours:           i64,
  #[serde(default = "default_feature_name")]
  pub feature_name:              String,
  #[serde(default = "default_prompt_limit")]
  pub prompt_max_accommodations: usize,
  #[serde(default = "default_prompt_limit")]
  pub prompt_max_bursaries:      usize,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_completion_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_completion_model() -> String { "gpt-4o-mini".to_string() }
fn default_completion_timeout_secs() -> u64 { 60 }
fn default_cache_ttl_hours() -> i64 { DEFAULT_TTL_HOURS }
fn default_feature_name() -> String { BURSARY_PACK_FEATURE.to_string() }
fn default_prompt_limit() -> usize { 25 }

impl ServerConfig {
  /// Settings for the HTTP completion client.
  pub fn completion(&self) -> CompletionConfig {
    CompletionConfig {
      base_url: self.completion_base_url.clone(),
      api_key:  self.completion_api_key.clone(),
      model:    self.completion_model.clone(),
      timeout:  Duration::from_secs(self.completion_timeout_secs),
    }
  }

  /// Lifetime of cache entries. `None` unless `cache_ttl_hours` is a
  /// positive number of hours that fits in a [`TimeDelta`].
  pub fn cache_ttl(&self) -> Option<TimeDelta> {
    TimeDelta::try_hours(self.cache_ttl_hours).filter(|ttl| *ttl > TimeDelta::zero())
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, C> {
  pub store:    Arc<S>,
  pub pipeline: Arc<PackPipeline<S, C>>,
  pub config:   Arc<ServerConfig>,
}

impl<S, C> Clone for AppState<S, C> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      pipeline: self.pipeline.clone(),
      config:   self.config.clone(),
    }
  }
}

impl<S, C> AppState<S, C>
where
  S: PackStore,
  C: CompletionProvider,
{
  pub fn new(store: Arc<S>, completion: Arc<C>, config: ServerConfig) -> Self {
    let pipeline = PackPipeline::new(store.clone(), completion, PipelineConfig::from(&config));
    Self {
      store,
      pipeline: Arc::new(pipeline),
      config: Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the service.
pub fn router<S, C>(state: AppState<S, C>) -> Router
where
  S: PackStore + 'static,
  C: CompletionProvider + 'static,
{
  Router::new()
    .route("/health",                       get(health::handler))
    .route("/api/bursary-pack",             post(packs::generate::<S, C>))
    .route("/api/requests",                 get(requests::list_own::<S, C>))
    .route("/api/requests/{id}",            get(requests::get_own::<S, C>))
    .route("/api/admin/settings",           get(settings::list::<S, C>))
    .route("/api/admin/settings/{feature}", put(settings::update::<S, C>))
    .route("/api/admin/requests",           get(requests::list_all::<S, C>))
    .route("/api/admin/cache/evict",        post(cache::evict::<S, C>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use bursary_core::{
    identity::Principal,
    listing::{Accommodation, ListingStatus},
    store::RequestQuery,
  };
  use bursary_store_sqlite::SqliteStore;
  use chrono::Utc;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use crate::{
    auth::{generate_token, hash_token},
    testing::{FENCED_PACKS, ScriptedCompletion, test_config},
  };

  struct Harness {
    state:      AppState<SqliteStore, ScriptedCompletion>,
    completion: Arc<ScriptedCompletion>,
    user:       String,
    admin:      String,
  }

  async fn harness(completion: ScriptedCompletion) -> Harness {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.set_feature("bursary_pack".into(), true).await.unwrap();
    store
      .upsert_accommodation(&Accommodation {
        id:               Uuid::new_v4(),
        property_name:    "Hatfield Studios".into(),
        property_type:    "apartment".into(),
        address:          "12 Burnett St".into(),
        city:             "Pretoria".into(),
        province:         "Gauteng".into(),
        university:       Some("University of Pretoria".into()),
        monthly_cost:     3800.0,
        rooms_available:  4,
        amenities:        vec!["wifi".into()],
        nsfas_accredited: true,
        status:           ListingStatus::Active,
        created_at:       Utc::now(),
      })
      .await
      .unwrap();

    let user  = generate_token();
    let admin = generate_token();
    store
      .register_token(hash_token(&user), Principal { user_id: Uuid::new_v4(), is_admin: false })
      .await
      .unwrap();
    store
      .register_token(hash_token(&admin), Principal { user_id: Uuid::new_v4(), is_admin: true })
      .await
      .unwrap();

    let completion = Arc::new(completion);
    let state      = AppState::new(Arc::new(store), completion.clone(), test_config());
    Harness { state, completion, user, admin }
  }

  async fn send(
    h:      &Harness,
    method: &str,
    uri:    &str,
    token:  Option<&str>,
    body:   Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    router(h.state.clone()).oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn pretoria() -> Value {
    json!({ "city": "Pretoria", "maxBudget": 4000, "nsfasEligible": true })
  }

  // ── Health ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_needs_no_auth() {
    let h    = harness(ScriptedCompletion::default()).await;
    let resp = send(&h, "GET", "/health", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "status": "ok" }));
  }

  // ── Generation ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unauthenticated_generation_leaves_no_trace() {
    let h    = harness(ScriptedCompletion::replying(FENCED_PACKS, 1)).await;
    let resp = send(&h, "POST", "/api/bursary-pack", None, Some(pretoria())).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
    assert_eq!(json_body(resp).await["error"], "unauthorized");

    let records = h.state.store.list_requests(&RequestQuery::default()).await.unwrap();
    assert!(records.is_empty());
    assert_eq!(h.completion.calls(), 0);
  }

  #[tokio::test]
  async fn second_identical_request_is_served_from_cache() {
    let h = harness(ScriptedCompletion::replying(FENCED_PACKS, 2)).await;

    let first = send(&h, "POST", "/api/bursary-pack", Some(h.user.as_str()), Some(pretoria())).await;
    assert_eq!(first.status(), StatusCode::OK);
    let first = json_body(first).await;
    assert_eq!(first["fromCache"], false);
    assert_eq!(first["pack"][0]["packName"], "Hatfield + NSFAS");

    let prompt = h.completion.last_user_message().unwrap();
    assert!(prompt.contains("Preferred City: Pretoria"));
    assert!(prompt.contains("Budget: Up to R4000/month"));
    assert!(prompt.contains("NSFAS Eligible: Yes"));

    let reordered = json!({ "nsfasEligible": true, "maxBudget": 4000, "city": "Pretoria" });
    let second = send(&h, "POST", "/api/bursary-pack", Some(h.user.as_str()), Some(reordered)).await;
    let second = json_body(second).await;
    assert_eq!(second["fromCache"], true);
    assert_eq!(second["pack"], first["pack"]);
    assert_eq!(h.completion.calls(), 1);

    let history = send(&h, "GET", "/api/requests", Some(h.user.as_str()), None).await;
    let history = json_body(history).await;
    assert_eq!(history.as_array().unwrap().len(), 2);
    assert_eq!(history[0]["fromCache"], true);
    assert_eq!(history[0]["status"], "completed");
  }

  #[tokio::test]
  async fn malformed_body_is_bad_request() {
    let h    = harness(ScriptedCompletion::default()).await;
    let resp = send(&h, "POST", "/api/bursary-pack", Some(h.user.as_str()), Some(json!({ "maxBudget": "lots" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn quota_exhaustion_surfaces_as_402() {
    let h = harness(ScriptedCompletion::new([Err(
      bursary_core::completion::CompletionError::QuotaExhausted,
    )]))
    .await;
    let resp = send(&h, "POST", "/api/bursary-pack", Some(h.user.as_str()), Some(pretoria())).await;
    assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(json_body(resp).await["error"], "AI credits exhausted, please contact support");

    let history = json_body(send(&h, "GET", "/api/requests?status=failed", Some(h.user.as_str()), None).await).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
  }

  // ── Admin ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_routes_reject_regular_users() {
    let h = harness(ScriptedCompletion::default()).await;
    for (method, uri) in [
      ("GET", "/api/admin/settings"),
      ("GET", "/api/admin/requests"),
      ("POST", "/api/admin/cache/evict"),
    ] {
      let resp = send(&h, method, uri, Some(h.user.as_str()), None).await;
      assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{method} {uri}");
    }
    let resp = send(&h, "PUT", "/api/admin/settings/bursary_pack", Some(h.user.as_str()), Some(json!({ "isEnabled": false }))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn disabling_the_flag_stops_generation() {
    let h = harness(ScriptedCompletion::replying(FENCED_PACKS, 1)).await;

    let resp = send(&h, "PUT", "/api/admin/settings/bursary_pack", Some(h.admin.as_str()), Some(json!({ "isEnabled": false }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let setting = json_body(resp).await;
    assert_eq!(setting["featureName"], "bursary_pack");
    assert_eq!(setting["isEnabled"], false);

    let resp = send(&h, "POST", "/api/bursary-pack", Some(h.user.as_str()), Some(pretoria())).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(h.completion.calls(), 0);

    let records = h.state.store.list_requests(&RequestQuery::default()).await.unwrap();
    assert!(records.is_empty());

    let settings = json_body(send(&h, "GET", "/api/admin/settings", Some(h.admin.as_str()), None).await).await;
    assert_eq!(settings[0]["isEnabled"], false);
  }

  #[tokio::test]
  async fn records_are_private_to_their_owner() {
    let h = harness(ScriptedCompletion::replying(FENCED_PACKS, 1)).await;
    send(&h, "POST", "/api/bursary-pack", Some(h.admin.as_str()), Some(pretoria())).await;

    let all = json_body(send(&h, "GET", "/api/admin/requests", Some(h.admin.as_str()), None).await).await;
    let id  = all[0]["id"].as_str().unwrap().to_owned();

    let resp = send(&h, "GET", &format!("/api/requests/{id}"), Some(h.user.as_str()), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&h, "GET", &format!("/api/requests/{id}"), Some(h.admin.as_str()), None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let own = json_body(send(&h, "GET", "/api/requests", Some(h.user.as_str()), None).await).await;
    assert!(own.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn evict_reports_count() {
    let h    = harness(ScriptedCompletion::default()).await;
    let resp = send(&h, "POST", "/api/admin/cache/evict", Some(h.admin.as_str()), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "evicted": 0 }));
  }

  #[tokio::test]
  async fn invalid_request_id_is_bad_request() {
    let h    = harness(ScriptedCompletion::default()).await;
    let resp = send(&h, "GET", "/api/requests/not-a-uuid", Some(h.user.as_str()), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Configuration ───────────────────────────────────────────────────────────

  #[test]
  fn config_defaults_fill_optional_fields() {
    let cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from_str(
        r#"
          store_path       = "/tmp/bursary.db"
          completion_model = "gpt-test"
        "#,
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.completion_base_url, "https://api.openai.com/v1");
    assert_eq!(cfg.completion_model, "gpt-test");
    assert_eq!(cfg.completion_timeout_secs, 60);
    assert_eq!(cfg.cache_ttl_hours, 24);
    assert_eq!(cfg.feature_name, "bursary_pack");
    assert_eq!(cfg.prompt_max_accommodations, 25);
    assert!(cfg.completion_api_key.is_empty());
    assert_eq!(cfg.completion().timeout, Duration::from_secs(60));
    assert_eq!(cfg.cache_ttl(), Some(TimeDelta::hours(24)));
  }

  #[test]
  fn out_of_range_cache_ttl_is_rejected() {
    for hours in [0, -5, i64::MAX / 1000] {
      let cfg = ServerConfig { cache_ttl_hours: hours, ..test_config() };
      assert_eq!(cfg.cache_ttl(), None, "{hours}h was accepted");
      // Building the pipeline must not panic either.
      let pipeline = PipelineConfig::from(&cfg);
      assert_eq!(pipeline.cache_ttl, TimeDelta::hours(DEFAULT_TTL_HOURS));
    }
  }
}
