//! The pack generation pipeline.
//!
//! ```text
//! feature gate → ledger create → cache lookup
//!   hit  → ledger complete (from cache)
//!   miss → fetch listings → prompt → completion → normalise → cache write
//!          → ledger complete
//! ```
//!
//! Authentication happens before the pipeline runs, in the
//! [`CurrentUser`](crate::auth::CurrentUser) extractor. Any failure after the
//! ledger row exists terminates the row as `failed`.

use std::sync::Arc;

use bursary_ai::{normalize::normalize, prompt};
use bursary_core::{
  cache::{CacheEntry, DEFAULT_TTL_HOURS, cache_key},
  completion::CompletionProvider,
  identity::Principal,
  pack::PackResponse,
  preferences::Preferences,
  store::{AccommodationQuery, PackStore},
};
use chrono::TimeDelta;

use crate::{
  ServerConfig,
  error::{Error, Result},
};

/// Tunables for [`PackPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
  /// Flag that must be enabled for generation to run.
  pub feature:            String,
  pub cache_ttl:          TimeDelta,
  pub max_accommodations: usize,
  pub max_bursaries:      usize,
}

impl From<&ServerConfig> for PipelineConfig {
  fn from(cfg: &ServerConfig) -> Self {
    Self {
      feature:            cfg.feature_name.clone(),
      cache_ttl:          cfg.cache_ttl().unwrap_or_else(|| TimeDelta::hours(DEFAULT_TTL_HOURS)),
      max_accommodations: cfg.prompt_max_accommodations,
      max_bursaries:      cfg.prompt_max_bursaries,
    }
  }
}

pub struct PackPipeline<S, C> {
  store:      Arc<S>,
  completion: Arc<C>,
  config:     PipelineConfig,
}

impl<S, C> PackPipeline<S, C>
where
  S: PackStore,
  C: CompletionProvider,
{
  pub fn new(store: Arc<S>, completion: Arc<C>, config: PipelineConfig) -> Self {
    Self { store, completion, config }
  }

  /// Produce packs for `prefs` on behalf of `principal`.
  pub async fn generate(&self, principal: &Principal, prefs: Preferences) -> Result<PackResponse> {
    let enabled = self
      .store
      .feature_enabled(self.config.feature.clone())
      .await
      .map_err(Error::store)?;
    if !enabled {
      tracing::info!(feature = %self.config.feature, "generation rejected, feature disabled");
      return Err(Error::FeatureDisabled);
    }

    let record = self
      .store
      .create_request(principal.user_id, prefs.clone())
      .await
      .map_err(Error::store)?;

    let outcome = async {
      let response = self.resolve(&prefs).await?;
      self
        .store
        .complete_request(record.id, response.pack.clone(), response.from_cache)
        .await
        .map_err(Error::store)?;
      Ok::<_, Error>(response)
    }
    .await;

    match outcome {
      Ok(response) => {
        tracing::info!(
          request_id = %record.id,
          from_cache = response.from_cache,
          fallback = response.pack.is_fallback(),
          "pack request completed"
        );
        Ok(response)
      }
      Err(e) => {
        tracing::warn!(request_id = %record.id, error = %e, "pack request failed");
        if let Err(ledger_err) = self.store.fail_request(record.id, e.to_string()).await {
          tracing::error!(request_id = %record.id, error = %ledger_err, "could not mark request failed");
        }
        Err(e)
      }
    }
  }

  /// Serve from the cache, or generate and cache.
  async fn resolve(&self, prefs: &Preferences) -> Result<PackResponse> {
    let key = cache_key(prefs)?;

    if let Some(entry) = self.store.cache_get(key.clone()).await.map_err(Error::store)? {
      tracing::info!("cache hit");
      return Ok(PackResponse { pack: entry.pack_data, from_cache: true });
    }
    tracing::info!("cache miss, generating");

    let query = AccommodationQuery::from_preferences(prefs).with_limit(self.config.max_accommodations);
    let (accommodations, bursaries) = tokio::try_join!(
      self.store.list_accommodations(&query),
      self.store.list_bursaries(Some(self.config.max_bursaries)),
    )
    .map_err(Error::store)?;
    tracing::debug!(
      accommodations = accommodations.len(),
      bursaries = bursaries.len(),
      "fetched listings"
    );

    let prompt   = prompt::build(prefs, &accommodations, &bursaries)?;
    let messages = prompt.messages();
    let raw      = self.completion.complete(&messages).await?;
    let pack     = normalize(&raw);

    self
      .store
      .cache_put(CacheEntry::new(key, pack.clone(), self.config.cache_ttl))
      .await
      .map_err(Error::store)?;

    Ok(PackResponse { pack, from_cache: false })
  }
}
