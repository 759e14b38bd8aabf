//! Rule catalog generation with cache fallback
//!
//! One generation pass:
//!
//! ```text
//! registry ──► archive ──► rule records ─┐
//!    │                                   ├─► build_catalog ─► Catalog ─► cache
//!    └── README ──► sections ──► HTML ───┘
//! ```
//!
//! [`RuleGenerator::ensure_catalog`] runs the pass at most once per
//! generator. Callers are serialized on one async mutex, so concurrent
//! requests wait for the first pass instead of fetching in parallel. When
//! the pass fails, the last cached catalog is used instead.

use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::cache::RuleCache;
use crate::config::GeneratorConfig;
use crate::docs;
use crate::error::{GenerationError, SetupError};
use crate::rules::{build_catalog, Catalog};
use crate::source::{HttpToolSource, ToolSource};

/// Builds the rule catalog once and hands out the shared result
pub struct RuleGenerator<S = HttpToolSource> {
    source: S,
    cache: RuleCache,
    catalog: Mutex<Option<Arc<Catalog>>>,
}

impl RuleGenerator<HttpToolSource> {
    /// Generator talking to the configured registry over HTTP
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, SetupError> {
        let cache_path = config.resolved_cache_path()?;
        let source = HttpToolSource::new(config)?;
        Ok(Self::new(source, RuleCache::new(cache_path)))
    }
}

impl<S: ToolSource> RuleGenerator<S> {
    pub fn new(source: S, cache: RuleCache) -> Self {
        Self {
            source,
            cache,
            catalog: Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &RuleCache {
        &self.cache
    }

    /// The populated catalog, without triggering generation
    pub async fn current(&self) -> Option<Arc<Catalog>> {
        self.catalog.lock().await.clone()
    }

    /// Return the catalog, generating it on first use
    ///
    /// Once populated (from a fresh pass or from the cache) the same catalog
    /// is returned on every call with no network I/O. If generation fails and
    /// no cache can be read, the generation error is returned and nothing is
    /// populated, so a later call tries again.
    pub async fn ensure_catalog(&self) -> Result<Arc<Catalog>, GenerationError> {
        let mut slot = self.catalog.lock().await;
        if let Some(catalog) = slot.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        let catalog = match self.generate().await {
            Ok(catalog) => {
                tracing::info!("Generated {} rules from the scan tool", catalog.len());
                self.cache.save(&catalog);
                catalog
            }
            Err(err) => {
                tracing::warn!("Rule generation failed, trying the rule cache: {err}");
                match self.cache.load() {
                    Ok(cached) => {
                        tracing::info!(
                            "Loaded {} rules from cache: {}",
                            cached.len(),
                            self.cache.path().display()
                        );
                        cached
                    }
                    Err(cache_err) => {
                        tracing::error!("Unable to load rules from cache: {cache_err}");
                        return Err(err);
                    }
                }
            }
        };

        let catalog = Arc::new(catalog);
        *slot = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// One generation pass; touches neither the shared catalog nor the cache
    pub async fn generate(&self) -> Result<Catalog, GenerationError> {
        let metadata = self.source.fetch_tool_metadata().await?;
        let records = self.source.extract_rule_info(&metadata.bala_url).await?;
        let descriptions = docs::rule_descriptions(&metadata.readme);

        tracing::debug!(
            "Merging {} rule records with {} documented rules",
            records.len(),
            descriptions.len()
        );
        Ok(build_catalog(records, &descriptions))
    }
}

static GLOBAL: OnceCell<RuleGenerator> = OnceCell::new();

/// Process-wide generator built from the default configuration
pub fn global() -> Result<&'static RuleGenerator, SetupError> {
    GLOBAL.get_or_try_init(|| {
        let config = GeneratorConfig::load()?;
        RuleGenerator::from_config(&config)
    })
}
