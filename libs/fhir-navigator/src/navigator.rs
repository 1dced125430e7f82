//! Navigator Facade (spec §4.9): owns configuration, the four caches, and
//! the package-context namespace; exposes `get_element` and `get_children`.

use std::sync::Arc;

use tracing::instrument;

use crate::cache::{ColdCache, TieredCache};
use crate::children::resolve_children;
use crate::context::NavContext;
use crate::error::NavigatorError;
use crate::model::{EnrichedElementDefinition, EnrichedSnapshot};
use crate::provider::{MetadataResolver, ProviderError, SnapshotProvider, SnapshotRef};
use crate::resolver::resolve;

/// Hot-LRU capacities for the four caches (spec §4.8 "Default hot
/// capacities"). Implementations must not vary these based on the presence
/// of a cold tier.
#[derive(Debug, Clone, Copy)]
pub struct CacheCapacities {
    pub snapshot: usize,
    pub type_meta: usize,
    pub element: usize,
    pub children: usize,
}

impl Default for CacheCapacities {
    fn default() -> Self {
        Self {
            snapshot: 100,
            type_meta: 500,
            element: 2_000,
            children: 500,
        }
    }
}

/// Pluggable cold-tier caches. Any subset may be absent (spec §4.9).
#[derive(Default)]
pub struct ColdCaches {
    pub snapshot: Option<Arc<dyn ColdCache<Arc<EnrichedSnapshot>>>>,
    pub type_meta: Option<Arc<dyn ColdCache<Option<String>>>>,
    pub element: Option<Arc<dyn ColdCache<Arc<EnrichedElementDefinition>>>>,
    pub children: Option<Arc<dyn ColdCache<Arc<Vec<EnrichedElementDefinition>>>>>,
}

/// A pluggable sink for navigator diagnostics (spec §4.9 "capture the
/// logger (default no-op)"). Structured logging proper is emitted
/// unconditionally through `tracing`; this trait is the caller-visible
/// accessor surface the spec calls for.
pub trait NavigatorLogger: Send + Sync {
    fn log(&self, message: &str);
}

pub struct NoopLogger;

impl NavigatorLogger for NoopLogger {
    fn log(&self, _message: &str) {}
}

pub struct TracingLogger;

impl NavigatorLogger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::debug!(target: "zunder_navigator", "{message}");
    }
}

#[derive(Default)]
pub struct NavigatorConfig {
    pub cache_capacities: CacheCapacities,
    pub cold_caches: ColdCaches,
    pub logger: Option<Arc<dyn NavigatorLogger>>,
}

/// Holds configuration, caches, and the package-context namespace; exposes
/// `get_element`/`get_children` over any `SnapshotProvider` +
/// `MetadataResolver` pair (spec §4.9).
pub struct Navigator {
    ctx: NavContext,
    logger: Arc<dyn NavigatorLogger>,
}

impl Navigator {
    /// Computes the package-context string once, by asking the Metadata
    /// Resolver for the normalized root packages and stably JSON-encoding
    /// the result (spec §4.9).
    pub async fn new(
        snapshot_provider: Arc<dyn SnapshotProvider>,
        metadata_resolver: Arc<dyn MetadataResolver>,
        config: NavigatorConfig,
    ) -> Result<Self, NavigatorError> {
        let root_packages = metadata_resolver
            .get_normalized_root_packages()
            .await
            .map_err(|err| NavigatorError::upstream("resolving normalized root packages", err))?;
        let package_context =
            serde_json::to_string(&root_packages).expect("package coordinates are always JSON-safe");

        let caps = config.cache_capacities;
        let ctx = NavContext {
            snapshot_provider,
            metadata_resolver,
            snapshot_cache: TieredCache::new("snapshot", caps.snapshot, config.cold_caches.snapshot),
            type_meta_cache: TieredCache::new("type-meta", caps.type_meta, config.cold_caches.type_meta),
            element_cache: TieredCache::new("element", caps.element, config.cold_caches.element),
            children_cache: TieredCache::new("children", caps.children, config.cold_caches.children),
            package_context,
        };

        Ok(Self {
            ctx,
            logger: config.logger.unwrap_or_else(|| Arc::new(NoopLogger)),
        })
    }

    #[instrument(skip(self, snapshot_id, fsh_path), fields(snapshot_id = %snapshot_id_label(&snapshot_id)))]
    pub async fn get_element(
        &self,
        snapshot_id: SnapshotRef,
        fsh_path: impl Into<String>,
    ) -> Result<EnrichedElementDefinition, NavigatorError> {
        resolve(&self.ctx, snapshot_id, None, fsh_path.into(), None).await
    }

    #[instrument(skip(self, snapshot_id, fsh_path), fields(snapshot_id = %snapshot_id_label(&snapshot_id)))]
    pub async fn get_children(
        &self,
        snapshot_id: SnapshotRef,
        fsh_path: impl Into<String>,
    ) -> Result<Vec<EnrichedElementDefinition>, NavigatorError> {
        resolve_children(&self.ctx, snapshot_id, None, fsh_path.into()).await
    }

    pub fn snapshot_provider(&self) -> &Arc<dyn SnapshotProvider> {
        &self.ctx.snapshot_provider
    }

    pub fn metadata_resolver(&self) -> &Arc<dyn MetadataResolver> {
        &self.ctx.metadata_resolver
    }

    pub fn logger(&self) -> &Arc<dyn NavigatorLogger> {
        &self.logger
    }

    pub fn package_context(&self) -> &str {
        &self.ctx.package_context
    }
}

fn snapshot_id_label(id: &SnapshotRef) -> String {
    id.normalized_id()
}

impl From<ProviderError> for NavigatorError {
    fn from(err: ProviderError) -> Self {
        NavigatorError::upstream("provider call", err)
    }
}
