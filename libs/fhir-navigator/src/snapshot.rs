//! Cached, enriched snapshot fetch: the join point between the Snapshot
//! Provider, the Enricher, and the Snapshot Cache (spec §4.6 data flow,
//! §6.3 snapshot-cache key shape).

use std::sync::Arc;

use crate::cache::CacheKeyPart;
use crate::context::NavContext;
use crate::enrich::enrich_snapshot;
use crate::error::NavigatorError;
use crate::model::{EnrichedSnapshot, PackageFilter};
use crate::provider::{ProviderError, SnapshotRef};

/// Fetches the enriched snapshot for `id`, consulting (and populating) the
/// Snapshot Cache. Key: `[normalizedSnapshotId, pkgId, pkgVer]` (spec §6.3).
pub async fn get_enriched_snapshot(
    ctx: &NavContext,
    id: &SnapshotRef,
    package_filter: Option<&PackageFilter>,
) -> Result<Arc<EnrichedSnapshot>, NavigatorError> {
    let (normalized_id, pkg_id, pkg_ver) = snapshot_cache_key_parts(id, package_filter);
    let key = vec![
        CacheKeyPart::Str(normalized_id.clone()),
        CacheKeyPart::Str(pkg_id),
        CacheKeyPart::Str(pkg_ver),
    ];

    if let Some(cached) = ctx.snapshot_cache.get(&key).await {
        return Ok(cached);
    }

    let raw = ctx
        .snapshot_provider
        .get_snapshot(id, package_filter)
        .await
        .map_err(|err| provider_error_to_navigator_error(&normalized_id, err))?;

    let enriched = enrich_snapshot(ctx, raw).await;
    ctx.snapshot_cache.set(&key, enriched.clone()).await;
    Ok(enriched)
}

fn snapshot_cache_key_parts(
    id: &SnapshotRef,
    package_filter: Option<&PackageFilter>,
) -> (String, String, String) {
    match id {
        SnapshotRef::ById(raw_id) => {
            let (pkg_id, pkg_ver) = match package_filter {
                Some(filter) => (filter.id.clone(), filter.version.clone()),
                None => (String::new(), String::new()),
            };
            (raw_id.clone(), pkg_id, pkg_ver)
        }
        SnapshotRef::ByEntry { .. } => (id.normalized_id(), String::new(), String::new()),
    }
}

fn provider_error_to_navigator_error(context: &str, err: ProviderError) -> NavigatorError {
    NavigatorError::upstream(format!("snapshot fetch for '{context}'"), err)
}
