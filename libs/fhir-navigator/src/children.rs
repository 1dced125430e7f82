//! Children Resolver (spec §4.7): resolves the parent via the Path
//! Resolver, then selects its direct children, rebasing through
//! `contentReference` or a single remaining type when the snapshot defines
//! none directly.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::cache::CacheKeyPart;
use crate::context::NavContext;
use crate::error::NavigatorError;
use crate::model::{EnrichedElementDefinition, PackageFilter};
use crate::provider::SnapshotRef;
use crate::resolver::resolve;
use crate::snapshot::get_enriched_snapshot;

/// Resolves the direct children of `fsh_path` within `snapshot_id`.
pub fn resolve_children<'a>(
    ctx: &'a NavContext,
    snapshot_id: SnapshotRef,
    package_filter: Option<PackageFilter>,
    fsh_path: String,
) -> Pin<Box<dyn Future<Output = Result<Vec<EnrichedElementDefinition>, NavigatorError>> + Send + 'a>> {
    Box::pin(async move {
        let normalized_id = snapshot_id.normalized_id();
        let key = vec![
            CacheKeyPart::Str(ctx.package_context.clone()),
            CacheKeyPart::Str(normalized_id.clone()),
            CacheKeyPart::Str(fsh_path.clone()),
        ];
        if let Some(cached) = ctx.children_cache.get(&key).await {
            return Ok((*cached).clone());
        }

        let requested_snapshot = get_enriched_snapshot(ctx, &snapshot_id, package_filter.as_ref()).await?;

        let resolved = resolve(
            ctx,
            snapshot_id.clone(),
            package_filter.clone(),
            fsh_path.clone(),
            None,
        )
        .await?;
        let parent_id = resolved.inner.id.clone();

        let (actual_snapshot, key) = if resolved.from_definition != requested_snapshot.url {
            let actual_ref = SnapshotRef::from(resolved.from_definition.clone());
            let actual_id = actual_ref.normalized_id();
            let key = vec![
                CacheKeyPart::Str(ctx.package_context.clone()),
                CacheKeyPart::Str(actual_id),
                CacheKeyPart::Str(fsh_path.clone()),
            ];
            if let Some(cached) = ctx.children_cache.get(&key).await {
                return Ok((*cached).clone());
            }
            let snapshot = get_enriched_snapshot(ctx, &actual_ref, package_filter.as_ref()).await?;
            (snapshot, key)
        } else {
            (requested_snapshot, key)
        };

        let prefix = format!("{parent_id}.");
        let direct_children: Vec<EnrichedElementDefinition> = actual_snapshot
            .element
            .iter()
            .filter(|e| {
                e.inner
                    .id
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|suffix| !suffix.contains('.'))
            })
            .cloned()
            .collect();

        if !direct_children.is_empty() {
            ctx.children_cache.set(&key, Arc::new(direct_children.clone())).await;
            return Ok(direct_children);
        }

        if let Some(content_reference) = &resolved.inner.content_reference {
            let mut referenced = content_reference.trim_start_matches('#').to_string();
            let type_prefix = format!("{}.", actual_snapshot.type_);
            if let Some(stripped) = referenced.strip_prefix(type_prefix.as_str()) {
                referenced = stripped.to_string();
            }

            let result = resolve_children(
                ctx,
                SnapshotRef::from(actual_snapshot.type_.clone()),
                Some(actual_snapshot.core_package.clone()),
                referenced,
            )
            .await?;
            ctx.children_cache.set(&key, Arc::new(result.clone())).await;
            return Ok(result);
        }

        let types = resolved.inner.types();
        if types.len() > 1 {
            return Err(NavigatorError::ambiguous_choice(&fsh_path, &actual_snapshot.url));
        }

        if let Some(t) = types.first() {
            let (child_snapshot_ref, child_package_filter) = match t.profile.as_ref().and_then(|p| p.first()) {
                Some(profile) => (
                    SnapshotRef::from(canonical_last_segment(profile)),
                    None,
                ),
                None => (
                    SnapshotRef::from(t.code.clone()),
                    Some(actual_snapshot.core_package.clone()),
                ),
            };

            let result = resolve_children(ctx, child_snapshot_ref, child_package_filter, ".".to_string()).await?;
            ctx.children_cache.set(&key, Arc::new(result.clone())).await;
            return Ok(result);
        }

        ctx.children_cache.set(&key, Arc::new(Vec::new())).await;
        Ok(Vec::new())
    })
}

/// The last path segment of a canonical URL, ignoring a trailing `|version`.
fn canonical_last_segment(canonical: &str) -> String {
    let without_version = canonical.split('|').next().unwrap_or(canonical);
    without_version
        .rsplit('/')
        .next()
        .unwrap_or(without_version)
        .to_string()
}
