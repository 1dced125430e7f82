//! Path Resolver (spec §4.6): orchestrates the lexer, matcher, slice
//! resolver, and rebaser over a segment list, maintaining state and writing
//! through the Element Cache at every prefix.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use zunder_models::ElementDefinitionType;

use crate::cache::CacheKeyPart;
use crate::context::NavContext;
use crate::error::NavigatorError;
use crate::lexer::{parse_segment, split_fsh_path};
use crate::model::{EnrichedElementDefinition, PackageFilter};
use crate::polymorphic::match_path;
use crate::provider::SnapshotRef;
use crate::rebase::rebase;
use crate::slice::resolve_slice;
use crate::snapshot::get_enriched_snapshot;
use crate::util::{base_name_of, init_cap};
use tracing::debug;

/// Carries a narrowed `__name` across a virtual-slice profile hop or a
/// content-reference rebase into a new snapshot (spec §4.6 "Empty path").
#[derive(Debug, Clone, Default)]
pub struct CameFromContext {
    pub name: Vec<String>,
}

/// Resolves `fsh_path` within `snapshot_id`, returning the single matching
/// enriched element. Recurses (boxed, since `async fn` cannot be
/// self-recursive) when a virtual slice or a rebase switches snapshots.
pub fn resolve<'a>(
    ctx: &'a NavContext,
    snapshot_id: SnapshotRef,
    package_filter: Option<PackageFilter>,
    fsh_path: String,
    came_from: Option<CameFromContext>,
) -> Pin<Box<dyn Future<Output = Result<EnrichedElementDefinition, NavigatorError>> + Send + 'a>> {
    Box::pin(async move {
        let snapshot = get_enriched_snapshot(ctx, &snapshot_id, package_filter.as_ref()).await?;
        let namespace = ctx.element_namespace(package_filter.as_ref());
        let normalized_id = snapshot_id.normalized_id();

        let full_key = vec![
            CacheKeyPart::Str(namespace.clone()),
            CacheKeyPart::Str(normalized_id.clone()),
            CacheKeyPart::Str(fsh_path.clone()),
        ];
        if let Some(cached) = ctx.element_cache.get(&full_key).await {
            return Ok((*cached).clone());
        }

        let root = snapshot
            .root()
            .ok_or_else(|| NavigatorError::not_found(".", "", &snapshot.url))?;

        let segments = split_fsh_path(&fsh_path);

        if segments.is_empty() {
            let mut result = root.clone();
            result.inner.type_ = Some(vec![ElementDefinitionType {
                code: snapshot.type_.clone(),
                profile: None,
                target_profile: None,
                kind: Some(snapshot.kind.clone()),
            }]);

            if let Some(cf) = &came_from {
                result.name = if cf.name.len() > 1 {
                    let suffix = init_cap(&snapshot.type_);
                    cf.name
                        .iter()
                        .filter(|n| n.ends_with(&suffix))
                        .cloned()
                        .collect()
                } else {
                    cf.name.clone()
                };
            }

            ctx.element_cache.set(&full_key, Arc::new(result.clone())).await;
            return Ok(result);
        }

        let mut current_element = root.clone();
        let mut current_path = current_element.inner.id.clone();
        let current_base_url = snapshot.url.clone();

        for i in 0..segments.len() {
            let prefix_path = segments[..=i].join(".");
            let prefix_key = vec![
                CacheKeyPart::Str(namespace.clone()),
                CacheKeyPart::Str(normalized_id.clone()),
                CacheKeyPart::Str(prefix_path.clone()),
            ];
            if let Some(cached) = ctx.element_cache.get(&prefix_key).await {
                current_element = (*cached).clone();
                current_path = current_element.inner.id.clone();
                continue;
            }

            let segment = parse_segment(&segments[i]);
            let search_path = format!("{current_path}.{}", segment.base);
            let previous_element = current_element.clone();

            let raw_elements: Vec<zunder_models::ElementDefinition> =
                snapshot.element.iter().map(|e| e.inner.clone()).collect();
            let matched = match_path(&raw_elements, &search_path);

            let mut resolved = match matched {
                Some(result) => {
                    let matched_enriched = snapshot
                        .by_id(&result.element.id)
                        .expect("match_path result always comes from this snapshot's elements")
                        .clone();

                    match result.narrowed_type {
                        Some(t) => {
                            let inferred =
                                format!("{}{}", base_name_of(&matched_enriched.inner.id), init_cap(&t.code));
                            let real_id = format!("{}:{}", matched_enriched.inner.id, inferred);
                            match snapshot.by_id(&real_id) {
                                Some(real) => real.clone(),
                                None => {
                                    let mut narrowed = matched_enriched;
                                    narrowed.inner.type_ = Some(vec![t.clone()]);
                                    narrowed.name = vec![inferred];
                                    narrowed
                                }
                            }
                        }
                        None => matched_enriched,
                    }
                }
                None => {
                    let rest = segments[i..].join(".");
                    debug!(
                        segment = %segment.base,
                        from = %previous_element.inner.path,
                        "no direct or polymorphic match, attempting rebase"
                    );
                    match rebase(ctx, &snapshot, &previous_element, rest).await? {
                        Some(result) => {
                            debug!(
                                into = %result.from_definition,
                                path = %result.inner.path,
                                "rebase hop resolved"
                            );
                            ctx.element_cache.set(&full_key, Arc::new(result.clone())).await;
                            return Ok(result);
                        }
                        None => {
                            return Err(NavigatorError::not_found(
                                &segment.base,
                                &previous_element.inner.path,
                                &snapshot.url,
                            ));
                        }
                    }
                }
            };

            if let Some(slice) = &segment.slice {
                let sliced = resolve_slice(ctx, &snapshot, &resolved, slice).await?;
                if sliced.from_definition != current_base_url {
                    debug!(
                        slice = %slice,
                        into = %sliced.from_definition,
                        "virtual slice rebased into a new profile"
                    );
                    let remaining = segments[i + 1..].join(".");
                    let came_from_ctx = CameFromContext {
                        name: resolved.name.clone(),
                    };
                    let result = resolve(
                        ctx,
                        SnapshotRef::from(sliced.from_definition.clone()),
                        None,
                        remaining,
                        Some(came_from_ctx),
                    )
                    .await?;
                    ctx.element_cache.set(&full_key, Arc::new(result.clone())).await;
                    return Ok(result);
                }
                resolved = sliced;
            }

            current_element = resolved;
            current_path = current_element.inner.id.clone();
            ctx.element_cache
                .set(&prefix_key, Arc::new(current_element.clone()))
                .await;
        }

        ctx.element_cache
            .set(&full_key, Arc::new(current_element.clone()))
            .await;
        Ok(current_element)
    })
}
