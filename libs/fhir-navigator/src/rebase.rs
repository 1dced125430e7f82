//! Cross-snapshot rebasing (spec §4.4): `contentReference`, then
//! single-type profile/base-type rebasing. Invoked by the Path Resolver when
//! the Polymorphic Matcher finds nothing for the current segment.

use std::future::Future;
use std::pin::Pin;

use crate::context::NavContext;
use crate::error::NavigatorError;
use crate::model::{EnrichedElementDefinition, EnrichedSnapshot, PackageFilter};
use crate::provider::SnapshotRef;
use crate::resolver::resolve;
use tracing::debug;

/// Returns `Ok(Some(element))` when a rebase strategy applied and resolved
/// the remaining path, `Ok(None)` when neither strategy applies (the caller
/// raises `NotFound`), or `Err` when a nested resolution genuinely failed
/// (spec §9: no cycle-detection needed — each rebase consumes `rest` or a
/// strict suffix of it).
pub fn rebase<'a>(
    ctx: &'a NavContext,
    current_snapshot: &'a EnrichedSnapshot,
    previous: &'a EnrichedElementDefinition,
    rest: String,
) -> Pin<Box<dyn Future<Output = Result<Option<EnrichedElementDefinition>, NavigatorError>> + Send + 'a>> {
    Box::pin(async move {
        if let Some(content_reference) = &previous.inner.content_reference {
            let mut referenced = content_reference.trim_start_matches('#').to_string();
            let type_prefix = format!("{}.", current_snapshot.type_);
            if let Some(stripped) = referenced.strip_prefix(type_prefix.as_str()) {
                referenced = stripped.to_string();
            }
            let new_path = if rest.is_empty() {
                referenced
            } else {
                format!("{referenced}.{rest}")
            };

            debug!(
                content_reference = %content_reference,
                new_path = %new_path,
                "rebasing via contentReference within the same snapshot"
            );
            let snapshot_ref = SnapshotRef::from(current_snapshot.type_.clone());
            let package_filter = current_snapshot.core_package.clone();
            let result = resolve(ctx, snapshot_ref, Some(package_filter), new_path, None).await?;
            return Ok(Some(result));
        }

        let types = previous.inner.types();
        if types.len() == 1 {
            let t = &types[0];
            let (snapshot_ref, package_filter): (SnapshotRef, Option<PackageFilter>) =
                match t.profile.as_ref().and_then(|p| p.first()) {
                    Some(profile) => (
                        SnapshotRef::from(profile.clone()),
                        Some(PackageFilter {
                            id: current_snapshot.package_id.clone(),
                            version: current_snapshot.package_version.clone(),
                        }),
                    ),
                    None => (
                        SnapshotRef::from(t.code.clone()),
                        Some(current_snapshot.core_package.clone()),
                    ),
                };

            debug!(
                target = %snapshot_ref_label(&snapshot_ref),
                via_profile = t.profile.as_ref().and_then(|p| p.first()).is_some(),
                "rebasing via the element's sole remaining type"
            );
            let result = resolve(ctx, snapshot_ref, package_filter, rest, None).await?;
            return Ok(Some(result));
        }

        Ok(None)
    })
}

fn snapshot_ref_label(snapshot_ref: &SnapshotRef) -> String {
    snapshot_ref.normalized_id()
}
