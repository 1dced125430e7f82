//! Slice resolution (spec §4.3): real slices, polymorphic narrowing, and
//! virtual-slice profile rebasing.
//!
//! Design decision (open question left unresolved by §9 "try snapshot"
//! description — recorded in DESIGN.md): `try_resolve_snapshot` only locates
//! a *candidate* snapshot; it does not itself judge type-compatibility. The
//! caller (`resolve_slice`, spec §4.3 step 4) performs the compatibility
//! check so the `SliceMismatch` vs. "not a known slice" distinction stays in
//! one place.

use crate::context::NavContext;
use crate::error::NavigatorError;
use crate::model::{EnrichedElementDefinition, EnrichedSnapshot, PackageCoords};
use crate::provider::{MetaQuery, SnapshotRef};
use crate::snapshot::get_enriched_snapshot;
use crate::util::{base_name_of, init_cap};
use tracing::debug;

/// Resolves a bracketed slice token `s` against the base element `b` within
/// `snapshot`. Returns the resolved element, which may come from a different
/// snapshot (a virtual slice / profile rebase) — callers detect this by
/// comparing `__fromDefinition` to the current base URL.
pub async fn resolve_slice(
    ctx: &NavContext,
    snapshot: &EnrichedSnapshot,
    base: &EnrichedElementDefinition,
    slice: &str,
) -> Result<EnrichedElementDefinition, NavigatorError> {
    let real_slice_id = format!("{}:{}", base.inner.id, slice);
    if let Some(real) = snapshot.by_id(&real_slice_id) {
        return Ok(real.clone());
    }

    if base.inner.is_choice_type() && slice == "x" {
        return Ok(base.clone());
    }

    if base.inner.is_choice_type() {
        if let Some(t) = base.inner.types().iter().find(|t| t.code == slice) {
            let inferred = format!("{}{}", base_name_of(&base.inner.id), init_cap(&t.code));
            let narrowed_id = format!("{}:{}", base.inner.id, inferred);
            if let Some(real) = snapshot.by_id(&narrowed_id) {
                return Ok(real.clone());
            }

            let mut narrowed = base.clone();
            narrowed.inner.type_ = Some(vec![t.clone()]);
            narrowed.name = vec![inferred];
            return Ok(narrowed);
        }
    }

    let allowed_types: Vec<String> = base.inner.types().iter().map(|t| t.code.clone()).collect();
    match try_resolve_snapshot(ctx, slice, &base.core_package).await? {
        Some(candidate) => {
            if allowed_types.iter().any(|code| code == &candidate.1) {
                debug!(
                    slice = %slice,
                    candidate_type = %candidate.1,
                    "virtual slice candidate accepted"
                );
                Ok(candidate.0)
            } else {
                debug!(
                    slice = %slice,
                    candidate_type = %candidate.1,
                    allowed = ?allowed_types,
                    "virtual slice candidate rejected, type not among allowed"
                );
                Err(NavigatorError::slice_mismatch(slice, &base.inner.path, &snapshot.url))
            }
        }
        None => Err(NavigatorError::not_found(slice, &base.inner.path, &snapshot.url)),
    }
}

/// Locates a candidate StructureDefinition for virtual-slice resolution
/// (spec §4.3 `try_resolve_snapshot`). Returns the candidate's root element
/// together with its base `type` code so the caller can judge compatibility;
/// never returns an error for "not found" — only genuine upstream failures
/// propagate (spec §9: the absence path is modeled as an optional, not an
/// exception).
async fn try_resolve_snapshot(
    ctx: &NavContext,
    id: &str,
    core_package: &PackageCoords,
) -> Result<Option<(EnrichedElementDefinition, String)>, NavigatorError> {
    let query = MetaQuery {
        resource_type: None,
        id: id.to_string(),
        package: Some(core_package.clone()),
    };

    if let Ok(records) = ctx.metadata_resolver.lookup(&query).await {
        if records.len() == 1 {
            if let Some(found) = fetch_root(ctx, id, Some(core_package)).await {
                return Ok(Some(found));
            }
        }
    }

    Ok(fetch_root(ctx, id, None).await)
}

async fn fetch_root(
    ctx: &NavContext,
    id: &str,
    package_filter: Option<&PackageCoords>,
) -> Option<(EnrichedElementDefinition, String)> {
    let snapshot = get_enriched_snapshot(ctx, &SnapshotRef::from(id), package_filter)
        .await
        .ok()?;
    let root = snapshot.root()?.clone();
    Some((root, snapshot.type_.clone()))
}
