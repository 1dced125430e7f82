//! Snapshot enrichment (spec §4.5): the one-time normalization pass applied
//! the first time a snapshot is fetched. Strips the verbose field set and
//! `constraint[].xpath`, tags origin, classifies per-type `__kind`, and
//! computes FSH-style `__name`.

use std::sync::Arc;

use zunder_models::{ElementDefinition, ElementDefinitionType};

use crate::cache::CacheKeyPart;
use crate::context::{log_swallowed, NavContext};
use crate::model::{EnrichedElementDefinition, EnrichedSnapshot, PackageCoords};
use crate::provider::{MetaQuery, RawSnapshot};
use crate::util::{base_name_of, init_cap, last_dot_segment};

const FHIRPATH_SYSTEM_PREFIX: &str = "http://hl7.org/fhirpath/System.";

/// Enriches a freshly fetched snapshot. Idempotent but not cheap; callers
/// should only invoke this on a snapshot cache miss.
pub async fn enrich_snapshot(ctx: &NavContext, raw: RawSnapshot) -> Arc<EnrichedSnapshot> {
    let mut elements = Vec::with_capacity(raw.element.len());
    for mut element in raw.element {
        strip_verbose_fields(&mut element);
        classify_types(ctx, &mut element, &raw.core_package).await;
        let name = compute_name(&element);
        elements.push(EnrichedElementDefinition {
            inner: element,
            from_definition: raw.url.clone(),
            core_package: raw.core_package.clone(),
            package_id: raw.package_id.clone(),
            package_version: raw.package_version.clone(),
            name,
        });
    }

    Arc::new(EnrichedSnapshot {
        url: raw.url,
        type_: raw.type_,
        kind: raw.kind,
        core_package: raw.core_package,
        package_id: raw.package_id,
        package_version: raw.package_version,
        element: elements,
    })
}

/// Clears the verbose, non-navigational field set (spec §4.5) and
/// `constraint[].xpath`. These are explicit `ElementDefinition` fields, not
/// part of the `#[serde(flatten)]` `extensions` bag, so they must be cleared
/// here rather than relying on the model's shape to drop them.
fn strip_verbose_fields(element: &mut ElementDefinition) {
    element.alias = None;
    element.mapping = None;
    element.must_support = None;
    element.is_summary = None;
    element.is_modifier = None;
    element.requirements = None;
    element.representation = None;
    element.comment = None;
    element.definition = None;
    element.is_modifier_reason = None;
    element.meaning_when_missing = None;
    element.example = None;
    element.short = None;

    if let Some(constraints) = element.constraint.as_mut() {
        for constraint in constraints.iter_mut() {
            constraint.xpath = None;
        }
    }
}

/// Sets `type[*].__kind`, via the Type-Meta Cache keyed `[code, corePkgId,
/// corePkgVer]`, falling back to the Metadata Resolver on miss. Lookup
/// failures are swallowed (spec §7 "Metadata-resolver errors during
/// enrichment are absorbed per-type").
async fn classify_types(ctx: &NavContext, element: &mut ElementDefinition, core_package: &PackageCoords) {
    let Some(types) = element.type_.as_mut() else {
        return;
    };

    for t in types.iter_mut() {
        if t.code.starts_with(FHIRPATH_SYSTEM_PREFIX) {
            t.kind = Some("system".to_string());
            continue;
        }

        t.kind = resolve_type_kind(ctx, &t.code, core_package).await;
    }
}

async fn resolve_type_kind(
    ctx: &NavContext,
    code: &str,
    core_package: &PackageCoords,
) -> Option<String> {
    let key = vec![
        CacheKeyPart::Str(code.to_string()),
        CacheKeyPart::Str(core_package.id.clone()),
        CacheKeyPart::Str(core_package.version.clone()),
    ];

    if let Some(cached) = ctx.type_meta_cache.get(&key).await {
        return cached;
    }

    let query = MetaQuery {
        resource_type: None,
        id: code.to_string(),
        package: Some(core_package.clone()),
    };

    let kind = match ctx.metadata_resolver.resolve_meta(&query).await {
        Ok(Some(record)) => record.kind,
        Ok(None) => None,
        Err(err) => {
            log_swallowed("enrich::resolve_type_kind", err);
            None
        }
    };

    ctx.type_meta_cache.set(&key, kind.clone()).await;
    kind
}

/// Computes `__name` for one element (spec §4.5).
fn compute_name(element: &ElementDefinition) -> Vec<String> {
    let last_segment = last_dot_segment(&element.path);
    let is_choice_path = last_segment.ends_with("[x]");
    let base = base_name_of(&element.path);
    let types: &[ElementDefinitionType] = element.types();

    match types.len() {
        1 if is_choice_path => vec![format!("{base}{}", init_cap(&types[0].code))],
        1 => vec![last_segment.to_string()],
        n if n > 1 && is_choice_path => types
            .iter()
            .map(|t| format!("{base}{}", init_cap(&t.code)))
            .collect(),
        _ => match &element.content_reference {
            Some(reference) => vec![last_dot_segment(reference).to_string()],
            None => Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_with_code(code: &str) -> ElementDefinitionType {
        ElementDefinitionType::new(code)
    }

    fn element(path: &str, id: &str, types: Vec<ElementDefinitionType>) -> ElementDefinition {
        let mut e = ElementDefinition {
            id: id.to_string(),
            path: path.to_string(),
            min: None,
            max: None,
            base: None,
            type_: if types.is_empty() { None } else { Some(types) },
            content_reference: None,
            constraint: None,
            alias: None,
            mapping: None,
            must_support: None,
            is_summary: None,
            is_modifier: None,
            requirements: None,
            representation: None,
            comment: None,
            definition: None,
            is_modifier_reason: None,
            meaning_when_missing: None,
            example: None,
            short: None,
            extensions: Default::default(),
        };
        e.id = id.to_string();
        e
    }

    #[test]
    fn single_type_choice_element_names_by_narrowed_type() {
        let e = element(
            "Extension.value[x]",
            "Extension.value[x]",
            vec![type_with_code("string")],
        );
        assert_eq!(compute_name(&e), vec!["valueString".to_string()]);
    }

    #[test]
    fn single_type_non_choice_element_names_by_last_segment() {
        let e = element("Extension.url", "Extension.url", vec![type_with_code("uri")]);
        assert_eq!(compute_name(&e), vec!["url".to_string()]);
    }

    #[test]
    fn multi_type_choice_element_names_every_type() {
        let e = element(
            "Observation.value[x]",
            "Observation.value[x]",
            vec![type_with_code("string"), type_with_code("CodeableConcept")],
        );
        assert_eq!(
            compute_name(&e),
            vec!["valueString".to_string(), "valueCodeableConcept".to_string()]
        );
    }

    #[test]
    fn strip_verbose_fields_clears_the_named_fields_and_constraint_xpath() {
        let mut e = element("Patient.gender", "Patient.gender", vec![type_with_code("code")]);
        e.short = Some("male | female | other | unknown".to_string());
        e.must_support = Some(true);
        e.definition = Some("The gender...".to_string());
        e.constraint = Some(vec![zunder_models::ElementDefinitionConstraint {
            key: "ele-1".to_string(),
            severity: "error".to_string(),
            human: "must be present".to_string(),
            expression: "hasValue()".to_string(),
            source: None,
            xpath: Some("@value|f:*|h:div".to_string()),
        }]);

        strip_verbose_fields(&mut e);

        assert_eq!(e.short, None);
        assert_eq!(e.must_support, None);
        assert_eq!(e.definition, None);
        assert_eq!(e.constraint.unwrap()[0].xpath, None);
    }

    #[test]
    fn content_reference_element_names_by_referenced_segment() {
        let mut e = element("Bundle.entry.link", "Bundle.entry.link", vec![]);
        e.content_reference = Some("#Bundle.link".to_string());
        assert_eq!(compute_name(&e), vec!["link".to_string()]);
    }
}
