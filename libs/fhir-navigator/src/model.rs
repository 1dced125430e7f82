//! Enriched element/snapshot shapes (spec §3, §4.5).
//!
//! `EnrichedElementDefinition` augments a raw `ElementDefinition` with the
//! fields the enricher computes once per snapshot fetch: `__fromDefinition`,
//! `__corePackage`/`__packageId`/`__packageVersion`, `__name`, and per-type
//! `__kind`. It derefs to the underlying `ElementDefinition` so callers keep
//! using `.id`/`.path`/`.types()` unchanged.

use std::ops::Deref;

use zunder_models::ElementDefinition;

pub use crate::provider::{PackageCoords, PackageFilter};

/// An `ElementDefinition` after the one-time enrichment pass (spec §4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedElementDefinition {
    pub inner: ElementDefinition,
    pub from_definition: String,
    pub core_package: PackageCoords,
    pub package_id: String,
    pub package_version: String,
    pub name: Vec<String>,
}

impl Deref for EnrichedElementDefinition {
    type Target = ElementDefinition;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// A fully enriched snapshot: the cached unit of work (spec §4.5 "The
/// enriched snapshot is what is cached").
#[derive(Debug, Clone)]
pub struct EnrichedSnapshot {
    pub url: String,
    pub type_: String,
    pub kind: String,
    pub core_package: PackageCoords,
    pub package_id: String,
    pub package_version: String,
    pub element: Vec<EnrichedElementDefinition>,
}

impl EnrichedSnapshot {
    pub fn root(&self) -> Option<&EnrichedElementDefinition> {
        self.element.first()
    }

    pub fn by_id(&self, id: &str) -> Option<&EnrichedElementDefinition> {
        self.element.iter().find(|e| e.inner.id == id)
    }
}
