//! External collaborator contracts (spec §6.1, §6.2): the Snapshot Provider
//! and the Metadata Resolver. Both are pure, cached, asynchronous lookups —
//! the navigator defines the shape it needs from them and otherwise treats
//! them as opaque, matching `zunder-context`'s `ConformanceResourceProvider`
//! trait style (`#[async_trait] pub trait ...: Send + Sync`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use zunder_models::ElementDefinition;

/// A snapshot identifier: either a StructureDefinition id/canonical URL, or a
/// package-scoped entry (spec §3 "Snapshot identifier").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SnapshotRef {
    ById(String),
    ByEntry {
        package_id: String,
        package_version: String,
        filename: String,
    },
}

impl SnapshotRef {
    /// The normalized id used for cache-key and `__fromDefinition` comparisons.
    pub fn normalized_id(&self) -> String {
        match self {
            SnapshotRef::ById(id) => id.clone(),
            SnapshotRef::ByEntry {
                package_id,
                package_version,
                filename,
            } => format!("{package_id}::{package_version}::{filename}"),
        }
    }
}

impl From<&str> for SnapshotRef {
    fn from(value: &str) -> Self {
        SnapshotRef::ById(value.to_string())
    }
}

impl From<String> for SnapshotRef {
    fn from(value: String) -> Self {
        SnapshotRef::ById(value)
    }
}

/// `{id, version}` package coordinates (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageCoords {
    pub id: String,
    pub version: String,
}

/// An optional package constraint on Snapshot Provider / Metadata Resolver
/// lookups (spec §3 "Package filter").
pub type PackageFilter = PackageCoords;

/// Raw snapshot as produced by the Snapshot Provider, before enrichment
/// (spec §3 "Snapshot").
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub url: String,
    pub type_: String,
    pub kind: String,
    pub core_package: PackageCoords,
    pub package_id: String,
    pub package_version: String,
    pub element: Vec<ElementDefinition>,
}

/// A query against the Metadata Resolver (spec §6.2).
#[derive(Debug, Clone)]
pub struct MetaQuery {
    pub resource_type: Option<String>,
    pub id: String,
    pub package: Option<PackageFilter>,
}

/// A package-scoped metadata record (spec §6.2).
#[derive(Debug, Clone)]
pub struct MetadataRecord {
    pub kind: Option<String>,
    pub package_id: String,
    pub package_version: String,
    pub filename: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("ambiguous result: {0}")]
    Ambiguous(String),
    #[error("provider I/O error: {0}")]
    Io(String),
}

/// Produces a full, ordered element list for a snapshot identifier, filtered
/// to a package if requested (spec §6.1). Out of scope: how the snapshot was
/// generated (differential merge, package extraction, ...).
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn get_snapshot(
        &self,
        id: &SnapshotRef,
        package_filter: Option<&PackageFilter>,
    ) -> std::result::Result<RawSnapshot, ProviderError>;
}

/// Resolves type codes and profile ids to package-scoped metadata, used only
/// during enrichment and virtual-slice resolution (spec §6.2).
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve_meta(
        &self,
        query: &MetaQuery,
    ) -> std::result::Result<Option<MetadataRecord>, ProviderError>;

    async fn lookup(
        &self,
        query: &MetaQuery,
    ) -> std::result::Result<Vec<MetadataRecord>, ProviderError>;

    async fn get_normalized_root_packages(
        &self,
    ) -> std::result::Result<Vec<PackageCoords>, ProviderError>;
}
