//! FSH-style path resolution over FHIR StructureDefinition snapshots.
//!
//! Given a canonical element list (a "snapshot") and a dotted FSH path, this
//! crate resolves either the single matching element (`get_element`) or its
//! immediate children (`get_children`), handling polymorphic narrowing,
//! slice matching (including virtual-slice profile rebasing), and
//! cross-snapshot traversal via base types and `contentReference`.
//!
//! Snapshot production and package management are out of scope: the
//! [`SnapshotProvider`] and [`MetadataResolver`] traits are the seams a host
//! application implements.

mod cache;
mod children;
mod context;
mod enrich;
mod error;
mod lexer;
mod model;
mod navigator;
mod polymorphic;
mod provider;
mod rebase;
mod resolver;
mod slice;
mod snapshot;
mod util;

pub use cache::{CacheKey, CacheKeyPart, ColdCache};
pub use error::{NavigatorError, Result};
pub use model::{EnrichedElementDefinition, EnrichedSnapshot, PackageCoords, PackageFilter};
pub use navigator::{
    CacheCapacities, ColdCaches, Navigator, NavigatorConfig, NavigatorLogger, NoopLogger, TracingLogger,
};
pub use provider::{
    MetaQuery, MetadataRecord, MetadataResolver, ProviderError, RawSnapshot, SnapshotProvider, SnapshotRef,
};
