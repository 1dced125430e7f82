//! Shared resolution context: the external collaborators, the four caches,
//! and the package-context namespace string (spec §4.9, §9 "Global package
//! context"). Threaded by reference through every resolution module so none
//! of them need to be generic over the provider/resolver types.

use std::sync::Arc;

use tracing::warn;

use crate::cache::TieredCache;
use crate::model::{EnrichedSnapshot, PackageFilter};
use crate::provider::{MetadataResolver, SnapshotProvider};

pub struct NavContext {
    pub snapshot_provider: Arc<dyn SnapshotProvider>,
    pub metadata_resolver: Arc<dyn MetadataResolver>,
    pub snapshot_cache: TieredCache<Arc<EnrichedSnapshot>>,
    pub type_meta_cache: TieredCache<Option<String>>,
    pub element_cache: TieredCache<Arc<crate::model::EnrichedElementDefinition>>,
    pub children_cache: TieredCache<Arc<Vec<crate::model::EnrichedElementDefinition>>>,
    /// Canonical JSON of `get_normalized_root_packages()`, computed once at
    /// construction (spec §4.9, §9).
    pub package_context: String,
}

impl NavContext {
    /// The namespace prefix used in element/children cache keys: the
    /// caller-supplied package filter if present, else the package context
    /// (spec §6.3 "when a packageFilter is present it replaces the package
    /// context").
    pub fn element_namespace(&self, package_filter: Option<&PackageFilter>) -> String {
        match package_filter {
            Some(filter) => {
                serde_json::to_string(&[filter]).expect("package filter is always JSON-safe")
            }
            None => self.package_context.clone(),
        }
    }
}

pub(crate) fn log_swallowed(context: &str, err: impl std::fmt::Display) {
    warn!(context, %err, "absorbed error, continuing without this value");
}
