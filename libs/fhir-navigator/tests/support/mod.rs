//! Shared test doubles: an in-memory `SnapshotProvider` and `MetadataResolver`
//! over a small, hand-built set of snapshots covering the end-to-end
//! scenarios (Patient/us-core-patient, Extension, us-core-race, Bundle,
//! Observation, Identifier, string, canonical).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use zunder_navigator::{
    MetaQuery, MetadataRecord, MetadataResolver, Navigator, NavigatorConfig, PackageCoords,
    ProviderError, RawSnapshot, SnapshotProvider, SnapshotRef,
};

fn pkg(id: &str, version: &str) -> PackageCoords {
    PackageCoords {
        id: id.to_string(),
        version: version.to_string(),
    }
}

fn core_pkg() -> PackageCoords {
    pkg("hl7.fhir.r4.core", "4.0.1")
}

fn us_core_pkg() -> PackageCoords {
    pkg("hl7.fhir.us.core", "5.0.1")
}

fn snapshot(
    url: &str,
    type_: &str,
    kind: &str,
    core_package: PackageCoords,
    package: PackageCoords,
    elements: serde_json::Value,
) -> RawSnapshot {
    let element = serde_json::from_value(elements).expect("fixture elements must deserialize");
    RawSnapshot {
        url: url.to_string(),
        type_: type_.to_string(),
        kind: kind.to_string(),
        core_package,
        package_id: package.id,
        package_version: package.version,
        element,
    }
}

pub struct MockProvider {
    snapshots: HashMap<String, RawSnapshot>,
}

impl MockProvider {
    fn build() -> Self {
        let mut snapshots = HashMap::new();

        snapshots.insert(
            "us-core-patient".to_string(),
            snapshot(
                "http://hl7.org/fhir/us/core/StructureDefinition/us-core-patient",
                "Patient",
                "resource",
                core_pkg(),
                us_core_pkg(),
                json!([
                    {"id": "Patient", "path": "Patient"},
                    {"id": "Patient.identifier", "path": "Patient.identifier", "type": [{"code": "Identifier"}]},
                    {
                        "id": "Patient.gender",
                        "path": "Patient.gender",
                        "type": [{"code": "code"}],
                        "short": "male | female | other | unknown",
                        "mustSupport": true,
                        "definition": "The gender that the patient is considered to have for administration and record keeping purposes."
                    }
                ]),
            ),
        );

        snapshots.insert(
            "Patient".to_string(),
            snapshot(
                "http://hl7.org/fhir/StructureDefinition/Patient",
                "Patient",
                "resource",
                core_pkg(),
                core_pkg(),
                json!([
                    {"id": "Patient", "path": "Patient"},
                    {"id": "Patient.extension", "path": "Patient.extension", "type": [{"code": "Extension"}]}
                ]),
            ),
        );

        snapshots.insert(
            "Identifier".to_string(),
            snapshot(
                "http://hl7.org/fhir/StructureDefinition/Identifier",
                "Identifier",
                "complex-type",
                core_pkg(),
                core_pkg(),
                json!([
                    {"id": "Identifier", "path": "Identifier"},
                    {"id": "Identifier.value", "path": "Identifier.value", "type": [{"code": "string"}]}
                ]),
            ),
        );

        snapshots.insert(
            "string".to_string(),
            snapshot(
                "http://hl7.org/fhir/StructureDefinition/string",
                "string",
                "primitive-type",
                core_pkg(),
                core_pkg(),
                json!([
                    {"id": "string", "path": "string"},
                    {"id": "string.extension", "path": "string.extension", "type": [{"code": "Extension"}]}
                ]),
            ),
        );

        snapshots.insert(
            "Extension".to_string(),
            snapshot(
                "http://hl7.org/fhir/StructureDefinition/Extension",
                "Extension",
                "complex-type",
                core_pkg(),
                core_pkg(),
                json!([
                    {"id": "Extension", "path": "Extension"},
                    {"id": "Extension.url", "path": "Extension.url", "type": [{"code": "uri"}]},
                    {
                        "id": "Extension.value[x]",
                        "path": "Extension.value[x]",
                        "type": [{"code": "string"}, {"code": "CodeableConcept"}]
                    }
                ]),
            ),
        );

        snapshots.insert(
            "us-core-race".to_string(),
            snapshot(
                "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race",
                "Extension",
                "complex-type",
                us_core_pkg(),
                us_core_pkg(),
                json!([
                    {"id": "Extension", "path": "Extension"},
                    {
                        "id": "Extension.url",
                        "path": "Extension.url",
                        "type": [{"code": "uri"}],
                        "fixedUri": "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race"
                    }
                ]),
            ),
        );

        snapshots.insert(
            "Bundle".to_string(),
            snapshot(
                "http://hl7.org/fhir/StructureDefinition/Bundle",
                "Bundle",
                "resource",
                core_pkg(),
                core_pkg(),
                json!([
                    {"id": "Bundle", "path": "Bundle"},
                    {"id": "Bundle.entry", "path": "Bundle.entry", "type": [{"code": "BackboneElement"}]},
                    {"id": "Bundle.entry.link", "path": "Bundle.entry.link", "contentReference": "#Bundle.link"},
                    {"id": "Bundle.link", "path": "Bundle.link", "type": [{"code": "BackboneElement"}]},
                    {"id": "Bundle.link.url", "path": "Bundle.link.url", "type": [{"code": "uri"}]}
                ]),
            ),
        );

        snapshots.insert(
            "Observation".to_string(),
            snapshot(
                "http://hl7.org/fhir/StructureDefinition/Observation",
                "Observation",
                "resource",
                core_pkg(),
                core_pkg(),
                json!([
                    {"id": "Observation", "path": "Observation"},
                    {
                        "id": "Observation.value[x]",
                        "path": "Observation.value[x]",
                        "type": [
                            {"code": "Quantity"},
                            {"code": "CodeableConcept"},
                            {"code": "string"},
                            {"code": "boolean"}
                        ]
                    }
                ]),
            ),
        );

        snapshots.insert(
            "canonical".to_string(),
            snapshot(
                "http://hl7.org/fhir/StructureDefinition/canonical",
                "canonical",
                "primitive-type",
                core_pkg(),
                core_pkg(),
                json!([{"id": "canonical", "path": "canonical"}]),
            ),
        );

        // Snapshots are also addressable by canonical URL (spec §6.1: the
        // Snapshot Provider accepts "id, base type name, or canonical URL"),
        // which matters once a virtual-slice hop re-resolves via `__fromDefinition`.
        let url_aliases: Vec<(String, RawSnapshot)> = snapshots
            .values()
            .map(|snapshot| (snapshot.url.clone(), snapshot.clone()))
            .collect();
        snapshots.extend(url_aliases);

        Self { snapshots }
    }
}

#[async_trait]
impl SnapshotProvider for MockProvider {
    async fn get_snapshot(
        &self,
        id: &SnapshotRef,
        _package_filter: Option<&PackageCoords>,
    ) -> Result<RawSnapshot, ProviderError> {
        let key = match id {
            SnapshotRef::ById(id) => id.clone(),
            SnapshotRef::ByEntry { filename, .. } => filename.clone(),
        };
        self.snapshots
            .get(&key)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(key))
    }
}

pub struct MockMetadataResolver {
    root_packages: Vec<PackageCoords>,
}

impl MockMetadataResolver {
    pub fn new(root_packages: Vec<PackageCoords>) -> Self {
        Self { root_packages }
    }
}

impl Default for MockMetadataResolver {
    fn default() -> Self {
        Self::new(vec![us_core_pkg()])
    }
}

#[async_trait]
impl MetadataResolver for MockMetadataResolver {
    async fn resolve_meta(&self, query: &MetaQuery) -> Result<Option<MetadataRecord>, ProviderError> {
        let kind = match query.id.as_str() {
            "string" | "uri" | "code" | "canonical" => Some("primitive-type".to_string()),
            "Identifier" | "Extension" | "CodeableConcept" | "BackboneElement" => {
                Some("complex-type".to_string())
            }
            _ => None,
        };
        Ok(kind.map(|kind| MetadataRecord {
            kind: Some(kind),
            package_id: "hl7.fhir.r4.core".to_string(),
            package_version: "4.0.1".to_string(),
            filename: None,
        }))
    }

    async fn lookup(&self, query: &MetaQuery) -> Result<Vec<MetadataRecord>, ProviderError> {
        if query.id == "us-core-race" {
            Ok(vec![MetadataRecord {
                kind: Some("complex-type".to_string()),
                package_id: "hl7.fhir.us.core".to_string(),
                package_version: "5.0.1".to_string(),
                filename: None,
            }])
        } else {
            Ok(Vec::new())
        }
    }

    async fn get_normalized_root_packages(&self) -> Result<Vec<PackageCoords>, ProviderError> {
        Ok(self.root_packages.clone())
    }
}

pub async fn build_navigator() -> Navigator {
    build_navigator_with_config(NavigatorConfig::default()).await
}

pub async fn build_navigator_with_config(config: NavigatorConfig) -> Navigator {
    Navigator::new(Arc::new(MockProvider::build()), Arc::new(MockMetadataResolver::default()), config)
        .await
        .expect("mock metadata resolver never fails get_normalized_root_packages")
}

pub async fn build_navigator_with_root_packages(
    root_packages: Vec<PackageCoords>,
    config: NavigatorConfig,
) -> Navigator {
    Navigator::new(
        Arc::new(MockProvider::build()),
        Arc::new(MockMetadataResolver::new(root_packages)),
        config,
    )
    .await
    .expect("mock metadata resolver never fails get_normalized_root_packages")
}

/// An in-memory `ColdCache<V>` double backed by a shared map, used to prove
/// that two navigators over differing root packages never collide on a
/// shared cold tier (spec §4.9 "Namespacing").
pub struct SharedColdCache<V> {
    entries: std::sync::Mutex<HashMap<String, V>>,
}

impl<V> SharedColdCache<V> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: std::sync::Mutex::new(HashMap::new()),
        })
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl<V> zunder_navigator::ColdCache<V> for SharedColdCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<V>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: V) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.entries.lock().unwrap().contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }

    async fn clear(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

pub fn id(s: &str) -> SnapshotRef {
    SnapshotRef::from(s)
}
