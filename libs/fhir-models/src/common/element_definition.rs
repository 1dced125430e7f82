//! ElementDefinition and Snapshot/Differential models.
//!
//! Version-agnostic: works across R4, R4B, and R5 ElementDefinition shapes.
//! Fields the navigator strips during enrichment (§4.5) are modeled
//! explicitly; everything else (fixed[x]/pattern[x], slicing, binding, ...)
//! is carried in `extensions`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One entry of `ElementDefinition.type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDefinitionType {
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<String>>,

    #[serde(rename = "targetProfile", skip_serializing_if = "Option::is_none")]
    pub target_profile: Option<Vec<String>>,

    /// Populated by the enricher (§4.5): "system" for FHIRPath system types,
    /// otherwise the resolved StructureDefinitionKind of `code`.
    #[serde(rename = "__kind", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ElementDefinitionType {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            profile: None,
            target_profile: None,
            kind: None,
        }
    }
}

/// One entry of `ElementDefinition.constraint`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDefinitionConstraint {
    pub key: String,
    pub severity: String,
    pub human: String,
    pub expression: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Stripped by the enricher (§4.5).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
}

/// One node of a StructureDefinition snapshot or differential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDefinition {
    pub id: String,
    pub path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<Value>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<Vec<ElementDefinitionType>>,

    #[serde(rename = "contentReference", skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Vec<ElementDefinitionConstraint>>,

    // --- Verbose fields stripped wholesale by the enricher (§4.5) ---
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Vec<Value>>,
    #[serde(rename = "mustSupport", skip_serializing_if = "Option::is_none")]
    pub must_support: Option<bool>,
    #[serde(rename = "isSummary", skip_serializing_if = "Option::is_none")]
    pub is_summary: Option<bool>,
    #[serde(rename = "isModifier", skip_serializing_if = "Option::is_none")]
    pub is_modifier: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representation: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(rename = "isModifierReason", skip_serializing_if = "Option::is_none")]
    pub is_modifier_reason: Option<String>,
    #[serde(rename = "meaningWhenMissing", skip_serializing_if = "Option::is_none")]
    pub meaning_when_missing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    /// Everything else: `slicing`, `binding`, `fixed[x]`/`pattern[x]`, `sliceName`, ...
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl ElementDefinition {
    /// `true` when this is a polymorphic ("choice") element: `id`/`path` end in `[x]`.
    pub fn is_choice_type(&self) -> bool {
        self.id.ends_with("[x]")
    }

    /// The slice name, if `id` has the form `parentId:sliceName`.
    pub fn slice_name(&self) -> Option<&str> {
        self.id.rsplit_once(':').map(|(_, name)| name)
    }

    pub fn types(&self) -> &[ElementDefinitionType] {
        self.type_.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub element: Vec<ElementDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Differential {
    pub element: Vec<ElementDefinition>,
}

impl Snapshot {
    pub fn root(&self) -> Option<&ElementDefinition> {
        self.element.first()
    }

    pub fn by_id(&self, id: &str) -> Option<&ElementDefinition> {
        self.element.iter().find(|e| e.id == id)
    }
}
