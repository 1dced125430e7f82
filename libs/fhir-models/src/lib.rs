//! Version-agnostic FHIR conformance resource models.
//!
//! Shared between the snapshot navigator and anything else in the workspace
//! that needs to read (not validate or mutate) a `StructureDefinition`.

mod common;

pub use common::complex::*;
pub use common::element_definition::{
    Differential, ElementDefinition, ElementDefinitionConstraint, ElementDefinitionType, Snapshot,
};
pub use common::error::{Error, Result};
pub use common::structure_definition::{
    StructureDefinition, StructureDefinitionContext, StructureDefinitionKind,
    StructureDefinitionMapping, TypeDerivationRule,
};
