//! FHIR R4B data models
//!
//! Immutable, builder-constructed values for a set of FHIR R4B resources and
//! the datatypes they use.
//!
//! # Module Organization
//!
//! - `types`: framework base types, primitives, code enums and datatypes
//! - `resources`: `DeviceMetric`, `DocumentManifest`, `List`, `Media`,
//!   `Medication`, `Practitioner`, `RelatedPerson`, `SubscriptionStatus` and
//!   `Substance`, each with its backbone elements
//! - `validation`: the checks run at build time, plus `ValidationContext`
//!   which collects advisory issues
//! - `visitor`: the tree walking protocol
//! - `json`: FHIR JSON rendering on top of the visitor
//!
//! # Design Philosophy
//!
//! - **Immutable**: values are only produced by `build()`, which validates
//! - **Strongly-typed**: choice elements are enums, required codes are enums
//! - **Structural**: equality and hashing cover every field; hashes are memoized
//!
//! # Example
//!
//! ```rust
//! use ferrum_models::prelude::*;
//!
//! let ingredient = MedicationIngredient::builder()
//!     .item(CodeableConcept::builder().text("Acetaminophen").build()?)
//!     .is_active(true)
//!     .build()?;
//! let medication = Medication::builder()
//!     .status(MedicationStatus::Active)
//!     .ingredient([ingredient])
//!     .build()?;
//!
//! assert_eq!(medication.ingredient().len(), 1);
//! assert_eq!(medication.to_builder().build()?, medication);
//! # Ok::<(), ferrum_models::Error>(())
//! ```

#[macro_use]
mod macros;

pub mod binding;
pub mod config;
pub mod error;
pub mod json;
pub mod model_info;
pub mod resource_type;
pub mod resources;
pub mod terminology;
pub mod types;
pub mod validation;
pub mod visitor;

pub use error::{Error, Result};

/// Everything needed to build, inspect and walk model values.
pub mod prelude {
    pub use crate::config::ModelConfig;
    pub use crate::error::Error;
    pub use crate::json::{to_json_string, to_json_value, JsonWriter};
    pub use crate::model_info::{ElementInfo, ModelInfo};
    pub use crate::resources::*;
    pub use crate::types::*;
    pub use crate::validation::{IssueSeverity, ValidationContext, ValidationIssue};
    pub use crate::visitor::{CollectingVisitor, Node, PrimitiveValue, Visitable, Visitor};
}
