//! Terminology binding metadata attached to coded elements.

use std::fmt;

/// Degree to which a coded element must conform to its bound value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingStrength {
    Required,
    Extensible,
    Preferred,
    Example,
}

impl BindingStrength {
    /// Non-conformance with a required binding blocks construction; weaker
    /// strengths only produce advisory issues.
    pub fn is_blocking(self) -> bool {
        matches!(self, BindingStrength::Required)
    }
}

impl fmt::Display for BindingStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BindingStrength::Required => "required",
            BindingStrength::Extensible => "extensible",
            BindingStrength::Preferred => "preferred",
            BindingStrength::Example => "example",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub name: &'static str,
    pub strength: BindingStrength,
    pub value_set: &'static str,
    pub description: Option<&'static str>,
    pub max_value_set: Option<&'static str>,
}

impl Binding {
    pub const fn new(name: &'static str, strength: BindingStrength, value_set: &'static str) -> Self {
        Self {
            name,
            strength,
            value_set,
            description: None,
            max_value_set: None,
        }
    }

    pub const fn description(self, description: &'static str) -> Self {
        Self {
            description: Some(description),
            ..self
        }
    }

    pub const fn max_value_set(self, max_value_set: &'static str) -> Self {
        Self {
            max_value_set: Some(max_value_set),
            ..self
        }
    }
}

/// Shared bindings used by more than one type.
pub mod common {
    use super::{Binding, BindingStrength};
    use crate::terminology::ALL_LANGUAGES;

    pub const LANGUAGE: Binding = Binding::new(
        "Language",
        BindingStrength::Preferred,
        "http://hl7.org/fhir/ValueSet/languages",
    )
    .description("A human language.")
    .max_value_set(ALL_LANGUAGES);

    pub const MIME_TYPE: Binding = Binding::new(
        "MimeType",
        BindingStrength::Required,
        "http://hl7.org/fhir/ValueSet/mimetypes|4.3.0",
    )
    .description("The mime type of an attachment. Any valid mime type is allowed.");

    pub const RESOURCE_TYPE: Binding = Binding::new(
        "FHIRResourceTypeExt",
        BindingStrength::Extensible,
        "http://hl7.org/fhir/ValueSet/resource-types",
    )
    .description("A resource (or, for logical models, the URI of the logical model).");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_required_bindings_block() {
        assert!(BindingStrength::Required.is_blocking());
        assert!(!BindingStrength::Extensible.is_blocking());
        assert!(!BindingStrength::Example.is_blocking());
    }

    #[test]
    fn language_binding_carries_max_value_set() {
        assert_eq!(common::LANGUAGE.strength, BindingStrength::Preferred);
        assert_eq!(
            common::LANGUAGE.max_value_set,
            Some("http://hl7.org/fhir/ValueSet/all-languages")
        );
        assert_eq!(common::LANGUAGE.strength.to_string(), "preferred");
    }
}
