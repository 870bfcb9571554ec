//! Error types for FHIR models

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required element: '{0}'")]
    MissingRequiredElement(String),

    #[error("ele-1: All FHIR elements must have a @value or children: '{0}'")]
    ValueOrChildrenRequired(String),

    #[error("Element: '{0}' is prohibited")]
    ProhibitedElement(String),

    #[error("Invalid {type_name} value for element '{element}': {reason}")]
    InvalidPrimitive {
        element: String,
        type_name: &'static str,
        reason: String,
    },

    #[error("Invalid reference value '{reference}' for element '{element}': {reason}")]
    InvalidReference {
        element: String,
        reference: String,
        reason: String,
    },

    #[error("Resource type found in reference value '{resource_type}' for element '{element}' must be one of: {allowed:?}")]
    ReferenceTypeNotAllowed {
        element: String,
        resource_type: String,
        allowed: Vec<String>,
    },

    #[error("Element '{element}' does not conform to value set '{value_set}': {reason}")]
    ValueSetBinding {
        element: String,
        value_set: String,
        reason: String,
    },

    #[error("Invalid {type_name} literal: '{value}'")]
    Parse {
        type_name: &'static str,
        value: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    /// Path of the element that failed validation, if the error concerns one.
    pub fn element(&self) -> Option<&str> {
        match self {
            Error::MissingRequiredElement(element)
            | Error::ValueOrChildrenRequired(element)
            | Error::ProhibitedElement(element) => Some(element),
            Error::InvalidPrimitive { element, .. }
            | Error::InvalidReference { element, .. }
            | Error::ReferenceTypeNotAllowed { element, .. }
            | Error::ValueSetBinding { element, .. } => Some(element),
            Error::Parse { .. } | Error::SerializationError(_) => None,
        }
    }

    pub(crate) fn parse(type_name: &'static str, value: &str) -> Self {
        Error::Parse {
            type_name,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_path_is_reported() {
        let err = Error::MissingRequiredElement("RelatedPerson.patient".to_string());
        assert_eq!(err.element(), Some("RelatedPerson.patient"));
        assert_eq!(
            err.to_string(),
            "Missing required element: 'RelatedPerson.patient'"
        );

        assert_eq!(Error::parse("date", "2020-13").element(), None);
    }
}
