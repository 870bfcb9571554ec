use super::{Element, ElementBase, ElementBuilder, FhirString, HashMemo, Identifier, Uri};
use crate::binding::common;
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_opt, walk, Node, Visitable, Visitor};

/// A reference from one resource to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    base: ElementBase,
    reference: Option<FhirString>,
    type_: Option<Uri>,
    identifier: Option<Identifier>,
    display: Option<FhirString>,
    hash: HashMemo,
}

memoized_hash!(Reference { base, reference, type_, identifier, display });

impl Reference {
    pub fn builder() -> ReferenceBuilder {
        ReferenceBuilder::default()
    }

    pub fn to_builder(&self) -> ReferenceBuilder {
        ReferenceBuilder::from(self.clone())
    }

    /// Literal reference: relative, internal (`#id`) or absolute URL.
    pub fn reference(&self) -> Option<&FhirString> {
        self.reference.as_ref()
    }

    /// Type the reference refers to, as a resource type name or `StructureDefinition` URL.
    pub fn type_(&self) -> Option<&Uri> {
        self.type_.as_ref()
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    pub fn display(&self) -> Option<&FhirString> {
        self.display.as_ref()
    }

    pub fn reference_value(&self) -> Option<&str> {
        self.reference.as_ref().and_then(FhirString::as_str)
    }

    pub fn type_value(&self) -> Option<&str> {
        self.type_.as_ref().and_then(Uri::as_str)
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Reference")?;
        validation::check_primitive(ctx, self.reference.as_ref(), "Reference.reference")?;
        validation::check_primitive(ctx, self.type_.as_ref(), "Reference.type")?;
        validation::check_uri_binding(
            ctx,
            self.type_.as_ref(),
            "Reference.type",
            &common::RESOURCE_TYPE,
        )?;
        validation::check_primitive(ctx, self.display.as_ref(), "Reference.display")?;
        validation::require_value_or_children(self, "Reference")
    }
}

impl Element for Reference {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Reference"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || self.reference.is_some()
            || self.type_.is_some()
            || self.identifier.is_some()
            || self.display.is_some()
    }
}

impl Visitable for Reference {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Reference(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.reference.as_ref(), "reference", visitor);
            accept_opt(self.type_.as_ref(), "type", visitor);
            accept_opt(self.identifier.as_ref(), "identifier", visitor);
            accept_opt(self.display.as_ref(), "display", visitor);
        });
    }
}

impl ModelInfo for Reference {
    const TYPE_NAME: &'static str = "Reference";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("reference").summary(),
        ElementInfo::new("type").summary().binding(common::RESOURCE_TYPE),
        ElementInfo::new("identifier").summary(),
        ElementInfo::new("display").summary(),
    ];
}

impl CheckValue for Reference {}

#[derive(Debug, Clone, Default)]
pub struct ReferenceBuilder {
    base: ElementBase,
    reference: Option<FhirString>,
    type_: Option<Uri>,
    identifier: Option<Identifier>,
    display: Option<FhirString>,
}

impl ReferenceBuilder {
    pub fn reference(mut self, reference: impl Into<FhirString>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn type_(mut self, type_: impl Into<Uri>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn display(mut self, display: impl Into<FhirString>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn build(self) -> Result<Reference> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Reference> {
        let reference = Reference {
            base: self.base,
            reference: self.reference,
            type_: self.type_,
            identifier: self.identifier,
            display: self.display,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            reference.validate(ctx)?;
        }
        Ok(reference)
    }
}

impl ElementBuilder for ReferenceBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Reference> for ReferenceBuilder {
    fn from(reference: Reference) -> Self {
        Self {
            base: reference.base,
            reference: reference.reference,
            type_: reference.type_,
            identifier: reference.identifier,
            display: reference.display,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn literal_reference_accessors() {
        let reference = Reference::builder()
            .reference("Patient/123")
            .display("Peter James Chalmers")
            .build()
            .unwrap();
        assert_eq!(reference.reference_value(), Some("Patient/123"));
        assert_eq!(reference.type_value(), None);
        assert!(reference.identifier().is_none());
    }

    #[test]
    fn logical_reference_by_identifier() {
        let identifier = Identifier::builder()
            .system("http://hl7.org/fhir/sid/us-npi")
            .value("0123456789")
            .build()
            .unwrap();
        let reference = Reference::builder()
            .type_("Practitioner")
            .identifier(identifier.clone())
            .build()
            .unwrap();
        assert_eq!(reference.identifier(), Some(&identifier));
    }

    #[test]
    fn empty_reference_violates_ele_1() {
        let err = Reference::builder().build().unwrap_err();
        assert!(matches!(err, Error::ValueOrChildrenRequired(_)));
    }

    #[test]
    fn blank_display_is_rejected() {
        let err = Reference::builder().display("  ").build().unwrap_err();
        assert_eq!(err.element(), Some("Reference.display"));
    }
}
