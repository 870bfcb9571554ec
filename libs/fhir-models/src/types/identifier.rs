use super::{
    CodeValue, CodeableConcept, Coded, Element, ElementBase, ElementBuilder, FhirString, HashMemo,
    IdentifierUse, Period, Reference, Uri,
};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_opt, walk, Node, Visitable, Visitor};

const IDENTIFIER_USE: Binding = Binding::new(
    "IdentifierUse",
    BindingStrength::Required,
    <IdentifierUse as CodeValue>::VALUE_SET,
)
.description("Identifies the purpose for this identifier, if known .");

const IDENTIFIER_TYPE: Binding = Binding::new(
    "IdentifierType",
    BindingStrength::Extensible,
    "http://hl7.org/fhir/ValueSet/identifier-type",
)
.description("A coded type for an identifier that can be used to determine which identifier to use for a specific purpose.");

const ASSIGNER_TARGETS: &[&str] = &["Organization"];

/// An identifier intended for computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    base: ElementBase,
    use_: Option<Coded<IdentifierUse>>,
    type_: Option<CodeableConcept>,
    system: Option<Uri>,
    value: Option<FhirString>,
    period: Option<Period>,
    assigner: Option<Box<Reference>>,
    hash: HashMemo,
}

memoized_hash!(Identifier { base, use_, type_, system, value, period, assigner });

impl Identifier {
    pub fn builder() -> IdentifierBuilder {
        IdentifierBuilder::default()
    }

    pub fn to_builder(&self) -> IdentifierBuilder {
        IdentifierBuilder::from(self.clone())
    }

    pub fn use_(&self) -> Option<&Coded<IdentifierUse>> {
        self.use_.as_ref()
    }

    pub fn type_(&self) -> Option<&CodeableConcept> {
        self.type_.as_ref()
    }

    /// Namespace for the identifier value.
    pub fn system(&self) -> Option<&Uri> {
        self.system.as_ref()
    }

    pub fn value(&self) -> Option<&FhirString> {
        self.value.as_ref()
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }

    /// Organization that issued the identifier.
    pub fn assigner(&self) -> Option<&Reference> {
        self.assigner.as_deref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Identifier")?;
        validation::check_concept_binding(
            ctx,
            self.type_.as_ref(),
            "Identifier.type",
            &IDENTIFIER_TYPE,
        )?;
        validation::check_primitive(ctx, self.system.as_ref(), "Identifier.system")?;
        validation::check_primitive(ctx, self.value.as_ref(), "Identifier.value")?;
        validation::check_reference_type(
            ctx,
            self.assigner.as_deref(),
            "Identifier.assigner",
            ASSIGNER_TARGETS,
        )?;
        validation::require_value_or_children(self, "Identifier")
    }
}

impl Element for Identifier {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Identifier"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || self.use_.is_some()
            || self.type_.is_some()
            || self.system.is_some()
            || self.value.is_some()
            || self.period.is_some()
            || self.assigner.is_some()
    }
}

impl Visitable for Identifier {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Identifier(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.use_.as_ref(), "use", visitor);
            accept_opt(self.type_.as_ref(), "type", visitor);
            accept_opt(self.system.as_ref(), "system", visitor);
            accept_opt(self.value.as_ref(), "value", visitor);
            accept_opt(self.period.as_ref(), "period", visitor);
            accept_opt(self.assigner.as_deref(), "assigner", visitor);
        });
    }
}

impl ModelInfo for Identifier {
    const TYPE_NAME: &'static str = "Identifier";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("use").summary().binding(IDENTIFIER_USE),
        ElementInfo::new("type").summary().binding(IDENTIFIER_TYPE),
        ElementInfo::new("system").summary(),
        ElementInfo::new("value").summary(),
        ElementInfo::new("period").summary(),
        ElementInfo::new("assigner").summary().targets(ASSIGNER_TARGETS),
    ];
}

impl CheckValue for Identifier {}

#[derive(Debug, Clone, Default)]
pub struct IdentifierBuilder {
    base: ElementBase,
    use_: Option<Coded<IdentifierUse>>,
    type_: Option<CodeableConcept>,
    system: Option<Uri>,
    value: Option<FhirString>,
    period: Option<Period>,
    assigner: Option<Box<Reference>>,
}

impl IdentifierBuilder {
    pub fn use_(mut self, use_: impl Into<Coded<IdentifierUse>>) -> Self {
        self.use_ = Some(use_.into());
        self
    }

    pub fn type_(mut self, type_: CodeableConcept) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn system(mut self, system: impl Into<Uri>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn value(mut self, value: impl Into<FhirString>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn assigner(mut self, assigner: Reference) -> Self {
        self.assigner = Some(Box::new(assigner));
        self
    }

    pub fn build(self) -> Result<Identifier> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Identifier> {
        let identifier = Identifier {
            base: self.base,
            use_: self.use_,
            type_: self.type_,
            system: self.system,
            value: self.value,
            period: self.period,
            assigner: self.assigner,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            identifier.validate(ctx)?;
        }
        Ok(identifier)
    }
}

impl ElementBuilder for IdentifierBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Identifier> for IdentifierBuilder {
    fn from(identifier: Identifier) -> Self {
        Self {
            base: identifier.base,
            use_: identifier.use_,
            type_: identifier.type_,
            system: identifier.system,
            value: identifier.value,
            period: identifier.period,
            assigner: identifier.assigner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn assigner_must_be_an_organization() {
        let assigner = Reference::builder().reference("Patient/1").build().unwrap();
        let err = Identifier::builder()
            .value("12345")
            .assigner(assigner)
            .build()
            .unwrap_err();
        match err {
            Error::ReferenceTypeNotAllowed {
                element,
                resource_type,
                allowed,
            } => {
                assert_eq!(element, "Identifier.assigner");
                assert_eq!(resource_type, "Patient");
                assert_eq!(allowed, vec!["Organization".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn coded_use() {
        let identifier = Identifier::builder()
            .use_(IdentifierUse::Official)
            .value("MRN-1")
            .build()
            .unwrap();
        assert_eq!(
            identifier.use_().and_then(Coded::value),
            Some(IdentifierUse::Official)
        );
    }

    #[test]
    fn metadata_lists_declared_elements() {
        let names: Vec<_> = Identifier::ELEMENTS.iter().map(|e| e.name).collect();
        assert_eq!(names, ["use", "type", "system", "value", "period", "assigner"]);
        assert_eq!(
            Identifier::element_info("assigner").map(|e| e.targets),
            Some(&["Organization"][..])
        );
    }
}
