use super::{Boolean, Code, Element, ElementBase, ElementBuilder, FhirString, HashMemo, Uri};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

/// A reference to a code defined by a terminology system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coding {
    base: ElementBase,
    system: Option<Uri>,
    version: Option<FhirString>,
    code: Option<Code>,
    display: Option<FhirString>,
    user_selected: Option<Boolean>,
    hash: HashMemo,
}

memoized_hash!(Coding {
    base,
    system,
    version,
    code,
    display,
    user_selected
});

impl Coding {
    pub fn builder() -> CodingBuilder {
        CodingBuilder::default()
    }

    pub fn to_builder(&self) -> CodingBuilder {
        CodingBuilder::from(self.clone())
    }

    pub fn system(&self) -> Option<&Uri> {
        self.system.as_ref()
    }

    pub fn version(&self) -> Option<&FhirString> {
        self.version.as_ref()
    }

    pub fn code(&self) -> Option<&Code> {
        self.code.as_ref()
    }

    pub fn display(&self) -> Option<&FhirString> {
        self.display.as_ref()
    }

    pub fn user_selected(&self) -> Option<&Boolean> {
        self.user_selected.as_ref()
    }

    pub fn system_value(&self) -> Option<&str> {
        self.system.as_ref().and_then(Uri::as_str)
    }

    pub fn code_value(&self) -> Option<&str> {
        self.code.as_ref().and_then(Code::as_str)
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Coding")?;
        validation::check_primitive(ctx, self.system.as_ref(), "Coding.system")?;
        validation::check_primitive(ctx, self.version.as_ref(), "Coding.version")?;
        validation::check_primitive(ctx, self.code.as_ref(), "Coding.code")?;
        validation::check_primitive(ctx, self.display.as_ref(), "Coding.display")?;
        validation::require_value_or_children(self, "Coding")
    }
}

impl Element for Coding {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Coding"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || self.system.is_some()
            || self.version.is_some()
            || self.code.is_some()
            || self.display.is_some()
            || self.user_selected.is_some()
    }
}

impl Visitable for Coding {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Coding(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.system.as_ref(), "system", visitor);
            accept_opt(self.version.as_ref(), "version", visitor);
            accept_opt(self.code.as_ref(), "code", visitor);
            accept_opt(self.display.as_ref(), "display", visitor);
            accept_opt(self.user_selected.as_ref(), "userSelected", visitor);
        });
    }
}

impl ModelInfo for Coding {
    const TYPE_NAME: &'static str = "Coding";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("system").summary(),
        ElementInfo::new("version").summary(),
        ElementInfo::new("code").summary(),
        ElementInfo::new("display").summary(),
        ElementInfo::new("userSelected").summary(),
    ];
}

impl CheckValue for Coding {}

#[derive(Debug, Clone, Default)]
pub struct CodingBuilder {
    base: ElementBase,
    system: Option<Uri>,
    version: Option<FhirString>,
    code: Option<Code>,
    display: Option<FhirString>,
    user_selected: Option<Boolean>,
}

impl CodingBuilder {
    pub fn system(mut self, system: impl Into<Uri>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn version(mut self, version: impl Into<FhirString>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn code(mut self, code: impl Into<Code>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn display(mut self, display: impl Into<FhirString>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn user_selected(mut self, user_selected: impl Into<Boolean>) -> Self {
        self.user_selected = Some(user_selected.into());
        self
    }

    pub fn build(self) -> Result<Coding> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Coding> {
        let coding = Coding {
            base: self.base,
            system: self.system,
            version: self.version,
            code: self.code,
            display: self.display,
            user_selected: self.user_selected,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            coding.validate(ctx)?;
        }
        Ok(coding)
    }
}

impl ElementBuilder for CodingBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Coding> for CodingBuilder {
    fn from(coding: Coding) -> Self {
        Self {
            base: coding.base,
            system: coding.system,
            version: coding.version,
            code: coding.code,
            display: coding.display,
            user_selected: coding.user_selected,
        }
    }
}

/// A concept that may be defined by a formal reference to a terminology or
/// ontology, or may be provided by text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeableConcept {
    base: ElementBase,
    coding: Vec<Coding>,
    text: Option<FhirString>,
    hash: HashMemo,
}

memoized_hash!(CodeableConcept { base, coding, text });

impl CodeableConcept {
    pub fn builder() -> CodeableConceptBuilder {
        CodeableConceptBuilder::default()
    }

    pub fn to_builder(&self) -> CodeableConceptBuilder {
        CodeableConceptBuilder::from(self.clone())
    }

    pub fn coding(&self) -> &[Coding] {
        &self.coding
    }

    pub fn text(&self) -> Option<&FhirString> {
        self.text.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "CodeableConcept")?;
        validation::check_primitive(ctx, self.text.as_ref(), "CodeableConcept.text")?;
        validation::require_value_or_children(self, "CodeableConcept")
    }
}

impl Element for CodeableConcept {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "CodeableConcept"
    }

    fn has_children(&self) -> bool {
        self.base.has_children() || !self.coding.is_empty() || self.text.is_some()
    }
}

impl Visitable for CodeableConcept {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::CodeableConcept(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_list(&self.coding, "coding", visitor);
            accept_opt(self.text.as_ref(), "text", visitor);
        });
    }
}

impl ModelInfo for CodeableConcept {
    const TYPE_NAME: &'static str = "CodeableConcept";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("coding").repeating().summary(),
        ElementInfo::new("text").summary(),
    ];
}

impl CheckValue for CodeableConcept {}

#[derive(Debug, Clone, Default)]
pub struct CodeableConceptBuilder {
    base: ElementBase,
    coding: Vec<Coding>,
    text: Option<FhirString>,
}

impl CodeableConceptBuilder {
    /// Append codings.
    pub fn coding(mut self, coding: impl IntoIterator<Item = Coding>) -> Self {
        self.coding.extend(coding);
        self
    }

    /// Replace all codings.
    pub fn set_coding(mut self, coding: impl IntoIterator<Item = Coding>) -> Self {
        self.coding = coding.into_iter().collect();
        self
    }

    pub fn text(mut self, text: impl Into<FhirString>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn build(self) -> Result<CodeableConcept> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<CodeableConcept> {
        let concept = CodeableConcept {
            base: self.base,
            coding: self.coding,
            text: self.text,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            concept.validate(ctx)?;
        }
        Ok(concept)
    }
}

impl ElementBuilder for CodeableConceptBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<CodeableConcept> for CodeableConceptBuilder {
    fn from(concept: CodeableConcept) -> Self {
        Self {
            base: concept.base,
            coding: concept.coding,
            text: concept.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_concept_violates_ele_1() {
        let err = CodeableConcept::builder().build().unwrap_err();
        assert!(matches!(err, Error::ValueOrChildrenRequired(ref p) if p == "CodeableConcept"));
    }

    #[test]
    fn text_only_concept_is_valid() {
        let concept = CodeableConcept::builder().text("Paracetamol").build().unwrap();
        assert!(concept.coding().is_empty());
        assert_eq!(concept.text().and_then(FhirString::as_str), Some("Paracetamol"));
    }

    #[test]
    fn invalid_code_names_element() {
        let err = Coding::builder().code("two  spaces").build().unwrap_err();
        assert_eq!(err.element(), Some("Coding.code"));
    }

    #[test]
    fn set_coding_replaces() {
        let a = Coding::builder().code("a").build().unwrap();
        let b = Coding::builder().code("b").build().unwrap();
        let concept = CodeableConcept::builder()
            .coding([a])
            .set_coding([b.clone()])
            .build()
            .unwrap();
        assert_eq!(concept.coding(), &[b]);
    }
}
