use super::{
    CodeValue, Coded, Element, ElementBase, ElementBuilder, HashMemo, NarrativeStatus, Xhtml,
};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{walk, Node, Visitable, Visitor};

const NARRATIVE_STATUS: Binding = Binding::new(
    "NarrativeStatus",
    BindingStrength::Required,
    <NarrativeStatus as CodeValue>::VALUE_SET,
)
.description("The status of a resource narrative.");

/// A human-readable summary of the resource conveying the essential clinical and
/// business information for the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrative {
    base: ElementBase,
    status: Coded<NarrativeStatus>,
    div: Xhtml,
    hash: HashMemo,
}

memoized_hash!(Narrative { base, status, div });

impl Narrative {
    pub fn builder() -> NarrativeBuilder {
        NarrativeBuilder::default()
    }

    pub fn to_builder(&self) -> NarrativeBuilder {
        NarrativeBuilder::from(self.clone())
    }

    pub fn status(&self) -> &Coded<NarrativeStatus> {
        &self.status
    }

    pub fn div(&self) -> &Xhtml {
        &self.div
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Narrative")?;
        validation::check_primitive(ctx, Some(&self.div), "Narrative.div")?;
        validation::require_value_or_children(self, "Narrative")
    }
}

impl Element for Narrative {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Narrative"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl Visitable for Narrative {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Narrative(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            self.status.accept("status", None, visitor);
            self.div.accept("div", None, visitor);
        });
    }
}

impl ModelInfo for Narrative {
    const TYPE_NAME: &'static str = "Narrative";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("status").required().binding(NARRATIVE_STATUS),
        ElementInfo::new("div").required(),
    ];
}

impl CheckValue for Narrative {}

#[derive(Debug, Clone, Default)]
pub struct NarrativeBuilder {
    base: ElementBase,
    status: Option<Coded<NarrativeStatus>>,
    div: Option<Xhtml>,
}

impl NarrativeBuilder {
    pub fn status(mut self, status: impl Into<Coded<NarrativeStatus>>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn div(mut self, div: impl Into<Xhtml>) -> Self {
        self.div = Some(div.into());
        self
    }

    pub fn build(self) -> Result<Narrative> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Narrative> {
        let status = validation::require_non_null(self.status, "Narrative.status")?;
        let div = validation::require_non_null(self.div, "Narrative.div")?;
        let narrative = Narrative {
            base: self.base,
            status,
            div,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            narrative.validate(ctx)?;
        }
        Ok(narrative)
    }
}

impl ElementBuilder for NarrativeBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Narrative> for NarrativeBuilder {
    fn from(narrative: Narrative) -> Self {
        Self {
            base: narrative.base,
            status: Some(narrative.status),
            div: Some(narrative.div),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const DIV: &str = r#"<div xmlns="http://www.w3.org/1999/xhtml"><p>Paracetamol 500mg</p></div>"#;

    #[test]
    fn status_and_div_are_required() {
        let err = Narrative::builder().div(DIV).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "Narrative.status"));
        let err = Narrative::builder()
            .status(NarrativeStatus::Generated)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "Narrative.div"));
    }

    #[test]
    fn div_must_be_xhtml() {
        let narrative = Narrative::builder()
            .status(NarrativeStatus::Generated)
            .div(DIV)
            .build()
            .unwrap();
        assert_eq!(narrative.status().value(), Some(NarrativeStatus::Generated));

        let err = Narrative::builder()
            .status(NarrativeStatus::Generated)
            .div("<p>plain</p>")
            .build()
            .unwrap_err();
        assert_eq!(err.element(), Some("Narrative.div"));
    }
}
