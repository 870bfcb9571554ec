use super::{
    CodeValue, Coded, Element, ElementBase, ElementBuilder, FhirString, HashMemo, NameUse, Period,
};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

const NAME_USE: Binding = Binding::new(
    "NameUse",
    BindingStrength::Required,
    <NameUse as CodeValue>::VALUE_SET,
)
.description("The use of a human name.");

/// A human's name with the ability to identify parts and usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanName {
    base: ElementBase,
    use_: Option<Coded<NameUse>>,
    text: Option<FhirString>,
    family: Option<FhirString>,
    given: Vec<FhirString>,
    prefix: Vec<FhirString>,
    suffix: Vec<FhirString>,
    period: Option<Period>,
    hash: HashMemo,
}

memoized_hash!(HumanName { base, use_, text, family, given, prefix, suffix, period });

impl HumanName {
    pub fn builder() -> HumanNameBuilder {
        HumanNameBuilder::default()
    }

    pub fn to_builder(&self) -> HumanNameBuilder {
        HumanNameBuilder::from(self.clone())
    }

    pub fn use_(&self) -> Option<&Coded<NameUse>> {
        self.use_.as_ref()
    }

    pub fn text(&self) -> Option<&FhirString> {
        self.text.as_ref()
    }

    pub fn family(&self) -> Option<&FhirString> {
        self.family.as_ref()
    }

    /// Given names, including middle names, in order.
    pub fn given(&self) -> &[FhirString] {
        &self.given
    }

    pub fn prefix(&self) -> &[FhirString] {
        &self.prefix
    }

    pub fn suffix(&self) -> &[FhirString] {
        &self.suffix
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "HumanName")?;
        validation::check_primitive(ctx, self.text.as_ref(), "HumanName.text")?;
        validation::check_primitive(ctx, self.family.as_ref(), "HumanName.family")?;
        validation::check_primitives(ctx, &self.given, "HumanName.given")?;
        validation::check_primitives(ctx, &self.prefix, "HumanName.prefix")?;
        validation::check_primitives(ctx, &self.suffix, "HumanName.suffix")?;
        validation::require_value_or_children(self, "HumanName")
    }
}

impl Element for HumanName {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "HumanName"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || self.use_.is_some()
            || self.text.is_some()
            || self.family.is_some()
            || !self.given.is_empty()
            || !self.prefix.is_empty()
            || !self.suffix.is_empty()
            || self.period.is_some()
    }
}

impl Visitable for HumanName {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::HumanName(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.use_.as_ref(), "use", visitor);
            accept_opt(self.text.as_ref(), "text", visitor);
            accept_opt(self.family.as_ref(), "family", visitor);
            accept_list(&self.given, "given", visitor);
            accept_list(&self.prefix, "prefix", visitor);
            accept_list(&self.suffix, "suffix", visitor);
            accept_opt(self.period.as_ref(), "period", visitor);
        });
    }
}

impl ModelInfo for HumanName {
    const TYPE_NAME: &'static str = "HumanName";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("use").summary().binding(NAME_USE),
        ElementInfo::new("text").summary(),
        ElementInfo::new("family").summary(),
        ElementInfo::new("given").repeating().summary(),
        ElementInfo::new("prefix").repeating().summary(),
        ElementInfo::new("suffix").repeating().summary(),
        ElementInfo::new("period").summary(),
    ];
}

impl CheckValue for HumanName {}

#[derive(Debug, Clone, Default)]
pub struct HumanNameBuilder {
    base: ElementBase,
    use_: Option<Coded<NameUse>>,
    text: Option<FhirString>,
    family: Option<FhirString>,
    given: Vec<FhirString>,
    prefix: Vec<FhirString>,
    suffix: Vec<FhirString>,
    period: Option<Period>,
}

impl HumanNameBuilder {
    pub fn use_(mut self, use_: impl Into<Coded<NameUse>>) -> Self {
        self.use_ = Some(use_.into());
        self
    }

    pub fn text(mut self, text: impl Into<FhirString>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn family(mut self, family: impl Into<FhirString>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn given<I, T>(mut self, given: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FhirString>,
    {
        self.given.extend(given.into_iter().map(Into::into));
        self
    }

    pub fn set_given<I, T>(mut self, given: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FhirString>,
    {
        self.given = given.into_iter().map(Into::into).collect();
        self
    }

    pub fn prefix<I, T>(mut self, prefix: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FhirString>,
    {
        self.prefix.extend(prefix.into_iter().map(Into::into));
        self
    }

    pub fn set_prefix<I, T>(mut self, prefix: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FhirString>,
    {
        self.prefix = prefix.into_iter().map(Into::into).collect();
        self
    }

    pub fn suffix<I, T>(mut self, suffix: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FhirString>,
    {
        self.suffix.extend(suffix.into_iter().map(Into::into));
        self
    }

    pub fn set_suffix<I, T>(mut self, suffix: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FhirString>,
    {
        self.suffix = suffix.into_iter().map(Into::into).collect();
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn build(self) -> Result<HumanName> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<HumanName> {
        let human_name = HumanName {
            base: self.base,
            use_: self.use_,
            text: self.text,
            family: self.family,
            given: self.given,
            prefix: self.prefix,
            suffix: self.suffix,
            period: self.period,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            human_name.validate(ctx)?;
        }
        Ok(human_name)
    }
}

impl ElementBuilder for HumanNameBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<HumanName> for HumanNameBuilder {
    fn from(human_name: HumanName) -> Self {
        Self {
            base: human_name.base,
            use_: human_name.use_,
            text: human_name.text,
            family: human_name.family,
            given: human_name.given,
            prefix: human_name.prefix,
            suffix: human_name.suffix,
            period: human_name.period,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_names_append_in_order() {
        let name = HumanName::builder()
            .family("Chalmers")
            .given(["Peter"])
            .given(["James"])
            .build()
            .unwrap();
        let given: Vec<_> = name.given().iter().filter_map(FhirString::as_str).collect();
        assert_eq!(given, ["Peter", "James"]);
    }

    #[test]
    fn set_given_replaces() {
        let name = HumanName::builder()
            .given(["Peter", "James"])
            .set_given(Vec::<&str>::new())
            .text("Peter Chalmers")
            .build()
            .unwrap();
        assert!(name.given().is_empty());
    }
}
