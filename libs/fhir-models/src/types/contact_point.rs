use super::{
    CodeValue, Coded, ContactPointSystem, ContactPointUse, Element, ElementBase, ElementBuilder,
    FhirString, HashMemo, Period, PositiveInt,
};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_opt, walk, Node, Visitable, Visitor};

const CONTACT_POINT_SYSTEM: Binding = Binding::new(
    "ContactPointSystem",
    BindingStrength::Required,
    <ContactPointSystem as CodeValue>::VALUE_SET,
)
.description("Telecommunications form for contact point.");

const CONTACT_POINT_USE: Binding = Binding::new(
    "ContactPointUse",
    BindingStrength::Required,
    <ContactPointUse as CodeValue>::VALUE_SET,
)
.description("Use of contact point.");

/// Details for all kinds of technology mediated contact points for a person or organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPoint {
    base: ElementBase,
    system: Option<Coded<ContactPointSystem>>,
    value: Option<FhirString>,
    use_: Option<Coded<ContactPointUse>>,
    rank: Option<PositiveInt>,
    period: Option<Period>,
    hash: HashMemo,
}

memoized_hash!(ContactPoint { base, system, value, use_, rank, period });

impl ContactPoint {
    pub fn builder() -> ContactPointBuilder {
        ContactPointBuilder::default()
    }

    pub fn to_builder(&self) -> ContactPointBuilder {
        ContactPointBuilder::from(self.clone())
    }

    pub fn system(&self) -> Option<&Coded<ContactPointSystem>> {
        self.system.as_ref()
    }

    pub fn value(&self) -> Option<&FhirString> {
        self.value.as_ref()
    }

    pub fn use_(&self) -> Option<&Coded<ContactPointUse>> {
        self.use_.as_ref()
    }

    /// Preference order, 1 being the highest.
    pub fn rank(&self) -> Option<&PositiveInt> {
        self.rank.as_ref()
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "ContactPoint")?;
        validation::check_primitive(ctx, self.value.as_ref(), "ContactPoint.value")?;
        validation::check_primitive(ctx, self.rank.as_ref(), "ContactPoint.rank")?;
        validation::require_value_or_children(self, "ContactPoint")
    }
}

impl Element for ContactPoint {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "ContactPoint"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || self.system.is_some()
            || self.value.is_some()
            || self.use_.is_some()
            || self.rank.is_some()
            || self.period.is_some()
    }
}

impl Visitable for ContactPoint {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::ContactPoint(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.system.as_ref(), "system", visitor);
            accept_opt(self.value.as_ref(), "value", visitor);
            accept_opt(self.use_.as_ref(), "use", visitor);
            accept_opt(self.rank.as_ref(), "rank", visitor);
            accept_opt(self.period.as_ref(), "period", visitor);
        });
    }
}

impl ModelInfo for ContactPoint {
    const TYPE_NAME: &'static str = "ContactPoint";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("system").summary().binding(CONTACT_POINT_SYSTEM),
        ElementInfo::new("value").summary(),
        ElementInfo::new("use").summary().binding(CONTACT_POINT_USE),
        ElementInfo::new("rank").summary(),
        ElementInfo::new("period").summary(),
    ];
}

impl CheckValue for ContactPoint {}

#[derive(Debug, Clone, Default)]
pub struct ContactPointBuilder {
    base: ElementBase,
    system: Option<Coded<ContactPointSystem>>,
    value: Option<FhirString>,
    use_: Option<Coded<ContactPointUse>>,
    rank: Option<PositiveInt>,
    period: Option<Period>,
}

impl ContactPointBuilder {
    pub fn system(mut self, system: impl Into<Coded<ContactPointSystem>>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn value(mut self, value: impl Into<FhirString>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn use_(mut self, use_: impl Into<Coded<ContactPointUse>>) -> Self {
        self.use_ = Some(use_.into());
        self
    }

    pub fn rank(mut self, rank: impl Into<PositiveInt>) -> Self {
        self.rank = Some(rank.into());
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn build(self) -> Result<ContactPoint> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<ContactPoint> {
        let contact_point = ContactPoint {
            base: self.base,
            system: self.system,
            value: self.value,
            use_: self.use_,
            rank: self.rank,
            period: self.period,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            contact_point.validate(ctx)?;
        }
        Ok(contact_point)
    }
}

impl ElementBuilder for ContactPointBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<ContactPoint> for ContactPointBuilder {
    fn from(contact_point: ContactPoint) -> Self {
        Self {
            base: contact_point.base,
            system: contact_point.system,
            value: contact_point.value,
            use_: contact_point.use_,
            rank: contact_point.rank,
            period: contact_point.period,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_must_be_positive() {
        let err = ContactPoint::builder()
            .system(ContactPointSystem::Phone)
            .value("+1 555 0100")
            .rank(0)
            .build()
            .unwrap_err();
        assert_eq!(err.element(), Some("ContactPoint.rank"));
    }
}
