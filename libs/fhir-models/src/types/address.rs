use super::{
    AddressType, AddressUse, CodeValue, Coded, Element, ElementBase, ElementBuilder, FhirString,
    HashMemo, Period,
};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

const ADDRESS_USE: Binding = Binding::new(
    "AddressUse",
    BindingStrength::Required,
    <AddressUse as CodeValue>::VALUE_SET,
)
.description("The use of an address.");

const ADDRESS_TYPE: Binding = Binding::new(
    "AddressType",
    BindingStrength::Required,
    <AddressType as CodeValue>::VALUE_SET,
)
.description("The type of an address (physical / postal).");

/// An address expressed using postal conventions (as opposed to GPS or other
/// location definition formats).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    base: ElementBase,
    use_: Option<Coded<AddressUse>>,
    type_: Option<Coded<AddressType>>,
    text: Option<FhirString>,
    line: Vec<FhirString>,
    city: Option<FhirString>,
    district: Option<FhirString>,
    state: Option<FhirString>,
    postal_code: Option<FhirString>,
    country: Option<FhirString>,
    period: Option<Period>,
    hash: HashMemo,
}

memoized_hash!(Address {
    base,
    use_,
    type_,
    text,
    line,
    city,
    district,
    state,
    postal_code,
    country,
    period,
});

impl Address {
    pub fn builder() -> AddressBuilder {
        AddressBuilder::default()
    }

    pub fn to_builder(&self) -> AddressBuilder {
        AddressBuilder::from(self.clone())
    }

    pub fn use_(&self) -> Option<&Coded<AddressUse>> {
        self.use_.as_ref()
    }

    pub fn type_(&self) -> Option<&Coded<AddressType>> {
        self.type_.as_ref()
    }

    pub fn text(&self) -> Option<&FhirString> {
        self.text.as_ref()
    }

    pub fn line(&self) -> &[FhirString] {
        &self.line
    }

    pub fn city(&self) -> Option<&FhirString> {
        self.city.as_ref()
    }

    pub fn district(&self) -> Option<&FhirString> {
        self.district.as_ref()
    }

    pub fn state(&self) -> Option<&FhirString> {
        self.state.as_ref()
    }

    pub fn postal_code(&self) -> Option<&FhirString> {
        self.postal_code.as_ref()
    }

    pub fn country(&self) -> Option<&FhirString> {
        self.country.as_ref()
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Address")?;
        validation::check_primitive(ctx, self.text.as_ref(), "Address.text")?;
        validation::check_primitives(ctx, &self.line, "Address.line")?;
        validation::check_primitive(ctx, self.city.as_ref(), "Address.city")?;
        validation::check_primitive(ctx, self.district.as_ref(), "Address.district")?;
        validation::check_primitive(ctx, self.state.as_ref(), "Address.state")?;
        validation::check_primitive(ctx, self.postal_code.as_ref(), "Address.postalCode")?;
        validation::check_primitive(ctx, self.country.as_ref(), "Address.country")?;
        validation::require_value_or_children(self, "Address")
    }
}

impl Element for Address {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Address"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || self.use_.is_some()
            || self.type_.is_some()
            || self.text.is_some()
            || !self.line.is_empty()
            || self.city.is_some()
            || self.district.is_some()
            || self.state.is_some()
            || self.postal_code.is_some()
            || self.country.is_some()
            || self.period.is_some()
    }
}

impl Visitable for Address {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Address(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.use_.as_ref(), "use", visitor);
            accept_opt(self.type_.as_ref(), "type", visitor);
            accept_opt(self.text.as_ref(), "text", visitor);
            accept_list(&self.line, "line", visitor);
            accept_opt(self.city.as_ref(), "city", visitor);
            accept_opt(self.district.as_ref(), "district", visitor);
            accept_opt(self.state.as_ref(), "state", visitor);
            accept_opt(self.postal_code.as_ref(), "postalCode", visitor);
            accept_opt(self.country.as_ref(), "country", visitor);
            accept_opt(self.period.as_ref(), "period", visitor);
        });
    }
}

impl ModelInfo for Address {
    const TYPE_NAME: &'static str = "Address";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("use").summary().binding(ADDRESS_USE),
        ElementInfo::new("type").summary().binding(ADDRESS_TYPE),
        ElementInfo::new("text").summary(),
        ElementInfo::new("line").repeating().summary(),
        ElementInfo::new("city").summary(),
        ElementInfo::new("district").summary(),
        ElementInfo::new("state").summary(),
        ElementInfo::new("postalCode").summary(),
        ElementInfo::new("country").summary(),
        ElementInfo::new("period").summary(),
    ];
}

impl CheckValue for Address {}

#[derive(Debug, Clone, Default)]
pub struct AddressBuilder {
    base: ElementBase,
    use_: Option<Coded<AddressUse>>,
    type_: Option<Coded<AddressType>>,
    text: Option<FhirString>,
    line: Vec<FhirString>,
    city: Option<FhirString>,
    district: Option<FhirString>,
    state: Option<FhirString>,
    postal_code: Option<FhirString>,
    country: Option<FhirString>,
    period: Option<Period>,
}

impl AddressBuilder {
    pub fn use_(mut self, use_: impl Into<Coded<AddressUse>>) -> Self {
        self.use_ = Some(use_.into());
        self
    }

    pub fn type_(mut self, type_: impl Into<Coded<AddressType>>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    pub fn text(mut self, text: impl Into<FhirString>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn line<I, T>(mut self, line: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FhirString>,
    {
        self.line.extend(line.into_iter().map(Into::into));
        self
    }

    pub fn set_line<I, T>(mut self, line: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FhirString>,
    {
        self.line = line.into_iter().map(Into::into).collect();
        self
    }

    pub fn city(mut self, city: impl Into<FhirString>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn district(mut self, district: impl Into<FhirString>) -> Self {
        self.district = Some(district.into());
        self
    }

    pub fn state(mut self, state: impl Into<FhirString>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn postal_code(mut self, postal_code: impl Into<FhirString>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn country(mut self, country: impl Into<FhirString>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn build(self) -> Result<Address> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Address> {
        let address = Address {
            base: self.base,
            use_: self.use_,
            type_: self.type_,
            text: self.text,
            line: self.line,
            city: self.city,
            district: self.district,
            state: self.state,
            postal_code: self.postal_code,
            country: self.country,
            period: self.period,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            address.validate(ctx)?;
        }
        Ok(address)
    }
}

impl ElementBuilder for AddressBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Address> for AddressBuilder {
    fn from(address: Address) -> Self {
        Self {
            base: address.base,
            use_: address.use_,
            type_: address.type_,
            text: address.text,
            line: address.line,
            city: address.city,
            district: address.district,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            period: address.period,
        }
    }
}
