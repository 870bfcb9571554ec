//! `Quantity` and the datatypes composed of it.

use super::{
    Code, CodeValue, Coded, Decimal, Element, ElementBase, ElementBuilder, FhirString, HashMemo,
    QuantityComparator, Uri,
};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_opt, walk, Node, Visitable, Visitor};

const QUANTITY_COMPARATOR: Binding = Binding::new(
    "QuantityComparator",
    BindingStrength::Required,
    <QuantityComparator as CodeValue>::VALUE_SET,
)
.description("How the Quantity should be understood and represented.");

/// A measured amount, or an amount that can potentially be measured.
///
/// Also used for the `SimpleQuantity` and `Duration` profiles; elements using
/// `SimpleQuantity` reject a `comparator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantity {
    base: ElementBase,
    value: Option<Decimal>,
    comparator: Option<Coded<QuantityComparator>>,
    unit: Option<FhirString>,
    system: Option<Uri>,
    code: Option<Code>,
    hash: HashMemo,
}

memoized_hash!(Quantity { base, value, comparator, unit, system, code });

impl Quantity {
    pub fn builder() -> QuantityBuilder {
        QuantityBuilder::default()
    }

    pub fn to_builder(&self) -> QuantityBuilder {
        QuantityBuilder::from(self.clone())
    }

    pub fn value(&self) -> Option<&Decimal> {
        self.value.as_ref()
    }

    /// How to understand the value; only `Quantity` proper may carry one.
    pub fn comparator(&self) -> Option<&Coded<QuantityComparator>> {
        self.comparator.as_ref()
    }

    pub fn unit(&self) -> Option<&FhirString> {
        self.unit.as_ref()
    }

    pub fn system(&self) -> Option<&Uri> {
        self.system.as_ref()
    }

    pub fn code(&self) -> Option<&Code> {
        self.code.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Quantity")?;
        validation::check_primitive(ctx, self.value.as_ref(), "Quantity.value")?;
        validation::check_primitive(ctx, self.unit.as_ref(), "Quantity.unit")?;
        validation::check_primitive(ctx, self.system.as_ref(), "Quantity.system")?;
        validation::check_primitive(ctx, self.code.as_ref(), "Quantity.code")?;
        validation::require_value_or_children(self, "Quantity")
    }
}

impl Element for Quantity {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Quantity"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || self.value.is_some()
            || self.comparator.is_some()
            || self.unit.is_some()
            || self.system.is_some()
            || self.code.is_some()
    }
}

impl Visitable for Quantity {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Quantity(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.value.as_ref(), "value", visitor);
            accept_opt(self.comparator.as_ref(), "comparator", visitor);
            accept_opt(self.unit.as_ref(), "unit", visitor);
            accept_opt(self.system.as_ref(), "system", visitor);
            accept_opt(self.code.as_ref(), "code", visitor);
        });
    }
}

impl ModelInfo for Quantity {
    const TYPE_NAME: &'static str = "Quantity";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("value").summary(),
        ElementInfo::new("comparator").summary().binding(QUANTITY_COMPARATOR),
        ElementInfo::new("unit").summary(),
        ElementInfo::new("system").summary(),
        ElementInfo::new("code").summary(),
    ];
}

impl CheckValue for Quantity {}

#[derive(Debug, Clone, Default)]
pub struct QuantityBuilder {
    base: ElementBase,
    value: Option<Decimal>,
    comparator: Option<Coded<QuantityComparator>>,
    unit: Option<FhirString>,
    system: Option<Uri>,
    code: Option<Code>,
}

impl QuantityBuilder {
    pub fn value(mut self, value: impl Into<Decimal>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn comparator(mut self, comparator: impl Into<Coded<QuantityComparator>>) -> Self {
        self.comparator = Some(comparator.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<FhirString>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn system(mut self, system: impl Into<Uri>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn code(mut self, code: impl Into<Code>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn build(self) -> Result<Quantity> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Quantity> {
        let quantity = Quantity {
            base: self.base,
            value: self.value,
            comparator: self.comparator,
            unit: self.unit,
            system: self.system,
            code: self.code,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            quantity.validate(ctx)?;
        }
        Ok(quantity)
    }
}

impl ElementBuilder for QuantityBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Quantity> for QuantityBuilder {
    fn from(quantity: Quantity) -> Self {
        Self {
            base: quantity.base,
            value: quantity.value,
            comparator: quantity.comparator,
            unit: quantity.unit,
            system: quantity.system,
            code: quantity.code,
        }
    }
}

/// A relationship of two Quantity values expressed as a numerator and a denominator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ratio {
    base: ElementBase,
    numerator: Option<Quantity>,
    denominator: Option<Quantity>,
    hash: HashMemo,
}

memoized_hash!(Ratio { base, numerator, denominator });

impl Ratio {
    pub fn builder() -> RatioBuilder {
        RatioBuilder::default()
    }

    pub fn to_builder(&self) -> RatioBuilder {
        RatioBuilder::from(self.clone())
    }

    pub fn numerator(&self) -> Option<&Quantity> {
        self.numerator.as_ref()
    }

    pub fn denominator(&self) -> Option<&Quantity> {
        self.denominator.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Ratio")?;
        validation::require_value_or_children(self, "Ratio")
    }
}

impl Element for Ratio {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Ratio"
    }

    fn has_children(&self) -> bool {
        self.base.has_children() || self.numerator.is_some() || self.denominator.is_some()
    }
}

impl Visitable for Ratio {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Ratio(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.numerator.as_ref(), "numerator", visitor);
            accept_opt(self.denominator.as_ref(), "denominator", visitor);
        });
    }
}

impl ModelInfo for Ratio {
    const TYPE_NAME: &'static str = "Ratio";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("numerator").summary(),
        ElementInfo::new("denominator").summary(),
    ];
}

impl CheckValue for Ratio {}

#[derive(Debug, Clone, Default)]
pub struct RatioBuilder {
    base: ElementBase,
    numerator: Option<Quantity>,
    denominator: Option<Quantity>,
}

impl RatioBuilder {
    pub fn numerator(mut self, numerator: Quantity) -> Self {
        self.numerator = Some(numerator);
        self
    }

    pub fn denominator(mut self, denominator: Quantity) -> Self {
        self.denominator = Some(denominator);
        self
    }

    pub fn build(self) -> Result<Ratio> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Ratio> {
        let ratio = Ratio {
            base: self.base,
            numerator: self.numerator,
            denominator: self.denominator,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            ratio.validate(ctx)?;
        }
        Ok(ratio)
    }
}

impl ElementBuilder for RatioBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Ratio> for RatioBuilder {
    fn from(ratio: Ratio) -> Self {
        Self {
            base: ratio.base,
            numerator: ratio.numerator,
            denominator: ratio.denominator,
        }
    }
}

/// A set of ordered Quantities defined by a low and high limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    base: ElementBase,
    low: Option<Quantity>,
    high: Option<Quantity>,
    hash: HashMemo,
}

memoized_hash!(Range { base, low, high });

impl Range {
    pub fn builder() -> RangeBuilder {
        RangeBuilder::default()
    }

    pub fn to_builder(&self) -> RangeBuilder {
        RangeBuilder::from(self.clone())
    }

    pub fn low(&self) -> Option<&Quantity> {
        self.low.as_ref()
    }

    pub fn high(&self) -> Option<&Quantity> {
        self.high.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Range")?;
        if let Some(low) = &self.low {
            validation::prohibited(low.comparator(), "Range.low.comparator")?;
        }
        if let Some(high) = &self.high {
            validation::prohibited(high.comparator(), "Range.high.comparator")?;
        }
        validation::require_value_or_children(self, "Range")
    }
}

impl Element for Range {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Range"
    }

    fn has_children(&self) -> bool {
        self.base.has_children() || self.low.is_some() || self.high.is_some()
    }
}

impl Visitable for Range {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Range(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.low.as_ref(), "low", visitor);
            accept_opt(self.high.as_ref(), "high", visitor);
        });
    }
}

impl ModelInfo for Range {
    const TYPE_NAME: &'static str = "Range";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("low").summary(),
        ElementInfo::new("high").summary(),
    ];
}

impl CheckValue for Range {}

#[derive(Debug, Clone, Default)]
pub struct RangeBuilder {
    base: ElementBase,
    low: Option<Quantity>,
    high: Option<Quantity>,
}

impl RangeBuilder {
    pub fn low(mut self, low: Quantity) -> Self {
        self.low = Some(low);
        self
    }

    pub fn high(mut self, high: Quantity) -> Self {
        self.high = Some(high);
        self
    }

    pub fn build(self) -> Result<Range> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Range> {
        let range = Range {
            base: self.base,
            low: self.low,
            high: self.high,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            range.validate(ctx)?;
        }
        Ok(range)
    }
}

impl ElementBuilder for RangeBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Range> for RangeBuilder {
    fn from(range: Range) -> Self {
        Self {
            base: range.base,
            low: range.low,
            high: range.high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rust_decimal::Decimal as RustDecimal;

    fn mg(value: i32) -> QuantityBuilder {
        Quantity::builder()
            .value(value)
            .unit("mg")
            .system("http://unitsofmeasure.org")
            .code("mg")
    }

    #[test]
    fn decimal_values_keep_scale() {
        let quantity = Quantity::builder()
            .value(RustDecimal::new(2505, 1))
            .unit("mL")
            .build()
            .unwrap();
        assert_eq!(
            quantity.value().and_then(Decimal::value).map(ToString::to_string),
            Some("250.5".to_string())
        );
    }

    #[test]
    fn range_limits_reject_comparators() {
        let low = mg(5).comparator(QuantityComparator::GreaterOrEqual).build().unwrap();
        let err = Range::builder().low(low).build().unwrap_err();
        assert!(matches!(err, Error::ProhibitedElement(ref p) if p == "Range.low.comparator"));

        let range = Range::builder()
            .low(mg(5).build().unwrap())
            .high(mg(10).build().unwrap())
            .build()
            .unwrap();
        assert!(range.high().is_some());
    }

    #[test]
    fn ratio_of_quantities() {
        let ratio = Ratio::builder()
            .numerator(mg(500).build().unwrap())
            .denominator(Quantity::builder().value(1).unit("tablet").build().unwrap())
            .build()
            .unwrap();
        assert_eq!(
            ratio.denominator().and_then(Quantity::unit).and_then(FhirString::as_str),
            Some("tablet")
        );
    }

    #[test]
    fn equal_quantities_hash_alike() {
        let a = mg(1).build().unwrap();
        let b = mg(1).build().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());
        assert_ne!(a, mg(2).build().unwrap());
    }
}
