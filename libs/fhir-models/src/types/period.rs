use super::{DateTime, Element, ElementBase, ElementBuilder, HashMemo};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_opt, walk, Node, Visitable, Visitor};

/// A time period defined by a start and end date and optionally time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    base: ElementBase,
    start: Option<DateTime>,
    end: Option<DateTime>,
    hash: HashMemo,
}

memoized_hash!(Period { base, start, end });

impl Period {
    pub fn builder() -> PeriodBuilder {
        PeriodBuilder::default()
    }

    pub fn to_builder(&self) -> PeriodBuilder {
        PeriodBuilder::from(self.clone())
    }

    pub fn start(&self) -> Option<&DateTime> {
        self.start.as_ref()
    }

    /// End of the period; absent means ongoing.
    pub fn end(&self) -> Option<&DateTime> {
        self.end.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Period")?;
        validation::check_primitive(ctx, self.start.as_ref(), "Period.start")?;
        validation::check_primitive(ctx, self.end.as_ref(), "Period.end")?;
        validation::require_value_or_children(self, "Period")
    }
}

impl Element for Period {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Period"
    }

    fn has_children(&self) -> bool {
        self.base.has_children() || self.start.is_some() || self.end.is_some()
    }
}

impl Visitable for Period {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Period(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.start.as_ref(), "start", visitor);
            accept_opt(self.end.as_ref(), "end", visitor);
        });
    }
}

impl ModelInfo for Period {
    const TYPE_NAME: &'static str = "Period";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("start").summary(),
        ElementInfo::new("end").summary(),
    ];
}

impl CheckValue for Period {}

#[derive(Debug, Clone, Default)]
pub struct PeriodBuilder {
    base: ElementBase,
    start: Option<DateTime>,
    end: Option<DateTime>,
}

impl PeriodBuilder {
    pub fn start(mut self, start: impl Into<DateTime>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn end(mut self, end: impl Into<DateTime>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn build(self) -> Result<Period> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Period> {
        let period = Period {
            base: self.base,
            start: self.start,
            end: self.end,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            period.validate(ctx)?;
        }
        Ok(period)
    }
}

impl ElementBuilder for PeriodBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Period> for PeriodBuilder {
    fn from(period: Period) -> Self {
        Self {
            base: period.base,
            start: period.start,
            end: period.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::temporal::DateTimeValue;

    #[test]
    fn open_ended_period() {
        let period = Period::builder()
            .start(DateTime::parse("2021-01").unwrap())
            .build()
            .unwrap();
        assert_eq!(
            period.start().and_then(DateTime::value),
            Some(&DateTimeValue::YearMonth(2021, 1))
        );
        assert!(period.end().is_none());
    }
}
