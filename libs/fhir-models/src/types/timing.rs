use super::{
    BackboneElement, BackboneElementBase, BackboneElementBuilder, CodeValue, CodeableConcept,
    Coded, DateTime, DayOfWeek, Decimal, Element, ElementBase, ElementBuilder, EventTiming,
    Extension, HashMemo, Period, PositiveInt, Quantity, Range, Time, UnitsOfTime, UnsignedInt,
};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, BACKBONE_ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

const TIMING_ABBREVIATION: Binding = Binding::new(
    "TimingAbbreviation",
    BindingStrength::Preferred,
    "http://hl7.org/fhir/ValueSet/timing-abbreviation",
)
.description("Code for a known / defined timing pattern.");

const UNITS_OF_TIME: Binding = Binding::new(
    "UnitsOfTime",
    BindingStrength::Required,
    <UnitsOfTime as CodeValue>::VALUE_SET,
)
.description("A unit of time (units from UCUM).");

const DAY_OF_WEEK: Binding = Binding::new(
    "DayOfWeek",
    BindingStrength::Required,
    <DayOfWeek as CodeValue>::VALUE_SET,
);

const EVENT_TIMING: Binding = Binding::new(
    "EventTiming",
    BindingStrength::Required,
    <EventTiming as CodeValue>::VALUE_SET,
)
.description("Real world event relating to the schedule.");

choice!(
    /// `Timing.repeat.bounds[x]`; the `Duration` alternative is a `Quantity`.
    TimingRepeatBounds {
        Duration(Quantity),
        Range(Range),
        Period(Period),
    }
);

/// Specifies an event that may occur multiple times.
///
/// Timing schedules are used to record when things are planned, expected or
/// requested to occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    base: BackboneElementBase,
    event: Vec<DateTime>,
    repeat: Option<TimingRepeat>,
    code: Option<CodeableConcept>,
    hash: HashMemo,
}

memoized_hash!(Timing { base, event, repeat, code });

impl Timing {
    pub fn builder() -> TimingBuilder {
        TimingBuilder::default()
    }

    pub fn to_builder(&self) -> TimingBuilder {
        TimingBuilder::from(self.clone())
    }

    pub fn event(&self) -> &[DateTime] {
        &self.event
    }

    pub fn repeat(&self) -> Option<&TimingRepeat> {
        self.repeat.as_ref()
    }

    /// `BID`, `TID`, `QID`, `AM`, ...
    pub fn code(&self) -> Option<&CodeableConcept> {
        self.code.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Timing")?;
        validation::check_primitives(ctx, &self.event, "Timing.event")?;
        validation::check_concept_binding(
            ctx,
            self.code.as_ref(),
            "Timing.code",
            &TIMING_ABBREVIATION,
        )?;
        validation::require_value_or_children(self, "Timing")
    }
}

impl Element for Timing {
    fn element_base(&self) -> &ElementBase {
        &self.base.element
    }

    fn type_name(&self) -> &'static str {
        "Timing"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || !self.event.is_empty()
            || self.repeat.is_some()
            || self.code.is_some()
    }
}

impl BackboneElement for Timing {
    fn modifier_extension(&self) -> &[Extension] {
        &self.base.modifier_extension
    }
}

impl Visitable for Timing {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Timing(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_list(&self.event, "event", visitor);
            accept_opt(self.repeat.as_ref(), "repeat", visitor);
            accept_opt(self.code.as_ref(), "code", visitor);
        });
    }
}

impl ModelInfo for Timing {
    const TYPE_NAME: &'static str = "Timing";
    const BASE_ELEMENTS: &'static [ElementInfo] = BACKBONE_ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("event").repeating().summary(),
        ElementInfo::new("repeat").summary(),
        ElementInfo::new("code").summary().binding(TIMING_ABBREVIATION),
    ];
}

impl CheckValue for Timing {}

#[derive(Debug, Clone, Default)]
pub struct TimingBuilder {
    base: BackboneElementBase,
    event: Vec<DateTime>,
    repeat: Option<TimingRepeat>,
    code: Option<CodeableConcept>,
}

impl TimingBuilder {
    pub fn event<I, T>(mut self, event: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DateTime>,
    {
        self.event.extend(event.into_iter().map(Into::into));
        self
    }

    pub fn set_event<I, T>(mut self, event: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DateTime>,
    {
        self.event = event.into_iter().map(Into::into).collect();
        self
    }

    pub fn repeat(mut self, repeat: TimingRepeat) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn code(mut self, code: CodeableConcept) -> Self {
        self.code = Some(code);
        self
    }

    pub fn build(self) -> Result<Timing> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Timing> {
        let timing = Timing {
            base: self.base,
            event: self.event,
            repeat: self.repeat,
            code: self.code,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            timing.validate(ctx)?;
        }
        Ok(timing)
    }
}

impl ElementBuilder for TimingBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base.element
    }
}

impl BackboneElementBuilder for TimingBuilder {
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase {
        &mut self.base
    }
}

impl From<Timing> for TimingBuilder {
    fn from(timing: Timing) -> Self {
        Self {
            base: timing.base,
            event: timing.event,
            repeat: timing.repeat,
            code: timing.code,
        }
    }
}

/// A set of rules that describe when the event is scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingRepeat {
    base: BackboneElementBase,
    bounds: Option<TimingRepeatBounds>,
    count: Option<PositiveInt>,
    count_max: Option<PositiveInt>,
    duration: Option<Decimal>,
    duration_max: Option<Decimal>,
    duration_unit: Option<Coded<UnitsOfTime>>,
    frequency: Option<PositiveInt>,
    frequency_max: Option<PositiveInt>,
    period: Option<Decimal>,
    period_max: Option<Decimal>,
    period_unit: Option<Coded<UnitsOfTime>>,
    day_of_week: Vec<Coded<DayOfWeek>>,
    time_of_day: Vec<Time>,
    when: Vec<Coded<EventTiming>>,
    offset: Option<UnsignedInt>,
    hash: HashMemo,
}

memoized_hash!(TimingRepeat {
    base,
    bounds,
    count,
    count_max,
    duration,
    duration_max,
    duration_unit,
    frequency,
    frequency_max,
    period,
    period_max,
    period_unit,
    day_of_week,
    time_of_day,
    when,
    offset,
});

impl TimingRepeat {
    pub fn builder() -> TimingRepeatBuilder {
        TimingRepeatBuilder::default()
    }

    pub fn to_builder(&self) -> TimingRepeatBuilder {
        TimingRepeatBuilder::from(self.clone())
    }

    pub fn bounds(&self) -> Option<&TimingRepeatBounds> {
        self.bounds.as_ref()
    }

    pub fn count(&self) -> Option<&PositiveInt> {
        self.count.as_ref()
    }

    pub fn count_max(&self) -> Option<&PositiveInt> {
        self.count_max.as_ref()
    }

    pub fn duration(&self) -> Option<&Decimal> {
        self.duration.as_ref()
    }

    pub fn duration_max(&self) -> Option<&Decimal> {
        self.duration_max.as_ref()
    }

    pub fn duration_unit(&self) -> Option<&Coded<UnitsOfTime>> {
        self.duration_unit.as_ref()
    }

    pub fn frequency(&self) -> Option<&PositiveInt> {
        self.frequency.as_ref()
    }

    pub fn frequency_max(&self) -> Option<&PositiveInt> {
        self.frequency_max.as_ref()
    }

    pub fn period(&self) -> Option<&Decimal> {
        self.period.as_ref()
    }

    pub fn period_max(&self) -> Option<&Decimal> {
        self.period_max.as_ref()
    }

    pub fn period_unit(&self) -> Option<&Coded<UnitsOfTime>> {
        self.period_unit.as_ref()
    }

    pub fn day_of_week(&self) -> &[Coded<DayOfWeek>] {
        &self.day_of_week
    }

    pub fn time_of_day(&self) -> &[Time] {
        &self.time_of_day
    }

    pub fn when(&self) -> &[Coded<EventTiming>] {
        &self.when
    }

    /// Minutes from the event.
    pub fn offset(&self) -> Option<&UnsignedInt> {
        self.offset.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Timing.repeat")?;
        if let Some(bounds) = &self.bounds {
            bounds.validate(ctx, "Timing.repeat.bounds")?;
        }
        validation::check_primitive(ctx, self.count.as_ref(), "Timing.repeat.count")?;
        validation::check_primitive(ctx, self.count_max.as_ref(), "Timing.repeat.countMax")?;
        validation::check_primitive(ctx, self.duration.as_ref(), "Timing.repeat.duration")?;
        validation::check_primitive(ctx, self.duration_max.as_ref(), "Timing.repeat.durationMax")?;
        validation::check_primitive(ctx, self.frequency.as_ref(), "Timing.repeat.frequency")?;
        validation::check_primitive(
            ctx,
            self.frequency_max.as_ref(),
            "Timing.repeat.frequencyMax",
        )?;
        validation::check_primitive(ctx, self.period.as_ref(), "Timing.repeat.period")?;
        validation::check_primitive(ctx, self.period_max.as_ref(), "Timing.repeat.periodMax")?;
        validation::check_primitives(ctx, &self.time_of_day, "Timing.repeat.timeOfDay")?;
        validation::check_primitive(ctx, self.offset.as_ref(), "Timing.repeat.offset")?;
        validation::require_value_or_children(self, "Timing.repeat")
    }
}

impl Element for TimingRepeat {
    fn element_base(&self) -> &ElementBase {
        &self.base.element
    }

    fn type_name(&self) -> &'static str {
        "Timing.repeat"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || self.bounds.is_some()
            || self.count.is_some()
            || self.count_max.is_some()
            || self.duration.is_some()
            || self.duration_max.is_some()
            || self.duration_unit.is_some()
            || self.frequency.is_some()
            || self.frequency_max.is_some()
            || self.period.is_some()
            || self.period_max.is_some()
            || self.period_unit.is_some()
            || !self.day_of_week.is_empty()
            || !self.time_of_day.is_empty()
            || !self.when.is_empty()
            || self.offset.is_some()
    }
}

impl BackboneElement for TimingRepeat {
    fn modifier_extension(&self) -> &[Extension] {
        &self.base.modifier_extension
    }
}

impl Visitable for TimingRepeat {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::TimingRepeat(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            if let Some(bounds) = &self.bounds {
                bounds.accept_choice("bounds", visitor);
            }
            accept_opt(self.count.as_ref(), "count", visitor);
            accept_opt(self.count_max.as_ref(), "countMax", visitor);
            accept_opt(self.duration.as_ref(), "duration", visitor);
            accept_opt(self.duration_max.as_ref(), "durationMax", visitor);
            accept_opt(self.duration_unit.as_ref(), "durationUnit", visitor);
            accept_opt(self.frequency.as_ref(), "frequency", visitor);
            accept_opt(self.frequency_max.as_ref(), "frequencyMax", visitor);
            accept_opt(self.period.as_ref(), "period", visitor);
            accept_opt(self.period_max.as_ref(), "periodMax", visitor);
            accept_opt(self.period_unit.as_ref(), "periodUnit", visitor);
            accept_list(&self.day_of_week, "dayOfWeek", visitor);
            accept_list(&self.time_of_day, "timeOfDay", visitor);
            accept_list(&self.when, "when", visitor);
            accept_opt(self.offset.as_ref(), "offset", visitor);
        });
    }
}

impl ModelInfo for TimingRepeat {
    const TYPE_NAME: &'static str = "Timing.repeat";
    const BASE_ELEMENTS: &'static [ElementInfo] = BACKBONE_ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("bounds").summary().choice(&["Duration", "Range", "Period"]),
        ElementInfo::new("count").summary(),
        ElementInfo::new("countMax").summary(),
        ElementInfo::new("duration").summary(),
        ElementInfo::new("durationMax").summary(),
        ElementInfo::new("durationUnit").summary().binding(UNITS_OF_TIME),
        ElementInfo::new("frequency").summary(),
        ElementInfo::new("frequencyMax").summary(),
        ElementInfo::new("period").summary(),
        ElementInfo::new("periodMax").summary(),
        ElementInfo::new("periodUnit").summary().binding(UNITS_OF_TIME),
        ElementInfo::new("dayOfWeek").repeating().summary().binding(DAY_OF_WEEK),
        ElementInfo::new("timeOfDay").repeating().summary(),
        ElementInfo::new("when").repeating().summary().binding(EVENT_TIMING),
        ElementInfo::new("offset").summary(),
    ];
}

impl CheckValue for TimingRepeat {}

#[derive(Debug, Clone, Default)]
pub struct TimingRepeatBuilder {
    base: BackboneElementBase,
    bounds: Option<TimingRepeatBounds>,
    count: Option<PositiveInt>,
    count_max: Option<PositiveInt>,
    duration: Option<Decimal>,
    duration_max: Option<Decimal>,
    duration_unit: Option<Coded<UnitsOfTime>>,
    frequency: Option<PositiveInt>,
    frequency_max: Option<PositiveInt>,
    period: Option<Decimal>,
    period_max: Option<Decimal>,
    period_unit: Option<Coded<UnitsOfTime>>,
    day_of_week: Vec<Coded<DayOfWeek>>,
    time_of_day: Vec<Time>,
    when: Vec<Coded<EventTiming>>,
    offset: Option<UnsignedInt>,
}

impl TimingRepeatBuilder {
    pub fn bounds(mut self, bounds: impl Into<TimingRepeatBounds>) -> Self {
        self.bounds = Some(bounds.into());
        self
    }

    pub fn count(mut self, count: impl Into<PositiveInt>) -> Self {
        self.count = Some(count.into());
        self
    }

    pub fn count_max(mut self, count_max: impl Into<PositiveInt>) -> Self {
        self.count_max = Some(count_max.into());
        self
    }

    pub fn duration(mut self, duration: impl Into<Decimal>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn duration_max(mut self, duration_max: impl Into<Decimal>) -> Self {
        self.duration_max = Some(duration_max.into());
        self
    }

    pub fn duration_unit(mut self, duration_unit: impl Into<Coded<UnitsOfTime>>) -> Self {
        self.duration_unit = Some(duration_unit.into());
        self
    }

    pub fn frequency(mut self, frequency: impl Into<PositiveInt>) -> Self {
        self.frequency = Some(frequency.into());
        self
    }

    pub fn frequency_max(mut self, frequency_max: impl Into<PositiveInt>) -> Self {
        self.frequency_max = Some(frequency_max.into());
        self
    }

    pub fn period(mut self, period: impl Into<Decimal>) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn period_max(mut self, period_max: impl Into<Decimal>) -> Self {
        self.period_max = Some(period_max.into());
        self
    }

    pub fn period_unit(mut self, period_unit: impl Into<Coded<UnitsOfTime>>) -> Self {
        self.period_unit = Some(period_unit.into());
        self
    }

    pub fn day_of_week<I, T>(mut self, day_of_week: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Coded<DayOfWeek>>,
    {
        self.day_of_week.extend(day_of_week.into_iter().map(Into::into));
        self
    }

    pub fn set_day_of_week<I, T>(mut self, day_of_week: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Coded<DayOfWeek>>,
    {
        self.day_of_week = day_of_week.into_iter().map(Into::into).collect();
        self
    }

    pub fn time_of_day<I, T>(mut self, time_of_day: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Time>,
    {
        self.time_of_day.extend(time_of_day.into_iter().map(Into::into));
        self
    }

    pub fn set_time_of_day<I, T>(mut self, time_of_day: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Time>,
    {
        self.time_of_day = time_of_day.into_iter().map(Into::into).collect();
        self
    }

    pub fn when<I, T>(mut self, when: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Coded<EventTiming>>,
    {
        self.when.extend(when.into_iter().map(Into::into));
        self
    }

    pub fn set_when<I, T>(mut self, when: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Coded<EventTiming>>,
    {
        self.when = when.into_iter().map(Into::into).collect();
        self
    }

    pub fn offset(mut self, offset: impl Into<UnsignedInt>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn build(self) -> Result<TimingRepeat> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<TimingRepeat> {
        let repeat = TimingRepeat {
            base: self.base,
            bounds: self.bounds,
            count: self.count,
            count_max: self.count_max,
            duration: self.duration,
            duration_max: self.duration_max,
            duration_unit: self.duration_unit,
            frequency: self.frequency,
            frequency_max: self.frequency_max,
            period: self.period,
            period_max: self.period_max,
            period_unit: self.period_unit,
            day_of_week: self.day_of_week,
            time_of_day: self.time_of_day,
            when: self.when,
            offset: self.offset,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            repeat.validate(ctx)?;
        }
        Ok(repeat)
    }
}

impl ElementBuilder for TimingRepeatBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base.element
    }
}

impl BackboneElementBuilder for TimingRepeatBuilder {
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase {
        &mut self.base
    }
}

impl From<TimingRepeat> for TimingRepeatBuilder {
    fn from(repeat: TimingRepeat) -> Self {
        Self {
            base: repeat.base,
            bounds: repeat.bounds,
            count: repeat.count,
            count_max: repeat.count_max,
            duration: repeat.duration,
            duration_max: repeat.duration_max,
            duration_unit: repeat.duration_unit,
            frequency: repeat.frequency,
            frequency_max: repeat.frequency_max,
            period: repeat.period,
            period_max: repeat.period_max,
            period_unit: repeat.period_unit,
            day_of_week: repeat.day_of_week,
            time_of_day: repeat.time_of_day,
            when: repeat.when,
            offset: repeat.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn twice_daily_for_a_week() {
        let bounds = Quantity::builder()
            .value(7)
            .unit("days")
            .system("http://unitsofmeasure.org")
            .code("d")
            .build()
            .unwrap();
        let repeat = TimingRepeat::builder()
            .bounds(bounds)
            .frequency(2)
            .period(1)
            .period_unit(UnitsOfTime::Day)
            .when([EventTiming::Morning, EventTiming::Evening])
            .build()
            .unwrap();
        let timing = Timing::builder().repeat(repeat).build().unwrap();

        let repeat = timing.repeat().unwrap();
        assert_eq!(repeat.bounds().map(TimingRepeatBounds::type_suffix), Some("Duration"));
        assert_eq!(repeat.when().len(), 2);
        assert_eq!(repeat.period_unit().and_then(Coded::value), Some(UnitsOfTime::Day));
    }

    #[test]
    fn frequency_must_be_positive() {
        let err = TimingRepeat::builder().frequency(0).build().unwrap_err();
        assert_eq!(err.element(), Some("Timing.repeat.frequency"));
    }

    #[test]
    fn empty_timing_violates_ele_1() {
        let err = Timing::builder().build().unwrap_err();
        assert!(matches!(err, Error::ValueOrChildrenRequired(ref p) if p == "Timing"));
    }

    #[test]
    fn times_of_day() {
        let repeat = TimingRepeat::builder()
            .time_of_day([Time::parse("08:00:00").unwrap(), Time::parse("20:00:00").unwrap()])
            .build()
            .unwrap();
        assert_eq!(repeat.time_of_day().len(), 2);
    }
}
