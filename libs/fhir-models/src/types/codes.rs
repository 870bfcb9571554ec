//! Codes bound to required value sets.
//!
//! A required binding admits exactly the codes of its value set, so each such
//! value set is an enum. [`Coded<T>`] is the element wrapper (`id`,
//! `extension`, value) used for these fields.

use super::{Element, ElementBase, ElementBuilder};
use crate::error::Result;
use crate::validation::{self, ValidationContext};
use crate::visitor::{walk, Node, PrimitiveValue, Visitable, Visitor};
use std::fmt;
use std::hash::Hash;

/// A code enum generated for a required value set.
pub trait CodeValue: Copy + fmt::Debug + Eq + Hash + Send + Sync + 'static {
    const TYPE_NAME: &'static str;
    const VALUE_SET: &'static str;

    fn as_str(&self) -> &'static str;
    fn from_code(code: &str) -> Option<Self>;
    fn values() -> &'static [Self];
}

/// Object-safe view of a [`Coded`] element of any code enum.
pub trait CodedElement: Visitable + fmt::Debug + Send + Sync {
    fn as_element(&self) -> &dyn Element;
    fn code(&self) -> Option<&'static str>;
    fn value_set(&self) -> &'static str;
}

/// A `code` element whose value is drawn from the enum `T`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coded<T: CodeValue> {
    pub(crate) base: ElementBase,
    pub(crate) value: Option<T>,
}

impl<T: CodeValue> Coded<T> {
    pub fn of(value: T) -> Self {
        Self {
            base: ElementBase::default(),
            value: Some(value),
        }
    }

    pub fn builder() -> CodedBuilder<T> {
        CodedBuilder::default()
    }

    pub fn to_builder(&self) -> CodedBuilder<T> {
        CodedBuilder::from(self.clone())
    }

    pub fn value(&self) -> Option<T> {
        self.value
    }

    pub(crate) fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "code")?;
        validation::require_value_or_children(self, "code")
    }
}

impl<T: CodeValue> From<T> for Coded<T> {
    fn from(value: T) -> Self {
        Self::of(value)
    }
}

impl<T: CodeValue> Element for Coded<T> {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "code"
    }

    fn has_value(&self) -> bool {
        self.value.is_some()
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
    }
}

impl<T: CodeValue> CodedElement for Coded<T> {
    fn as_element(&self) -> &dyn Element {
        self
    }

    fn code(&self) -> Option<&'static str> {
        self.value.as_ref().map(CodeValue::as_str)
    }

    fn value_set(&self) -> &'static str {
        T::VALUE_SET
    }
}

impl<T: CodeValue> Visitable for Coded<T> {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Coded(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            if let Some(code) = self.code() {
                visitor.visit_value("value", PrimitiveValue::String(code));
            }
        });
    }
}

#[derive(Debug, Clone)]
pub struct CodedBuilder<T: CodeValue> {
    base: ElementBase,
    value: Option<T>,
}

impl<T: CodeValue> Default for CodedBuilder<T> {
    fn default() -> Self {
        Self {
            base: ElementBase::default(),
            value: None,
        }
    }
}

impl<T: CodeValue> CodedBuilder<T> {
    pub fn value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    pub fn build(self) -> Result<Coded<T>> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Coded<T>> {
        let coded = Coded {
            base: self.base,
            value: self.value,
        };
        if ctx.validating() {
            coded.validate(ctx)?;
        }
        Ok(coded)
    }
}

impl<T: CodeValue> ElementBuilder for CodedBuilder<T> {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl<T: CodeValue> From<Coded<T>> for CodedBuilder<T> {
    fn from(coded: Coded<T>) -> Self {
        Self {
            base: coded.base,
            value: coded.value,
        }
    }
}

code_enum!(
    /// Identifies the purpose for this identifier, if known
    IdentifierUse, "http://hl7.org/fhir/ValueSet/identifier-use|4.3.0" {
        Usual => "usual",
        Official => "official",
        Temp => "temp",
        Secondary => "secondary",
        Old => "old",
    }
);

code_enum!(
    /// How the Quantity should be understood and represented
    QuantityComparator, "http://hl7.org/fhir/ValueSet/quantity-comparator|4.3.0" {
        LessThan => "<",
        LessOrEqual => "<=",
        GreaterOrEqual => ">=",
        GreaterThan => ">",
    }
);

code_enum!(
    NarrativeStatus, "http://hl7.org/fhir/ValueSet/narrative-status|4.3.0" {
        Generated => "generated",
        Extensions => "extensions",
        Additional => "additional",
        Empty => "empty",
    }
);

code_enum!(
    NameUse, "http://hl7.org/fhir/ValueSet/name-use|4.3.0" {
        Usual => "usual",
        Official => "official",
        Temp => "temp",
        Nickname => "nickname",
        Anonymous => "anonymous",
        Old => "old",
        Maiden => "maiden",
    }
);

code_enum!(
    ContactPointSystem, "http://hl7.org/fhir/ValueSet/contact-point-system|4.3.0" {
        Phone => "phone",
        Fax => "fax",
        Email => "email",
        Pager => "pager",
        Url => "url",
        Sms => "sms",
        Other => "other",
    }
);

code_enum!(
    ContactPointUse, "http://hl7.org/fhir/ValueSet/contact-point-use|4.3.0" {
        Home => "home",
        Work => "work",
        Temp => "temp",
        Old => "old",
        Mobile => "mobile",
    }
);

code_enum!(
    AddressUse, "http://hl7.org/fhir/ValueSet/address-use|4.3.0" {
        Home => "home",
        Work => "work",
        Temp => "temp",
        Old => "old",
        Billing => "billing",
    }
);

code_enum!(
    AddressType, "http://hl7.org/fhir/ValueSet/address-type|4.3.0" {
        Postal => "postal",
        Physical => "physical",
        Both => "both",
    }
);

code_enum!(
    /// A unit of time (units from UCUM)
    UnitsOfTime, "http://hl7.org/fhir/ValueSet/units-of-time|4.3.0" {
        Second => "s",
        Minute => "min",
        Hour => "h",
        Day => "d",
        Week => "wk",
        Month => "mo",
        Year => "a",
    }
);

code_enum!(
    DayOfWeek, "http://hl7.org/fhir/ValueSet/days-of-week|4.3.0" {
        Monday => "mon",
        Tuesday => "tue",
        Wednesday => "wed",
        Thursday => "thu",
        Friday => "fri",
        Saturday => "sat",
        Sunday => "sun",
    }
);

code_enum!(
    /// Real world event relating to the schedule
    EventTiming, "http://hl7.org/fhir/ValueSet/event-timing|4.3.0" {
        Morning => "MORN",
        EarlyMorning => "MORN.early",
        LateMorning => "MORN.late",
        Noon => "NOON",
        Afternoon => "AFT",
        EarlyAfternoon => "AFT.early",
        LateAfternoon => "AFT.late",
        Evening => "EVE",
        EarlyEvening => "EVE.early",
        LateEvening => "EVE.late",
        Night => "NIGHT",
        AfterSleep => "PHS",
        BeforeSleep => "HS",
        Wake => "WAKE",
        Meal => "C",
        Breakfast => "CM",
        Lunch => "CD",
        Dinner => "CV",
        BeforeMeal => "AC",
        BeforeBreakfast => "ACM",
        BeforeLunch => "ACD",
        BeforeDinner => "ACV",
        AfterMeal => "PC",
        AfterBreakfast => "PCM",
        AfterLunch => "PCD",
        AfterDinner => "PCV",
    }
);

code_enum!(
    AdministrativeGender, "http://hl7.org/fhir/ValueSet/administrative-gender|4.3.0" {
        Male => "male",
        Female => "female",
        Other => "other",
        Unknown => "unknown",
    }
);

code_enum!(
    /// A coded concept defining if the medication is in active use
    MedicationStatus, "http://hl7.org/fhir/ValueSet/medication-status|4.3.0" {
        Active => "active",
        Inactive => "inactive",
        EnteredInError => "entered-in-error",
    }
);

code_enum!(
    DeviceMetricOperationalStatus, "http://hl7.org/fhir/ValueSet/metric-operational-status|4.3.0" {
        On => "on",
        Off => "off",
        Standby => "standby",
        EnteredInError => "entered-in-error",
    }
);

code_enum!(
    DeviceMetricColor, "http://hl7.org/fhir/ValueSet/metric-color|4.3.0" {
        Black => "black",
        Red => "red",
        Green => "green",
        Yellow => "yellow",
        Blue => "blue",
        Magenta => "magenta",
        Cyan => "cyan",
        White => "white",
    }
);

code_enum!(
    DeviceMetricCategory, "http://hl7.org/fhir/ValueSet/metric-category|4.3.0" {
        Measurement => "measurement",
        Setting => "setting",
        Calculation => "calculation",
        Unspecified => "unspecified",
    }
);

code_enum!(
    DeviceMetricCalibrationType, "http://hl7.org/fhir/ValueSet/metric-calibration-type|4.3.0" {
        Unspecified => "unspecified",
        Offset => "offset",
        Gain => "gain",
        TwoPoint => "two-point",
    }
);

code_enum!(
    DeviceMetricCalibrationState, "http://hl7.org/fhir/ValueSet/metric-calibration-state|4.3.0" {
        NotCalibrated => "not-calibrated",
        CalibrationRequired => "calibration-required",
        Calibrated => "calibrated",
        Unspecified => "unspecified",
    }
);

code_enum!(
    /// The status of the document reference
    DocumentReferenceStatus, "http://hl7.org/fhir/ValueSet/document-reference-status|4.3.0" {
        Current => "current",
        Superseded => "superseded",
        EnteredInError => "entered-in-error",
    }
);

code_enum!(
    ListStatus, "http://hl7.org/fhir/ValueSet/list-status|4.3.0" {
        Current => "current",
        Retired => "retired",
        EnteredInError => "entered-in-error",
    }
);

code_enum!(
    /// How the list was prepared: a working list, a snapshot or a list of changes
    ListMode, "http://hl7.org/fhir/ValueSet/list-mode|4.3.0" {
        Working => "working",
        Snapshot => "snapshot",
        Changes => "changes",
    }
);

code_enum!(
    /// Codes identifying the lifecycle stage of an event
    EventStatus, "http://hl7.org/fhir/ValueSet/event-status|4.3.0" {
        Preparation => "preparation",
        InProgress => "in-progress",
        NotDone => "not-done",
        OnHold => "on-hold",
        Stopped => "stopped",
        Completed => "completed",
        EnteredInError => "entered-in-error",
        Unknown => "unknown",
    }
);

code_enum!(
    SubscriptionStatusCode, "http://hl7.org/fhir/ValueSet/subscription-status|4.3.0" {
        Requested => "requested",
        Active => "active",
        Error => "error",
        Off => "off",
        EnteredInError => "entered-in-error",
    }
);

code_enum!(
    /// The type of notification represented by a status message
    SubscriptionNotificationType, "http://hl7.org/fhir/ValueSet/subscription-notification-type|4.3.0" {
        Handshake => "handshake",
        Heartbeat => "heartbeat",
        EventNotification => "event-notification",
        QueryStatus => "query-status",
        QueryEvent => "query-event",
    }
);

code_enum!(
    SubstanceStatus, "http://hl7.org/fhir/ValueSet/substance-status|4.3.0" {
        Active => "active",
        Inactive => "inactive",
        EnteredInError => "entered-in-error",
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn codes_round_trip_through_strings() {
        assert_eq!(EventTiming::EarlyMorning.as_str(), "MORN.early");
        assert_eq!("MORN.early".parse::<EventTiming>().unwrap(), EventTiming::EarlyMorning);
        assert_eq!(QuantityComparator::LessOrEqual.to_string(), "<=");
        assert_eq!(EventTiming::values().len(), 26);
    }

    #[test]
    fn unknown_codes_are_rejected() {
        let err = "paused".parse::<MedicationStatus>().unwrap_err();
        assert!(matches!(err, Error::Parse { type_name: "MedicationStatus", .. }));
        assert_eq!(MedicationStatus::from_code("Active"), None);
    }

    #[test]
    fn serde_uses_wire_codes() {
        let json = serde_json::to_string(&DeviceMetricCalibrationType::TwoPoint).unwrap();
        assert_eq!(json, "\"two-point\"");
        let parsed: ListMode = serde_json::from_str("\"snapshot\"").unwrap();
        assert_eq!(parsed, ListMode::Snapshot);
    }

    #[test]
    fn coded_element_exposes_value_set() {
        let status = Coded::of(SubstanceStatus::Inactive);
        assert_eq!(status.code(), Some("inactive"));
        assert_eq!(
            status.value_set(),
            "http://hl7.org/fhir/ValueSet/substance-status|4.3.0"
        );
        assert!(Coded::<SubstanceStatus>::builder().build().is_err());
    }
}
