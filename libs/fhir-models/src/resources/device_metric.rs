use super::{DomainResource, DomainResourceBase, DomainResourceBuilder};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, BACKBONE_ELEMENT_BASE, DOMAIN_RESOURCE_BASE};
use crate::types::{
    BackboneElement, BackboneElementBase, BackboneElementBuilder, CodeValue, CodeableConcept,
    Coded, DeviceMetricCalibrationState, DeviceMetricCalibrationType, DeviceMetricCategory,
    DeviceMetricColor, DeviceMetricOperationalStatus, Element, ElementBase, ElementBuilder,
    Extension, HashMemo, Identifier, Instant, Reference, Timing,
};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

const METRIC_TYPE: Binding = Binding::new(
    "MetricType",
    BindingStrength::Preferred,
    "http://hl7.org/fhir/ValueSet/devicemetric-type",
)
.description("Describes the metric type.");

const METRIC_UNIT: Binding = Binding::new(
    "MetricUnit",
    BindingStrength::Preferred,
    "http://hl7.org/fhir/ValueSet/devicemetric-type",
)
.description("Describes the unit of the metric.");

const DEVICE_METRIC_OPERATIONAL_STATUS: Binding = Binding::new(
    "DeviceMetricOperationalStatus",
    BindingStrength::Required,
    <DeviceMetricOperationalStatus as CodeValue>::VALUE_SET,
)
.description("Describes the operational status of the DeviceMetric.");

const DEVICE_METRIC_COLOR: Binding = Binding::new(
    "DeviceMetricColor",
    BindingStrength::Required,
    <DeviceMetricColor as CodeValue>::VALUE_SET,
)
.description("Describes the typical color of representation.");

const DEVICE_METRIC_CATEGORY: Binding = Binding::new(
    "DeviceMetricCategory",
    BindingStrength::Required,
    <DeviceMetricCategory as CodeValue>::VALUE_SET,
)
.description("Describes the category of the metric.");

const DEVICE_METRIC_CALIBRATION_TYPE: Binding = Binding::new(
    "DeviceMetricCalibrationType",
    BindingStrength::Required,
    <DeviceMetricCalibrationType as CodeValue>::VALUE_SET,
)
.description("Describes the type of a metric calibration.");

const DEVICE_METRIC_CALIBRATION_STATE: Binding = Binding::new(
    "DeviceMetricCalibrationState",
    BindingStrength::Required,
    <DeviceMetricCalibrationState as CodeValue>::VALUE_SET,
)
.description("Describes the state of a metric calibration.");

const SOURCE_TARGETS: &[&str] = &["Device"];
const PARENT_TARGETS: &[&str] = &["Device"];

/// Describes a measurement, calculation or setting capability of a medical
/// device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMetric {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    type_: CodeableConcept,
    unit: Option<CodeableConcept>,
    source: Option<Reference>,
    parent: Option<Reference>,
    operational_status: Option<Coded<DeviceMetricOperationalStatus>>,
    color: Option<Coded<DeviceMetricColor>>,
    category: Coded<DeviceMetricCategory>,
    measurement_period: Option<Timing>,
    calibration: Vec<DeviceMetricCalibration>,
    hash: HashMemo,
}

memoized_hash!(DeviceMetric {
    base,
    identifier,
    type_,
    unit,
    source,
    parent,
    operational_status,
    color,
    category,
    measurement_period,
    calibration,
});

impl DeviceMetric {
    pub fn builder() -> DeviceMetricBuilder {
        DeviceMetricBuilder::default()
    }

    pub fn to_builder(&self) -> DeviceMetricBuilder {
        DeviceMetricBuilder::from(self.clone())
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    /// What the metric measures, typically an ISO/IEEE 11073 code.
    pub fn type_(&self) -> &CodeableConcept {
        &self.type_
    }

    pub fn unit(&self) -> Option<&CodeableConcept> {
        self.unit.as_ref()
    }

    pub fn source(&self) -> Option<&Reference> {
        self.source.as_ref()
    }

    /// The device this metric belongs to, usually a VMD or channel.
    pub fn parent(&self) -> Option<&Reference> {
        self.parent.as_ref()
    }

    pub fn operational_status(&self) -> Option<&Coded<DeviceMetricOperationalStatus>> {
        self.operational_status.as_ref()
    }

    pub fn color(&self) -> Option<&Coded<DeviceMetricColor>> {
        self.color.as_ref()
    }

    pub fn category(&self) -> &Coded<DeviceMetricCategory> {
        &self.category
    }

    pub fn measurement_period(&self) -> Option<&Timing> {
        self.measurement_period.as_ref()
    }

    pub fn calibration(&self) -> &[DeviceMetricCalibration] {
        &self.calibration
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "DeviceMetric")?;
        validation::check_concept_binding(
            ctx,
            Some(&self.type_),
            "DeviceMetric.type",
            &METRIC_TYPE,
        )?;
        validation::check_concept_binding(
            ctx,
            self.unit.as_ref(),
            "DeviceMetric.unit",
            &METRIC_UNIT,
        )?;
        validation::check_reference_type(
            ctx,
            self.source.as_ref(),
            "DeviceMetric.source",
            SOURCE_TARGETS,
        )?;
        validation::check_reference_type(
            ctx,
            self.parent.as_ref(),
            "DeviceMetric.parent",
            PARENT_TARGETS,
        )?;
        Ok(())
    }
}

impl DomainResource for DeviceMetric {
    fn domain_resource_base(&self) -> &DomainResourceBase {
        &self.base
    }

    fn resource_type(&self) -> &'static str {
        "DeviceMetric"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl Visitable for DeviceMetric {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::DeviceMetric(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_list(&self.identifier, "identifier", visitor);
            self.type_.accept("type", None, visitor);
            accept_opt(self.unit.as_ref(), "unit", visitor);
            accept_opt(self.source.as_ref(), "source", visitor);
            accept_opt(self.parent.as_ref(), "parent", visitor);
            accept_opt(self.operational_status.as_ref(), "operationalStatus", visitor);
            accept_opt(self.color.as_ref(), "color", visitor);
            self.category.accept("category", None, visitor);
            accept_opt(self.measurement_period.as_ref(), "measurementPeriod", visitor);
            accept_list(&self.calibration, "calibration", visitor);
        });
    }
}

impl ModelInfo for DeviceMetric {
    const TYPE_NAME: &'static str = "DeviceMetric";
    const BASE_ELEMENTS: &'static [ElementInfo] = DOMAIN_RESOURCE_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("identifier").repeating().summary(),
        ElementInfo::new("type").required().summary().binding(METRIC_TYPE),
        ElementInfo::new("unit").summary().binding(METRIC_UNIT),
        ElementInfo::new("source").summary().targets(SOURCE_TARGETS),
        ElementInfo::new("parent").summary().targets(PARENT_TARGETS),
        ElementInfo::new("operationalStatus").summary().binding(DEVICE_METRIC_OPERATIONAL_STATUS),
        ElementInfo::new("color").summary().binding(DEVICE_METRIC_COLOR),
        ElementInfo::new("category").required().summary().binding(DEVICE_METRIC_CATEGORY),
        ElementInfo::new("measurementPeriod").summary(),
        ElementInfo::new("calibration").repeating().summary(),
    ];
}

#[derive(Debug, Clone, Default)]
pub struct DeviceMetricBuilder {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    type_: Option<CodeableConcept>,
    unit: Option<CodeableConcept>,
    source: Option<Reference>,
    parent: Option<Reference>,
    operational_status: Option<Coded<DeviceMetricOperationalStatus>>,
    color: Option<Coded<DeviceMetricColor>>,
    category: Option<Coded<DeviceMetricCategory>>,
    measurement_period: Option<Timing>,
    calibration: Vec<DeviceMetricCalibration>,
}

impl DeviceMetricBuilder {
    pub fn identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier.extend(identifier);
        self
    }

    pub fn set_identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier = identifier.into_iter().collect();
        self
    }

    pub fn type_(mut self, type_: CodeableConcept) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn unit(mut self, unit: CodeableConcept) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn source(mut self, source: Reference) -> Self {
        self.source = Some(source);
        self
    }

    pub fn parent(mut self, parent: Reference) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn operational_status(
        mut self,
        operational_status: impl Into<Coded<DeviceMetricOperationalStatus>>,
    ) -> Self {
        self.operational_status = Some(operational_status.into());
        self
    }

    pub fn color(mut self, color: impl Into<Coded<DeviceMetricColor>>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn category(mut self, category: impl Into<Coded<DeviceMetricCategory>>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn measurement_period(mut self, measurement_period: Timing) -> Self {
        self.measurement_period = Some(measurement_period);
        self
    }

    pub fn calibration(
        mut self,
        calibration: impl IntoIterator<Item = DeviceMetricCalibration>,
    ) -> Self {
        self.calibration.extend(calibration);
        self
    }

    pub fn set_calibration(
        mut self,
        calibration: impl IntoIterator<Item = DeviceMetricCalibration>,
    ) -> Self {
        self.calibration = calibration.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<DeviceMetric> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<DeviceMetric> {
        let type_ = validation::require_non_null(self.type_, "DeviceMetric.type")?;
        let category = validation::require_non_null(self.category, "DeviceMetric.category")?;
        let metric = DeviceMetric {
            base: self.base,
            identifier: self.identifier,
            type_,
            unit: self.unit,
            source: self.source,
            parent: self.parent,
            operational_status: self.operational_status,
            color: self.color,
            category,
            measurement_period: self.measurement_period,
            calibration: self.calibration,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            metric.validate(ctx).inspect_err(|err| {
                tracing::debug!(resource_type = "DeviceMetric", error = %err, "Build rejected");
            })?;
        }
        Ok(metric)
    }
}

impl DomainResourceBuilder for DeviceMetricBuilder {
    fn domain_resource_base_mut(&mut self) -> &mut DomainResourceBase {
        &mut self.base
    }
}

impl From<DeviceMetric> for DeviceMetricBuilder {
    fn from(metric: DeviceMetric) -> Self {
        Self {
            base: metric.base,
            identifier: metric.identifier,
            type_: Some(metric.type_),
            unit: metric.unit,
            source: metric.source,
            parent: metric.parent,
            operational_status: metric.operational_status,
            color: metric.color,
            category: Some(metric.category),
            measurement_period: metric.measurement_period,
            calibration: metric.calibration,
        }
    }
}

/// A calibration operation performed on the metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMetricCalibration {
    base: BackboneElementBase,
    type_: Option<Coded<DeviceMetricCalibrationType>>,
    state: Option<Coded<DeviceMetricCalibrationState>>,
    time: Option<Instant>,
    hash: HashMemo,
}

memoized_hash!(DeviceMetricCalibration { base, type_, state, time });

impl DeviceMetricCalibration {
    pub fn builder() -> DeviceMetricCalibrationBuilder {
        DeviceMetricCalibrationBuilder::default()
    }

    pub fn to_builder(&self) -> DeviceMetricCalibrationBuilder {
        DeviceMetricCalibrationBuilder::from(self.clone())
    }

    pub fn type_(&self) -> Option<&Coded<DeviceMetricCalibrationType>> {
        self.type_.as_ref()
    }

    pub fn state(&self) -> Option<&Coded<DeviceMetricCalibrationState>> {
        self.state.as_ref()
    }

    pub fn time(&self) -> Option<&Instant> {
        self.time.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "DeviceMetric.calibration")?;
        validation::check_primitive(ctx, self.time.as_ref(), "DeviceMetric.calibration.time")?;
        validation::require_value_or_children(self, "DeviceMetric.calibration")
    }
}

impl Element for DeviceMetricCalibration {
    fn element_base(&self) -> &ElementBase {
        &self.base.element
    }

    fn type_name(&self) -> &'static str {
        "DeviceMetric.calibration"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || self.type_.is_some()
            || self.state.is_some()
            || self.time.is_some()
    }
}

impl BackboneElement for DeviceMetricCalibration {
    fn modifier_extension(&self) -> &[Extension] {
        &self.base.modifier_extension
    }
}

impl Visitable for DeviceMetricCalibration {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::DeviceMetricCalibration(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.type_.as_ref(), "type", visitor);
            accept_opt(self.state.as_ref(), "state", visitor);
            accept_opt(self.time.as_ref(), "time", visitor);
        });
    }
}

impl ModelInfo for DeviceMetricCalibration {
    const TYPE_NAME: &'static str = "DeviceMetric.calibration";
    const BASE_ELEMENTS: &'static [ElementInfo] = BACKBONE_ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("type").summary().binding(DEVICE_METRIC_CALIBRATION_TYPE),
        ElementInfo::new("state").summary().binding(DEVICE_METRIC_CALIBRATION_STATE),
        ElementInfo::new("time").summary(),
    ];
}

impl CheckValue for DeviceMetricCalibration {}

#[derive(Debug, Clone, Default)]
pub struct DeviceMetricCalibrationBuilder {
    base: BackboneElementBase,
    type_: Option<Coded<DeviceMetricCalibrationType>>,
    state: Option<Coded<DeviceMetricCalibrationState>>,
    time: Option<Instant>,
}

impl DeviceMetricCalibrationBuilder {
    pub fn type_(mut self, type_: impl Into<Coded<DeviceMetricCalibrationType>>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    pub fn state(mut self, state: impl Into<Coded<DeviceMetricCalibrationState>>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn time(mut self, time: impl Into<Instant>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn build(self) -> Result<DeviceMetricCalibration> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<DeviceMetricCalibration> {
        let calibration = DeviceMetricCalibration {
            base: self.base,
            type_: self.type_,
            state: self.state,
            time: self.time,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            calibration.validate(ctx)?;
        }
        Ok(calibration)
    }
}

impl ElementBuilder for DeviceMetricCalibrationBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base.element
    }
}

impl BackboneElementBuilder for DeviceMetricCalibrationBuilder {
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase {
        &mut self.base
    }
}

impl From<DeviceMetricCalibration> for DeviceMetricCalibrationBuilder {
    fn from(calibration: DeviceMetricCalibration) -> Self {
        Self {
            base: calibration.base,
            type_: calibration.type_,
            state: calibration.state,
            time: calibration.time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::Coding;

    fn heart_rate() -> CodeableConcept {
        CodeableConcept::builder()
            .coding([Coding::builder()
                .system("urn:iso:std:iso:11073:10101")
                .code("150456")
                .display("MDC_PULS_OXIM_SAT_O2")
                .build()
                .unwrap()])
            .build()
            .unwrap()
    }

    #[test]
    fn type_and_category_are_required() {
        let err = DeviceMetric::builder()
            .category(DeviceMetricCategory::Measurement)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "DeviceMetric.type"));

        let err = DeviceMetric::builder().type_(heart_rate()).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "DeviceMetric.category"));
    }

    #[test]
    fn calibrations_are_recorded_in_order() {
        let calibrated = DeviceMetricCalibration::builder()
            .type_(DeviceMetricCalibrationType::TwoPoint)
            .state(DeviceMetricCalibrationState::Calibrated)
            .time(Instant::parse("2021-03-01T10:30:00Z").unwrap())
            .build()
            .unwrap();
        let pending = DeviceMetricCalibration::builder()
            .state(DeviceMetricCalibrationState::CalibrationRequired)
            .build()
            .unwrap();
        let metric = DeviceMetric::builder()
            .type_(heart_rate())
            .category(DeviceMetricCategory::Measurement)
            .operational_status(DeviceMetricOperationalStatus::On)
            .color(DeviceMetricColor::Blue)
            .calibration([calibrated, pending])
            .build()
            .unwrap();

        assert_eq!(metric.calibration().len(), 2);
        assert_eq!(
            metric.calibration()[1].state().and_then(Coded::value),
            Some(DeviceMetricCalibrationState::CalibrationRequired)
        );
        assert_eq!(metric.color().and_then(Coded::value), Some(DeviceMetricColor::Blue));
    }

    #[test]
    fn source_must_be_a_device() {
        let err = DeviceMetric::builder()
            .type_(heart_rate())
            .category(DeviceMetricCategory::Setting)
            .source(Reference::builder().reference("Patient/example").build().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::ReferenceTypeNotAllowed { ref element, .. } if element == "DeviceMetric.source"));
    }

    #[test]
    fn empty_calibration_violates_ele_1() {
        let err = DeviceMetricCalibration::builder().build().unwrap_err();
        assert!(matches!(err, Error::ValueOrChildrenRequired(ref p) if p == "DeviceMetric.calibration"));
    }
}
