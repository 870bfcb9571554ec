use super::{DomainResource, DomainResourceBase, DomainResourceBuilder};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, DOMAIN_RESOURCE_BASE};
use crate::types::{
    Annotation, Attachment, CodeValue, CodeableConcept, Coded, DateTime, Decimal, EventStatus,
    FhirString, HashMemo, Identifier, Instant, Period, PositiveInt, Reference,
};
use crate::validation::{self, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

const MEDIA_STATUS: Binding = Binding::new(
    "MediaStatus",
    BindingStrength::Required,
    <EventStatus as CodeValue>::VALUE_SET,
)
.description("Codes identifying the lifecycle stage of an event.");

const MEDIA_TYPE: Binding = Binding::new(
    "MediaType",
    BindingStrength::Extensible,
    "http://hl7.org/fhir/ValueSet/media-type",
)
.description("Codes for high level media categories.");

const MEDIA_MODALITY: Binding = Binding::new(
    "MediaModality",
    BindingStrength::Example,
    "http://hl7.org/fhir/ValueSet/media-modality",
)
.description("Detailed information about the type of the image.");

const MEDIA_VIEW: Binding = Binding::new(
    "MediaView",
    BindingStrength::Example,
    "http://hl7.org/fhir/ValueSet/media-view",
)
.description("Imaging view (projection) used when collecting an image.");

const MEDIA_REASON: Binding = Binding::new(
    "MediaReason",
    BindingStrength::Example,
    "http://hl7.org/fhir/ValueSet/procedure-reason",
)
.description("The reason for the media.");

const BODY_SITE: Binding = Binding::new(
    "BodySite",
    BindingStrength::Example,
    "http://hl7.org/fhir/ValueSet/body-site",
)
.description("Codes describing anatomical locations.");

choice!(
    /// `Media.created[x]`.
    MediaCreated {
        DateTime(DateTime),
        Period(Period),
    }
);

const BASED_ON_TARGETS: &[&str] = &["ServiceRequest", "CarePlan"];
const SUBJECT_TARGETS: &[&str] = &[
    "Patient",
    "Practitioner",
    "PractitionerRole",
    "Group",
    "Device",
    "Specimen",
    "Location",
];
const ENCOUNTER_TARGETS: &[&str] = &["Encounter"];
const OPERATOR_TARGETS: &[&str] = &[
    "Practitioner",
    "PractitionerRole",
    "Organization",
    "CareTeam",
    "Patient",
    "Device",
    "RelatedPerson",
];
const DEVICE_TARGETS: &[&str] = &["Device", "DeviceMetric"];

/// A photo, video, or audio recording acquired or used in healthcare. The actual
/// content may be inline or provided by direct reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    based_on: Vec<Reference>,
    part_of: Vec<Reference>,
    status: Coded<EventStatus>,
    type_: Option<CodeableConcept>,
    modality: Option<CodeableConcept>,
    view: Option<CodeableConcept>,
    subject: Option<Reference>,
    encounter: Option<Reference>,
    created: Option<MediaCreated>,
    issued: Option<Instant>,
    operator: Option<Reference>,
    reason_code: Vec<CodeableConcept>,
    body_site: Option<CodeableConcept>,
    device_name: Option<FhirString>,
    device: Option<Reference>,
    height: Option<PositiveInt>,
    width: Option<PositiveInt>,
    frames: Option<PositiveInt>,
    duration: Option<Decimal>,
    content: Attachment,
    note: Vec<Annotation>,
    hash: HashMemo,
}

memoized_hash!(Media {
    base,
    identifier,
    based_on,
    part_of,
    status,
    type_,
    modality,
    view,
    subject,
    encounter,
    created,
    issued,
    operator,
    reason_code,
    body_site,
    device_name,
    device,
    height,
    width,
    frames,
    duration,
    content,
    note,
});

impl Media {
    pub fn builder() -> MediaBuilder {
        MediaBuilder::default()
    }

    pub fn to_builder(&self) -> MediaBuilder {
        MediaBuilder::from(self.clone())
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    pub fn based_on(&self) -> &[Reference] {
        &self.based_on
    }

    pub fn part_of(&self) -> &[Reference] {
        &self.part_of
    }

    pub fn status(&self) -> &Coded<EventStatus> {
        &self.status
    }

    pub fn type_(&self) -> Option<&CodeableConcept> {
        self.type_.as_ref()
    }

    pub fn modality(&self) -> Option<&CodeableConcept> {
        self.modality.as_ref()
    }

    pub fn view(&self) -> Option<&CodeableConcept> {
        self.view.as_ref()
    }

    pub fn subject(&self) -> Option<&Reference> {
        self.subject.as_ref()
    }

    pub fn encounter(&self) -> Option<&Reference> {
        self.encounter.as_ref()
    }

    /// When the media was collected.
    pub fn created(&self) -> Option<&MediaCreated> {
        self.created.as_ref()
    }

    pub fn issued(&self) -> Option<&Instant> {
        self.issued.as_ref()
    }

    pub fn operator(&self) -> Option<&Reference> {
        self.operator.as_ref()
    }

    pub fn reason_code(&self) -> &[CodeableConcept] {
        &self.reason_code
    }

    pub fn body_site(&self) -> Option<&CodeableConcept> {
        self.body_site.as_ref()
    }

    pub fn device_name(&self) -> Option<&FhirString> {
        self.device_name.as_ref()
    }

    pub fn device(&self) -> Option<&Reference> {
        self.device.as_ref()
    }

    pub fn height(&self) -> Option<&PositiveInt> {
        self.height.as_ref()
    }

    pub fn width(&self) -> Option<&PositiveInt> {
        self.width.as_ref()
    }

    pub fn frames(&self) -> Option<&PositiveInt> {
        self.frames.as_ref()
    }

    /// Length in seconds.
    pub fn duration(&self) -> Option<&Decimal> {
        self.duration.as_ref()
    }

    pub fn content(&self) -> &Attachment {
        &self.content
    }

    pub fn note(&self) -> &[Annotation] {
        &self.note
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Media")?;
        validation::check_reference_types(ctx, &self.based_on, "Media.basedOn", BASED_ON_TARGETS)?;
        validation::check_concept_binding(ctx, self.type_.as_ref(), "Media.type", &MEDIA_TYPE)?;
        validation::check_concept_binding(
            ctx,
            self.modality.as_ref(),
            "Media.modality",
            &MEDIA_MODALITY,
        )?;
        validation::check_concept_binding(ctx, self.view.as_ref(), "Media.view", &MEDIA_VIEW)?;
        validation::check_reference_type(
            ctx,
            self.subject.as_ref(),
            "Media.subject",
            SUBJECT_TARGETS,
        )?;
        validation::check_reference_type(
            ctx,
            self.encounter.as_ref(),
            "Media.encounter",
            ENCOUNTER_TARGETS,
        )?;
        if let Some(created) = &self.created {
            created.validate(ctx, "Media.created")?;
        }
        validation::check_primitive(ctx, self.issued.as_ref(), "Media.issued")?;
        validation::check_reference_type(
            ctx,
            self.operator.as_ref(),
            "Media.operator",
            OPERATOR_TARGETS,
        )?;
        validation::check_concept_bindings(
            ctx,
            &self.reason_code,
            "Media.reasonCode",
            &MEDIA_REASON,
        )?;
        validation::check_concept_binding(
            ctx,
            self.body_site.as_ref(),
            "Media.bodySite",
            &BODY_SITE,
        )?;
        validation::check_primitive(ctx, self.device_name.as_ref(), "Media.deviceName")?;
        validation::check_reference_type(
            ctx,
            self.device.as_ref(),
            "Media.device",
            DEVICE_TARGETS,
        )?;
        validation::check_primitive(ctx, self.height.as_ref(), "Media.height")?;
        validation::check_primitive(ctx, self.width.as_ref(), "Media.width")?;
        validation::check_primitive(ctx, self.frames.as_ref(), "Media.frames")?;
        validation::check_primitive(ctx, self.duration.as_ref(), "Media.duration")?;
        Ok(())
    }
}

impl DomainResource for Media {
    fn domain_resource_base(&self) -> &DomainResourceBase {
        &self.base
    }

    fn resource_type(&self) -> &'static str {
        "Media"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl Visitable for Media {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Media(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_list(&self.identifier, "identifier", visitor);
            accept_list(&self.based_on, "basedOn", visitor);
            accept_list(&self.part_of, "partOf", visitor);
            self.status.accept("status", None, visitor);
            accept_opt(self.type_.as_ref(), "type", visitor);
            accept_opt(self.modality.as_ref(), "modality", visitor);
            accept_opt(self.view.as_ref(), "view", visitor);
            accept_opt(self.subject.as_ref(), "subject", visitor);
            accept_opt(self.encounter.as_ref(), "encounter", visitor);
            if let Some(created) = &self.created {
                created.accept_choice("created", visitor);
            }
            accept_opt(self.issued.as_ref(), "issued", visitor);
            accept_opt(self.operator.as_ref(), "operator", visitor);
            accept_list(&self.reason_code, "reasonCode", visitor);
            accept_opt(self.body_site.as_ref(), "bodySite", visitor);
            accept_opt(self.device_name.as_ref(), "deviceName", visitor);
            accept_opt(self.device.as_ref(), "device", visitor);
            accept_opt(self.height.as_ref(), "height", visitor);
            accept_opt(self.width.as_ref(), "width", visitor);
            accept_opt(self.frames.as_ref(), "frames", visitor);
            accept_opt(self.duration.as_ref(), "duration", visitor);
            self.content.accept("content", None, visitor);
            accept_list(&self.note, "note", visitor);
        });
    }
}

impl ModelInfo for Media {
    const TYPE_NAME: &'static str = "Media";
    const BASE_ELEMENTS: &'static [ElementInfo] = DOMAIN_RESOURCE_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("identifier").repeating().summary(),
        ElementInfo::new("basedOn").repeating().summary().targets(BASED_ON_TARGETS),
        ElementInfo::new("partOf").repeating().summary(),
        ElementInfo::new("status").required().summary().binding(MEDIA_STATUS),
        ElementInfo::new("type").summary().binding(MEDIA_TYPE),
        ElementInfo::new("modality").summary().binding(MEDIA_MODALITY),
        ElementInfo::new("view").summary().binding(MEDIA_VIEW),
        ElementInfo::new("subject").summary().targets(SUBJECT_TARGETS),
        ElementInfo::new("encounter").summary().targets(ENCOUNTER_TARGETS),
        ElementInfo::new("created").summary().choice(&["DateTime", "Period"]),
        ElementInfo::new("issued").summary(),
        ElementInfo::new("operator").summary().targets(OPERATOR_TARGETS),
        ElementInfo::new("reasonCode").repeating().summary().binding(MEDIA_REASON),
        ElementInfo::new("bodySite").summary().binding(BODY_SITE),
        ElementInfo::new("deviceName").summary(),
        ElementInfo::new("device").summary().targets(DEVICE_TARGETS),
        ElementInfo::new("height").summary(),
        ElementInfo::new("width").summary(),
        ElementInfo::new("frames").summary(),
        ElementInfo::new("duration").summary(),
        ElementInfo::new("content").required().summary(),
        ElementInfo::new("note").repeating(),
    ];
}

#[derive(Debug, Clone, Default)]
pub struct MediaBuilder {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    based_on: Vec<Reference>,
    part_of: Vec<Reference>,
    status: Option<Coded<EventStatus>>,
    type_: Option<CodeableConcept>,
    modality: Option<CodeableConcept>,
    view: Option<CodeableConcept>,
    subject: Option<Reference>,
    encounter: Option<Reference>,
    created: Option<MediaCreated>,
    issued: Option<Instant>,
    operator: Option<Reference>,
    reason_code: Vec<CodeableConcept>,
    body_site: Option<CodeableConcept>,
    device_name: Option<FhirString>,
    device: Option<Reference>,
    height: Option<PositiveInt>,
    width: Option<PositiveInt>,
    frames: Option<PositiveInt>,
    duration: Option<Decimal>,
    content: Option<Attachment>,
    note: Vec<Annotation>,
}

impl MediaBuilder {
    pub fn identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier.extend(identifier);
        self
    }

    pub fn set_identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier = identifier.into_iter().collect();
        self
    }

    pub fn based_on(mut self, based_on: impl IntoIterator<Item = Reference>) -> Self {
        self.based_on.extend(based_on);
        self
    }

    pub fn set_based_on(mut self, based_on: impl IntoIterator<Item = Reference>) -> Self {
        self.based_on = based_on.into_iter().collect();
        self
    }

    pub fn part_of(mut self, part_of: impl IntoIterator<Item = Reference>) -> Self {
        self.part_of.extend(part_of);
        self
    }

    pub fn set_part_of(mut self, part_of: impl IntoIterator<Item = Reference>) -> Self {
        self.part_of = part_of.into_iter().collect();
        self
    }

    pub fn status(mut self, status: impl Into<Coded<EventStatus>>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn type_(mut self, type_: CodeableConcept) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn modality(mut self, modality: CodeableConcept) -> Self {
        self.modality = Some(modality);
        self
    }

    pub fn view(mut self, view: CodeableConcept) -> Self {
        self.view = Some(view);
        self
    }

    pub fn subject(mut self, subject: Reference) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn encounter(mut self, encounter: Reference) -> Self {
        self.encounter = Some(encounter);
        self
    }

    pub fn created(mut self, created: impl Into<MediaCreated>) -> Self {
        self.created = Some(created.into());
        self
    }

    pub fn issued(mut self, issued: impl Into<Instant>) -> Self {
        self.issued = Some(issued.into());
        self
    }

    pub fn operator(mut self, operator: Reference) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn reason_code(mut self, reason_code: impl IntoIterator<Item = CodeableConcept>) -> Self {
        self.reason_code.extend(reason_code);
        self
    }

    pub fn set_reason_code(
        mut self,
        reason_code: impl IntoIterator<Item = CodeableConcept>,
    ) -> Self {
        self.reason_code = reason_code.into_iter().collect();
        self
    }

    pub fn body_site(mut self, body_site: CodeableConcept) -> Self {
        self.body_site = Some(body_site);
        self
    }

    pub fn device_name(mut self, device_name: impl Into<FhirString>) -> Self {
        self.device_name = Some(device_name.into());
        self
    }

    pub fn device(mut self, device: Reference) -> Self {
        self.device = Some(device);
        self
    }

    pub fn height(mut self, height: impl Into<PositiveInt>) -> Self {
        self.height = Some(height.into());
        self
    }

    pub fn width(mut self, width: impl Into<PositiveInt>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn frames(mut self, frames: impl Into<PositiveInt>) -> Self {
        self.frames = Some(frames.into());
        self
    }

    pub fn duration(mut self, duration: impl Into<Decimal>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn content(mut self, content: Attachment) -> Self {
        self.content = Some(content);
        self
    }

    pub fn note(mut self, note: impl IntoIterator<Item = Annotation>) -> Self {
        self.note.extend(note);
        self
    }

    pub fn set_note(mut self, note: impl IntoIterator<Item = Annotation>) -> Self {
        self.note = note.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<Media> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Media> {
        let status = validation::require_non_null(self.status, "Media.status")?;
        let content = validation::require_non_null(self.content, "Media.content")?;
        let media = Media {
            base: self.base,
            identifier: self.identifier,
            based_on: self.based_on,
            part_of: self.part_of,
            status,
            type_: self.type_,
            modality: self.modality,
            view: self.view,
            subject: self.subject,
            encounter: self.encounter,
            created: self.created,
            issued: self.issued,
            operator: self.operator,
            reason_code: self.reason_code,
            body_site: self.body_site,
            device_name: self.device_name,
            device: self.device,
            height: self.height,
            width: self.width,
            frames: self.frames,
            duration: self.duration,
            content,
            note: self.note,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            media.validate(ctx).inspect_err(|err| {
                tracing::debug!(resource_type = "Media", error = %err, "Build rejected");
            })?;
        }
        Ok(media)
    }
}

impl DomainResourceBuilder for MediaBuilder {
    fn domain_resource_base_mut(&mut self) -> &mut DomainResourceBase {
        &mut self.base
    }
}

impl From<Media> for MediaBuilder {
    fn from(media: Media) -> Self {
        Self {
            base: media.base,
            identifier: media.identifier,
            based_on: media.based_on,
            part_of: media.part_of,
            status: Some(media.status),
            type_: media.type_,
            modality: media.modality,
            view: media.view,
            subject: media.subject,
            encounter: media.encounter,
            created: media.created,
            issued: media.issued,
            operator: media.operator,
            reason_code: media.reason_code,
            body_site: media.body_site,
            device_name: media.device_name,
            device: media.device,
            height: media.height,
            width: media.width,
            frames: media.frames,
            duration: media.duration,
            content: Some(media.content),
            note: media.note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn photo() -> Attachment {
        Attachment::builder()
            .content_type("image/gif")
            .url("http://example.org/images/xray.gif")
            .build()
            .unwrap()
    }

    #[test]
    fn content_and_status_are_required() {
        let err = Media::builder().status(EventStatus::Completed).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "Media.content"));
        let err = Media::builder().content(photo()).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "Media.status"));
    }

    #[test]
    fn created_is_a_choice() {
        let media = Media::builder()
            .status(EventStatus::Completed)
            .content(photo())
            .created(DateTime::parse("2017-12-17").unwrap())
            .build()
            .unwrap();
        assert_eq!(
            media.created().map(|c| c.element_name("created")),
            Some("createdDateTime".to_string())
        );
        assert!(Media::element_info("createdPeriod").is_some());
    }

    #[test]
    fn dimensions_must_be_positive() {
        let err = Media::builder()
            .status(EventStatus::Completed)
            .content(photo())
            .height(0)
            .build()
            .unwrap_err();
        assert_eq!(err.element(), Some("Media.height"));
    }

    #[test]
    fn operator_targets_are_checked() {
        let err = Media::builder()
            .status(EventStatus::Completed)
            .content(photo())
            .operator(Reference::builder().reference("Medication/1").build().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::ReferenceTypeNotAllowed { ref element, .. } if element == "Media.operator"));
    }
}
