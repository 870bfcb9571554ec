use super::{DomainResource, DomainResourceBase, DomainResourceBuilder};
use crate::binding::{common, Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, BACKBONE_ELEMENT_BASE, DOMAIN_RESOURCE_BASE};
use crate::types::{
    Address, AdministrativeGender, Attachment, BackboneElement, BackboneElementBase,
    BackboneElementBuilder, Boolean, CodeValue, CodeableConcept, Coded, ContactPoint, Date,
    Element, ElementBase, ElementBuilder, Extension, HashMemo, HumanName, Identifier, Period,
    Reference,
};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

const PATIENT_RELATIONSHIP_TYPE: Binding = Binding::new(
    "PatientRelationshipType",
    BindingStrength::Preferred,
    "http://hl7.org/fhir/ValueSet/relatedperson-relationshiptype",
)
.description("The nature of the relationship between a patient and the related person.");

const ADMINISTRATIVE_GENDER: Binding = Binding::new(
    "AdministrativeGender",
    BindingStrength::Required,
    <AdministrativeGender as CodeValue>::VALUE_SET,
)
.description("The gender of a person used for administrative purposes.");

const PATIENT_TARGETS: &[&str] = &["Patient"];

/// Information about a person that is involved in the care for a patient, but who is
/// not the target of healthcare, nor has a formal responsibility in the care process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedPerson {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    active: Option<Boolean>,
    patient: Reference,
    relationship: Vec<CodeableConcept>,
    name: Vec<HumanName>,
    telecom: Vec<ContactPoint>,
    gender: Option<Coded<AdministrativeGender>>,
    birth_date: Option<Date>,
    address: Vec<Address>,
    photo: Vec<Attachment>,
    period: Option<Period>,
    communication: Vec<RelatedPersonCommunication>,
    hash: HashMemo,
}

memoized_hash!(RelatedPerson {
    base,
    identifier,
    active,
    patient,
    relationship,
    name,
    telecom,
    gender,
    birth_date,
    address,
    photo,
    period,
    communication,
});

impl RelatedPerson {
    pub fn builder() -> RelatedPersonBuilder {
        RelatedPersonBuilder::default()
    }

    pub fn to_builder(&self) -> RelatedPersonBuilder {
        RelatedPersonBuilder::from(self.clone())
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    pub fn active(&self) -> Option<&Boolean> {
        self.active.as_ref()
    }

    pub fn patient(&self) -> &Reference {
        &self.patient
    }

    pub fn relationship(&self) -> &[CodeableConcept] {
        &self.relationship
    }

    pub fn name(&self) -> &[HumanName] {
        &self.name
    }

    pub fn telecom(&self) -> &[ContactPoint] {
        &self.telecom
    }

    pub fn gender(&self) -> Option<&Coded<AdministrativeGender>> {
        self.gender.as_ref()
    }

    pub fn birth_date(&self) -> Option<&Date> {
        self.birth_date.as_ref()
    }

    pub fn address(&self) -> &[Address] {
        &self.address
    }

    pub fn photo(&self) -> &[Attachment] {
        &self.photo
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }

    pub fn communication(&self) -> &[RelatedPersonCommunication] {
        &self.communication
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "RelatedPerson")?;
        validation::check_primitive(ctx, self.active.as_ref(), "RelatedPerson.active")?;
        validation::check_reference_type(
            ctx,
            Some(&self.patient),
            "RelatedPerson.patient",
            PATIENT_TARGETS,
        )?;
        validation::check_concept_bindings(
            ctx,
            &self.relationship,
            "RelatedPerson.relationship",
            &PATIENT_RELATIONSHIP_TYPE,
        )?;
        validation::check_primitive(ctx, self.birth_date.as_ref(), "RelatedPerson.birthDate")?;
        Ok(())
    }
}

impl DomainResource for RelatedPerson {
    fn domain_resource_base(&self) -> &DomainResourceBase {
        &self.base
    }

    fn resource_type(&self) -> &'static str {
        "RelatedPerson"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl Visitable for RelatedPerson {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::RelatedPerson(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_list(&self.identifier, "identifier", visitor);
            accept_opt(self.active.as_ref(), "active", visitor);
            self.patient.accept("patient", None, visitor);
            accept_list(&self.relationship, "relationship", visitor);
            accept_list(&self.name, "name", visitor);
            accept_list(&self.telecom, "telecom", visitor);
            accept_opt(self.gender.as_ref(), "gender", visitor);
            accept_opt(self.birth_date.as_ref(), "birthDate", visitor);
            accept_list(&self.address, "address", visitor);
            accept_list(&self.photo, "photo", visitor);
            accept_opt(self.period.as_ref(), "period", visitor);
            accept_list(&self.communication, "communication", visitor);
        });
    }
}

impl ModelInfo for RelatedPerson {
    const TYPE_NAME: &'static str = "RelatedPerson";
    const BASE_ELEMENTS: &'static [ElementInfo] = DOMAIN_RESOURCE_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("identifier").repeating().summary(),
        ElementInfo::new("active").summary(),
        ElementInfo::new("patient").required().summary().targets(PATIENT_TARGETS),
        ElementInfo::new("relationship").repeating().summary().binding(PATIENT_RELATIONSHIP_TYPE),
        ElementInfo::new("name").repeating().summary(),
        ElementInfo::new("telecom").repeating().summary(),
        ElementInfo::new("gender").summary().binding(ADMINISTRATIVE_GENDER),
        ElementInfo::new("birthDate").summary(),
        ElementInfo::new("address").repeating().summary(),
        ElementInfo::new("photo").repeating(),
        ElementInfo::new("period"),
        ElementInfo::new("communication").repeating(),
    ];
}

#[derive(Debug, Clone, Default)]
pub struct RelatedPersonBuilder {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    active: Option<Boolean>,
    patient: Option<Reference>,
    relationship: Vec<CodeableConcept>,
    name: Vec<HumanName>,
    telecom: Vec<ContactPoint>,
    gender: Option<Coded<AdministrativeGender>>,
    birth_date: Option<Date>,
    address: Vec<Address>,
    photo: Vec<Attachment>,
    period: Option<Period>,
    communication: Vec<RelatedPersonCommunication>,
}

impl RelatedPersonBuilder {
    pub fn identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier.extend(identifier);
        self
    }

    pub fn set_identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier = identifier.into_iter().collect();
        self
    }

    pub fn active(mut self, active: impl Into<Boolean>) -> Self {
        self.active = Some(active.into());
        self
    }

    pub fn patient(mut self, patient: Reference) -> Self {
        self.patient = Some(patient);
        self
    }

    pub fn relationship(mut self, relationship: impl IntoIterator<Item = CodeableConcept>) -> Self {
        self.relationship.extend(relationship);
        self
    }

    pub fn set_relationship(
        mut self,
        relationship: impl IntoIterator<Item = CodeableConcept>,
    ) -> Self {
        self.relationship = relationship.into_iter().collect();
        self
    }

    pub fn name(mut self, name: impl IntoIterator<Item = HumanName>) -> Self {
        self.name.extend(name);
        self
    }

    pub fn set_name(mut self, name: impl IntoIterator<Item = HumanName>) -> Self {
        self.name = name.into_iter().collect();
        self
    }

    pub fn telecom(mut self, telecom: impl IntoIterator<Item = ContactPoint>) -> Self {
        self.telecom.extend(telecom);
        self
    }

    pub fn set_telecom(mut self, telecom: impl IntoIterator<Item = ContactPoint>) -> Self {
        self.telecom = telecom.into_iter().collect();
        self
    }

    pub fn gender(mut self, gender: impl Into<Coded<AdministrativeGender>>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn birth_date(mut self, birth_date: impl Into<Date>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }

    pub fn address(mut self, address: impl IntoIterator<Item = Address>) -> Self {
        self.address.extend(address);
        self
    }

    pub fn set_address(mut self, address: impl IntoIterator<Item = Address>) -> Self {
        self.address = address.into_iter().collect();
        self
    }

    pub fn photo(mut self, photo: impl IntoIterator<Item = Attachment>) -> Self {
        self.photo.extend(photo);
        self
    }

    pub fn set_photo(mut self, photo: impl IntoIterator<Item = Attachment>) -> Self {
        self.photo = photo.into_iter().collect();
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn communication(
        mut self,
        communication: impl IntoIterator<Item = RelatedPersonCommunication>,
    ) -> Self {
        self.communication.extend(communication);
        self
    }

    pub fn set_communication(
        mut self,
        communication: impl IntoIterator<Item = RelatedPersonCommunication>,
    ) -> Self {
        self.communication = communication.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<RelatedPerson> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<RelatedPerson> {
        let patient = validation::require_non_null(self.patient, "RelatedPerson.patient")?;
        let related_person = RelatedPerson {
            base: self.base,
            identifier: self.identifier,
            active: self.active,
            patient,
            relationship: self.relationship,
            name: self.name,
            telecom: self.telecom,
            gender: self.gender,
            birth_date: self.birth_date,
            address: self.address,
            photo: self.photo,
            period: self.period,
            communication: self.communication,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            related_person.validate(ctx).inspect_err(|err| {
                tracing::debug!(resource_type = "RelatedPerson", error = %err, "Build rejected");
            })?;
        }
        Ok(related_person)
    }
}

impl DomainResourceBuilder for RelatedPersonBuilder {
    fn domain_resource_base_mut(&mut self) -> &mut DomainResourceBase {
        &mut self.base
    }
}

impl From<RelatedPerson> for RelatedPersonBuilder {
    fn from(related_person: RelatedPerson) -> Self {
        Self {
            base: related_person.base,
            identifier: related_person.identifier,
            active: related_person.active,
            patient: Some(related_person.patient),
            relationship: related_person.relationship,
            name: related_person.name,
            telecom: related_person.telecom,
            gender: related_person.gender,
            birth_date: related_person.birth_date,
            address: related_person.address,
            photo: related_person.photo,
            period: related_person.period,
            communication: related_person.communication,
        }
    }
}

/// A language which may be used to communicate with the related person about the
/// patient's health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedPersonCommunication {
    base: BackboneElementBase,
    language: CodeableConcept,
    preferred: Option<Boolean>,
    hash: HashMemo,
}

memoized_hash!(RelatedPersonCommunication { base, language, preferred });

impl RelatedPersonCommunication {
    pub fn builder() -> RelatedPersonCommunicationBuilder {
        RelatedPersonCommunicationBuilder::default()
    }

    pub fn to_builder(&self) -> RelatedPersonCommunicationBuilder {
        RelatedPersonCommunicationBuilder::from(self.clone())
    }

    pub fn language(&self) -> &CodeableConcept {
        &self.language
    }

    /// Whether this is the preferred language.
    pub fn preferred(&self) -> Option<&Boolean> {
        self.preferred.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "RelatedPerson.communication")?;
        validation::check_concept_binding(
            ctx,
            Some(&self.language),
            "RelatedPerson.communication.language",
            &common::LANGUAGE,
        )?;
        validation::check_primitive(
            ctx,
            self.preferred.as_ref(),
            "RelatedPerson.communication.preferred",
        )?;
        validation::require_value_or_children(self, "RelatedPerson.communication")
    }
}

impl Element for RelatedPersonCommunication {
    fn element_base(&self) -> &ElementBase {
        &self.base.element
    }

    fn type_name(&self) -> &'static str {
        "RelatedPerson.communication"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl BackboneElement for RelatedPersonCommunication {
    fn modifier_extension(&self) -> &[Extension] {
        &self.base.modifier_extension
    }
}

impl Visitable for RelatedPersonCommunication {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::RelatedPersonCommunication(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            self.language.accept("language", None, visitor);
            accept_opt(self.preferred.as_ref(), "preferred", visitor);
        });
    }
}

impl ModelInfo for RelatedPersonCommunication {
    const TYPE_NAME: &'static str = "RelatedPerson.communication";
    const BASE_ELEMENTS: &'static [ElementInfo] = BACKBONE_ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("language").required().binding(common::LANGUAGE),
        ElementInfo::new("preferred"),
    ];
}

impl CheckValue for RelatedPersonCommunication {}

#[derive(Debug, Clone, Default)]
pub struct RelatedPersonCommunicationBuilder {
    base: BackboneElementBase,
    language: Option<CodeableConcept>,
    preferred: Option<Boolean>,
}

impl RelatedPersonCommunicationBuilder {
    pub fn language(mut self, language: CodeableConcept) -> Self {
        self.language = Some(language);
        self
    }

    pub fn preferred(mut self, preferred: impl Into<Boolean>) -> Self {
        self.preferred = Some(preferred.into());
        self
    }

    pub fn build(self) -> Result<RelatedPersonCommunication> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<RelatedPersonCommunication> {
        let language =
            validation::require_non_null(self.language, "RelatedPerson.communication.language")?;
        let communication = RelatedPersonCommunication {
            base: self.base,
            language,
            preferred: self.preferred,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            communication.validate(ctx)?;
        }
        Ok(communication)
    }
}

impl ElementBuilder for RelatedPersonCommunicationBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base.element
    }
}

impl BackboneElementBuilder for RelatedPersonCommunicationBuilder {
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase {
        &mut self.base
    }
}

impl From<RelatedPersonCommunication> for RelatedPersonCommunicationBuilder {
    fn from(communication: RelatedPersonCommunication) -> Self {
        Self {
            base: communication.base,
            language: Some(communication.language),
            preferred: communication.preferred,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::Coding;

    fn patient() -> Reference {
        Reference::builder().reference("Patient/example").build().unwrap()
    }

    #[test]
    fn patient_is_required() {
        let err = RelatedPerson::builder().active(true).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "RelatedPerson.patient"));
    }

    #[test]
    fn patient_must_reference_a_patient() {
        let err = RelatedPerson::builder()
            .patient(Reference::builder().reference("Practitioner/1").build().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::ReferenceTypeNotAllowed { ref element, .. } if element == "RelatedPerson.patient"));
    }

    #[test]
    fn communication_languages() {
        let dutch = CodeableConcept::builder()
            .coding([Coding::builder().system("urn:ietf:bcp:47").code("nl").build().unwrap()])
            .build()
            .unwrap();
        let communication = RelatedPersonCommunication::builder()
            .language(dutch)
            .preferred(true)
            .build()
            .unwrap();
        let person = RelatedPerson::builder()
            .patient(patient())
            .communication([communication])
            .build()
            .unwrap();
        assert_eq!(person.communication().len(), 1);
        assert_eq!(person.patient().reference_value(), Some("Patient/example"));
    }

    #[test]
    fn communication_language_is_required() {
        let err = RelatedPersonCommunication::builder().preferred(true).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "RelatedPerson.communication.language"));
    }
}
