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

const ADMINISTRATIVE_GENDER: Binding = Binding::new(
    "AdministrativeGender",
    BindingStrength::Required,
    <AdministrativeGender as CodeValue>::VALUE_SET,
)
.description("The gender of a person used for administrative purposes.");

const QUALIFICATION: Binding = Binding::new(
    "Qualification",
    BindingStrength::Example,
    "http://terminology.hl7.org/ValueSet/v2-2.7-0360",
)
.description("Specific qualification the practitioner has to provide a service.");

const QUALIFICATION_ISSUER_TARGETS: &[&str] = &["Organization"];

/// A person who is directly or indirectly involved in the provisioning of
/// healthcare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Practitioner {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    active: Option<Boolean>,
    name: Vec<HumanName>,
    telecom: Vec<ContactPoint>,
    address: Vec<Address>,
    gender: Option<Coded<AdministrativeGender>>,
    birth_date: Option<Date>,
    photo: Vec<Attachment>,
    qualification: Vec<PractitionerQualification>,
    communication: Vec<CodeableConcept>,
    hash: HashMemo,
}

memoized_hash!(Practitioner {
    base,
    identifier,
    active,
    name,
    telecom,
    address,
    gender,
    birth_date,
    photo,
    qualification,
    communication,
});

impl Practitioner {
    pub fn builder() -> PractitionerBuilder {
        PractitionerBuilder::default()
    }

    pub fn to_builder(&self) -> PractitionerBuilder {
        PractitionerBuilder::from(self.clone())
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    pub fn active(&self) -> Option<&Boolean> {
        self.active.as_ref()
    }

    pub fn name(&self) -> &[HumanName] {
        &self.name
    }

    pub fn telecom(&self) -> &[ContactPoint] {
        &self.telecom
    }

    pub fn address(&self) -> &[Address] {
        &self.address
    }

    pub fn gender(&self) -> Option<&Coded<AdministrativeGender>> {
        self.gender.as_ref()
    }

    pub fn birth_date(&self) -> Option<&Date> {
        self.birth_date.as_ref()
    }

    pub fn photo(&self) -> &[Attachment] {
        &self.photo
    }

    pub fn qualification(&self) -> &[PractitionerQualification] {
        &self.qualification
    }

    /// Languages the practitioner can use in patient communication.
    pub fn communication(&self) -> &[CodeableConcept] {
        &self.communication
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Practitioner")?;
        validation::check_primitive(ctx, self.active.as_ref(), "Practitioner.active")?;
        validation::check_primitive(ctx, self.birth_date.as_ref(), "Practitioner.birthDate")?;
        validation::check_concept_bindings(
            ctx,
            &self.communication,
            "Practitioner.communication",
            &common::LANGUAGE,
        )?;
        Ok(())
    }
}

impl DomainResource for Practitioner {
    fn domain_resource_base(&self) -> &DomainResourceBase {
        &self.base
    }

    fn resource_type(&self) -> &'static str {
        "Practitioner"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || !self.identifier.is_empty()
            || self.active.is_some()
            || !self.name.is_empty()
            || !self.telecom.is_empty()
            || !self.address.is_empty()
            || self.gender.is_some()
            || self.birth_date.is_some()
            || !self.photo.is_empty()
            || !self.qualification.is_empty()
            || !self.communication.is_empty()
    }
}

impl Visitable for Practitioner {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Practitioner(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_list(&self.identifier, "identifier", visitor);
            accept_opt(self.active.as_ref(), "active", visitor);
            accept_list(&self.name, "name", visitor);
            accept_list(&self.telecom, "telecom", visitor);
            accept_list(&self.address, "address", visitor);
            accept_opt(self.gender.as_ref(), "gender", visitor);
            accept_opt(self.birth_date.as_ref(), "birthDate", visitor);
            accept_list(&self.photo, "photo", visitor);
            accept_list(&self.qualification, "qualification", visitor);
            accept_list(&self.communication, "communication", visitor);
        });
    }
}

impl ModelInfo for Practitioner {
    const TYPE_NAME: &'static str = "Practitioner";
    const BASE_ELEMENTS: &'static [ElementInfo] = DOMAIN_RESOURCE_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("identifier").repeating().summary(),
        ElementInfo::new("active").summary(),
        ElementInfo::new("name").repeating().summary(),
        ElementInfo::new("telecom").repeating().summary(),
        ElementInfo::new("address").repeating().summary(),
        ElementInfo::new("gender").summary().binding(ADMINISTRATIVE_GENDER),
        ElementInfo::new("birthDate").summary(),
        ElementInfo::new("photo").repeating(),
        ElementInfo::new("qualification").repeating(),
        ElementInfo::new("communication").repeating().binding(common::LANGUAGE),
    ];
}

#[derive(Debug, Clone, Default)]
pub struct PractitionerBuilder {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    active: Option<Boolean>,
    name: Vec<HumanName>,
    telecom: Vec<ContactPoint>,
    address: Vec<Address>,
    gender: Option<Coded<AdministrativeGender>>,
    birth_date: Option<Date>,
    photo: Vec<Attachment>,
    qualification: Vec<PractitionerQualification>,
    communication: Vec<CodeableConcept>,
}

impl PractitionerBuilder {
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

    pub fn address(mut self, address: impl IntoIterator<Item = Address>) -> Self {
        self.address.extend(address);
        self
    }

    pub fn set_address(mut self, address: impl IntoIterator<Item = Address>) -> Self {
        self.address = address.into_iter().collect();
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

    pub fn photo(mut self, photo: impl IntoIterator<Item = Attachment>) -> Self {
        self.photo.extend(photo);
        self
    }

    pub fn set_photo(mut self, photo: impl IntoIterator<Item = Attachment>) -> Self {
        self.photo = photo.into_iter().collect();
        self
    }

    pub fn qualification(
        mut self,
        qualification: impl IntoIterator<Item = PractitionerQualification>,
    ) -> Self {
        self.qualification.extend(qualification);
        self
    }

    pub fn set_qualification(
        mut self,
        qualification: impl IntoIterator<Item = PractitionerQualification>,
    ) -> Self {
        self.qualification = qualification.into_iter().collect();
        self
    }

    pub fn communication(
        mut self,
        communication: impl IntoIterator<Item = CodeableConcept>,
    ) -> Self {
        self.communication.extend(communication);
        self
    }

    pub fn set_communication(
        mut self,
        communication: impl IntoIterator<Item = CodeableConcept>,
    ) -> Self {
        self.communication = communication.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<Practitioner> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Practitioner> {
        let practitioner = Practitioner {
            base: self.base,
            identifier: self.identifier,
            active: self.active,
            name: self.name,
            telecom: self.telecom,
            address: self.address,
            gender: self.gender,
            birth_date: self.birth_date,
            photo: self.photo,
            qualification: self.qualification,
            communication: self.communication,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            practitioner.validate(ctx).inspect_err(|err| {
                tracing::debug!(resource_type = "Practitioner", error = %err, "Build rejected");
            })?;
        }
        Ok(practitioner)
    }
}

impl DomainResourceBuilder for PractitionerBuilder {
    fn domain_resource_base_mut(&mut self) -> &mut DomainResourceBase {
        &mut self.base
    }
}

impl From<Practitioner> for PractitionerBuilder {
    fn from(practitioner: Practitioner) -> Self {
        Self {
            base: practitioner.base,
            identifier: practitioner.identifier,
            active: practitioner.active,
            name: practitioner.name,
            telecom: practitioner.telecom,
            address: practitioner.address,
            gender: practitioner.gender,
            birth_date: practitioner.birth_date,
            photo: practitioner.photo,
            qualification: practitioner.qualification,
            communication: practitioner.communication,
        }
    }
}

/// A certification, license or training obtained for the practitioner's role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PractitionerQualification {
    base: BackboneElementBase,
    identifier: Vec<Identifier>,
    code: CodeableConcept,
    period: Option<Period>,
    issuer: Option<Reference>,
    hash: HashMemo,
}

memoized_hash!(PractitionerQualification { base, identifier, code, period, issuer });

impl PractitionerQualification {
    pub fn builder() -> PractitionerQualificationBuilder {
        PractitionerQualificationBuilder::default()
    }

    pub fn to_builder(&self) -> PractitionerQualificationBuilder {
        PractitionerQualificationBuilder::from(self.clone())
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    pub fn code(&self) -> &CodeableConcept {
        &self.code
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }

    pub fn issuer(&self) -> Option<&Reference> {
        self.issuer.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Practitioner.qualification")?;
        validation::check_concept_binding(
            ctx,
            Some(&self.code),
            "Practitioner.qualification.code",
            &QUALIFICATION,
        )?;
        validation::check_reference_type(
            ctx,
            self.issuer.as_ref(),
            "Practitioner.qualification.issuer",
            QUALIFICATION_ISSUER_TARGETS,
        )?;
        validation::require_value_or_children(self, "Practitioner.qualification")
    }
}

impl Element for PractitionerQualification {
    fn element_base(&self) -> &ElementBase {
        &self.base.element
    }

    fn type_name(&self) -> &'static str {
        "Practitioner.qualification"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl BackboneElement for PractitionerQualification {
    fn modifier_extension(&self) -> &[Extension] {
        &self.base.modifier_extension
    }
}

impl Visitable for PractitionerQualification {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::PractitionerQualification(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_list(&self.identifier, "identifier", visitor);
            self.code.accept("code", None, visitor);
            accept_opt(self.period.as_ref(), "period", visitor);
            accept_opt(self.issuer.as_ref(), "issuer", visitor);
        });
    }
}

impl ModelInfo for PractitionerQualification {
    const TYPE_NAME: &'static str = "Practitioner.qualification";
    const BASE_ELEMENTS: &'static [ElementInfo] = BACKBONE_ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("identifier").repeating(),
        ElementInfo::new("code").required().binding(QUALIFICATION),
        ElementInfo::new("period"),
        ElementInfo::new("issuer").targets(QUALIFICATION_ISSUER_TARGETS),
    ];
}

impl CheckValue for PractitionerQualification {}

#[derive(Debug, Clone, Default)]
pub struct PractitionerQualificationBuilder {
    base: BackboneElementBase,
    identifier: Vec<Identifier>,
    code: Option<CodeableConcept>,
    period: Option<Period>,
    issuer: Option<Reference>,
}

impl PractitionerQualificationBuilder {
    pub fn identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier.extend(identifier);
        self
    }

    pub fn set_identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier = identifier.into_iter().collect();
        self
    }

    pub fn code(mut self, code: CodeableConcept) -> Self {
        self.code = Some(code);
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn issuer(mut self, issuer: Reference) -> Self {
        self.issuer = Some(issuer);
        self
    }

    pub fn build(self) -> Result<PractitionerQualification> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<PractitionerQualification> {
        let code = validation::require_non_null(self.code, "Practitioner.qualification.code")?;
        let qualification = PractitionerQualification {
            base: self.base,
            identifier: self.identifier,
            code,
            period: self.period,
            issuer: self.issuer,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            qualification.validate(ctx)?;
        }
        Ok(qualification)
    }
}

impl ElementBuilder for PractitionerQualificationBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base.element
    }
}

impl BackboneElementBuilder for PractitionerQualificationBuilder {
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase {
        &mut self.base
    }
}

impl From<PractitionerQualification> for PractitionerQualificationBuilder {
    fn from(qualification: PractitionerQualification) -> Self {
        Self {
            base: qualification.base,
            identifier: qualification.identifier,
            code: Some(qualification.code),
            period: qualification.period,
            issuer: qualification.issuer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn name() -> HumanName {
        HumanName::builder()
            .family("Careful")
            .given(["Adam"])
            .prefix(["Dr"])
            .build()
            .unwrap()
    }

    #[test]
    fn demographics() {
        let practitioner = Practitioner::builder()
            .active(true)
            .name([name()])
            .gender(AdministrativeGender::Male)
            .birth_date(Date::parse("1971-11-07").unwrap())
            .build()
            .unwrap();
        assert_eq!(practitioner.name().len(), 1);
        assert_eq!(
            practitioner.gender().and_then(Coded::value),
            Some(AdministrativeGender::Male)
        );
        assert!(Practitioner::element_info("birthDate").is_some_and(|e| e.summary));
    }

    #[test]
    fn qualification_requires_code() {
        let err = PractitionerQualification::builder().build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "Practitioner.qualification.code"));
    }

    #[test]
    fn qualification_issuer_is_an_organization() {
        let code = CodeableConcept::builder().text("Bachelor of Science").build().unwrap();
        let err = PractitionerQualification::builder()
            .code(code)
            .issuer(Reference::builder().reference("Patient/1").build().unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err.element(), Some("Practitioner.qualification.issuer"));
    }
}
