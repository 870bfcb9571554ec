use super::{DomainResource, DomainResourceBase, DomainResourceBuilder};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, BACKBONE_ELEMENT_BASE, DOMAIN_RESOURCE_BASE};
use crate::types::{
    BackboneElement, BackboneElementBase, BackboneElementBuilder, Boolean, CodeValue,
    CodeableConcept, Coded, DateTime, Element, ElementBase, ElementBuilder, Extension, FhirString,
    HashMemo, Identifier, MedicationStatus, Ratio, Reference,
};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

const MEDICATION_FORMAL_REPRESENTATION: Binding = Binding::new(
    "MedicationFormalRepresentation",
    BindingStrength::Example,
    "http://hl7.org/fhir/ValueSet/medication-codes",
)
.description("A coded concept that defines the type of a medication.");

const MEDICATION_STATUS: Binding = Binding::new(
    "MedicationStatus",
    BindingStrength::Required,
    <MedicationStatus as CodeValue>::VALUE_SET,
)
.description("A coded concept defining if the medication is in active use.");

const MEDICATION_FORM: Binding = Binding::new(
    "MedicationForm",
    BindingStrength::Example,
    "http://hl7.org/fhir/ValueSet/medication-form-codes",
)
.description("A coded concept defining the form of a medication.");

choice!(
    /// `Medication.ingredient.item[x]`.
    MedicationIngredientItem {
        CodeableConcept(CodeableConcept),
        Reference(Reference),
    }
);

const MANUFACTURER_TARGETS: &[&str] = &["Organization"];
const INGREDIENT_ITEM_TARGETS: &[&str] = &["Substance", "Medication"];

/// Identifies and defines a medication for prescribing, dispensing and administering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Medication {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    code: Option<CodeableConcept>,
    status: Option<Coded<MedicationStatus>>,
    manufacturer: Option<Reference>,
    form: Option<CodeableConcept>,
    amount: Option<Ratio>,
    ingredient: Vec<MedicationIngredient>,
    batch: Option<MedicationBatch>,
    hash: HashMemo,
}

memoized_hash!(Medication {
    base,
    identifier,
    code,
    status,
    manufacturer,
    form,
    amount,
    ingredient,
    batch,
});

impl Medication {
    pub fn builder() -> MedicationBuilder {
        MedicationBuilder::default()
    }

    pub fn to_builder(&self) -> MedicationBuilder {
        MedicationBuilder::from(self.clone())
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    pub fn code(&self) -> Option<&CodeableConcept> {
        self.code.as_ref()
    }

    pub fn status(&self) -> Option<&Coded<MedicationStatus>> {
        self.status.as_ref()
    }

    pub fn manufacturer(&self) -> Option<&Reference> {
        self.manufacturer.as_ref()
    }

    pub fn form(&self) -> Option<&CodeableConcept> {
        self.form.as_ref()
    }

    /// Amount of drug in the package.
    pub fn amount(&self) -> Option<&Ratio> {
        self.amount.as_ref()
    }

    pub fn ingredient(&self) -> &[MedicationIngredient] {
        &self.ingredient
    }

    pub fn batch(&self) -> Option<&MedicationBatch> {
        self.batch.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Medication")?;
        validation::check_concept_binding(
            ctx,
            self.code.as_ref(),
            "Medication.code",
            &MEDICATION_FORMAL_REPRESENTATION,
        )?;
        validation::check_reference_type(
            ctx,
            self.manufacturer.as_ref(),
            "Medication.manufacturer",
            MANUFACTURER_TARGETS,
        )?;
        validation::check_concept_binding(
            ctx,
            self.form.as_ref(),
            "Medication.form",
            &MEDICATION_FORM,
        )?;
        Ok(())
    }
}

impl DomainResource for Medication {
    fn domain_resource_base(&self) -> &DomainResourceBase {
        &self.base
    }

    fn resource_type(&self) -> &'static str {
        "Medication"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || !self.identifier.is_empty()
            || self.code.is_some()
            || self.status.is_some()
            || self.manufacturer.is_some()
            || self.form.is_some()
            || self.amount.is_some()
            || !self.ingredient.is_empty()
            || self.batch.is_some()
    }
}

impl Visitable for Medication {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Medication(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_list(&self.identifier, "identifier", visitor);
            accept_opt(self.code.as_ref(), "code", visitor);
            accept_opt(self.status.as_ref(), "status", visitor);
            accept_opt(self.manufacturer.as_ref(), "manufacturer", visitor);
            accept_opt(self.form.as_ref(), "form", visitor);
            accept_opt(self.amount.as_ref(), "amount", visitor);
            accept_list(&self.ingredient, "ingredient", visitor);
            accept_opt(self.batch.as_ref(), "batch", visitor);
        });
    }
}

impl ModelInfo for Medication {
    const TYPE_NAME: &'static str = "Medication";
    const BASE_ELEMENTS: &'static [ElementInfo] = DOMAIN_RESOURCE_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("identifier").repeating().summary(),
        ElementInfo::new("code").summary().binding(MEDICATION_FORMAL_REPRESENTATION),
        ElementInfo::new("status").summary().binding(MEDICATION_STATUS),
        ElementInfo::new("manufacturer").summary().targets(MANUFACTURER_TARGETS),
        ElementInfo::new("form").binding(MEDICATION_FORM),
        ElementInfo::new("amount").summary(),
        ElementInfo::new("ingredient").repeating(),
        ElementInfo::new("batch"),
    ];
}

#[derive(Debug, Clone, Default)]
pub struct MedicationBuilder {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    code: Option<CodeableConcept>,
    status: Option<Coded<MedicationStatus>>,
    manufacturer: Option<Reference>,
    form: Option<CodeableConcept>,
    amount: Option<Ratio>,
    ingredient: Vec<MedicationIngredient>,
    batch: Option<MedicationBatch>,
}

impl MedicationBuilder {
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

    pub fn status(mut self, status: impl Into<Coded<MedicationStatus>>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn manufacturer(mut self, manufacturer: Reference) -> Self {
        self.manufacturer = Some(manufacturer);
        self
    }

    pub fn form(mut self, form: CodeableConcept) -> Self {
        self.form = Some(form);
        self
    }

    pub fn amount(mut self, amount: Ratio) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn ingredient(
        mut self,
        ingredient: impl IntoIterator<Item = MedicationIngredient>,
    ) -> Self {
        self.ingredient.extend(ingredient);
        self
    }

    pub fn set_ingredient(
        mut self,
        ingredient: impl IntoIterator<Item = MedicationIngredient>,
    ) -> Self {
        self.ingredient = ingredient.into_iter().collect();
        self
    }

    pub fn batch(mut self, batch: MedicationBatch) -> Self {
        self.batch = Some(batch);
        self
    }

    pub fn build(self) -> Result<Medication> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Medication> {
        let medication = Medication {
            base: self.base,
            identifier: self.identifier,
            code: self.code,
            status: self.status,
            manufacturer: self.manufacturer,
            form: self.form,
            amount: self.amount,
            ingredient: self.ingredient,
            batch: self.batch,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            medication.validate(ctx).inspect_err(|err| {
                tracing::debug!(resource_type = "Medication", error = %err, "Build rejected");
            })?;
        }
        Ok(medication)
    }
}

impl DomainResourceBuilder for MedicationBuilder {
    fn domain_resource_base_mut(&mut self) -> &mut DomainResourceBase {
        &mut self.base
    }
}

impl From<Medication> for MedicationBuilder {
    fn from(medication: Medication) -> Self {
        Self {
            base: medication.base,
            identifier: medication.identifier,
            code: medication.code,
            status: medication.status,
            manufacturer: medication.manufacturer,
            form: medication.form,
            amount: medication.amount,
            ingredient: medication.ingredient,
            batch: medication.batch,
        }
    }
}

/// An active or inactive ingredient of a medication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationIngredient {
    base: BackboneElementBase,
    item: MedicationIngredientItem,
    is_active: Option<Boolean>,
    strength: Option<Ratio>,
    hash: HashMemo,
}

memoized_hash!(MedicationIngredient { base, item, is_active, strength });

impl MedicationIngredient {
    pub fn builder() -> MedicationIngredientBuilder {
        MedicationIngredientBuilder::default()
    }

    pub fn to_builder(&self) -> MedicationIngredientBuilder {
        MedicationIngredientBuilder::from(self.clone())
    }

    /// The ingredient, as a code or a reference to a `Substance` or `Medication`.
    pub fn item(&self) -> &MedicationIngredientItem {
        &self.item
    }

    pub fn is_active(&self) -> Option<&Boolean> {
        self.is_active.as_ref()
    }

    pub fn strength(&self) -> Option<&Ratio> {
        self.strength.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Medication.ingredient")?;
        let item = &self.item;
        item.validate(ctx, "Medication.ingredient.item")?;
        if let MedicationIngredientItem::Reference(reference) = item {
            validation::check_reference_type(
                ctx,
                Some(reference),
                "Medication.ingredient.item",
                INGREDIENT_ITEM_TARGETS,
            )?;
        }
        validation::check_primitive(
            ctx,
            self.is_active.as_ref(),
            "Medication.ingredient.isActive",
        )?;
        validation::require_value_or_children(self, "Medication.ingredient")
    }
}

impl Element for MedicationIngredient {
    fn element_base(&self) -> &ElementBase {
        &self.base.element
    }

    fn type_name(&self) -> &'static str {
        "Medication.ingredient"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl BackboneElement for MedicationIngredient {
    fn modifier_extension(&self) -> &[Extension] {
        &self.base.modifier_extension
    }
}

impl Visitable for MedicationIngredient {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::MedicationIngredient(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            self.item.accept_choice("item", visitor);
            accept_opt(self.is_active.as_ref(), "isActive", visitor);
            accept_opt(self.strength.as_ref(), "strength", visitor);
        });
    }
}

impl ModelInfo for MedicationIngredient {
    const TYPE_NAME: &'static str = "Medication.ingredient";
    const BASE_ELEMENTS: &'static [ElementInfo] = BACKBONE_ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("item")
            .required()
            .choice(&["CodeableConcept", "Reference"])
            .targets(INGREDIENT_ITEM_TARGETS),
        ElementInfo::new("isActive"),
        ElementInfo::new("strength"),
    ];
}

impl CheckValue for MedicationIngredient {}

#[derive(Debug, Clone, Default)]
pub struct MedicationIngredientBuilder {
    base: BackboneElementBase,
    item: Option<MedicationIngredientItem>,
    is_active: Option<Boolean>,
    strength: Option<Ratio>,
}

impl MedicationIngredientBuilder {
    pub fn item(mut self, item: impl Into<MedicationIngredientItem>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn is_active(mut self, is_active: impl Into<Boolean>) -> Self {
        self.is_active = Some(is_active.into());
        self
    }

    pub fn strength(mut self, strength: Ratio) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn build(self) -> Result<MedicationIngredient> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<MedicationIngredient> {
        let item = validation::require_choice(self.item, "Medication.ingredient.item")?;
        let ingredient = MedicationIngredient {
            base: self.base,
            item,
            is_active: self.is_active,
            strength: self.strength,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            ingredient.validate(ctx)?;
        }
        Ok(ingredient)
    }
}

impl ElementBuilder for MedicationIngredientBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base.element
    }
}

impl BackboneElementBuilder for MedicationIngredientBuilder {
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase {
        &mut self.base
    }
}

impl From<MedicationIngredient> for MedicationIngredientBuilder {
    fn from(ingredient: MedicationIngredient) -> Self {
        Self {
            base: ingredient.base,
            item: Some(ingredient.item),
            is_active: ingredient.is_active,
            strength: ingredient.strength,
        }
    }
}

/// Packaging information for a single batch of the medication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationBatch {
    base: BackboneElementBase,
    lot_number: Option<FhirString>,
    expiration_date: Option<DateTime>,
    hash: HashMemo,
}

memoized_hash!(MedicationBatch { base, lot_number, expiration_date });

impl MedicationBatch {
    pub fn builder() -> MedicationBatchBuilder {
        MedicationBatchBuilder::default()
    }

    pub fn to_builder(&self) -> MedicationBatchBuilder {
        MedicationBatchBuilder::from(self.clone())
    }

    pub fn lot_number(&self) -> Option<&FhirString> {
        self.lot_number.as_ref()
    }

    pub fn expiration_date(&self) -> Option<&DateTime> {
        self.expiration_date.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Medication.batch")?;
        validation::check_primitive(ctx, self.lot_number.as_ref(), "Medication.batch.lotNumber")?;
        validation::check_primitive(
            ctx,
            self.expiration_date.as_ref(),
            "Medication.batch.expirationDate",
        )?;
        validation::require_value_or_children(self, "Medication.batch")
    }
}

impl Element for MedicationBatch {
    fn element_base(&self) -> &ElementBase {
        &self.base.element
    }

    fn type_name(&self) -> &'static str {
        "Medication.batch"
    }

    fn has_children(&self) -> bool {
        self.base.has_children() || self.lot_number.is_some() || self.expiration_date.is_some()
    }
}

impl BackboneElement for MedicationBatch {
    fn modifier_extension(&self) -> &[Extension] {
        &self.base.modifier_extension
    }
}

impl Visitable for MedicationBatch {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::MedicationBatch(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.lot_number.as_ref(), "lotNumber", visitor);
            accept_opt(self.expiration_date.as_ref(), "expirationDate", visitor);
        });
    }
}

impl ModelInfo for MedicationBatch {
    const TYPE_NAME: &'static str = "Medication.batch";
    const BASE_ELEMENTS: &'static [ElementInfo] = BACKBONE_ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("lotNumber"),
        ElementInfo::new("expirationDate"),
    ];
}

impl CheckValue for MedicationBatch {}

#[derive(Debug, Clone, Default)]
pub struct MedicationBatchBuilder {
    base: BackboneElementBase,
    lot_number: Option<FhirString>,
    expiration_date: Option<DateTime>,
}

impl MedicationBatchBuilder {
    pub fn lot_number(mut self, lot_number: impl Into<FhirString>) -> Self {
        self.lot_number = Some(lot_number.into());
        self
    }

    pub fn expiration_date(mut self, expiration_date: impl Into<DateTime>) -> Self {
        self.expiration_date = Some(expiration_date.into());
        self
    }

    pub fn build(self) -> Result<MedicationBatch> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<MedicationBatch> {
        let batch = MedicationBatch {
            base: self.base,
            lot_number: self.lot_number,
            expiration_date: self.expiration_date,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            batch.validate(ctx)?;
        }
        Ok(batch)
    }
}

impl ElementBuilder for MedicationBatchBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base.element
    }
}

impl BackboneElementBuilder for MedicationBatchBuilder {
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase {
        &mut self.base
    }
}

impl From<MedicationBatch> for MedicationBatchBuilder {
    fn from(batch: MedicationBatch) -> Self {
        Self {
            base: batch.base,
            lot_number: batch.lot_number,
            expiration_date: batch.expiration_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{Coding, Quantity};

    fn acetaminophen() -> CodeableConcept {
        CodeableConcept::builder()
            .coding([Coding::builder()
                .system("http://www.nlm.nih.gov/research/umls/rxnorm")
                .code("161")
                .display("Acetaminophen")
                .build()
                .unwrap()])
            .build()
            .unwrap()
    }

    fn milligrams(value: i32) -> Quantity {
        Quantity::builder()
            .value(value)
            .unit("mg")
            .system("http://unitsofmeasure.org")
            .code("mg")
            .build()
            .unwrap()
    }

    #[test]
    fn empty_medication_is_valid() {
        let medication = Medication::builder().build().unwrap();
        assert!(medication.identifier().is_empty());
        assert!(medication.ingredient().is_empty());
        assert!(medication.code().is_none());
    }

    #[test]
    fn ingredient_item_may_be_a_code() {
        let strength = Ratio::builder()
            .numerator(milligrams(500))
            .denominator(Quantity::builder().value(1).unit("tablet").build().unwrap())
            .build()
            .unwrap();
        let ingredient = MedicationIngredient::builder()
            .item(acetaminophen())
            .is_active(true)
            .strength(strength)
            .build()
            .unwrap();
        assert_eq!(ingredient.item().type_suffix(), "CodeableConcept");

        let medication = Medication::builder()
            .status(MedicationStatus::Active)
            .ingredient([ingredient])
            .build()
            .unwrap();
        assert_eq!(medication.ingredient().len(), 1);
    }

    #[test]
    fn ingredient_item_reference_must_be_substance_or_medication() {
        let substance = Reference::builder().reference("Substance/lactose").build().unwrap();
        assert!(MedicationIngredient::builder().item(substance).build().is_ok());

        let patient = Reference::builder().reference("Patient/1").build().unwrap();
        let err = MedicationIngredient::builder().item(patient).build().unwrap_err();
        assert!(matches!(
            err,
            Error::ReferenceTypeNotAllowed { ref element, ref resource_type, .. }
                if element == "Medication.ingredient.item" && resource_type == "Patient"
        ));
    }

    #[test]
    fn ingredient_item_is_required() {
        let err = MedicationIngredient::builder().is_active(false).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "Medication.ingredient.item"));
    }

    #[test]
    fn equal_builders_build_equal_values() {
        let build = || {
            Medication::builder()
                .code(acetaminophen())
                .batch(MedicationBatch::builder().lot_number("9494788").build().unwrap())
                .build()
                .unwrap()
        };
        let (a, b) = (build(), build());
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());
        assert_eq!(a.to_builder().build().unwrap(), a);
    }
}
