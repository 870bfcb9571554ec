use super::{DomainResource, DomainResourceBase, DomainResourceBuilder};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, BACKBONE_ELEMENT_BASE, DOMAIN_RESOURCE_BASE};
use crate::types::{
    BackboneElement, BackboneElementBase, BackboneElementBuilder, CodeValue, CodeableConcept,
    Coded, DateTime, Element, ElementBase, ElementBuilder, Extension, FhirString, HashMemo,
    Identifier, Quantity, Ratio, Reference, SubstanceStatus,
};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

const FHIR_SUBSTANCE_STATUS: Binding = Binding::new(
    "FHIRSubstanceStatus",
    BindingStrength::Required,
    <SubstanceStatus as CodeValue>::VALUE_SET,
)
.description("A code to indicate if the substance is actively used.");

const SUBSTANCE_CATEGORY: Binding = Binding::new(
    "SubstanceCategory",
    BindingStrength::Extensible,
    "http://hl7.org/fhir/ValueSet/substance-category",
)
.description("Category or classification of substance.");

const SUBSTANCE_CODE: Binding = Binding::new(
    "SubstanceCode",
    BindingStrength::Example,
    "http://hl7.org/fhir/ValueSet/substance-code",
)
.description("Substance codes.");

const SUBSTANCE_INGREDIENT: Binding = Binding::new(
    "SubstanceIngredient",
    BindingStrength::Example,
    "http://hl7.org/fhir/ValueSet/substance-code",
)
.description("Substance Ingredient codes.");

choice!(
    /// `Substance.ingredient.substance[x]`.
    SubstanceIngredientSubstance {
        CodeableConcept(CodeableConcept),
        Reference(Reference),
    }
);

const INGREDIENT_SUBSTANCE_TARGETS: &[&str] = &["Substance"];

/// A homogeneous material with a definite composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substance {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    status: Option<Coded<SubstanceStatus>>,
    category: Vec<CodeableConcept>,
    code: CodeableConcept,
    description: Option<FhirString>,
    instance: Vec<SubstanceInstance>,
    ingredient: Vec<SubstanceIngredient>,
    hash: HashMemo,
}

memoized_hash!(Substance {
    base,
    identifier,
    status,
    category,
    code,
    description,
    instance,
    ingredient,
});

impl Substance {
    pub fn builder() -> SubstanceBuilder {
        SubstanceBuilder::default()
    }

    pub fn to_builder(&self) -> SubstanceBuilder {
        SubstanceBuilder::from(self.clone())
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    pub fn status(&self) -> Option<&Coded<SubstanceStatus>> {
        self.status.as_ref()
    }

    pub fn category(&self) -> &[CodeableConcept] {
        &self.category
    }

    pub fn code(&self) -> &CodeableConcept {
        &self.code
    }

    pub fn description(&self) -> Option<&FhirString> {
        self.description.as_ref()
    }

    pub fn instance(&self) -> &[SubstanceInstance] {
        &self.instance
    }

    pub fn ingredient(&self) -> &[SubstanceIngredient] {
        &self.ingredient
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Substance")?;
        validation::check_concept_bindings(
            ctx,
            &self.category,
            "Substance.category",
            &SUBSTANCE_CATEGORY,
        )?;
        validation::check_concept_binding(
            ctx,
            Some(&self.code),
            "Substance.code",
            &SUBSTANCE_CODE,
        )?;
        validation::check_primitive(ctx, self.description.as_ref(), "Substance.description")?;
        Ok(())
    }
}

impl DomainResource for Substance {
    fn domain_resource_base(&self) -> &DomainResourceBase {
        &self.base
    }

    fn resource_type(&self) -> &'static str {
        "Substance"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl Visitable for Substance {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Substance(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_list(&self.identifier, "identifier", visitor);
            accept_opt(self.status.as_ref(), "status", visitor);
            accept_list(&self.category, "category", visitor);
            self.code.accept("code", None, visitor);
            accept_opt(self.description.as_ref(), "description", visitor);
            accept_list(&self.instance, "instance", visitor);
            accept_list(&self.ingredient, "ingredient", visitor);
        });
    }
}

impl ModelInfo for Substance {
    const TYPE_NAME: &'static str = "Substance";
    const BASE_ELEMENTS: &'static [ElementInfo] = DOMAIN_RESOURCE_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("identifier").repeating().summary(),
        ElementInfo::new("status").summary().binding(FHIR_SUBSTANCE_STATUS),
        ElementInfo::new("category").repeating().summary().binding(SUBSTANCE_CATEGORY),
        ElementInfo::new("code").required().summary().binding(SUBSTANCE_CODE),
        ElementInfo::new("description").summary(),
        ElementInfo::new("instance").repeating().summary(),
        ElementInfo::new("ingredient").repeating().summary(),
    ];
}

#[derive(Debug, Clone, Default)]
pub struct SubstanceBuilder {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    status: Option<Coded<SubstanceStatus>>,
    category: Vec<CodeableConcept>,
    code: Option<CodeableConcept>,
    description: Option<FhirString>,
    instance: Vec<SubstanceInstance>,
    ingredient: Vec<SubstanceIngredient>,
}

impl SubstanceBuilder {
    pub fn identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier.extend(identifier);
        self
    }

    pub fn set_identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier = identifier.into_iter().collect();
        self
    }

    pub fn status(mut self, status: impl Into<Coded<SubstanceStatus>>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn category(mut self, category: impl IntoIterator<Item = CodeableConcept>) -> Self {
        self.category.extend(category);
        self
    }

    pub fn set_category(mut self, category: impl IntoIterator<Item = CodeableConcept>) -> Self {
        self.category = category.into_iter().collect();
        self
    }

    pub fn code(mut self, code: CodeableConcept) -> Self {
        self.code = Some(code);
        self
    }

    pub fn description(mut self, description: impl Into<FhirString>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn instance(mut self, instance: impl IntoIterator<Item = SubstanceInstance>) -> Self {
        self.instance.extend(instance);
        self
    }

    pub fn set_instance(mut self, instance: impl IntoIterator<Item = SubstanceInstance>) -> Self {
        self.instance = instance.into_iter().collect();
        self
    }

    pub fn ingredient(mut self, ingredient: impl IntoIterator<Item = SubstanceIngredient>) -> Self {
        self.ingredient.extend(ingredient);
        self
    }

    pub fn set_ingredient(
        mut self,
        ingredient: impl IntoIterator<Item = SubstanceIngredient>,
    ) -> Self {
        self.ingredient = ingredient.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<Substance> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Substance> {
        let code = validation::require_non_null(self.code, "Substance.code")?;
        let substance = Substance {
            base: self.base,
            identifier: self.identifier,
            status: self.status,
            category: self.category,
            code,
            description: self.description,
            instance: self.instance,
            ingredient: self.ingredient,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            substance.validate(ctx).inspect_err(|err| {
                tracing::debug!(resource_type = "Substance", error = %err, "Build rejected");
            })?;
        }
        Ok(substance)
    }
}

impl DomainResourceBuilder for SubstanceBuilder {
    fn domain_resource_base_mut(&mut self) -> &mut DomainResourceBase {
        &mut self.base
    }
}

impl From<Substance> for SubstanceBuilder {
    fn from(substance: Substance) -> Self {
        Self {
            base: substance.base,
            identifier: substance.identifier,
            status: substance.status,
            category: substance.category,
            code: Some(substance.code),
            description: substance.description,
            instance: substance.instance,
            ingredient: substance.ingredient,
        }
    }
}

/// A specific package or container of the substance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstanceInstance {
    base: BackboneElementBase,
    identifier: Option<Identifier>,
    expiry: Option<DateTime>,
    quantity: Option<Quantity>,
    hash: HashMemo,
}

memoized_hash!(SubstanceInstance { base, identifier, expiry, quantity });

impl SubstanceInstance {
    pub fn builder() -> SubstanceInstanceBuilder {
        SubstanceInstanceBuilder::default()
    }

    pub fn to_builder(&self) -> SubstanceInstanceBuilder {
        SubstanceInstanceBuilder::from(self.clone())
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    pub fn expiry(&self) -> Option<&DateTime> {
        self.expiry.as_ref()
    }

    /// Amount of the substance in the package, as a `SimpleQuantity`.
    pub fn quantity(&self) -> Option<&Quantity> {
        self.quantity.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Substance.instance")?;
        validation::check_primitive(ctx, self.expiry.as_ref(), "Substance.instance.expiry")?;
        validation::prohibited(
            self.quantity.as_ref().and_then(|quantity| quantity.comparator()),
            "Substance.instance.quantity.comparator",
        )?;
        validation::require_value_or_children(self, "Substance.instance")
    }
}

impl Element for SubstanceInstance {
    fn element_base(&self) -> &ElementBase {
        &self.base.element
    }

    fn type_name(&self) -> &'static str {
        "Substance.instance"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || self.identifier.is_some()
            || self.expiry.is_some()
            || self.quantity.is_some()
    }
}

impl BackboneElement for SubstanceInstance {
    fn modifier_extension(&self) -> &[Extension] {
        &self.base.modifier_extension
    }
}

impl Visitable for SubstanceInstance {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::SubstanceInstance(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.identifier.as_ref(), "identifier", visitor);
            accept_opt(self.expiry.as_ref(), "expiry", visitor);
            accept_opt(self.quantity.as_ref(), "quantity", visitor);
        });
    }
}

impl ModelInfo for SubstanceInstance {
    const TYPE_NAME: &'static str = "Substance.instance";
    const BASE_ELEMENTS: &'static [ElementInfo] = BACKBONE_ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("identifier").summary(),
        ElementInfo::new("expiry").summary(),
        ElementInfo::new("quantity").summary(),
    ];
}

impl CheckValue for SubstanceInstance {}

#[derive(Debug, Clone, Default)]
pub struct SubstanceInstanceBuilder {
    base: BackboneElementBase,
    identifier: Option<Identifier>,
    expiry: Option<DateTime>,
    quantity: Option<Quantity>,
}

impl SubstanceInstanceBuilder {
    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn expiry(mut self, expiry: impl Into<DateTime>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }

    pub fn quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn build(self) -> Result<SubstanceInstance> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<SubstanceInstance> {
        let instance = SubstanceInstance {
            base: self.base,
            identifier: self.identifier,
            expiry: self.expiry,
            quantity: self.quantity,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            instance.validate(ctx)?;
        }
        Ok(instance)
    }
}

impl ElementBuilder for SubstanceInstanceBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base.element
    }
}

impl BackboneElementBuilder for SubstanceInstanceBuilder {
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase {
        &mut self.base
    }
}

impl From<SubstanceInstance> for SubstanceInstanceBuilder {
    fn from(instance: SubstanceInstance) -> Self {
        Self {
            base: instance.base,
            identifier: instance.identifier,
            expiry: instance.expiry,
            quantity: instance.quantity,
        }
    }
}

/// A substance that is part of this substance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstanceIngredient {
    base: BackboneElementBase,
    quantity: Option<Ratio>,
    substance: SubstanceIngredientSubstance,
    hash: HashMemo,
}

memoized_hash!(SubstanceIngredient { base, quantity, substance });

impl SubstanceIngredient {
    pub fn builder() -> SubstanceIngredientBuilder {
        SubstanceIngredientBuilder::default()
    }

    pub fn to_builder(&self) -> SubstanceIngredientBuilder {
        SubstanceIngredientBuilder::from(self.clone())
    }

    pub fn quantity(&self) -> Option<&Ratio> {
        self.quantity.as_ref()
    }

    pub fn substance(&self) -> &SubstanceIngredientSubstance {
        &self.substance
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Substance.ingredient")?;
        let substance = &self.substance;
        substance.validate(ctx, "Substance.ingredient.substance")?;
        if let SubstanceIngredientSubstance::Reference(reference) = substance {
            validation::check_reference_type(
                ctx,
                Some(reference),
                "Substance.ingredient.substance",
                INGREDIENT_SUBSTANCE_TARGETS,
            )?;
        }
        if let SubstanceIngredientSubstance::CodeableConcept(concept) = substance {
            validation::check_concept_binding(
                ctx,
                Some(concept),
                "Substance.ingredient.substance",
                &SUBSTANCE_INGREDIENT,
            )?;
        }
        validation::require_value_or_children(self, "Substance.ingredient")
    }
}

impl Element for SubstanceIngredient {
    fn element_base(&self) -> &ElementBase {
        &self.base.element
    }

    fn type_name(&self) -> &'static str {
        "Substance.ingredient"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl BackboneElement for SubstanceIngredient {
    fn modifier_extension(&self) -> &[Extension] {
        &self.base.modifier_extension
    }
}

impl Visitable for SubstanceIngredient {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::SubstanceIngredient(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.quantity.as_ref(), "quantity", visitor);
            self.substance.accept_choice("substance", visitor);
        });
    }
}

impl ModelInfo for SubstanceIngredient {
    const TYPE_NAME: &'static str = "Substance.ingredient";
    const BASE_ELEMENTS: &'static [ElementInfo] = BACKBONE_ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("quantity").summary(),
        ElementInfo::new("substance")
            .required()
            .summary()
            .choice(&["CodeableConcept", "Reference"])
            .targets(INGREDIENT_SUBSTANCE_TARGETS)
            .binding(SUBSTANCE_INGREDIENT),
    ];
}

impl CheckValue for SubstanceIngredient {}

#[derive(Debug, Clone, Default)]
pub struct SubstanceIngredientBuilder {
    base: BackboneElementBase,
    quantity: Option<Ratio>,
    substance: Option<SubstanceIngredientSubstance>,
}

impl SubstanceIngredientBuilder {
    pub fn quantity(mut self, quantity: Ratio) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn substance(mut self, substance: impl Into<SubstanceIngredientSubstance>) -> Self {
        self.substance = Some(substance.into());
        self
    }

    pub fn build(self) -> Result<SubstanceIngredient> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<SubstanceIngredient> {
        let substance =
            validation::require_choice(self.substance, "Substance.ingredient.substance")?;
        let ingredient = SubstanceIngredient {
            base: self.base,
            quantity: self.quantity,
            substance,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            ingredient.validate(ctx)?;
        }
        Ok(ingredient)
    }
}

impl ElementBuilder for SubstanceIngredientBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base.element
    }
}

impl BackboneElementBuilder for SubstanceIngredientBuilder {
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase {
        &mut self.base
    }
}

impl From<SubstanceIngredient> for SubstanceIngredientBuilder {
    fn from(ingredient: SubstanceIngredient) -> Self {
        Self {
            base: ingredient.base,
            quantity: ingredient.quantity,
            substance: Some(ingredient.substance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::QuantityComparator;

    fn code(text: &str) -> CodeableConcept {
        CodeableConcept::builder().text(text).build().unwrap()
    }

    #[test]
    fn code_is_required() {
        let err = Substance::builder()
            .status(SubstanceStatus::Active)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "Substance.code"));
    }

    #[test]
    fn instance_quantity_is_a_simple_quantity() {
        let bounded = Quantity::builder()
            .value(100)
            .unit("mL")
            .comparator(QuantityComparator::LessThan)
            .build()
            .unwrap();
        let err = SubstanceInstance::builder().quantity(bounded).build().unwrap_err();
        assert!(matches!(err, Error::ProhibitedElement(ref p) if p == "Substance.instance.quantity.comparator"));

        let exact = Quantity::builder().value(100).unit("mL").build().unwrap();
        assert!(SubstanceInstance::builder().quantity(exact).build().is_ok());
    }

    #[test]
    fn ingredient_substance_choice() {
        let by_code = SubstanceIngredient::builder()
            .substance(code("Sodium chloride"))
            .build()
            .unwrap();
        let by_reference = SubstanceIngredient::builder()
            .substance(Reference::builder().reference("Substance/f201").build().unwrap())
            .build()
            .unwrap();
        assert_eq!(by_code.substance().type_suffix(), "CodeableConcept");
        assert_eq!(by_reference.substance().element_name("substance"), "substanceReference");

        let substance = Substance::builder()
            .code(code("Saline"))
            .ingredient([by_code, by_reference])
            .build()
            .unwrap();
        assert_eq!(substance.ingredient().len(), 2);
    }

    #[test]
    fn ingredient_reference_must_be_a_substance() {
        let err = SubstanceIngredient::builder()
            .substance(Reference::builder().reference("Medication/1").build().unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err.element(), Some("Substance.ingredient.substance"));
    }
}
