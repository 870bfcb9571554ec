//! FHIR resources.
//!
//! Each resource lives in its own module together with its backbone
//! elements, whose names are flattened (`Medication.ingredient` is
//! [`MedicationIngredient`]).

mod device_metric;
mod document_manifest;
mod list;
mod media;
mod medication;
mod practitioner;
mod related_person;
mod subscription_status;
mod substance;

pub use device_metric::{
    DeviceMetric, DeviceMetricBuilder, DeviceMetricCalibration, DeviceMetricCalibrationBuilder,
};
pub use document_manifest::{
    DocumentManifest, DocumentManifestBuilder, DocumentManifestRelated,
    DocumentManifestRelatedBuilder,
};
pub use list::{List, ListBuilder, ListEntry, ListEntryBuilder};
pub use media::{Media, MediaBuilder, MediaCreated};
pub use medication::{
    Medication, MedicationBatch, MedicationBatchBuilder, MedicationBuilder, MedicationIngredient,
    MedicationIngredientBuilder, MedicationIngredientItem,
};
pub use practitioner::{
    Practitioner, PractitionerBuilder, PractitionerQualification, PractitionerQualificationBuilder,
};
pub use related_person::{
    RelatedPerson, RelatedPersonBuilder, RelatedPersonCommunication,
    RelatedPersonCommunicationBuilder,
};
pub use subscription_status::{
    SubscriptionStatus, SubscriptionStatusBuilder, SubscriptionStatusNotificationEvent,
    SubscriptionStatusNotificationEventBuilder,
};
pub use substance::{
    Substance, SubstanceBuilder, SubstanceIngredient, SubstanceIngredientBuilder,
    SubstanceIngredientSubstance, SubstanceInstance, SubstanceInstanceBuilder,
};

use crate::binding::common;
use crate::error::{Error, Result};
use crate::types::{Code, Extension, Meta, Narrative, Uri};
use crate::validation::{self, ValidationContext};
use crate::visitor::{accept_list, accept_opt, accept_str, Visitable, Visitor};
use std::fmt;

/// Accessors shared by every resource.
pub trait DomainResource: Visitable + fmt::Debug + Send + Sync {
    fn domain_resource_base(&self) -> &DomainResourceBase;

    /// Resource type name (`Medication`, `List`, ...).
    fn resource_type(&self) -> &'static str;

    /// Whether any own or inherited field is populated.
    fn has_children(&self) -> bool;

    /// Logical id of the resource.
    fn id(&self) -> Option<&str> {
        self.domain_resource_base().id.as_deref()
    }

    fn meta(&self) -> Option<&Meta> {
        self.domain_resource_base().meta.as_ref()
    }

    fn implicit_rules(&self) -> Option<&Uri> {
        self.domain_resource_base().implicit_rules.as_ref()
    }

    fn language(&self) -> Option<&Code> {
        self.domain_resource_base().language.as_ref()
    }

    fn text(&self) -> Option<&Narrative> {
        self.domain_resource_base().text.as_ref()
    }

    /// Inline resources with no independent existence.
    fn contained(&self) -> &[Resource] {
        &self.domain_resource_base().contained
    }

    fn extension(&self) -> &[Extension] {
        &self.domain_resource_base().extension
    }

    fn modifier_extension(&self) -> &[Extension] {
        &self.domain_resource_base().modifier_extension
    }

    /// Walk the whole resource, naming the root after its resource type.
    fn accept_visitor(&self, visitor: &mut dyn Visitor) {
        self.accept(self.resource_type(), None, visitor);
    }
}

/// Fields inherited from `Resource` and `DomainResource`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DomainResourceBase {
    pub(crate) id: Option<String>,
    pub(crate) meta: Option<Meta>,
    pub(crate) implicit_rules: Option<Uri>,
    pub(crate) language: Option<Code>,
    pub(crate) text: Option<Narrative>,
    pub(crate) contained: Vec<Resource>,
    pub(crate) extension: Vec<Extension>,
    pub(crate) modifier_extension: Vec<Extension>,
}

impl DomainResourceBase {
    pub fn has_children(&self) -> bool {
        self.id.is_some()
            || self.meta.is_some()
            || self.implicit_rules.is_some()
            || self.language.is_some()
            || self.text.is_some()
            || !self.contained.is_empty()
            || !self.extension.is_empty()
            || !self.modifier_extension.is_empty()
    }

    pub(crate) fn accept_children(&self, visitor: &mut dyn Visitor) {
        accept_str(self.id.as_deref(), "id", visitor);
        accept_opt(self.meta.as_ref(), "meta", visitor);
        accept_opt(self.implicit_rules.as_ref(), "implicitRules", visitor);
        accept_opt(self.language.as_ref(), "language", visitor);
        accept_opt(self.text.as_ref(), "text", visitor);
        accept_list(&self.contained, "contained", visitor);
        accept_list(&self.extension, "extension", visitor);
        accept_list(&self.modifier_extension, "modifierExtension", visitor);
    }

    pub(crate) fn validate(&self, ctx: &mut ValidationContext, resource_type: &str) -> Result<()> {
        if let Some(id) = self.id.as_deref() {
            validation::check_id(id).map_err(|reason| Error::InvalidPrimitive {
                element: format!("{}.id", resource_type),
                type_name: "id",
                reason,
            })?;
        }
        let implicit_rules = format!("{}.implicitRules", resource_type);
        validation::check_primitive(ctx, self.implicit_rules.as_ref(), &implicit_rules)?;
        let language = format!("{}.language", resource_type);
        validation::check_primitive(ctx, self.language.as_ref(), &language)?;
        validation::check_code_binding(ctx, self.language.as_ref(), &language, &common::LANGUAGE)?;
        Ok(())
    }
}

/// Setters shared by all resource builders.
pub trait DomainResourceBuilder: Sized {
    #[doc(hidden)]
    fn domain_resource_base_mut(&mut self) -> &mut DomainResourceBase;

    fn id(mut self, id: impl Into<String>) -> Self {
        self.domain_resource_base_mut().id = Some(id.into());
        self
    }

    fn meta(mut self, meta: Meta) -> Self {
        self.domain_resource_base_mut().meta = Some(meta);
        self
    }

    fn implicit_rules(mut self, implicit_rules: impl Into<Uri>) -> Self {
        self.domain_resource_base_mut().implicit_rules = Some(implicit_rules.into());
        self
    }

    fn language(mut self, language: impl Into<Code>) -> Self {
        self.domain_resource_base_mut().language = Some(language.into());
        self
    }

    fn text(mut self, text: Narrative) -> Self {
        self.domain_resource_base_mut().text = Some(text);
        self
    }

    /// Append contained resources.
    fn contained<R: Into<Resource>>(mut self, contained: impl IntoIterator<Item = R>) -> Self {
        self.domain_resource_base_mut()
            .contained
            .extend(contained.into_iter().map(Into::into));
        self
    }

    /// Replace all contained resources.
    fn set_contained<R: Into<Resource>>(mut self, contained: impl IntoIterator<Item = R>) -> Self {
        self.domain_resource_base_mut().contained = contained.into_iter().map(Into::into).collect();
        self
    }

    fn extension(mut self, extension: impl IntoIterator<Item = Extension>) -> Self {
        self.domain_resource_base_mut().extension.extend(extension);
        self
    }

    fn set_extension(mut self, extension: impl IntoIterator<Item = Extension>) -> Self {
        self.domain_resource_base_mut().extension = extension.into_iter().collect();
        self
    }

    fn modifier_extension(mut self, extension: impl IntoIterator<Item = Extension>) -> Self {
        self.domain_resource_base_mut()
            .modifier_extension
            .extend(extension);
        self
    }

    fn set_modifier_extension(mut self, extension: impl IntoIterator<Item = Extension>) -> Self {
        self.domain_resource_base_mut().modifier_extension = extension.into_iter().collect();
        self
    }
}

macro_rules! resources {
    ($($name:ident),+ $(,)?) => {
        /// Any resource of the model, as held by `contained`.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum Resource {
            $( $name(Box<$name>), )+
        }

        impl Resource {
            pub fn as_domain_resource(&self) -> &dyn DomainResource {
                match self {
                    $( Resource::$name(resource) => resource.as_ref(), )+
                }
            }

            pub fn resource_type(&self) -> &'static str {
                self.as_domain_resource().resource_type()
            }
        }

        impl Visitable for Resource {
            fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
                match self {
                    $( Resource::$name(resource) => resource.accept(name, index, visitor), )+
                }
            }
        }

        $(
            impl From<$name> for Resource {
                fn from(resource: $name) -> Self {
                    Resource::$name(Box::new(resource))
                }
            }
        )+
    };
}

resources!(
    DeviceMetric,
    DocumentManifest,
    List,
    Media,
    Medication,
    Practitioner,
    RelatedPerson,
    SubscriptionStatus,
    Substance,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    fn substance(id: Option<&str>) -> Substance {
        let code = CodeableConcept::builder().text("Lactose").build().unwrap();
        let builder = Substance::builder().code(code);
        match id {
            Some(id) => builder.id(id).build().unwrap(),
            None => builder.build().unwrap(),
        }
    }

    #[test]
    fn contained_resources_are_visited_under_contained() {
        let medication = Medication::builder()
            .contained([substance(Some("lactose"))])
            .build()
            .unwrap();
        assert_eq!(medication.contained()[0].resource_type(), "Substance");

        let mut names = CollectingVisitor::new(|node: Node<'_>| {
            node.as_resource().map(|r| r.resource_type().to_string())
        });
        medication.accept_visitor(&mut names);
        assert_eq!(names.results(), ["Medication", "Substance"]);
    }

    #[test]
    fn resource_ids_follow_id_rules() {
        assert!(Medication::builder().id("med-1").build().is_ok());
        let err = Medication::builder().id("med_1").build().unwrap_err();
        assert_eq!(err.element(), Some("Medication.id"));
    }

    #[test]
    fn language_must_be_a_language_tag() {
        assert!(Medication::builder().language("de-CH").build().is_ok());
        let err = Medication::builder().language("123456789").build().unwrap_err();
        assert!(matches!(err, Error::ValueSetBinding { ref element, .. } if element == "Medication.language"));
    }

    #[test]
    fn resource_enum_is_comparable() {
        let a: Resource = substance(Some("a")).into();
        let b: Resource = substance(Some("a")).into();
        assert_eq!(a, b);
        assert_ne!(a, Resource::from(substance(Some("b"))));
    }
}
