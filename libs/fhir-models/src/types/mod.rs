//! FHIR datatypes and the framework base element types.
//!
//! # Module Organization
//!
//! - `primitives`: `string`, `boolean`, `dateTime`, ... as elements carrying a value
//! - `temporal`: partial-precision date and dateTime values
//! - `codes`: enums for codes bound to required value sets, wrapped in [`Coded`]
//! - one module per complex datatype (`Coding`, `Reference`, `Timing`, ...)

mod address;
mod annotation;
mod attachment;
mod codeable_concept;
mod codes;
mod contact_point;
mod extension;
mod human_name;
mod identifier;
mod meta;
mod narrative;
mod period;
mod primitives;
mod quantity;
mod reference;
pub mod temporal;
mod timing;

pub use address::{Address, AddressBuilder};
pub use annotation::{Annotation, AnnotationAuthor, AnnotationBuilder};
pub use attachment::{Attachment, AttachmentBuilder};
pub use codeable_concept::{CodeableConcept, CodeableConceptBuilder, Coding, CodingBuilder};
pub use codes::*;
pub use contact_point::{ContactPoint, ContactPointBuilder};
pub use extension::{Extension, ExtensionBuilder, ExtensionValue};
pub use human_name::{HumanName, HumanNameBuilder};
pub use identifier::{Identifier, IdentifierBuilder};
pub use meta::{Meta, MetaBuilder};
pub use narrative::{Narrative, NarrativeBuilder};
pub use period::{Period, PeriodBuilder};
pub use primitives::*;
pub use quantity::{Quantity, QuantityBuilder, Range, RangeBuilder, Ratio, RatioBuilder};
pub use reference::{Reference, ReferenceBuilder};
pub use timing::{Timing, TimingBuilder, TimingRepeat, TimingRepeatBounds, TimingRepeatBuilder};

use crate::config::ModelConfig;
use crate::error::Result;
use crate::validation::{self, ValidationContext};
use crate::visitor::{accept_list, accept_str, PrimitiveValue, Visitable, Visitor};
use std::fmt;
use std::sync::OnceLock;

/// Common accessors of every element (datatypes, backbone elements and
/// primitives).
pub trait Element: Visitable + fmt::Debug + Send + Sync {
    fn element_base(&self) -> &ElementBase;

    /// FHIR type name (`string`, `Coding`, `Medication.ingredient`, ...).
    fn type_name(&self) -> &'static str;

    fn id(&self) -> Option<&str> {
        self.element_base().id.as_deref()
    }

    fn extension(&self) -> &[Extension] {
        &self.element_base().extension
    }

    /// Whether the element carries a primitive value.
    fn has_value(&self) -> bool {
        false
    }

    /// Whether any own or inherited child element is populated.
    fn has_children(&self) -> bool;
}

/// Elements that may carry modifier extensions.
pub trait BackboneElement: Element {
    fn modifier_extension(&self) -> &[Extension];
}

/// Primitive value rendering and value rules.
pub trait PrimitiveType: Element {
    fn primitive_value(&self) -> Option<PrimitiveValue<'_>>;

    /// Check the value against the type's lexical rules. Returns the reason
    /// on failure.
    fn check_value(&self, _config: &ModelConfig) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// `id` and `extension`, shared by every element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ElementBase {
    pub(crate) id: Option<String>,
    pub(crate) extension: Vec<Extension>,
}

impl ElementBase {
    /// Children for ele-1 purposes; the id is an attribute, not a child.
    pub fn has_children(&self) -> bool {
        !self.extension.is_empty()
    }

    pub(crate) fn accept_children(&self, visitor: &mut dyn Visitor) {
        accept_str(self.id.as_deref(), "id", visitor);
        accept_list(&self.extension, "extension", visitor);
    }

    pub(crate) fn validate(&self, ctx: &mut ValidationContext, path: &str) -> Result<()> {
        if let Some(id) = self.id.as_deref() {
            validation::check_string(id, ctx.config().check_control_chars).map_err(|reason| {
                crate::error::Error::InvalidPrimitive {
                    element: format!("{}.id", path),
                    type_name: "string",
                    reason,
                }
            })?;
        }
        Ok(())
    }
}

/// Element base plus `modifierExtension`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BackboneElementBase {
    pub(crate) element: ElementBase,
    pub(crate) modifier_extension: Vec<Extension>,
}

impl BackboneElementBase {
    pub fn has_children(&self) -> bool {
        self.element.has_children() || !self.modifier_extension.is_empty()
    }

    pub(crate) fn accept_children(&self, visitor: &mut dyn Visitor) {
        self.element.accept_children(visitor);
        accept_list(&self.modifier_extension, "modifierExtension", visitor);
    }

    pub(crate) fn validate(&self, ctx: &mut ValidationContext, path: &str) -> Result<()> {
        self.element.validate(ctx, path)
    }
}

/// Setters shared by all element builders.
pub trait ElementBuilder: Sized {
    #[doc(hidden)]
    fn element_base_mut(&mut self) -> &mut ElementBase;

    fn id(mut self, id: impl Into<String>) -> Self {
        self.element_base_mut().id = Some(id.into());
        self
    }

    /// Append extensions.
    fn extension(mut self, extension: impl IntoIterator<Item = Extension>) -> Self {
        self.element_base_mut().extension.extend(extension);
        self
    }

    /// Replace all extensions.
    fn set_extension(mut self, extension: impl IntoIterator<Item = Extension>) -> Self {
        self.element_base_mut().extension = extension.into_iter().collect();
        self
    }
}

/// Setters shared by backbone element builders.
pub trait BackboneElementBuilder: ElementBuilder {
    #[doc(hidden)]
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase;

    /// Append modifier extensions.
    fn modifier_extension(mut self, extension: impl IntoIterator<Item = Extension>) -> Self {
        self.backbone_base_mut().modifier_extension.extend(extension);
        self
    }

    /// Replace all modifier extensions.
    fn set_modifier_extension(mut self, extension: impl IntoIterator<Item = Extension>) -> Self {
        self.backbone_base_mut().modifier_extension = extension.into_iter().collect();
        self
    }
}

/// Lazily computed structural hash. Always compares equal so it never
/// affects derived equality.
#[derive(Clone, Default)]
pub(crate) struct HashMemo(OnceLock<u64>);

impl HashMemo {
    pub(crate) fn get_or_init(&self, compute: impl FnOnce() -> u64) -> u64 {
        *self.0.get_or_init(compute)
    }
}

impl PartialEq for HashMemo {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for HashMemo {}

impl fmt::Debug for HashMemo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashMemo")
    }
}
