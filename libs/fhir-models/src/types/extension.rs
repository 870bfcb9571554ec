use super::{
    Address, Annotation, Attachment, Base64Binary, Boolean, Canonical, Code, CodeableConcept,
    Coding, ContactPoint, Date, DateTime, Decimal, Element, ElementBase, ElementBuilder,
    FhirString, HashMemo, HumanName, Id, Identifier, Instant, Integer, Markdown, Meta, Period,
    PositiveInt, Quantity, Range, Ratio, Reference, Time, Timing, UnsignedInt, Uri, Url,
};
use crate::error::{Error, Result};
use crate::model_info::{ElementInfo, ModelInfo};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{walk, Node, PrimitiveValue, Visitable, Visitor};

choice!(
    /// `Extension.value[x]`. `Duration` and `SimpleQuantity` values use the
    /// `Quantity` alternative.
    ExtensionValue {
        Base64Binary(Base64Binary),
        Boolean(Boolean),
        Canonical(Canonical),
        Code(Code),
        Date(Date),
        DateTime(DateTime),
        Decimal(Decimal),
        Id(Id),
        Instant(Instant),
        Integer(Integer),
        Markdown(Markdown),
        PositiveInt(PositiveInt),
        String(FhirString),
        Time(Time),
        UnsignedInt(UnsignedInt),
        Uri(Uri),
        Url(Url),
        Address(Address),
        Annotation(Annotation),
        Attachment(Attachment),
        CodeableConcept(CodeableConcept),
        Coding(Coding),
        ContactPoint(ContactPoint),
        HumanName(HumanName),
        Identifier(Identifier),
        Meta(Meta),
        Period(Period),
        Quantity(Quantity),
        Range(Range),
        Ratio(Ratio),
        Reference(Reference),
        Timing(Timing),
    }
);

const VALUE_TYPES: &[&str] = &[
    "Base64Binary",
    "Boolean",
    "Canonical",
    "Code",
    "Date",
    "DateTime",
    "Decimal",
    "Id",
    "Instant",
    "Integer",
    "Markdown",
    "PositiveInt",
    "String",
    "Time",
    "UnsignedInt",
    "Uri",
    "Url",
    "Address",
    "Annotation",
    "Attachment",
    "CodeableConcept",
    "Coding",
    "ContactPoint",
    "HumanName",
    "Identifier",
    "Meta",
    "Period",
    "Quantity",
    "Range",
    "Ratio",
    "Reference",
    "Timing",
];

/// Optional extension element. `url` identifies the meaning of the extension
/// and is carried as an attribute rather than a child element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    base: ElementBase,
    url: String,
    value: Option<ExtensionValue>,
    hash: HashMemo,
}

memoized_hash!(Extension { base, url, value });

impl Extension {
    pub fn builder() -> ExtensionBuilder {
        ExtensionBuilder::default()
    }

    pub fn to_builder(&self) -> ExtensionBuilder {
        ExtensionBuilder::from(self.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn value(&self) -> Option<&ExtensionValue> {
        self.value.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Extension")?;
        validation::check_uri(&self.url).map_err(|reason| Error::InvalidPrimitive {
            element: "Extension.url".to_string(),
            type_name: "uri",
            reason,
        })?;
        if let Some(value) = &self.value {
            value.validate(ctx, "Extension.value")?;
        }
        validation::require_value_or_children(self, "Extension")
    }
}

impl Element for Extension {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Extension"
    }

    fn has_children(&self) -> bool {
        self.base.has_children() || self.value.is_some()
    }
}

impl Visitable for Extension {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Extension(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            visitor.visit_value("url", PrimitiveValue::String(&self.url));
            if let Some(value) = &self.value {
                value.accept_choice("value", visitor);
            }
        });
    }
}

impl ModelInfo for Extension {
    const TYPE_NAME: &'static str = "Extension";
    const BASE_ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("id"),
        ElementInfo::new("extension").repeating(),
        ElementInfo::new("url").required(),
    ];
    const ELEMENTS: &'static [ElementInfo] = &[ElementInfo::new("value").choice(VALUE_TYPES)];
}

impl CheckValue for Extension {}

#[derive(Debug, Clone, Default)]
pub struct ExtensionBuilder {
    base: ElementBase,
    url: Option<String>,
    value: Option<ExtensionValue>,
}

impl ExtensionBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn value(mut self, value: impl Into<ExtensionValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn build(self) -> Result<Extension> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Extension> {
        let url = validation::require_non_null(self.url, "Extension.url")?;
        let extension = Extension {
            base: self.base,
            url,
            value: self.value,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            extension.validate(ctx)?;
        }
        Ok(extension)
    }
}

impl ElementBuilder for ExtensionBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Extension> for ExtensionBuilder {
    fn from(extension: Extension) -> Self {
        Self {
            base: extension.base,
            url: Some(extension.url),
            value: extension.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIRTH_SEX: &str = "http://hl7.org/fhir/us/core/StructureDefinition/us-core-birthsex";

    #[test]
    fn url_is_required() {
        let err = Extension::builder()
            .value(Code::of("F"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "Extension.url"));
    }

    #[test]
    fn url_or_value_alone_is_not_enough() {
        let err = Extension::builder().url(BIRTH_SEX).build().unwrap_err();
        assert!(matches!(err, Error::ValueOrChildrenRequired(_)));
    }

    #[test]
    fn nested_extensions_satisfy_ele_1() {
        let inner = Extension::builder()
            .url("ombCategory")
            .value(Coding::builder().code("2106-3").build().unwrap())
            .build()
            .unwrap();
        let outer = Extension::builder()
            .url("http://hl7.org/fhir/us/core/StructureDefinition/us-core-race")
            .extension([inner])
            .build()
            .unwrap();
        assert_eq!(outer.extension().len(), 1);
        assert!(outer.value().is_none());
    }

    #[test]
    fn value_choice_names() {
        let extension = Extension::builder()
            .url(BIRTH_SEX)
            .value(FhirString::of("F"))
            .build()
            .unwrap();
        assert_eq!(
            extension.value().map(|v| v.element_name("value")),
            Some("valueString".to_string())
        );
        assert!(Extension::element_info("valueCodeableConcept").is_some());
        assert!(Extension::element_info("valueUnicorn").is_none());
    }

    #[test]
    fn primitive_values_are_checked() {
        let err = Extension::builder()
            .url(BIRTH_SEX)
            .value(PositiveInt::of(0))
            .build()
            .unwrap_err();
        assert_eq!(err.element(), Some("Extension.value"));
    }

    #[test]
    fn url_must_not_contain_whitespace() {
        let err = Extension::builder()
            .url("not a uri")
            .value(Boolean::of(true))
            .build()
            .unwrap_err();
        assert_eq!(err.element(), Some("Extension.url"));
    }
}
