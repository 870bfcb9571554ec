use super::{
    Base64Binary, Code, DateTime, Element, ElementBase, ElementBuilder, FhirString, HashMemo,
    UnsignedInt, Url,
};
use crate::binding::common;
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_opt, walk, Node, Visitable, Visitor};

/// Content in a format defined elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    base: ElementBase,
    content_type: Option<Code>,
    language: Option<Code>,
    data: Option<Base64Binary>,
    url: Option<Url>,
    size: Option<UnsignedInt>,
    hash_: Option<Base64Binary>,
    title: Option<FhirString>,
    creation: Option<DateTime>,
    hash: HashMemo,
}

memoized_hash!(Attachment {
    base,
    content_type,
    language,
    data,
    url,
    size,
    hash_,
    title,
    creation,
});

impl Attachment {
    pub fn builder() -> AttachmentBuilder {
        AttachmentBuilder::default()
    }

    pub fn to_builder(&self) -> AttachmentBuilder {
        AttachmentBuilder::from(self.clone())
    }

    /// Mime type of the content, with charset etc.
    pub fn content_type(&self) -> Option<&Code> {
        self.content_type.as_ref()
    }

    pub fn language(&self) -> Option<&Code> {
        self.language.as_ref()
    }

    pub fn data(&self) -> Option<&Base64Binary> {
        self.data.as_ref()
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn size(&self) -> Option<&UnsignedInt> {
        self.size.as_ref()
    }

    /// SHA-1 hash of the data.
    pub fn hash_(&self) -> Option<&Base64Binary> {
        self.hash_.as_ref()
    }

    pub fn title(&self) -> Option<&FhirString> {
        self.title.as_ref()
    }

    pub fn creation(&self) -> Option<&DateTime> {
        self.creation.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Attachment")?;
        validation::check_primitive(ctx, self.content_type.as_ref(), "Attachment.contentType")?;
        validation::check_code_binding(
            ctx,
            self.content_type.as_ref(),
            "Attachment.contentType",
            &common::MIME_TYPE,
        )?;
        validation::check_primitive(ctx, self.language.as_ref(), "Attachment.language")?;
        validation::check_code_binding(
            ctx,
            self.language.as_ref(),
            "Attachment.language",
            &common::LANGUAGE,
        )?;
        validation::check_primitive(ctx, self.data.as_ref(), "Attachment.data")?;
        validation::check_primitive(ctx, self.url.as_ref(), "Attachment.url")?;
        validation::check_primitive(ctx, self.size.as_ref(), "Attachment.size")?;
        validation::check_primitive(ctx, self.hash_.as_ref(), "Attachment.hash")?;
        validation::check_primitive(ctx, self.title.as_ref(), "Attachment.title")?;
        validation::check_primitive(ctx, self.creation.as_ref(), "Attachment.creation")?;
        validation::require_value_or_children(self, "Attachment")
    }
}

impl Element for Attachment {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Attachment"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || self.content_type.is_some()
            || self.language.is_some()
            || self.data.is_some()
            || self.url.is_some()
            || self.size.is_some()
            || self.hash_.is_some()
            || self.title.is_some()
            || self.creation.is_some()
    }
}

impl Visitable for Attachment {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Attachment(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.content_type.as_ref(), "contentType", visitor);
            accept_opt(self.language.as_ref(), "language", visitor);
            accept_opt(self.data.as_ref(), "data", visitor);
            accept_opt(self.url.as_ref(), "url", visitor);
            accept_opt(self.size.as_ref(), "size", visitor);
            accept_opt(self.hash_.as_ref(), "hash", visitor);
            accept_opt(self.title.as_ref(), "title", visitor);
            accept_opt(self.creation.as_ref(), "creation", visitor);
        });
    }
}

impl ModelInfo for Attachment {
    const TYPE_NAME: &'static str = "Attachment";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("contentType").summary().binding(common::MIME_TYPE),
        ElementInfo::new("language").summary().binding(common::LANGUAGE),
        ElementInfo::new("data"),
        ElementInfo::new("url").summary(),
        ElementInfo::new("size").summary(),
        ElementInfo::new("hash").summary(),
        ElementInfo::new("title").summary(),
        ElementInfo::new("creation").summary(),
    ];
}

impl CheckValue for Attachment {}

#[derive(Debug, Clone, Default)]
pub struct AttachmentBuilder {
    base: ElementBase,
    content_type: Option<Code>,
    language: Option<Code>,
    data: Option<Base64Binary>,
    url: Option<Url>,
    size: Option<UnsignedInt>,
    hash_: Option<Base64Binary>,
    title: Option<FhirString>,
    creation: Option<DateTime>,
}

impl AttachmentBuilder {
    pub fn content_type(mut self, content_type: impl Into<Code>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn language(mut self, language: impl Into<Code>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn data(mut self, data: impl Into<Base64Binary>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn url(mut self, url: impl Into<Url>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn size(mut self, size: impl Into<UnsignedInt>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn hash_(mut self, hash_: impl Into<Base64Binary>) -> Self {
        self.hash_ = Some(hash_.into());
        self
    }

    pub fn title(mut self, title: impl Into<FhirString>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn creation(mut self, creation: impl Into<DateTime>) -> Self {
        self.creation = Some(creation.into());
        self
    }

    pub fn build(self) -> Result<Attachment> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Attachment> {
        let attachment = Attachment {
            base: self.base,
            content_type: self.content_type,
            language: self.language,
            data: self.data,
            url: self.url,
            size: self.size,
            hash_: self.hash_,
            title: self.title,
            creation: self.creation,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            attachment.validate(ctx)?;
        }
        Ok(attachment)
    }
}

impl ElementBuilder for AttachmentBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Attachment> for AttachmentBuilder {
    fn from(attachment: Attachment) -> Self {
        Self {
            base: attachment.base,
            content_type: attachment.content_type,
            language: attachment.language,
            data: attachment.data,
            url: attachment.url,
            size: attachment.size,
            hash_: attachment.hash_,
            title: attachment.title,
            creation: attachment.creation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn mime_type_is_checked() {
        let attachment = Attachment::builder()
            .content_type("image/png")
            .data(vec![0x89, 0x50, 0x4e, 0x47])
            .build()
            .unwrap();
        assert_eq!(
            attachment.data().and_then(Base64Binary::encoded).as_deref(),
            Some("iVBORw==")
        );

        let err = Attachment::builder().content_type("png").build().unwrap_err();
        assert!(matches!(err, Error::ValueSetBinding { ref element, .. } if element == "Attachment.contentType"));
    }

    #[test]
    fn language_must_be_a_language_tag() {
        assert!(Attachment::builder().language("en-US").title("x").build().is_ok());
        let err = Attachment::builder().language("not a tag").build().unwrap_err();
        assert_eq!(err.element(), Some("Attachment.language"));
    }

    #[test]
    fn hash_element_is_separate_from_structural_hash() {
        let attachment = Attachment::builder()
            .url("http://example.org/scan.pdf")
            .hash_(Base64Binary::decode("2jmj7l5rSw0yVb/vlWAYkK/YBwk=").unwrap())
            .build()
            .unwrap();
        assert!(attachment.hash_().is_some());
        assert_eq!(attachment.hash_code(), attachment.clone().hash_code());
    }
}
