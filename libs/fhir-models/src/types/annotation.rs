use super::{
    DateTime, Element, ElementBase, ElementBuilder, FhirString, HashMemo, Markdown, Reference,
};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_opt, walk, Node, Visitable, Visitor};

choice!(
    /// `Annotation.author[x]`
    AnnotationAuthor {
        Reference(Reference),
        String(FhirString),
    }
);

const AUTHOR_TARGETS: &[&str] = &["Practitioner", "Patient", "RelatedPerson", "Organization"];

/// A text note which also contains information about who made the statement and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    base: ElementBase,
    author: Option<AnnotationAuthor>,
    time: Option<DateTime>,
    text: Markdown,
    hash: HashMemo,
}

memoized_hash!(Annotation { base, author, time, text });

impl Annotation {
    pub fn builder() -> AnnotationBuilder {
        AnnotationBuilder::default()
    }

    pub fn to_builder(&self) -> AnnotationBuilder {
        AnnotationBuilder::from(self.clone())
    }

    pub fn author(&self) -> Option<&AnnotationAuthor> {
        self.author.as_ref()
    }

    pub fn time(&self) -> Option<&DateTime> {
        self.time.as_ref()
    }

    pub fn text(&self) -> &Markdown {
        &self.text
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Annotation")?;
        if let Some(author) = &self.author {
            author.validate(ctx, "Annotation.author")?;
            if let AnnotationAuthor::Reference(reference) = author {
                validation::check_reference_type(
                    ctx,
                    Some(reference),
                    "Annotation.author",
                    AUTHOR_TARGETS,
                )?;
            }
        }
        validation::check_primitive(ctx, self.time.as_ref(), "Annotation.time")?;
        validation::check_primitive(ctx, Some(&self.text), "Annotation.text")?;
        validation::require_value_or_children(self, "Annotation")
    }
}

impl Element for Annotation {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Annotation"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl Visitable for Annotation {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Annotation(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            if let Some(author) = &self.author {
                author.accept_choice("author", visitor);
            }
            accept_opt(self.time.as_ref(), "time", visitor);
            self.text.accept("text", None, visitor);
        });
    }
}

impl ModelInfo for Annotation {
    const TYPE_NAME: &'static str = "Annotation";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("author")
            .summary()
            .choice(&["Reference", "String"])
            .targets(AUTHOR_TARGETS),
        ElementInfo::new("time").summary(),
        ElementInfo::new("text").required().summary(),
    ];
}

impl CheckValue for Annotation {}

#[derive(Debug, Clone, Default)]
pub struct AnnotationBuilder {
    base: ElementBase,
    author: Option<AnnotationAuthor>,
    time: Option<DateTime>,
    text: Option<Markdown>,
}

impl AnnotationBuilder {
    pub fn author(mut self, author: impl Into<AnnotationAuthor>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn time(mut self, time: impl Into<DateTime>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn text(mut self, text: impl Into<Markdown>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn build(self) -> Result<Annotation> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Annotation> {
        let text = validation::require_non_null(self.text, "Annotation.text")?;
        let annotation = Annotation {
            base: self.base,
            author: self.author,
            time: self.time,
            text,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            annotation.validate(ctx)?;
        }
        Ok(annotation)
    }
}

impl ElementBuilder for AnnotationBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Annotation> for AnnotationBuilder {
    fn from(annotation: Annotation) -> Self {
        Self {
            base: annotation.base,
            author: annotation.author,
            time: annotation.time,
            text: Some(annotation.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn text_is_required() {
        let err = Annotation::builder().build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "Annotation.text"));
    }

    #[test]
    fn author_choice() {
        let note = Annotation::builder()
            .author(FhirString::of("Dr. Ada"))
            .text("Patient tolerates the dose well")
            .build()
            .unwrap();
        assert_eq!(note.author().map(AnnotationAuthor::type_suffix), Some("String"));
        assert_eq!(note.text().as_str(), Some("Patient tolerates the dose well"));

        let device = Reference::builder().reference("Device/pump").build().unwrap();
        let err = Annotation::builder()
            .author(device)
            .text("x")
            .build()
            .unwrap_err();
        assert_eq!(err.element(), Some("Annotation.author"));
    }
}
