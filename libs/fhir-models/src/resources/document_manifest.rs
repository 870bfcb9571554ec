use super::{DomainResource, DomainResourceBase, DomainResourceBuilder};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, BACKBONE_ELEMENT_BASE, DOMAIN_RESOURCE_BASE};
use crate::types::{
    BackboneElement, BackboneElementBase, BackboneElementBuilder, CodeValue, CodeableConcept,
    Coded, DateTime, DocumentReferenceStatus, Element, ElementBase, ElementBuilder, Extension,
    FhirString, HashMemo, Identifier, Reference, Uri,
};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

const DOCUMENT_REFERENCE_STATUS: Binding = Binding::new(
    "DocumentReferenceStatus",
    BindingStrength::Required,
    <DocumentReferenceStatus as CodeValue>::VALUE_SET,
)
.description("The status of the document reference.");

const V3_ACT: Binding = Binding::new(
    "v3Act",
    BindingStrength::Example,
    "http://terminology.hl7.org/ValueSet/v3-ActCode",
)
.description("The activity that caused the DocumentManifest to be created.");

const SUBJECT_TARGETS: &[&str] = &["Patient", "Practitioner", "Group", "Device"];
const AUTHOR_TARGETS: &[&str] = &[
    "Practitioner",
    "PractitionerRole",
    "Organization",
    "Device",
    "Patient",
    "RelatedPerson",
];
const RECIPIENT_TARGETS: &[&str] = &[
    "Patient",
    "Practitioner",
    "PractitionerRole",
    "RelatedPerson",
    "Organization",
];

/// A collection of documents compiled for a purpose together with metadata that
/// applies to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentManifest {
    base: DomainResourceBase,
    master_identifier: Option<Identifier>,
    identifier: Vec<Identifier>,
    status: Coded<DocumentReferenceStatus>,
    type_: Option<CodeableConcept>,
    subject: Option<Reference>,
    created: Option<DateTime>,
    author: Vec<Reference>,
    recipient: Vec<Reference>,
    source: Option<Uri>,
    description: Option<FhirString>,
    content: Vec<Reference>,
    related: Vec<DocumentManifestRelated>,
    hash: HashMemo,
}

memoized_hash!(DocumentManifest {
    base,
    master_identifier,
    identifier,
    status,
    type_,
    subject,
    created,
    author,
    recipient,
    source,
    description,
    content,
    related,
});

impl DocumentManifest {
    pub fn builder() -> DocumentManifestBuilder {
        DocumentManifestBuilder::default()
    }

    pub fn to_builder(&self) -> DocumentManifestBuilder {
        DocumentManifestBuilder::from(self.clone())
    }

    pub fn master_identifier(&self) -> Option<&Identifier> {
        self.master_identifier.as_ref()
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    pub fn status(&self) -> &Coded<DocumentReferenceStatus> {
        &self.status
    }

    pub fn type_(&self) -> Option<&CodeableConcept> {
        self.type_.as_ref()
    }

    pub fn subject(&self) -> Option<&Reference> {
        self.subject.as_ref()
    }

    pub fn created(&self) -> Option<&DateTime> {
        self.created.as_ref()
    }

    pub fn author(&self) -> &[Reference] {
        &self.author
    }

    pub fn recipient(&self) -> &[Reference] {
        &self.recipient
    }

    pub fn source(&self) -> Option<&Uri> {
        self.source.as_ref()
    }

    pub fn description(&self) -> Option<&FhirString> {
        self.description.as_ref()
    }

    /// The documents, images or other resources in the set. Any resource type.
    pub fn content(&self) -> &[Reference] {
        &self.content
    }

    pub fn related(&self) -> &[DocumentManifestRelated] {
        &self.related
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "DocumentManifest")?;
        validation::check_concept_binding(
            ctx,
            self.type_.as_ref(),
            "DocumentManifest.type",
            &V3_ACT,
        )?;
        validation::check_reference_type(
            ctx,
            self.subject.as_ref(),
            "DocumentManifest.subject",
            SUBJECT_TARGETS,
        )?;
        validation::check_primitive(ctx, self.created.as_ref(), "DocumentManifest.created")?;
        validation::check_reference_types(
            ctx,
            &self.author,
            "DocumentManifest.author",
            AUTHOR_TARGETS,
        )?;
        validation::check_reference_types(
            ctx,
            &self.recipient,
            "DocumentManifest.recipient",
            RECIPIENT_TARGETS,
        )?;
        validation::check_primitive(ctx, self.source.as_ref(), "DocumentManifest.source")?;
        validation::check_primitive(
            ctx,
            self.description.as_ref(),
            "DocumentManifest.description",
        )?;
        Ok(())
    }
}

impl DomainResource for DocumentManifest {
    fn domain_resource_base(&self) -> &DomainResourceBase {
        &self.base
    }

    fn resource_type(&self) -> &'static str {
        "DocumentManifest"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl Visitable for DocumentManifest {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::DocumentManifest(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.master_identifier.as_ref(), "masterIdentifier", visitor);
            accept_list(&self.identifier, "identifier", visitor);
            self.status.accept("status", None, visitor);
            accept_opt(self.type_.as_ref(), "type", visitor);
            accept_opt(self.subject.as_ref(), "subject", visitor);
            accept_opt(self.created.as_ref(), "created", visitor);
            accept_list(&self.author, "author", visitor);
            accept_list(&self.recipient, "recipient", visitor);
            accept_opt(self.source.as_ref(), "source", visitor);
            accept_opt(self.description.as_ref(), "description", visitor);
            accept_list(&self.content, "content", visitor);
            accept_list(&self.related, "related", visitor);
        });
    }
}

impl ModelInfo for DocumentManifest {
    const TYPE_NAME: &'static str = "DocumentManifest";
    const BASE_ELEMENTS: &'static [ElementInfo] = DOMAIN_RESOURCE_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("masterIdentifier").summary(),
        ElementInfo::new("identifier").repeating().summary(),
        ElementInfo::new("status").required().summary().binding(DOCUMENT_REFERENCE_STATUS),
        ElementInfo::new("type").summary().binding(V3_ACT),
        ElementInfo::new("subject").summary().targets(SUBJECT_TARGETS),
        ElementInfo::new("created"),
        ElementInfo::new("author").repeating().summary().targets(AUTHOR_TARGETS),
        ElementInfo::new("recipient").repeating().targets(RECIPIENT_TARGETS),
        ElementInfo::new("source"),
        ElementInfo::new("description").summary(),
        ElementInfo::new("content").required().repeating().summary(),
        ElementInfo::new("related").repeating(),
    ];
}

#[derive(Debug, Clone, Default)]
pub struct DocumentManifestBuilder {
    base: DomainResourceBase,
    master_identifier: Option<Identifier>,
    identifier: Vec<Identifier>,
    status: Option<Coded<DocumentReferenceStatus>>,
    type_: Option<CodeableConcept>,
    subject: Option<Reference>,
    created: Option<DateTime>,
    author: Vec<Reference>,
    recipient: Vec<Reference>,
    source: Option<Uri>,
    description: Option<FhirString>,
    content: Vec<Reference>,
    related: Vec<DocumentManifestRelated>,
}

impl DocumentManifestBuilder {
    pub fn master_identifier(mut self, master_identifier: Identifier) -> Self {
        self.master_identifier = Some(master_identifier);
        self
    }

    pub fn identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier.extend(identifier);
        self
    }

    pub fn set_identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier = identifier.into_iter().collect();
        self
    }

    pub fn status(mut self, status: impl Into<Coded<DocumentReferenceStatus>>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn type_(mut self, type_: CodeableConcept) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn subject(mut self, subject: Reference) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn created(mut self, created: impl Into<DateTime>) -> Self {
        self.created = Some(created.into());
        self
    }

    pub fn author(mut self, author: impl IntoIterator<Item = Reference>) -> Self {
        self.author.extend(author);
        self
    }

    pub fn set_author(mut self, author: impl IntoIterator<Item = Reference>) -> Self {
        self.author = author.into_iter().collect();
        self
    }

    pub fn recipient(mut self, recipient: impl IntoIterator<Item = Reference>) -> Self {
        self.recipient.extend(recipient);
        self
    }

    pub fn set_recipient(mut self, recipient: impl IntoIterator<Item = Reference>) -> Self {
        self.recipient = recipient.into_iter().collect();
        self
    }

    pub fn source(mut self, source: impl Into<Uri>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn description(mut self, description: impl Into<FhirString>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn content(mut self, content: impl IntoIterator<Item = Reference>) -> Self {
        self.content.extend(content);
        self
    }

    pub fn set_content(mut self, content: impl IntoIterator<Item = Reference>) -> Self {
        self.content = content.into_iter().collect();
        self
    }

    pub fn related(mut self, related: impl IntoIterator<Item = DocumentManifestRelated>) -> Self {
        self.related.extend(related);
        self
    }

    pub fn set_related(
        mut self,
        related: impl IntoIterator<Item = DocumentManifestRelated>,
    ) -> Self {
        self.related = related.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<DocumentManifest> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<DocumentManifest> {
        let status = validation::require_non_null(self.status, "DocumentManifest.status")?;
        validation::require_non_empty(&self.content, "DocumentManifest.content")?;
        let manifest = DocumentManifest {
            base: self.base,
            master_identifier: self.master_identifier,
            identifier: self.identifier,
            status,
            type_: self.type_,
            subject: self.subject,
            created: self.created,
            author: self.author,
            recipient: self.recipient,
            source: self.source,
            description: self.description,
            content: self.content,
            related: self.related,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            manifest.validate(ctx).inspect_err(|err| {
                tracing::debug!(resource_type = "DocumentManifest", error = %err, "Build rejected");
            })?;
        }
        Ok(manifest)
    }
}

impl DomainResourceBuilder for DocumentManifestBuilder {
    fn domain_resource_base_mut(&mut self) -> &mut DomainResourceBase {
        &mut self.base
    }
}

impl From<DocumentManifest> for DocumentManifestBuilder {
    fn from(manifest: DocumentManifest) -> Self {
        Self {
            base: manifest.base,
            master_identifier: manifest.master_identifier,
            identifier: manifest.identifier,
            status: Some(manifest.status),
            type_: manifest.type_,
            subject: manifest.subject,
            created: manifest.created,
            author: manifest.author,
            recipient: manifest.recipient,
            source: manifest.source,
            description: manifest.description,
            content: manifest.content,
            related: manifest.related,
        }
    }
}

/// Related identifiers or resources associated with the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentManifestRelated {
    base: BackboneElementBase,
    identifier: Option<Identifier>,
    ref_: Option<Reference>,
    hash: HashMemo,
}

memoized_hash!(DocumentManifestRelated { base, identifier, ref_ });

impl DocumentManifestRelated {
    pub fn builder() -> DocumentManifestRelatedBuilder {
        DocumentManifestRelatedBuilder::default()
    }

    pub fn to_builder(&self) -> DocumentManifestRelatedBuilder {
        DocumentManifestRelatedBuilder::from(self.clone())
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    pub fn ref_(&self) -> Option<&Reference> {
        self.ref_.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "DocumentManifest.related")?;
        validation::require_value_or_children(self, "DocumentManifest.related")
    }
}

impl Element for DocumentManifestRelated {
    fn element_base(&self) -> &ElementBase {
        &self.base.element
    }

    fn type_name(&self) -> &'static str {
        "DocumentManifest.related"
    }

    fn has_children(&self) -> bool {
        self.base.has_children() || self.identifier.is_some() || self.ref_.is_some()
    }
}

impl BackboneElement for DocumentManifestRelated {
    fn modifier_extension(&self) -> &[Extension] {
        &self.base.modifier_extension
    }
}

impl Visitable for DocumentManifestRelated {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::DocumentManifestRelated(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.identifier.as_ref(), "identifier", visitor);
            accept_opt(self.ref_.as_ref(), "ref", visitor);
        });
    }
}

impl ModelInfo for DocumentManifestRelated {
    const TYPE_NAME: &'static str = "DocumentManifest.related";
    const BASE_ELEMENTS: &'static [ElementInfo] = BACKBONE_ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("identifier"),
        ElementInfo::new("ref"),
    ];
}

impl CheckValue for DocumentManifestRelated {}

#[derive(Debug, Clone, Default)]
pub struct DocumentManifestRelatedBuilder {
    base: BackboneElementBase,
    identifier: Option<Identifier>,
    ref_: Option<Reference>,
}

impl DocumentManifestRelatedBuilder {
    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn ref_(mut self, ref_: Reference) -> Self {
        self.ref_ = Some(ref_);
        self
    }

    pub fn build(self) -> Result<DocumentManifestRelated> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<DocumentManifestRelated> {
        let related = DocumentManifestRelated {
            base: self.base,
            identifier: self.identifier,
            ref_: self.ref_,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            related.validate(ctx)?;
        }
        Ok(related)
    }
}

impl ElementBuilder for DocumentManifestRelatedBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base.element
    }
}

impl BackboneElementBuilder for DocumentManifestRelatedBuilder {
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase {
        &mut self.base
    }
}

impl From<DocumentManifestRelated> for DocumentManifestRelatedBuilder {
    fn from(related: DocumentManifestRelated) -> Self {
        Self {
            base: related.base,
            identifier: related.identifier,
            ref_: related.ref_,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn document(id: &str) -> Reference {
        Reference::builder()
            .reference(format!("DocumentReference/{}", id))
            .build()
            .unwrap()
    }

    #[test]
    fn content_needs_at_least_one_entry() {
        let err = DocumentManifest::builder()
            .status(DocumentReferenceStatus::Current)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "DocumentManifest.content"));
    }

    #[test]
    fn content_accepts_any_resource_type() {
        let manifest = DocumentManifest::builder()
            .status(DocumentReferenceStatus::Current)
            .content([document("a"), document("b")])
            .content([Reference::builder().reference("Binary/c").build().unwrap()])
            .build()
            .unwrap();
        assert_eq!(manifest.content().len(), 3);
        assert_eq!(manifest.content()[2].reference_value(), Some("Binary/c"));
    }

    #[test]
    fn set_content_replaces_previous_entries() {
        let manifest = DocumentManifest::builder()
            .status(DocumentReferenceStatus::Superseded)
            .content([document("a")])
            .set_content([document("b")])
            .build()
            .unwrap();
        assert_eq!(manifest.content(), &[document("b")]);
    }

    #[test]
    fn author_targets_are_checked() {
        let err = DocumentManifest::builder()
            .status(DocumentReferenceStatus::Current)
            .content([document("a")])
            .author([Reference::builder().reference("Location/1").build().unwrap()])
            .build()
            .unwrap_err();
        assert_eq!(err.element(), Some("DocumentManifest.author"));
    }

    #[test]
    fn related_entries() {
        let related = DocumentManifestRelated::builder()
            .ref_(document("prior"))
            .build()
            .unwrap();
        let manifest = DocumentManifest::builder()
            .status(DocumentReferenceStatus::Current)
            .content([document("a")])
            .related([related.clone()])
            .build()
            .unwrap();
        assert_eq!(manifest.related(), &[related]);
        assert!(DocumentManifestRelated::builder().build().is_err());
    }
}
