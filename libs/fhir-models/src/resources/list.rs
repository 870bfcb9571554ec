use super::{DomainResource, DomainResourceBase, DomainResourceBuilder};
use crate::binding::{Binding, BindingStrength};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, BACKBONE_ELEMENT_BASE, DOMAIN_RESOURCE_BASE};
use crate::types::{
    Annotation, BackboneElement, BackboneElementBase, BackboneElementBuilder, Boolean, CodeValue,
    CodeableConcept, Coded, DateTime, Element, ElementBase, ElementBuilder, Extension, FhirString,
    HashMemo, Identifier, ListMode, ListStatus, Reference,
};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

const LIST_STATUS: Binding = Binding::new(
    "ListStatus",
    BindingStrength::Required,
    <ListStatus as CodeValue>::VALUE_SET,
)
.description("The current state of the list.");

const LIST_MODE: Binding = Binding::new(
    "ListMode",
    BindingStrength::Required,
    <ListMode as CodeValue>::VALUE_SET,
)
.description("The processing mode that applies to this list.");

const LIST_PURPOSE: Binding = Binding::new(
    "ListPurpose",
    BindingStrength::Example,
    "http://hl7.org/fhir/ValueSet/list-example-codes",
)
.description("What the purpose of a list is.");

const LIST_ORDER: Binding = Binding::new(
    "ListOrder",
    BindingStrength::Preferred,
    "http://hl7.org/fhir/ValueSet/list-order",
)
.description("What order applies to the items in a list.");

const LIST_ITEM_FLAG: Binding = Binding::new(
    "ListItemFlag",
    BindingStrength::Example,
    "http://hl7.org/fhir/ValueSet/list-item-flag",
)
.description(
    "Codes that provide further information about the reason and meaning of the item in the list.",
);

const LIST_EMPTY_REASON: Binding = Binding::new(
    "ListEmptyReason",
    BindingStrength::Preferred,
    "http://hl7.org/fhir/ValueSet/list-empty-reason",
)
.description("If a list is empty, why it is empty.");

const SUBJECT_TARGETS: &[&str] = &["Patient", "Group", "Device", "Location"];
const ENCOUNTER_TARGETS: &[&str] = &["Encounter"];
const SOURCE_TARGETS: &[&str] = &["Practitioner", "PractitionerRole", "Patient", "Device"];

/// A list is a curated collection of resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    status: Coded<ListStatus>,
    mode: Coded<ListMode>,
    title: Option<FhirString>,
    code: Option<CodeableConcept>,
    subject: Option<Reference>,
    encounter: Option<Reference>,
    date: Option<DateTime>,
    source: Option<Reference>,
    ordered_by: Option<CodeableConcept>,
    note: Vec<Annotation>,
    entry: Vec<ListEntry>,
    empty_reason: Option<CodeableConcept>,
    hash: HashMemo,
}

memoized_hash!(List {
    base,
    identifier,
    status,
    mode,
    title,
    code,
    subject,
    encounter,
    date,
    source,
    ordered_by,
    note,
    entry,
    empty_reason,
});

impl List {
    pub fn builder() -> ListBuilder {
        ListBuilder::default()
    }

    pub fn to_builder(&self) -> ListBuilder {
        ListBuilder::from(self.clone())
    }

    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }

    pub fn status(&self) -> &Coded<ListStatus> {
        &self.status
    }

    pub fn mode(&self) -> &Coded<ListMode> {
        &self.mode
    }

    pub fn title(&self) -> Option<&FhirString> {
        self.title.as_ref()
    }

    pub fn code(&self) -> Option<&CodeableConcept> {
        self.code.as_ref()
    }

    pub fn subject(&self) -> Option<&Reference> {
        self.subject.as_ref()
    }

    pub fn encounter(&self) -> Option<&Reference> {
        self.encounter.as_ref()
    }

    pub fn date(&self) -> Option<&DateTime> {
        self.date.as_ref()
    }

    pub fn source(&self) -> Option<&Reference> {
        self.source.as_ref()
    }

    pub fn ordered_by(&self) -> Option<&CodeableConcept> {
        self.ordered_by.as_ref()
    }

    pub fn note(&self) -> &[Annotation] {
        &self.note
    }

    pub fn entry(&self) -> &[ListEntry] {
        &self.entry
    }

    /// Why the list is empty.
    pub fn empty_reason(&self) -> Option<&CodeableConcept> {
        self.empty_reason.as_ref()
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "List")?;
        validation::check_primitive(ctx, self.title.as_ref(), "List.title")?;
        validation::check_concept_binding(ctx, self.code.as_ref(), "List.code", &LIST_PURPOSE)?;
        validation::check_reference_type(
            ctx,
            self.subject.as_ref(),
            "List.subject",
            SUBJECT_TARGETS,
        )?;
        validation::check_reference_type(
            ctx,
            self.encounter.as_ref(),
            "List.encounter",
            ENCOUNTER_TARGETS,
        )?;
        validation::check_primitive(ctx, self.date.as_ref(), "List.date")?;
        validation::check_reference_type(ctx, self.source.as_ref(), "List.source", SOURCE_TARGETS)?;
        validation::check_concept_binding(
            ctx,
            self.ordered_by.as_ref(),
            "List.orderedBy",
            &LIST_ORDER,
        )?;
        validation::check_concept_binding(
            ctx,
            self.empty_reason.as_ref(),
            "List.emptyReason",
            &LIST_EMPTY_REASON,
        )?;
        Ok(())
    }
}

impl DomainResource for List {
    fn domain_resource_base(&self) -> &DomainResourceBase {
        &self.base
    }

    fn resource_type(&self) -> &'static str {
        "List"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl Visitable for List {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::List(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_list(&self.identifier, "identifier", visitor);
            self.status.accept("status", None, visitor);
            self.mode.accept("mode", None, visitor);
            accept_opt(self.title.as_ref(), "title", visitor);
            accept_opt(self.code.as_ref(), "code", visitor);
            accept_opt(self.subject.as_ref(), "subject", visitor);
            accept_opt(self.encounter.as_ref(), "encounter", visitor);
            accept_opt(self.date.as_ref(), "date", visitor);
            accept_opt(self.source.as_ref(), "source", visitor);
            accept_opt(self.ordered_by.as_ref(), "orderedBy", visitor);
            accept_list(&self.note, "note", visitor);
            accept_list(&self.entry, "entry", visitor);
            accept_opt(self.empty_reason.as_ref(), "emptyReason", visitor);
        });
    }
}

impl ModelInfo for List {
    const TYPE_NAME: &'static str = "List";
    const BASE_ELEMENTS: &'static [ElementInfo] = DOMAIN_RESOURCE_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("identifier").repeating(),
        ElementInfo::new("status").required().summary().binding(LIST_STATUS),
        ElementInfo::new("mode").required().summary().binding(LIST_MODE),
        ElementInfo::new("title").summary(),
        ElementInfo::new("code").summary().binding(LIST_PURPOSE),
        ElementInfo::new("subject").summary().targets(SUBJECT_TARGETS),
        ElementInfo::new("encounter").targets(ENCOUNTER_TARGETS),
        ElementInfo::new("date").summary(),
        ElementInfo::new("source").summary().targets(SOURCE_TARGETS),
        ElementInfo::new("orderedBy").binding(LIST_ORDER),
        ElementInfo::new("note").repeating(),
        ElementInfo::new("entry").repeating(),
        ElementInfo::new("emptyReason").binding(LIST_EMPTY_REASON),
    ];
}

#[derive(Debug, Clone, Default)]
pub struct ListBuilder {
    base: DomainResourceBase,
    identifier: Vec<Identifier>,
    status: Option<Coded<ListStatus>>,
    mode: Option<Coded<ListMode>>,
    title: Option<FhirString>,
    code: Option<CodeableConcept>,
    subject: Option<Reference>,
    encounter: Option<Reference>,
    date: Option<DateTime>,
    source: Option<Reference>,
    ordered_by: Option<CodeableConcept>,
    note: Vec<Annotation>,
    entry: Vec<ListEntry>,
    empty_reason: Option<CodeableConcept>,
}

impl ListBuilder {
    pub fn identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier.extend(identifier);
        self
    }

    pub fn set_identifier(mut self, identifier: impl IntoIterator<Item = Identifier>) -> Self {
        self.identifier = identifier.into_iter().collect();
        self
    }

    pub fn status(mut self, status: impl Into<Coded<ListStatus>>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn mode(mut self, mode: impl Into<Coded<ListMode>>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn title(mut self, title: impl Into<FhirString>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn code(mut self, code: CodeableConcept) -> Self {
        self.code = Some(code);
        self
    }

    pub fn subject(mut self, subject: Reference) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn encounter(mut self, encounter: Reference) -> Self {
        self.encounter = Some(encounter);
        self
    }

    pub fn date(mut self, date: impl Into<DateTime>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn source(mut self, source: Reference) -> Self {
        self.source = Some(source);
        self
    }

    pub fn ordered_by(mut self, ordered_by: CodeableConcept) -> Self {
        self.ordered_by = Some(ordered_by);
        self
    }

    pub fn note(mut self, note: impl IntoIterator<Item = Annotation>) -> Self {
        self.note.extend(note);
        self
    }

    pub fn set_note(mut self, note: impl IntoIterator<Item = Annotation>) -> Self {
        self.note = note.into_iter().collect();
        self
    }

    pub fn entry(mut self, entry: impl IntoIterator<Item = ListEntry>) -> Self {
        self.entry.extend(entry);
        self
    }

    pub fn set_entry(mut self, entry: impl IntoIterator<Item = ListEntry>) -> Self {
        self.entry = entry.into_iter().collect();
        self
    }

    pub fn empty_reason(mut self, empty_reason: CodeableConcept) -> Self {
        self.empty_reason = Some(empty_reason);
        self
    }

    pub fn build(self) -> Result<List> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<List> {
        let status = validation::require_non_null(self.status, "List.status")?;
        let mode = validation::require_non_null(self.mode, "List.mode")?;
        let list = List {
            base: self.base,
            identifier: self.identifier,
            status,
            mode,
            title: self.title,
            code: self.code,
            subject: self.subject,
            encounter: self.encounter,
            date: self.date,
            source: self.source,
            ordered_by: self.ordered_by,
            note: self.note,
            entry: self.entry,
            empty_reason: self.empty_reason,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            list.validate(ctx).inspect_err(|err| {
                tracing::debug!(resource_type = "List", error = %err, "Build rejected");
            })?;
        }
        Ok(list)
    }
}

impl DomainResourceBuilder for ListBuilder {
    fn domain_resource_base_mut(&mut self) -> &mut DomainResourceBase {
        &mut self.base
    }
}

impl From<List> for ListBuilder {
    fn from(list: List) -> Self {
        Self {
            base: list.base,
            identifier: list.identifier,
            status: Some(list.status),
            mode: Some(list.mode),
            title: list.title,
            code: list.code,
            subject: list.subject,
            encounter: list.encounter,
            date: list.date,
            source: list.source,
            ordered_by: list.ordered_by,
            note: list.note,
            entry: list.entry,
            empty_reason: list.empty_reason,
        }
    }
}

/// An entry in a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    base: BackboneElementBase,
    flag: Option<CodeableConcept>,
    deleted: Option<Boolean>,
    date: Option<DateTime>,
    item: Reference,
    hash: HashMemo,
}

memoized_hash!(ListEntry { base, flag, deleted, date, item });

impl ListEntry {
    pub fn builder() -> ListEntryBuilder {
        ListEntryBuilder::default()
    }

    pub fn to_builder(&self) -> ListEntryBuilder {
        ListEntryBuilder::from(self.clone())
    }

    /// Workflow information about this item.
    pub fn flag(&self) -> Option<&CodeableConcept> {
        self.flag.as_ref()
    }

    /// Whether the item was removed from the list.
    pub fn deleted(&self) -> Option<&Boolean> {
        self.deleted.as_ref()
    }

    pub fn date(&self) -> Option<&DateTime> {
        self.date.as_ref()
    }

    pub fn item(&self) -> &Reference {
        &self.item
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "List.entry")?;
        validation::check_concept_binding(
            ctx,
            self.flag.as_ref(),
            "List.entry.flag",
            &LIST_ITEM_FLAG,
        )?;
        validation::check_primitive(ctx, self.deleted.as_ref(), "List.entry.deleted")?;
        validation::check_primitive(ctx, self.date.as_ref(), "List.entry.date")?;
        validation::require_value_or_children(self, "List.entry")
    }
}

impl Element for ListEntry {
    fn element_base(&self) -> &ElementBase {
        &self.base.element
    }

    fn type_name(&self) -> &'static str {
        "List.entry"
    }

    fn has_children(&self) -> bool {
        true
    }
}

impl BackboneElement for ListEntry {
    fn modifier_extension(&self) -> &[Extension] {
        &self.base.modifier_extension
    }
}

impl Visitable for ListEntry {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::ListEntry(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.flag.as_ref(), "flag", visitor);
            accept_opt(self.deleted.as_ref(), "deleted", visitor);
            accept_opt(self.date.as_ref(), "date", visitor);
            self.item.accept("item", None, visitor);
        });
    }
}

impl ModelInfo for ListEntry {
    const TYPE_NAME: &'static str = "List.entry";
    const BASE_ELEMENTS: &'static [ElementInfo] = BACKBONE_ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("flag").binding(LIST_ITEM_FLAG),
        ElementInfo::new("deleted"),
        ElementInfo::new("date"),
        ElementInfo::new("item").required(),
    ];
}

impl CheckValue for ListEntry {}

#[derive(Debug, Clone, Default)]
pub struct ListEntryBuilder {
    base: BackboneElementBase,
    flag: Option<CodeableConcept>,
    deleted: Option<Boolean>,
    date: Option<DateTime>,
    item: Option<Reference>,
}

impl ListEntryBuilder {
    pub fn flag(mut self, flag: CodeableConcept) -> Self {
        self.flag = Some(flag);
        self
    }

    pub fn deleted(mut self, deleted: impl Into<Boolean>) -> Self {
        self.deleted = Some(deleted.into());
        self
    }

    pub fn date(mut self, date: impl Into<DateTime>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn item(mut self, item: Reference) -> Self {
        self.item = Some(item);
        self
    }

    pub fn build(self) -> Result<ListEntry> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<ListEntry> {
        let item = validation::require_non_null(self.item, "List.entry.item")?;
        let entry = ListEntry {
            base: self.base,
            flag: self.flag,
            deleted: self.deleted,
            date: self.date,
            item,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            entry.validate(ctx)?;
        }
        Ok(entry)
    }
}

impl ElementBuilder for ListEntryBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base.element
    }
}

impl BackboneElementBuilder for ListEntryBuilder {
    fn backbone_base_mut(&mut self) -> &mut BackboneElementBase {
        &mut self.base
    }
}

impl From<ListEntry> for ListEntryBuilder {
    fn from(entry: ListEntry) -> Self {
        Self {
            base: entry.base,
            flag: entry.flag,
            deleted: entry.deleted,
            date: entry.date,
            item: Some(entry.item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::Coding;

    fn allergy(id: &str) -> ListEntry {
        ListEntry::builder()
            .item(
                Reference::builder()
                    .reference(format!("AllergyIntolerance/{}", id))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn status_and_mode_are_required() {
        let err = List::builder().mode(ListMode::Working).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "List.status"));
        let err = List::builder().status(ListStatus::Current).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "List.mode"));
    }

    #[test]
    fn entries_keep_their_order() {
        let list = List::builder()
            .status(ListStatus::Current)
            .mode(ListMode::Snapshot)
            .title("Current allergies")
            .entry([allergy("1"), allergy("2")])
            .entry([allergy("3")])
            .build()
            .unwrap();
        let items: Vec<_> = list
            .entry()
            .iter()
            .filter_map(|entry| entry.item().reference_value())
            .collect();
        assert_eq!(
            items,
            ["AllergyIntolerance/1", "AllergyIntolerance/2", "AllergyIntolerance/3"]
        );
    }

    #[test]
    fn entry_requires_an_item() {
        let err = ListEntry::builder().deleted(true).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref p) if p == "List.entry.item"));
    }

    #[test]
    fn empty_list_with_reason() {
        let reason = CodeableConcept::builder()
            .coding([Coding::builder()
                .system("http://terminology.hl7.org/CodeSystem/list-empty-reason")
                .code("nilknown")
                .build()
                .unwrap()])
            .build()
            .unwrap();
        let list = List::builder()
            .status(ListStatus::Current)
            .mode(ListMode::Working)
            .empty_reason(reason)
            .build()
            .unwrap();
        assert!(list.entry().is_empty());
        assert!(list.empty_reason().is_some());
    }

    #[test]
    fn subject_targets_are_checked() {
        let err = List::builder()
            .status(ListStatus::Current)
            .mode(ListMode::Working)
            .subject(Reference::builder().reference("Organization/1").build().unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err.element(), Some("List.subject"));
    }
}
