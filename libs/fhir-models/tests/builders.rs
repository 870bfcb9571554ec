use ferrum_models::prelude::*;
use ferrum_models::terminology::InMemoryValueSets;
use ferrum_models::types::temporal::DateTimeValue;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

fn reference(literal: &str) -> Reference {
    Reference::builder().reference(literal).build().unwrap()
}

fn concept(text: &str) -> CodeableConcept {
    CodeableConcept::builder().text(text).build().unwrap()
}

fn std_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn empty_medication_builds() {
    let medication = Medication::builder().build().unwrap();
    assert!(medication.identifier().is_empty());
    assert!(!medication.has_children());
    assert_eq!(medication.resource_type(), "Medication");
}

#[test]
fn related_person_requires_patient() {
    let err = RelatedPerson::builder().build().unwrap_err();
    assert_eq!(err.element(), Some("RelatedPerson.patient"));
    assert_eq!(
        err.to_string(),
        "Missing required element: 'RelatedPerson.patient'"
    );

    let person = RelatedPerson::builder()
        .patient(reference("Patient/example"))
        .build()
        .unwrap();
    assert_eq!(person.patient().reference_value(), Some("Patient/example"));
}

#[test]
fn ingredient_item_alternatives() {
    assert!(MedicationIngredient::builder()
        .item(concept("Lactose"))
        .build()
        .is_ok());
    assert!(MedicationIngredient::builder()
        .item(reference("Medication/base"))
        .build()
        .is_ok());

    let err = MedicationIngredient::builder()
        .item(reference("Patient/1"))
        .build()
        .unwrap_err();
    match err {
        Error::ReferenceTypeNotAllowed {
            element,
            resource_type,
            allowed,
        } => {
            assert_eq!(element, "Medication.ingredient.item");
            assert_eq!(resource_type, "Patient");
            assert_eq!(allowed, ["Substance", "Medication"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reference_type_checks_can_be_disabled() {
    let config = ModelConfig::default().with_check_reference_types(false);
    let mut ctx = ValidationContext::new(Arc::new(config));
    let ingredient = MedicationIngredient::builder()
        .item(reference("Patient/1"))
        .build_with(&mut ctx);
    assert!(ingredient.is_ok());
}

#[test]
fn explicit_reference_type_must_match_literal() {
    let mismatched = Reference::builder()
        .reference("Substance/1")
        .type_("Medication")
        .build()
        .unwrap();
    let err = MedicationIngredient::builder()
        .item(mismatched)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidReference { .. }));
}

#[test]
fn required_checks_run_without_validation() {
    let config = ModelConfig::default().with_validating(false);
    let mut ctx = ValidationContext::new(Arc::new(config));

    let err = RelatedPerson::builder().build_with(&mut ctx).unwrap_err();
    assert!(matches!(err, Error::MissingRequiredElement(_)));

    // Value rules are skipped.
    let medication = Medication::builder().id("not_an_id").build_with(&mut ctx);
    assert!(medication.is_ok());
}

#[test]
fn to_builder_round_trips() {
    let practitioner = Practitioner::builder()
        .id("f201")
        .active(true)
        .name([HumanName::builder()
            .use_(NameUse::Official)
            .family("Bronsig")
            .given(["Hendrik"])
            .build()
            .unwrap()])
        .telecom([ContactPoint::builder()
            .system(ContactPointSystem::Phone)
            .value("+31715269111")
            .build()
            .unwrap()])
        .gender(AdministrativeGender::Male)
        .communication([CodeableConcept::builder()
            .coding([Coding::builder().system("urn:ietf:bcp:47").code("nl").build().unwrap()])
            .build()
            .unwrap()])
        .build()
        .unwrap();

    let rebuilt = practitioner.to_builder().build().unwrap();
    assert_eq!(rebuilt, practitioner);
    assert_eq!(rebuilt.hash_code(), practitioner.hash_code());
}

#[test]
fn languages_need_a_coded_tag() {
    let err = Practitioner::builder()
        .communication([concept("Dutch")])
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::ValueSetBinding { ref element, .. } if element == "Practitioner.communication"));
}

#[test]
fn equal_content_hashes_equal() {
    let build = || {
        Substance::builder()
            .status(SubstanceStatus::Active)
            .category([concept("allergen")])
            .code(concept("Apple"))
            .description("Apple pie")
            .build()
            .unwrap()
    };
    let (a, b) = (build(), build());
    assert_eq!(a, b);
    assert_eq!(a.hash_code(), b.hash_code());
    assert_eq!(std_hash(&a), std_hash(&b));

    let c = a.to_builder().description("Apple sauce").build().unwrap();
    assert_ne!(a, c);
}

#[test]
fn appending_nothing_leaves_lists_unchanged() {
    let base = Media::builder()
        .status(EventStatus::Completed)
        .content(Attachment::builder().url("http://example.org/1.png").build().unwrap());
    let media = base.clone().build().unwrap();

    let appended = base
        .clone()
        .identifier(Vec::new())
        .note(std::iter::empty())
        .build()
        .unwrap();
    assert_eq!(appended, media);

    let replaced = base
        .reason_code([concept("Wound")])
        .set_reason_code(Vec::new())
        .build()
        .unwrap();
    assert!(replaced.reason_code().is_empty());
    assert_eq!(replaced, media);
}

#[test]
fn backbone_modifier_extensions() {
    let flag = Extension::builder()
        .url("http://example.org/fhir/StructureDefinition/unverified")
        .value(Boolean::of(true))
        .build()
        .unwrap();
    let entry = ListEntry::builder()
        .item(reference("Condition/1"))
        .modifier_extension([flag])
        .build()
        .unwrap();
    assert_eq!(entry.modifier_extension().len(), 1);
    assert_eq!(entry.type_name(), "List.entry");
}

#[test]
fn extensible_binding_misses_are_collected() {
    const CATEGORY: &str = "http://hl7.org/fhir/ValueSet/substance-category";
    const SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/substance-category";

    let terminology = InMemoryValueSets::new().with_codes(
        CATEGORY,
        Some(SYSTEM),
        ["allergen", "biological", "body", "chemical", "food", "drug", "material"],
    );
    let config = ModelConfig::default().with_terminology(Arc::new(terminology));
    let mut ctx = ValidationContext::new(Arc::new(config));

    let category = |code: &str| {
        CodeableConcept::builder()
            .coding([Coding::builder().system(SYSTEM).code(code).build().unwrap()])
            .build()
            .unwrap()
    };

    Substance::builder()
        .category([category("food")])
        .code(concept("Apple"))
        .build_with(&mut ctx)
        .unwrap();
    assert!(!ctx.has_warnings());

    Substance::builder()
        .category([category("mineral")])
        .code(concept("Quartz"))
        .build_with(&mut ctx)
        .unwrap();
    let issues = ctx.into_issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, IssueSeverity::Warning);
    assert_eq!(issues[0].location.as_deref(), Some("Substance.category"));
}

#[test]
fn required_codes_cover_their_value_set() {
    assert_eq!(ListMode::values().len(), 3);
    assert_eq!("changes".parse::<ListMode>().unwrap(), ListMode::Changes);
    assert_eq!(
        <EventStatus as CodeValue>::VALUE_SET,
        "http://hl7.org/fhir/ValueSet/event-status|4.3.0"
    );
}

#[test]
fn field_metadata_follows_declaration_order() {
    let names: Vec<_> = RelatedPerson::ELEMENTS.iter().map(|e| e.name).collect();
    assert_eq!(
        names,
        [
            "identifier",
            "active",
            "patient",
            "relationship",
            "name",
            "telecom",
            "gender",
            "birthDate",
            "address",
            "photo",
            "period",
            "communication",
        ]
    );
    let patient = RelatedPerson::element_info("patient").unwrap();
    assert_eq!(patient.min, 1);
    assert_eq!(patient.targets, ["Patient"]);
    assert!(RelatedPerson::element_info("implicitRules").is_some());
}

#[test]
fn built_values_cross_threads() {
    let medication = Arc::new(
        Medication::builder()
            .code(concept("Amoxicillin"))
            .build()
            .unwrap(),
    );
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let medication = Arc::clone(&medication);
            std::thread::spawn(move || medication.hash_code())
        })
        .collect();
    let hashes: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(hashes.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn batch_expiration_needs_a_real_month() {
    let err = MedicationBatch::builder()
        .expiration_date(DateTime::of(DateTimeValue::YearMonth(2020, 13)))
        .build()
        .unwrap_err();
    assert_eq!(err.element(), Some("Medication.batch.expirationDate"));

    let batch = MedicationBatch::builder()
        .expiration_date(DateTime::parse("2020-12").unwrap())
        .build()
        .unwrap();
    assert!(batch.expiration_date().is_some());
}

#[test]
fn zone_offsets_are_part_of_equality() {
    let media = |created: &str| {
        Media::builder()
            .status(EventStatus::Completed)
            .created(DateTime::parse(created).unwrap())
            .content(Attachment::builder().url("http://example.org/1.png").build().unwrap())
            .build()
            .unwrap()
    };
    let utc = media("2020-01-01T10:00:00Z");
    let shifted = media("2020-01-01T12:00:00+02:00");
    assert_ne!(utc, shifted);
    assert_ne!(utc.hash_code(), shifted.hash_code());
    assert_eq!(utc, media("2020-01-01T10:00:00Z"));
}
