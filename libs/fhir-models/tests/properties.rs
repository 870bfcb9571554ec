//! Property-based tests using QuickCheck

use ferrum_models::prelude::*;
use quickcheck::{QuickCheck, TestResult};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn substance(text: &str, description: &str) -> Result<Substance, Error> {
    Substance::builder()
        .code(CodeableConcept::builder().text(text).build()?)
        .description(description)
        .build()
}

/// Property: rebuilding from `to_builder` yields an equal value
#[test]
fn prop_to_builder_round_trip() {
    fn prop(text: String) -> TestResult {
        match substance(&text, "generated") {
            Ok(original) => {
                let rebuilt = original.to_builder().build().unwrap();
                TestResult::from_bool(
                    rebuilt == original && rebuilt.hash_code() == original.hash_code(),
                )
            }
            Err(_) => TestResult::discard(),
        }
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(String) -> TestResult);
}

/// Property: builders fed the same content produce equal hashes
#[test]
fn prop_equal_content_equal_hash() {
    fn prop(text: String, description: String) -> TestResult {
        match (substance(&text, &description), substance(&text, &description)) {
            (Ok(a), Ok(b)) => TestResult::from_bool(a == b && a.hash_code() == b.hash_code()),
            _ => TestResult::discard(),
        }
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(String, String) -> TestResult);
}

/// Property: appending an empty collection changes nothing
#[test]
fn prop_append_empty_is_noop() {
    fn prop(family: String) -> TestResult {
        let name = match HumanName::builder().family(family).build() {
            Ok(name) => name,
            Err(_) => return TestResult::discard(),
        };
        let base = Practitioner::builder().name([name]);
        let plain = base.clone().build().unwrap();
        let appended = base
            .name(Vec::new())
            .identifier(Vec::new())
            .qualification(Vec::new())
            .build()
            .unwrap();
        TestResult::from_bool(appended == plain && appended.name().len() == 1)
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(String) -> TestResult);
}

/// Property: whitespace-only concept text is always rejected
#[test]
fn prop_blank_text_rejected() {
    fn prop(spaces: u8, tabs: u8) -> TestResult {
        let text = format!("{}{}", " ".repeat(spaces as usize % 16), "\t".repeat(tabs as usize % 4));
        if text.is_empty() {
            return TestResult::discard();
        }
        match CodeableConcept::builder().text(text).build() {
            Err(err) => TestResult::from_bool(err.element() == Some("CodeableConcept.text")),
            Ok(_) => TestResult::failed(),
        }
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(u8, u8) -> TestResult);
}

/// Property: resource ids are accepted exactly when they match `[A-Za-z0-9\-.]{1,64}`
#[test]
fn prop_resource_id_rule() {
    fn prop(id: String) -> TestResult {
        init_tracing();
        let expected = !id.is_empty()
            && id.len() <= 64
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
        let result = Medication::builder().id(id).build();
        TestResult::from_bool(result.is_ok() == expected)
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(String) -> TestResult);
}

/// Accepted ids of every length from 1 to 64 characters
#[test]
fn resource_id_lengths() {
    for len in [1, 2, 63, 64] {
        let id = "a".repeat(len);
        assert!(Medication::builder().id(id).build().is_ok(), "length {}", len);
    }
    assert!(Medication::builder().id("a".repeat(65)).build().is_err());
}
