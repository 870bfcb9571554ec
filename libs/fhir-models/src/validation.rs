//! Validation support shared by every builder.
//!
//! `build()` on each model type calls into these checks. Structural
//! violations (missing required elements, disallowed reference targets,
//! invalid primitive values, required-binding mismatches) fail with an
//! [`Error`]. Weaker binding mismatches are advisory and are collected as
//! [`ValidationIssue`]s on the [`ValidationContext`].

use crate::binding::Binding;
use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::resource_type::is_resource_type;
use crate::terminology::{self, DATA_ABSENT_REASON_URL};
use crate::types::temporal::{DateTimeValue, DateValue};
use crate::types::{Code, CodeableConcept, Element, PrimitiveType, Reference, Uri};
use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

pub const MAX_STRING_LENGTH: usize = 1_048_576;

const MAX_ID_LENGTH: usize = 64;
const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
const STRUCTURE_DEFINITION_PREFIX: &str = "http://hl7.org/fhir/StructureDefinition/";

static RELATIVE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[A-Za-z0-9\-.:%$]+/)*?([A-Z][A-Za-z]*)/[A-Za-z0-9\-.]{1,64}(?:/_history/[A-Za-z0-9\-.]{1,64})?$",
    )
    .expect("relative reference regex must compile")
});

/// Issue severity
///
/// Build failures are returned as errors, so collected issues are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Warning,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// Issue type, as in the OperationOutcome issue-type value set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    CodeInvalid,
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueCode::CodeInvalid => write!(f, "code-invalid"),
        }
    }
}

/// Individual validation issue
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: IssueCode,
    pub diagnostics: String,
    pub location: Option<String>,
}

impl ValidationIssue {
    pub fn warning(code: IssueCode, diagnostics: String) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            code,
            diagnostics,
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Configuration and collected advisory issues for one or more builds.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    config: Arc<ModelConfig>,
    issues: Vec<ValidationIssue>,
}

impl ValidationContext {
    pub fn new(config: Arc<ModelConfig>) -> Self {
        Self {
            config,
            issues: Vec::new(),
        }
    }

    /// Context backed by [`ModelConfig::global`].
    pub fn global() -> Self {
        Self::new(ModelConfig::global())
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn validating(&self) -> bool {
        self.config.validating
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    pub fn has_warnings(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Warning)
    }

    pub(crate) fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::global()
    }
}

impl From<ModelConfig> for ValidationContext {
    fn from(config: ModelConfig) -> Self {
        Self::new(Arc::new(config))
    }
}

/// Value check run for every alternative of a choice element. Primitive
/// values may be created without a builder and are checked here; complex
/// values were validated when they were built.
pub(crate) trait CheckValue {
    fn check(&self, _ctx: &mut ValidationContext, _element: &str) -> Result<()> {
        Ok(())
    }
}

pub fn require_non_null<T>(value: Option<T>, element: &str) -> Result<T> {
    value.ok_or_else(|| Error::MissingRequiredElement(element.to_string()))
}

/// A required choice element must hold one of its alternatives.
pub fn require_choice<T>(value: Option<T>, element: &str) -> Result<T> {
    require_non_null(value, element)
}

pub fn require_non_empty<T>(values: &[T], element: &str) -> Result<()> {
    if values.is_empty() {
        return Err(Error::MissingRequiredElement(element.to_string()));
    }
    Ok(())
}

/// ele-1: every element must have a value or children.
pub fn require_value_or_children(element: &dyn Element, path: &str) -> Result<()> {
    if !element.has_value() && !element.has_children() {
        return Err(Error::ValueOrChildrenRequired(path.to_string()));
    }
    Ok(())
}

pub fn prohibited<T>(value: Option<&T>, element: &str) -> Result<()> {
    if value.is_some() {
        return Err(Error::ProhibitedElement(element.to_string()));
    }
    Ok(())
}

pub fn check_primitive<P: PrimitiveType>(
    ctx: &mut ValidationContext,
    value: Option<&P>,
    element: &str,
) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    value
        .check_value(ctx.config())
        .map_err(|reason| Error::InvalidPrimitive {
            element: element.to_string(),
            type_name: value.type_name(),
            reason,
        })
}

pub fn check_primitives<P: PrimitiveType>(
    ctx: &mut ValidationContext,
    values: &[P],
    element: &str,
) -> Result<()> {
    values
        .iter()
        .try_for_each(|value| check_primitive(ctx, Some(value), element))
}

/// FHIR string rules: bounded length, non-blank, no unsupported whitespace
/// or control characters.
pub fn check_string(value: &str, check_control_chars: bool) -> std::result::Result<(), String> {
    if value.len() > MAX_STRING_LENGTH {
        let length = value.chars().count();
        if length > MAX_STRING_LENGTH {
            return Err(format!(
                "String value length: {} is greater than maximum allowed length: {}",
                length, MAX_STRING_LENGTH
            ));
        }
    }
    for c in value.chars() {
        if c.is_whitespace() && !matches!(c, ' ' | '\t' | '\r' | '\n') {
            return Err(format!(
                "String value contains unsupported whitespace character: U+{:04X}",
                c as u32
            ));
        }
        if check_control_chars && c.is_control() && !matches!(c, '\t' | '\r' | '\n') {
            return Err(format!(
                "String value contains unsupported control character: U+{:04X}",
                c as u32
            ));
        }
    }
    if value.trim().is_empty() {
        return Err("String value must contain at least one non-whitespace character".to_string());
    }
    Ok(())
}

/// Codes: no leading or trailing whitespace and only single internal spaces.
pub fn check_code(value: &str) -> std::result::Result<(), String> {
    let well_formed = !value.is_empty()
        && value.split(' ').all(|token| {
            !token.is_empty() && !token.chars().any(char::is_whitespace)
        });
    if !well_formed {
        return Err(format!(
            "Code value: '{}' must not contain leading or trailing whitespace or consecutive spaces",
            value
        ));
    }
    Ok(())
}

pub fn check_id(value: &str) -> std::result::Result<(), String> {
    let valid_chars = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if value.is_empty() || value.len() > MAX_ID_LENGTH || !valid_chars {
        return Err(format!(
            "Id value: '{}' must be 1 to {} characters of [A-Za-z0-9\\-.]",
            value, MAX_ID_LENGTH
        ));
    }
    Ok(())
}

/// Years are written with exactly four digits, so 0001 to 9999.
pub fn check_year(year: i32, type_name: &str) -> std::result::Result<(), String> {
    if !(1..=9999).contains(&year) {
        return Err(format!(
            "{} value: year {} must be between 1 and 9999",
            type_name, year
        ));
    }
    Ok(())
}

fn check_month(month: u32, type_name: &str) -> std::result::Result<(), String> {
    if !(1..=12).contains(&month) {
        return Err(format!(
            "{} value: month {} must be between 1 and 12",
            type_name, month
        ));
    }
    Ok(())
}

pub fn check_date(value: &DateValue) -> std::result::Result<(), String> {
    match value {
        DateValue::Year(year) => check_year(*year, "date"),
        DateValue::YearMonth(year, month) => {
            check_year(*year, "date")?;
            check_month(*month, "date")
        }
        DateValue::Date(date) => check_year(date.year(), "date"),
    }
}

pub fn check_date_time(value: &DateTimeValue) -> std::result::Result<(), String> {
    match value {
        DateTimeValue::Year(year) => check_year(*year, "dateTime"),
        DateTimeValue::YearMonth(year, month) => {
            check_year(*year, "dateTime")?;
            check_month(*month, "dateTime")
        }
        DateTimeValue::Date(date) => check_year(date.year(), "dateTime"),
        DateTimeValue::DateTime(value) => check_year(value.year(), "dateTime"),
    }
}

pub fn check_uri(value: &str) -> std::result::Result<(), String> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(format!(
            "Uri value: '{}' must be non-empty and must not contain whitespace",
            value
        ));
    }
    Ok(())
}

pub fn check_min(value: i32, min: i32, type_name: &str) -> std::result::Result<(), String> {
    if value < min {
        return Err(format!(
            "{} value: {} must be greater than or equal to {}",
            type_name, value, min
        ));
    }
    Ok(())
}

/// Narrative content must be well-formed XML rooted at an XHTML `div`.
pub fn check_xhtml(value: &str) -> std::result::Result<(), String> {
    let document = roxmltree::Document::parse(value)
        .map_err(|e| format!("Xhtml value is not well-formed: {}", e))?;
    let root = document.root_element();
    if root.tag_name().name() != "div" || root.tag_name().namespace() != Some(XHTML_NAMESPACE) {
        return Err(format!(
            "Xhtml root element must be a <div> in the {} namespace",
            XHTML_NAMESPACE
        ));
    }
    Ok(())
}

/// Whether a reference string carries a URI scheme (`urn:`, `http:`, ...).
pub fn has_scheme(value: &str) -> bool {
    match value.find(':') {
        Some(index) => index > 0 && index + 1 < value.len(),
        None => false,
    }
}

/// Resource type named by a literal reference, or `None` for local and
/// absolute references, which are not checked.
fn literal_reference_type<'a>(value: &'a str, element: &str) -> Result<Option<&'a str>> {
    if value.starts_with('#') || has_scheme(value) {
        return Ok(None);
    }
    let resource_type = match value.find('?') {
        Some(index) => Some(&value[..index]),
        None => RELATIVE_REFERENCE
            .captures(value)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str()),
    };
    match resource_type {
        Some(resource_type) if is_resource_type(resource_type) => Ok(Some(resource_type)),
        Some(resource_type) => Err(Error::InvalidReference {
            element: element.to_string(),
            reference: value.to_string(),
            reason: format!("'{}' is not a valid resource type", resource_type),
        }),
        None => Err(Error::InvalidReference {
            element: element.to_string(),
            reference: value.to_string(),
            reason: "resource type not found".to_string(),
        }),
    }
}

fn not_allowed(element: &str, resource_type: &str, allowed: &[&str]) -> Error {
    Error::ReferenceTypeNotAllowed {
        element: element.to_string(),
        resource_type: resource_type.to_string(),
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
    }
}

/// Check a populated reference against the element's allow-list of target
/// resource types. An empty allow-list accepts any target.
pub fn check_reference_type(
    ctx: &ValidationContext,
    reference: Option<&Reference>,
    element: &str,
    allowed: &[&str],
) -> Result<()> {
    let Some(reference) = reference else {
        return Ok(());
    };
    if allowed.is_empty() {
        return Ok(());
    }
    if !ctx.config().check_reference_types {
        tracing::debug!(element, "Skipping reference type check");
        return Ok(());
    }

    let mut literal_type = None;
    if let Some(value) = reference.reference_value() {
        literal_type = literal_reference_type(value, element)?;
        if let Some(resource_type) = literal_type {
            if !allowed.contains(&resource_type) {
                return Err(not_allowed(element, resource_type, allowed));
            }
        }
    }

    if let Some(type_uri) = reference.type_value() {
        let resource_type = type_uri
            .strip_prefix(STRUCTURE_DEFINITION_PREFIX)
            .unwrap_or(type_uri);
        if !is_resource_type(resource_type) {
            return Err(Error::InvalidReference {
                element: element.to_string(),
                reference: type_uri.to_string(),
                reason: "Reference.type is not a valid resource type".to_string(),
            });
        }
        if !allowed.contains(&resource_type) {
            return Err(not_allowed(element, resource_type, allowed));
        }
        if let Some(literal) = literal_type {
            if literal != resource_type {
                return Err(Error::InvalidReference {
                    element: element.to_string(),
                    reference: reference.reference_value().unwrap_or_default().to_string(),
                    reason: format!(
                        "resource type '{}' does not match Reference.type '{}'",
                        literal, resource_type
                    ),
                });
            }
        }
    }
    Ok(())
}

pub fn check_reference_types(
    ctx: &ValidationContext,
    references: &[Reference],
    element: &str,
    allowed: &[&str],
) -> Result<()> {
    references
        .iter()
        .try_for_each(|reference| check_reference_type(ctx, Some(reference), element, allowed))
}

fn has_only_data_absent_reason(concept: &CodeableConcept) -> bool {
    concept.coding().is_empty()
        && concept.text().is_none()
        && concept
            .extension()
            .iter()
            .any(|ext| ext.url() == DATA_ABSENT_REASON_URL)
}

pub fn check_concept_binding(
    ctx: &mut ValidationContext,
    concept: Option<&CodeableConcept>,
    element: &str,
    binding: &Binding,
) -> Result<()> {
    let Some(concept) = concept else {
        return Ok(());
    };
    let codes: Vec<(Option<&str>, &str)> = concept
        .coding()
        .iter()
        .filter_map(|coding| coding.code_value().map(|code| (coding.system_value(), code)))
        .collect();

    if let Some(max_value_set) = binding.max_value_set {
        if ctx.config().extended_codeable_concept_validation
            && terminology::is_syntax_based(max_value_set)
            && !has_only_data_absent_reason(concept)
        {
            let conforms = codes.iter().any(|(system, code)| {
                system.is_some()
                    && terminology::validate_syntax(max_value_set, *system, code) == Some(true)
            });
            if !conforms {
                return Err(Error::ValueSetBinding {
                    element: element.to_string(),
                    value_set: max_value_set.to_string(),
                    reason: "no Coding with a valid system and code combination".to_string(),
                });
            }
        }
    }

    check_membership(ctx, element, binding, &codes)
}

pub fn check_concept_bindings(
    ctx: &mut ValidationContext,
    concepts: &[CodeableConcept],
    element: &str,
    binding: &Binding,
) -> Result<()> {
    concepts
        .iter()
        .try_for_each(|concept| check_concept_binding(ctx, Some(concept), element, binding))
}

pub fn check_code_binding(
    ctx: &mut ValidationContext,
    code: Option<&Code>,
    element: &str,
    binding: &Binding,
) -> Result<()> {
    check_value_binding(ctx, code.and_then(Code::as_str), element, binding)
}

/// Binding check for a `uri` carrying a code, such as `Reference.type`.
pub fn check_uri_binding(
    ctx: &mut ValidationContext,
    uri: Option<&Uri>,
    element: &str,
    binding: &Binding,
) -> Result<()> {
    check_value_binding(ctx, uri.and_then(Uri::as_str), element, binding)
}

fn check_value_binding(
    ctx: &mut ValidationContext,
    value: Option<&str>,
    element: &str,
    binding: &Binding,
) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if let Some(max_value_set) = binding.max_value_set {
        if ctx.config().extended_codeable_concept_validation
            && terminology::validate_syntax(max_value_set, None, value) == Some(false)
        {
            return Err(Error::ValueSetBinding {
                element: element.to_string(),
                value_set: max_value_set.to_string(),
                reason: format!("code '{}' is not valid", value),
            });
        }
    }
    check_membership(ctx, element, binding, &[(None, value)])
}

fn check_membership(
    ctx: &mut ValidationContext,
    element: &str,
    binding: &Binding,
    codes: &[(Option<&str>, &str)],
) -> Result<()> {
    if codes.is_empty() {
        return Ok(());
    }
    let value_set = binding.value_set;
    let config = Arc::clone(&ctx.config);
    let verdicts: Vec<Option<bool>> = if terminology::is_syntax_based(value_set) {
        codes
            .iter()
            .map(|(system, code)| terminology::validate_syntax(value_set, *system, code))
            .collect()
    } else if let Some(provider) = config.terminology.as_ref() {
        codes
            .iter()
            .map(|(system, code)| provider.contains(value_set, *system, code))
            .collect()
    } else {
        return Ok(());
    };

    let member = verdicts.contains(&Some(true));
    let known_miss = verdicts.contains(&Some(false));
    if member || !known_miss {
        return Ok(());
    }

    let listed = codes
        .iter()
        .map(|(_, code)| *code)
        .collect::<Vec<_>>()
        .join(", ");
    let reason = format!("code(s) [{}] not found in '{}' binding", listed, binding.name);
    if binding.strength.is_blocking() {
        return Err(Error::ValueSetBinding {
            element: element.to_string(),
            value_set: value_set.to_string(),
            reason,
        });
    }

    tracing::warn!(
        element,
        value_set,
        strength = %binding.strength,
        "Coded value does not conform to bound value set"
    );
    ctx.push(
        ValidationIssue::warning(
            IssueCode::CodeInvalid,
            format!("{} ({} binding to {})", reason, binding.strength, value_set),
        )
        .with_location(element),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_reject_blank_and_control_characters() {
        assert!(check_string("hello\tworld\r\n", true).is_ok());
        assert!(check_string("   ", true).is_err());
        assert!(check_string("bell\u{7}", true).is_err());
        assert!(check_string("bell\u{7}", false).is_ok());
        assert!(check_string("nbsp\u{a0}", false).is_err());
    }

    #[test]
    fn string_length_counts_characters() {
        let accented = "é".repeat(MAX_STRING_LENGTH);
        assert!(accented.len() > MAX_STRING_LENGTH);
        assert!(check_string(&accented, true).is_ok());

        let too_long = "a".repeat(MAX_STRING_LENGTH + 1);
        assert!(check_string(&too_long, true).is_err());
    }

    #[test]
    fn dates_stay_within_four_digit_years() {
        assert!(check_date(&DateValue::Year(2020)).is_ok());
        assert!(check_date(&DateValue::Year(0)).is_err());
        assert!(check_date(&DateValue::Year(123456)).is_err());
        assert!(check_date(&DateValue::YearMonth(2020, 13)).is_err());
        assert!(check_date_time(&DateTimeValue::YearMonth(2020, 0)).is_err());
        assert!(check_date_time(&DateTimeValue::YearMonth(2020, 12)).is_ok());
    }

    #[test]
    fn codes_allow_single_internal_spaces() {
        assert!(check_code("entered-in-error").is_ok());
        assert!(check_code("two words").is_ok());
        assert!(check_code(" leading").is_err());
        assert!(check_code("trailing ").is_err());
        assert!(check_code("double  space").is_err());
        assert!(check_code("tab\tinside").is_err());
        assert!(check_code("").is_err());
    }

    #[test]
    fn ids_are_bounded() {
        assert!(check_id("abc-123.X").is_ok());
        assert!(check_id(&"a".repeat(64)).is_ok());
        assert!(check_id(&"a".repeat(65)).is_err());
        assert!(check_id("has space").is_err());
        assert!(check_id("under_score").is_err());
    }

    #[test]
    fn xhtml_root_must_be_div() {
        assert!(check_xhtml(r#"<div xmlns="http://www.w3.org/1999/xhtml"><p>ok</p></div>"#).is_ok());
        assert!(check_xhtml("<div><p>no namespace</p></div>").is_err());
        assert!(check_xhtml(r#"<p xmlns="http://www.w3.org/1999/xhtml">x</p>"#).is_err());
        assert!(check_xhtml("<div").is_err());
    }

    #[test]
    fn scheme_detection() {
        assert!(has_scheme("urn:uuid:1234"));
        assert!(has_scheme("http://example.org/Patient/1"));
        assert!(!has_scheme("Patient/1"));
        assert!(!has_scheme(":missing"));
        assert!(!has_scheme("trailing:"));
    }

    #[test]
    fn literal_reference_types() {
        let element = "Test.subject";
        assert_eq!(literal_reference_type("Patient/123", element).unwrap(), Some("Patient"));
        assert_eq!(
            literal_reference_type("Patient/123/_history/2", element).unwrap(),
            Some("Patient")
        );
        assert_eq!(
            literal_reference_type("Patient?identifier=abc", element).unwrap(),
            Some("Patient")
        );
        assert_eq!(literal_reference_type("#contained", element).unwrap(), None);
        assert_eq!(literal_reference_type("urn:uuid:abc", element).unwrap(), None);
        assert!(literal_reference_type("Unicorn/1", element).is_err());
        assert!(literal_reference_type("garbage", element).is_err());
    }

    #[test]
    fn minimum_values() {
        assert!(check_min(1, 1, "positiveInt").is_ok());
        assert!(check_min(0, 1, "positiveInt").is_err());
        assert!(check_min(0, 0, "unsignedInt").is_ok());
    }
}
