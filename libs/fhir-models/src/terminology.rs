//! Value-set membership.
//!
//! Membership against enumerated value sets is answered by an optional
//! [`ValueSetMembership`] provider configured on
//! [`ModelConfig`](crate::config::ModelConfig). Value sets defined by a grammar
//! rather than an enumeration (languages, mime types) are checked here.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

pub const ALL_LANGUAGES: &str = "http://hl7.org/fhir/ValueSet/all-languages";
pub const BCP_47: &str = "urn:ietf:bcp:47";
pub const MIME_TYPES: &str = "http://hl7.org/fhir/ValueSet/mimetypes";
pub const BCP_13: &str = "urn:ietf:bcp:13";

pub const DATA_ABSENT_REASON_URL: &str =
    "http://hl7.org/fhir/StructureDefinition/data-absent-reason";

static LANGUAGE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"[A-Za-z]{2,3}(?:-[A-Za-z]{3}){0,3}|[A-Za-z]{4,8}",
        r")",
        r"(?:-[A-Za-z]{4})?",
        r"(?:-(?:[A-Za-z]{2}|[0-9]{3}))?",
        r"(?:-(?:[A-Za-z0-9]{5,8}|[0-9][A-Za-z0-9]{3}))*",
        r"(?:-[0-9A-WY-Za-wy-z](?:-[A-Za-z0-9]{2,8})+)*",
        r"(?:-[Xx](?:-[A-Za-z0-9]{1,8})+)?$",
        r"|^[Xx](?:-[A-Za-z0-9]{1,8})+$",
    ))
    .expect("language tag regex must compile")
});

static MIME_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*/[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*(?:\s*;.*)?$")
        .expect("mime type regex must compile")
});

/// Answers whether a code belongs to a value set.
///
/// `None` means the provider does not know the value set; the check is then
/// skipped rather than failed.
pub trait ValueSetMembership: Send + Sync {
    fn contains(&self, value_set: &str, system: Option<&str>, code: &str) -> Option<bool>;
}

/// Membership provider backed by explicitly registered codes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryValueSets {
    value_sets: HashMap<String, HashSet<(Option<String>, String)>>,
}

impl InMemoryValueSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `codes` from `system` as members of `value_set`.
    pub fn with_codes<'a>(
        mut self,
        value_set: &str,
        system: Option<&str>,
        codes: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let entry = self.value_sets.entry(strip_version(value_set).to_string()).or_default();
        for code in codes {
            entry.insert((system.map(str::to_string), code.to_string()));
        }
        self
    }
}

impl ValueSetMembership for InMemoryValueSets {
    fn contains(&self, value_set: &str, system: Option<&str>, code: &str) -> Option<bool> {
        let members = self.value_sets.get(strip_version(value_set))?;
        let key = (system.map(str::to_string), code.to_string());
        Some(members.contains(&key))
    }
}

/// Whether membership in `value_set` is decided by syntax.
pub fn is_syntax_based(value_set: &str) -> bool {
    matches!(strip_version(value_set), ALL_LANGUAGES | MIME_TYPES)
}

/// Syntax-based membership check. Returns `None` for value sets that are not
/// syntax-based.
pub fn validate_syntax(value_set: &str, system: Option<&str>, code: &str) -> Option<bool> {
    match strip_version(value_set) {
        ALL_LANGUAGES => Some(system.map_or(true, |s| s == BCP_47) && is_language_tag(code)),
        MIME_TYPES => Some(system.map_or(true, |s| s == BCP_13) && is_mime_type(code)),
        _ => None,
    }
}

/// BCP-47 language tag syntax.
pub fn is_language_tag(code: &str) -> bool {
    LANGUAGE_TAG.is_match(code)
}

/// BCP-13 mime type syntax.
pub fn is_mime_type(code: &str) -> bool {
    MIME_TYPE.is_match(code)
}

fn strip_version(value_set: &str) -> &str {
    value_set.split('|').next().unwrap_or(value_set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_tags() {
        for tag in ["en", "en-US", "zh-Hant-TW", "de-CH-1901", "x-klingon"] {
            assert!(is_language_tag(tag), "{tag} should be accepted");
        }
        for tag in ["", "english language", "e", "en_US", "-en"] {
            assert!(!is_language_tag(tag), "{tag} should be rejected");
        }
    }

    #[test]
    fn syntax_check_respects_system() {
        assert_eq!(validate_syntax(ALL_LANGUAGES, Some(BCP_47), "fr"), Some(true));
        assert_eq!(
            validate_syntax(ALL_LANGUAGES, Some("http://example.org"), "fr"),
            Some(false)
        );
        assert_eq!(validate_syntax("http://hl7.org/fhir/ValueSet/mimetypes|4.3.0", None, "image/png"), Some(true));
        assert_eq!(validate_syntax("http://example.org/vs", None, "x"), None);
    }

    #[test]
    fn in_memory_value_sets_ignore_version_suffix() {
        let vs = InMemoryValueSets::new().with_codes(
            "http://example.org/vs",
            Some("http://example.org/cs"),
            ["a", "b"],
        );
        assert_eq!(
            vs.contains("http://example.org/vs|1.0", Some("http://example.org/cs"), "a"),
            Some(true)
        );
        assert_eq!(
            vs.contains("http://example.org/vs", Some("http://example.org/cs"), "c"),
            Some(false)
        );
        assert_eq!(vs.contains("http://example.org/other", None, "a"), None);
    }
}
