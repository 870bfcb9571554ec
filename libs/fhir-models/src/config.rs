//! Model-wide validation settings.
//!
//! Every builder validates against a [`ModelConfig`]. `build()` uses the
//! process-global instance, `build_with()` takes an explicit
//! [`ValidationContext`](crate::validation::ValidationContext).

use crate::terminology::ValueSetMembership;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::{Arc, RwLock};

static GLOBAL_CONFIG: Lazy<RwLock<Arc<ModelConfig>>> =
    Lazy::new(|| RwLock::new(Arc::new(ModelConfig::from_env())));

const ENV_VALIDATING: &str = "FERRUM_MODEL_VALIDATING";
const ENV_CHECK_REFERENCE_TYPES: &str = "FERRUM_MODEL_CHECK_REFERENCE_TYPES";
const ENV_EXTENDED_CODEABLE_CONCEPT_VALIDATION: &str =
    "FERRUM_MODEL_EXTENDED_CODEABLE_CONCEPT_VALIDATION";
const ENV_CHECK_CONTROL_CHARS: &str = "FERRUM_MODEL_CHECK_CONTROL_CHARS";

#[derive(Clone)]
pub struct ModelConfig {
    /// Run validation in `build()`. When off, builders only assemble values.
    pub validating: bool,
    /// Check reference targets against each field's allow-list.
    pub check_reference_types: bool,
    /// Check codeable concepts against syntax-validated max value sets (BCP-47).
    pub extended_codeable_concept_validation: bool,
    /// Reject control characters other than tab, CR and LF in strings.
    pub check_control_chars: bool,
    /// Optional provider answering value-set membership questions.
    pub terminology: Option<Arc<dyn ValueSetMembership>>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            validating: true,
            check_reference_types: true,
            extended_codeable_concept_validation: true,
            check_control_chars: true,
            terminology: None,
        }
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("validating", &self.validating)
            .field("check_reference_types", &self.check_reference_types)
            .field(
                "extended_codeable_concept_validation",
                &self.extended_codeable_concept_validation,
            )
            .field("check_control_chars", &self.check_control_chars)
            .field("terminology", &self.terminology.is_some())
            .finish()
    }
}

impl ModelConfig {
    /// Default settings overridden by `FERRUM_MODEL_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            validating: env_flag(ENV_VALIDATING, defaults.validating),
            check_reference_types: env_flag(
                ENV_CHECK_REFERENCE_TYPES,
                defaults.check_reference_types,
            ),
            extended_codeable_concept_validation: env_flag(
                ENV_EXTENDED_CODEABLE_CONCEPT_VALIDATION,
                defaults.extended_codeable_concept_validation,
            ),
            check_control_chars: env_flag(ENV_CHECK_CONTROL_CHARS, defaults.check_control_chars),
            terminology: None,
        }
    }

    /// The process-global configuration used by `build()`.
    pub fn global() -> Arc<ModelConfig> {
        let guard = GLOBAL_CONFIG
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the process-global configuration.
    pub fn set_global(config: ModelConfig) {
        let mut guard = GLOBAL_CONFIG
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(config);
    }

    pub fn with_validating(mut self, validating: bool) -> Self {
        self.validating = validating;
        self
    }

    pub fn with_check_reference_types(mut self, check: bool) -> Self {
        self.check_reference_types = check;
        self
    }

    pub fn with_extended_codeable_concept_validation(mut self, check: bool) -> Self {
        self.extended_codeable_concept_validation = check;
        self
    }

    pub fn with_check_control_chars(mut self, check: bool) -> Self {
        self.check_control_chars = check;
        self
    }

    pub fn with_terminology(mut self, terminology: Arc<dyn ValueSetMembership>) -> Self {
        self.terminology = Some(terminology);
        self
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(raw) => parse_flag(&raw).unwrap_or_else(|| {
            tracing::warn!(variable = name, value = %raw, "Ignoring unrecognized boolean setting");
            default
        }),
        Err(_) => default,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_every_check() {
        let config = ModelConfig::default();
        assert!(config.validating);
        assert!(config.check_reference_types);
        assert!(config.extended_codeable_concept_validation);
        assert!(config.check_control_chars);
        assert!(config.terminology.is_none());
    }

    #[test]
    fn flags_parse_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn with_methods_override_defaults() {
        let config = ModelConfig::default()
            .with_check_reference_types(false)
            .with_validating(false);
        assert!(!config.check_reference_types);
        assert!(!config.validating);
        assert!(config.check_control_chars);
    }
}
