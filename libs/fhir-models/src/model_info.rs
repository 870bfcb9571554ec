//! Static field metadata for model types.
//!
//! The element tables list fields in declaration order, which is also the
//! order in which `accept` visits them and serializers emit them.

use crate::binding::{common, Binding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementInfo {
    pub name: &'static str,
    pub min: u32,
    pub repeating: bool,
    pub summary: bool,
    /// Type suffixes of a choice element (`value[x]`); empty otherwise.
    pub choice: &'static [&'static str],
    /// Allowed target resource types of a reference element; empty means any.
    pub targets: &'static [&'static str],
    pub binding: Option<Binding>,
}

impl ElementInfo {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            min: 0,
            repeating: false,
            summary: false,
            choice: &[],
            targets: &[],
            binding: None,
        }
    }

    pub const fn required(self) -> Self {
        Self { min: 1, ..self }
    }

    pub const fn repeating(self) -> Self {
        Self {
            repeating: true,
            ..self
        }
    }

    pub const fn summary(self) -> Self {
        Self {
            summary: true,
            ..self
        }
    }

    pub const fn choice(self, choice: &'static [&'static str]) -> Self {
        Self { choice, ..self }
    }

    pub const fn targets(self, targets: &'static [&'static str]) -> Self {
        Self { targets, ..self }
    }

    pub const fn binding(self, binding: Binding) -> Self {
        Self {
            binding: Some(binding),
            ..self
        }
    }

    pub fn is_required(&self) -> bool {
        self.min > 0
    }

    pub fn is_choice(&self) -> bool {
        !self.choice.is_empty()
    }

    /// Whether `element_name` is this element as it appears on the wire,
    /// including type-suffixed choice names.
    pub fn matches(&self, element_name: &str) -> bool {
        if self.is_choice() {
            element_name
                .strip_prefix(self.name)
                .is_some_and(|suffix| self.choice.contains(&suffix))
        } else {
            element_name == self.name
        }
    }
}

/// Metadata of a complex model type.
pub trait ModelInfo {
    const TYPE_NAME: &'static str;
    /// Elements inherited from the framework base type.
    const BASE_ELEMENTS: &'static [ElementInfo];
    /// Elements declared by the type itself.
    const ELEMENTS: &'static [ElementInfo];

    fn element_info(name: &str) -> Option<&'static ElementInfo> {
        Self::BASE_ELEMENTS
            .iter()
            .chain(Self::ELEMENTS.iter())
            .find(|info| info.matches(name))
    }

    fn all_elements() -> Vec<&'static ElementInfo> {
        Self::BASE_ELEMENTS
            .iter()
            .chain(Self::ELEMENTS.iter())
            .collect()
    }
}

pub const ELEMENT_BASE: &[ElementInfo] = &[
    ElementInfo::new("id"),
    ElementInfo::new("extension").repeating(),
];

pub const BACKBONE_ELEMENT_BASE: &[ElementInfo] = &[
    ElementInfo::new("id"),
    ElementInfo::new("extension").repeating(),
    ElementInfo::new("modifierExtension").repeating().summary(),
];

pub const DOMAIN_RESOURCE_BASE: &[ElementInfo] = &[
    ElementInfo::new("id").summary(),
    ElementInfo::new("meta").summary(),
    ElementInfo::new("implicitRules").summary(),
    ElementInfo::new("language").binding(common::LANGUAGE),
    ElementInfo::new("text"),
    ElementInfo::new("contained").repeating(),
    ElementInfo::new("extension").repeating(),
    ElementInfo::new("modifierExtension").repeating().summary(),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_elements_match_suffixed_names() {
        let info = ElementInfo::new("value").choice(&["String", "Boolean"]);
        assert!(info.matches("valueString"));
        assert!(info.matches("valueBoolean"));
        assert!(!info.matches("value"));
        assert!(!info.matches("valueQuantity"));
    }

    #[test]
    fn builder_methods_compose() {
        const INFO: ElementInfo = ElementInfo::new("subject")
            .required()
            .summary()
            .targets(&["Patient", "Group"]);
        assert!(INFO.is_required());
        assert!(INFO.summary);
        assert!(!INFO.repeating);
        assert_eq!(INFO.targets, &["Patient", "Group"]);
    }
}
