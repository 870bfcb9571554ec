use super::{Canonical, Coding, Element, ElementBase, ElementBuilder, HashMemo, Id, Instant, Uri};
use crate::error::Result;
use crate::model_info::{ElementInfo, ModelInfo, ELEMENT_BASE};
use crate::validation::{self, CheckValue, ValidationContext};
use crate::visitor::{accept_list, accept_opt, walk, Node, Visitable, Visitor};

/// The metadata about a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    base: ElementBase,
    version_id: Option<Id>,
    last_updated: Option<Instant>,
    source: Option<Uri>,
    profile: Vec<Canonical>,
    security: Vec<Coding>,
    tag: Vec<Coding>,
    hash: HashMemo,
}

memoized_hash!(Meta { base, version_id, last_updated, source, profile, security, tag });

impl Meta {
    pub fn builder() -> MetaBuilder {
        MetaBuilder::default()
    }

    pub fn to_builder(&self) -> MetaBuilder {
        MetaBuilder::from(self.clone())
    }

    pub fn version_id(&self) -> Option<&Id> {
        self.version_id.as_ref()
    }

    pub fn last_updated(&self) -> Option<&Instant> {
        self.last_updated.as_ref()
    }

    pub fn source(&self) -> Option<&Uri> {
        self.source.as_ref()
    }

    pub fn profile(&self) -> &[Canonical] {
        &self.profile
    }

    pub fn security(&self) -> &[Coding] {
        &self.security
    }

    pub fn tag(&self) -> &[Coding] {
        &self.tag
    }

    fn validate(&self, ctx: &mut ValidationContext) -> Result<()> {
        self.base.validate(ctx, "Meta")?;
        validation::check_primitive(ctx, self.version_id.as_ref(), "Meta.versionId")?;
        validation::check_primitive(ctx, self.last_updated.as_ref(), "Meta.lastUpdated")?;
        validation::check_primitive(ctx, self.source.as_ref(), "Meta.source")?;
        validation::check_primitives(ctx, &self.profile, "Meta.profile")?;
        validation::require_value_or_children(self, "Meta")
    }
}

impl Element for Meta {
    fn element_base(&self) -> &ElementBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "Meta"
    }

    fn has_children(&self) -> bool {
        self.base.has_children()
            || self.version_id.is_some()
            || self.last_updated.is_some()
            || self.source.is_some()
            || !self.profile.is_empty()
            || !self.security.is_empty()
            || !self.tag.is_empty()
    }
}

impl Visitable for Meta {
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        walk(name, index, Node::Meta(self), visitor, |visitor| {
            self.base.accept_children(visitor);
            accept_opt(self.version_id.as_ref(), "versionId", visitor);
            accept_opt(self.last_updated.as_ref(), "lastUpdated", visitor);
            accept_opt(self.source.as_ref(), "source", visitor);
            accept_list(&self.profile, "profile", visitor);
            accept_list(&self.security, "security", visitor);
            accept_list(&self.tag, "tag", visitor);
        });
    }
}

impl ModelInfo for Meta {
    const TYPE_NAME: &'static str = "Meta";
    const BASE_ELEMENTS: &'static [ElementInfo] = ELEMENT_BASE;
    const ELEMENTS: &'static [ElementInfo] = &[
        ElementInfo::new("versionId").summary(),
        ElementInfo::new("lastUpdated").summary(),
        ElementInfo::new("source").summary(),
        ElementInfo::new("profile").repeating().summary(),
        ElementInfo::new("security").repeating().summary(),
        ElementInfo::new("tag").repeating().summary(),
    ];
}

impl CheckValue for Meta {}

#[derive(Debug, Clone, Default)]
pub struct MetaBuilder {
    base: ElementBase,
    version_id: Option<Id>,
    last_updated: Option<Instant>,
    source: Option<Uri>,
    profile: Vec<Canonical>,
    security: Vec<Coding>,
    tag: Vec<Coding>,
}

impl MetaBuilder {
    pub fn version_id(mut self, version_id: impl Into<Id>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    pub fn last_updated(mut self, last_updated: impl Into<Instant>) -> Self {
        self.last_updated = Some(last_updated.into());
        self
    }

    pub fn source(mut self, source: impl Into<Uri>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn profile<I, T>(mut self, profile: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Canonical>,
    {
        self.profile.extend(profile.into_iter().map(Into::into));
        self
    }

    pub fn set_profile<I, T>(mut self, profile: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Canonical>,
    {
        self.profile = profile.into_iter().map(Into::into).collect();
        self
    }

    pub fn security(mut self, security: impl IntoIterator<Item = Coding>) -> Self {
        self.security.extend(security);
        self
    }

    pub fn set_security(mut self, security: impl IntoIterator<Item = Coding>) -> Self {
        self.security = security.into_iter().collect();
        self
    }

    pub fn tag(mut self, tag: impl IntoIterator<Item = Coding>) -> Self {
        self.tag.extend(tag);
        self
    }

    pub fn set_tag(mut self, tag: impl IntoIterator<Item = Coding>) -> Self {
        self.tag = tag.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<Meta> {
        self.build_with(&mut ValidationContext::global())
    }

    pub fn build_with(self, ctx: &mut ValidationContext) -> Result<Meta> {
        let meta = Meta {
            base: self.base,
            version_id: self.version_id,
            last_updated: self.last_updated,
            source: self.source,
            profile: self.profile,
            security: self.security,
            tag: self.tag,
            hash: HashMemo::default(),
        };
        if ctx.validating() {
            meta.validate(ctx)?;
        }
        Ok(meta)
    }
}

impl ElementBuilder for MetaBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl From<Meta> for MetaBuilder {
    fn from(meta: Meta) -> Self {
        Self {
            base: meta.base,
            version_id: meta.version_id,
            last_updated: meta.last_updated,
            source: meta.source,
            profile: meta.profile,
            security: meta.security,
            tag: meta.tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_accept_strings() {
        let meta = Meta::builder()
            .version_id("2")
            .profile(["http://hl7.org/fhir/StructureDefinition/vitalsigns"])
            .build()
            .unwrap();
        assert_eq!(meta.profile().len(), 1);
        assert!(Meta::builder().version_id("not valid").build().is_err());
    }
}
