//! Declarative generators for the mechanical parts of the model.

/// Implements `hash_code()` and `Hash` for a type carrying a `hash: HashMemo`
/// field. The structural hash covers the listed fields in order and is
/// computed at most once per instance.
macro_rules! memoized_hash {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $ty {
            /// Structural hash of this value, computed on first request and cached.
            pub fn hash_code(&self) -> u64 {
                self.hash.get_or_init(|| {
                    let mut hasher = std::collections::hash_map::DefaultHasher::new();
                    $( std::hash::Hash::hash(&self.$field, &mut hasher); )*
                    std::hash::Hasher::finish(&hasher)
                })
            }
        }

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                state.write_u64(self.hash_code());
            }
        }
    };
}

/// Generates a primitive element type (`id`, `extension`, `value`) with its
/// builder, element/visitor plumbing and value validation hook.
///
/// The per-type `PrimitiveType` impl (value rendering and value checks) is
/// written by hand next to the invocation.
///
/// The `zoned` form is for values holding a `chrono::DateTime<FixedOffset>`:
/// equality and hashing then cover the offset as well as the instant.
macro_rules! primitive {
    (
        $(#[$meta:meta])*
        $name:ident, $builder:ident, $value:ty, $fhir_name:literal, zoned
    ) => {
        primitive!(@define [$(#[$meta])* #[derive(Debug, Clone)]] $name, $builder, $value, $fhir_name);

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.base == other.base
                    && self.value.as_ref().map($crate::types::temporal::zoned_key)
                        == other.value.as_ref().map($crate::types::temporal::zoned_key)
            }
        }

        impl Eq for $name {}

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&self.base, state);
                let value = self.value.as_ref().map($crate::types::temporal::zoned_key);
                std::hash::Hash::hash(&value, state);
            }
        }
    };
    (
        $(#[$meta:meta])*
        $name:ident, $builder:ident, $value:ty, $fhir_name:literal
    ) => {
        primitive!(
            @define [$(#[$meta])* #[derive(Debug, Clone, PartialEq, Eq, Hash)]]
            $name, $builder, $value, $fhir_name
        );
    };
    (
        @define [$(#[$meta:meta])*]
        $name:ident, $builder:ident, $value:ty, $fhir_name:literal
    ) => {
        $(#[$meta])*
        pub struct $name {
            pub(crate) base: $crate::types::ElementBase,
            pub(crate) value: Option<$value>,
        }

        impl $name {
            /// Wraps a bare value with no id or extensions.
            pub fn of(value: impl Into<$value>) -> Self {
                Self {
                    base: $crate::types::ElementBase::default(),
                    value: Some(value.into()),
                }
            }

            pub fn builder() -> $builder {
                $builder::default()
            }

            pub fn to_builder(&self) -> $builder {
                $builder::from(self.clone())
            }

            pub fn value(&self) -> Option<&$value> {
                self.value.as_ref()
            }

            pub(crate) fn validate(
                &self,
                ctx: &mut $crate::validation::ValidationContext,
            ) -> $crate::error::Result<()> {
                self.base.validate(ctx, $fhir_name)?;
                $crate::validation::check_primitive(ctx, Some(self), $fhir_name)?;
                $crate::validation::require_value_or_children(self, $fhir_name)
            }
        }

        #[derive(Debug, Clone, Default)]
        pub struct $builder {
            base: $crate::types::ElementBase,
            value: Option<$value>,
        }

        impl $builder {
            pub fn value(mut self, value: impl Into<$value>) -> Self {
                self.value = Some(value.into());
                self
            }

            pub fn build(self) -> $crate::error::Result<$name> {
                self.build_with(&mut $crate::validation::ValidationContext::global())
            }

            pub fn build_with(
                self,
                ctx: &mut $crate::validation::ValidationContext,
            ) -> $crate::error::Result<$name> {
                let built = $name {
                    base: self.base,
                    value: self.value,
                };
                if ctx.validating() {
                    built.validate(ctx)?;
                }
                Ok(built)
            }
        }

        impl $crate::types::ElementBuilder for $builder {
            fn element_base_mut(&mut self) -> &mut $crate::types::ElementBase {
                &mut self.base
            }
        }

        impl From<$name> for $builder {
            fn from(primitive: $name) -> Self {
                Self {
                    base: primitive.base,
                    value: primitive.value,
                }
            }
        }

        impl $crate::types::Element for $name {
            fn element_base(&self) -> &$crate::types::ElementBase {
                &self.base
            }

            fn type_name(&self) -> &'static str {
                $fhir_name
            }

            fn has_value(&self) -> bool {
                self.value.is_some()
            }

            fn has_children(&self) -> bool {
                self.base.has_children()
            }
        }

        impl $crate::visitor::Visitable for $name {
            fn accept(
                &self,
                name: &str,
                index: Option<usize>,
                visitor: &mut dyn $crate::visitor::Visitor,
            ) {
                $crate::visitor::walk(name, index, $crate::visitor::Node::$name(self), visitor, |visitor| {
                    self.base.accept_children(visitor);
                    if let Some(value) = $crate::types::PrimitiveType::primitive_value(self) {
                        visitor.visit_value("value", value);
                    }
                });
            }
        }

        impl $crate::validation::CheckValue for $name {
            fn check(
                &self,
                ctx: &mut $crate::validation::ValidationContext,
                element: &str,
            ) -> $crate::error::Result<()> {
                $crate::validation::check_primitive(ctx, Some(self), element)
            }
        }
    };
}

/// Generates a code enum bound to a required value set, with its
/// `CodeValue`, `Display` and `FromStr` impls.
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $value_set:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $code)] $variant, )+
        }

        impl $crate::types::CodeValue for $name {
            const TYPE_NAME: &'static str = stringify!($name);
            const VALUE_SET: &'static str = $value_set;

            fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $code, )+
                }
            }

            fn from_code(code: &str) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )+
                    _ => None,
                }
            }

            fn values() -> &'static [Self] {
                &[ $( Self::$variant, )+ ]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::types::CodeValue::as_str(self))
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::Error;

            fn from_str(s: &str) -> $crate::error::Result<Self> {
                <Self as $crate::types::CodeValue>::from_code(s)
                    .ok_or_else(|| $crate::error::Error::parse(stringify!($name), s))
            }
        }
    };
}

/// Generates the sum type of a choice element (`value[x]`, `item[x]`, ...).
/// Variant names are the FHIR type names used as wire-name suffixes.
macro_rules! choice {
    (
        $(#[$meta:meta])*
        $name:ident { $( $variant:ident($ty:ty) ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant($ty), )+
        }

        impl $name {
            /// FHIR type name of the held alternative, as it suffixes the element name.
            pub fn type_suffix(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => stringify!($variant), )+
                }
            }

            /// Wire name of this choice under the element name `name`, e.g. `valueString`.
            pub fn element_name(&self, name: &str) -> String {
                format!("{}{}", name, self.type_suffix())
            }

            pub(crate) fn accept_choice(&self, name: &str, visitor: &mut dyn $crate::visitor::Visitor) {
                let element_name = self.element_name(name);
                match self {
                    $( Self::$variant(value) => {
                        $crate::visitor::Visitable::accept(value, &element_name, None, visitor)
                    } )+
                }
            }

            pub(crate) fn validate(
                &self,
                ctx: &mut $crate::validation::ValidationContext,
                element: &str,
            ) -> $crate::error::Result<()> {
                match self {
                    $( Self::$variant(value) => $crate::validation::CheckValue::check(value, ctx, element), )+
                }
            }
        }

        $(
            impl From<$ty> for $name {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}
