//! Tree visitor protocol.
//!
//! Every model type implements [`Visitable`]. `accept` walks the node in a
//! fixed pre-order: inherited framework fields first, then declared fields
//! in declaration order. Each node goes through four phases:
//!
//! 1. [`Visitor::pre_visit`] gates entry; `false` skips the node entirely.
//! 2. [`Visitor::visit_start`] is called.
//! 3. [`Visitor::visit`] gates descent; `false` prunes the children.
//! 4. [`Visitor::visit_end`] and [`Visitor::post_visit`] close the node.
//!
//! Repeated fields are bracketed by `visit_list_start`/`visit_list_end`
//! (empty lists are skipped). Leaf values (primitive values, element ids and
//! `Extension.url`) arrive through [`Visitor::visit_value`].

mod collecting;

pub use collecting::CollectingVisitor;

use crate::resources::{
    DeviceMetric, DeviceMetricCalibration, DocumentManifest, DocumentManifestRelated,
    DomainResource, List, ListEntry, Media, Medication, MedicationBatch, MedicationIngredient,
    Practitioner, PractitionerQualification, RelatedPerson, RelatedPersonCommunication,
    SubscriptionStatus, SubscriptionStatusNotificationEvent, Substance, SubstanceIngredient,
    SubstanceInstance,
};
use crate::types::temporal::{format_instant, format_time, DateTimeValue, DateValue};
use crate::types::{
    Address, Annotation, Attachment, Base64Binary, Boolean, Canonical, Code, CodeableConcept,
    CodedElement, Coding, ContactPoint, Date, DateTime, Decimal, Element, Extension, FhirString,
    HumanName, Id, Identifier, Instant, Integer, Markdown, Meta, Narrative, Period, PositiveInt,
    Quantity, Range, Ratio, Reference, Time, Timing, TimingRepeat, UnsignedInt, Uri, Url, Xhtml,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{FixedOffset, NaiveTime};
use std::fmt;

macro_rules! nodes {
    (
        primitives { $($p:ident),* $(,)? }
        elements { $($e:ident),* $(,)? }
        resources { $($r:ident),* $(,)? }
    ) => {
        /// A borrowed view of any visitable model node.
        #[derive(Debug, Clone, Copy)]
        pub enum Node<'a> {
            $( $p(&'a $p), )*
            /// A code bound to a required value set.
            Coded(&'a dyn CodedElement),
            $( $e(&'a $e), )*
            $( $r(&'a $r), )*
        }

        impl<'a> Node<'a> {
            /// FHIR type name of the node (`string`, `Coding`, `Medication`, ...).
            pub fn type_name(&self) -> &'static str {
                match self {
                    $( Node::$p(v) => Element::type_name(*v), )*
                    Node::Coded(v) => v.as_element().type_name(),
                    $( Node::$e(v) => Element::type_name(*v), )*
                    $( Node::$r(v) => DomainResource::resource_type(*v), )*
                }
            }

            pub fn is_primitive(&self) -> bool {
                matches!(self, $( Node::$p(_) | )* Node::Coded(_))
            }

            pub fn is_resource(&self) -> bool {
                matches!(self, $( Node::$r(_) )|*)
            }

            pub fn as_element(&self) -> Option<&'a dyn Element> {
                match *self {
                    $( Node::$p(v) => Some(v as &dyn Element), )*
                    Node::Coded(v) => Some(v.as_element()),
                    $( Node::$e(v) => Some(v as &dyn Element), )*
                    $( Node::$r(_) )|* => None,
                }
            }

            pub fn as_resource(&self) -> Option<&'a dyn DomainResource> {
                match *self {
                    $( Node::$r(v) => Some(v as &dyn DomainResource), )*
                    _ => None,
                }
            }
        }
    };
}

nodes! {
    primitives {
        Base64Binary, Boolean, Canonical, Code, Date, DateTime, Decimal, FhirString, Id,
        Instant, Integer, Markdown, PositiveInt, Time, UnsignedInt, Uri, Url, Xhtml,
    }
    elements {
        Address, Annotation, Attachment, CodeableConcept, Coding, ContactPoint, Extension,
        HumanName, Identifier, Meta, Narrative, Period, Quantity, Range, Ratio, Reference,
        Timing, TimingRepeat,
        DeviceMetricCalibration, DocumentManifestRelated, ListEntry, MedicationIngredient,
        MedicationBatch, PractitionerQualification, RelatedPersonCommunication,
        SubscriptionStatusNotificationEvent, SubstanceInstance, SubstanceIngredient,
    }
    resources {
        DeviceMetric, DocumentManifest, List, Media, Medication, Practitioner, RelatedPerson,
        SubscriptionStatus, Substance,
    }
}

/// A leaf value reported through [`Visitor::visit_value`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveValue<'a> {
    Boolean(bool),
    Integer(i32),
    Decimal(rust_decimal::Decimal),
    String(&'a str),
    Date(&'a DateValue),
    DateTime(&'a DateTimeValue),
    Instant(&'a chrono::DateTime<FixedOffset>),
    Time(&'a NaiveTime),
    Binary(&'a [u8]),
}

impl fmt::Display for PrimitiveValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Boolean(value) => write!(f, "{}", value),
            PrimitiveValue::Integer(value) => write!(f, "{}", value),
            PrimitiveValue::Decimal(value) => write!(f, "{}", value),
            PrimitiveValue::String(value) => f.write_str(value),
            PrimitiveValue::Date(value) => write!(f, "{}", value),
            PrimitiveValue::DateTime(value) => write!(f, "{}", value),
            PrimitiveValue::Instant(value) => f.write_str(&format_instant(value)),
            PrimitiveValue::Time(value) => f.write_str(&format_time(value)),
            PrimitiveValue::Binary(value) => f.write_str(&STANDARD.encode(value)),
        }
    }
}

/// Callbacks invoked while walking a model tree. Every hook has a no-op
/// default, so visitors override only what they need.
pub trait Visitor {
    fn pre_visit(&mut self, _node: Node<'_>) -> bool {
        true
    }

    fn visit_start(&mut self, _name: &str, _index: Option<usize>, _node: Node<'_>) {}

    fn visit(&mut self, _name: &str, _index: Option<usize>, _node: Node<'_>) -> bool {
        true
    }

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _node: Node<'_>) {}

    fn post_visit(&mut self, _node: Node<'_>) {}

    fn visit_list_start(&mut self, _name: &str, _len: usize) {}

    fn visit_list_end(&mut self, _name: &str, _len: usize) {}

    fn visit_value(&mut self, _name: &str, _value: PrimitiveValue<'_>) {}
}

pub trait Visitable {
    /// Walk this node under element name `name`. `index` is the position
    /// within a repeated field.
    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor);
}

/// Runs the four-phase protocol for `node`; `children` visits its fields.
pub fn walk(
    name: &str,
    index: Option<usize>,
    node: Node<'_>,
    visitor: &mut dyn Visitor,
    children: impl FnOnce(&mut dyn Visitor),
) {
    if visitor.pre_visit(node) {
        visitor.visit_start(name, index, node);
        if visitor.visit(name, index, node) {
            children(visitor);
        }
        visitor.visit_end(name, index, node);
        visitor.post_visit(node);
    }
}

pub fn accept_opt<T: Visitable + ?Sized>(value: Option<&T>, name: &str, visitor: &mut dyn Visitor) {
    if let Some(value) = value {
        value.accept(name, None, visitor);
    }
}

pub fn accept_list<T: Visitable>(values: &[T], name: &str, visitor: &mut dyn Visitor) {
    if values.is_empty() {
        return;
    }
    visitor.visit_list_start(name, values.len());
    for (index, value) in values.iter().enumerate() {
        value.accept(name, Some(index), visitor);
    }
    visitor.visit_list_end(name, values.len());
}

pub(crate) fn accept_str(value: Option<&str>, name: &str, visitor: &mut dyn Visitor) {
    if let Some(value) = value {
        visitor.visit_value(name, PrimitiveValue::String(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[derive(Default)]
    struct Trace {
        events: Vec<String>,
        prune: Option<&'static str>,
        skip: Option<&'static str>,
    }

    impl Visitor for Trace {
        fn pre_visit(&mut self, node: Node<'_>) -> bool {
            self.skip != Some(node.type_name())
        }

        fn visit_start(&mut self, name: &str, _index: Option<usize>, _node: Node<'_>) {
            self.events.push(format!("start {}", name));
        }

        fn visit(&mut self, _name: &str, _index: Option<usize>, node: Node<'_>) -> bool {
            self.prune != Some(node.type_name())
        }

        fn visit_end(&mut self, name: &str, _index: Option<usize>, _node: Node<'_>) {
            self.events.push(format!("end {}", name));
        }

        fn visit_value(&mut self, name: &str, value: PrimitiveValue<'_>) {
            self.events.push(format!("{}={}", name, value));
        }
    }

    fn coding() -> Coding {
        Coding::builder()
            .system("http://loinc.org")
            .code("1234-5")
            .build()
            .unwrap()
    }

    #[test]
    fn walks_in_declaration_order() {
        let mut trace = Trace::default();
        coding().accept("coding", None, &mut trace);
        assert_eq!(
            trace.events,
            vec![
                "start coding",
                "start system",
                "value=http://loinc.org",
                "end system",
                "start code",
                "value=1234-5",
                "end code",
                "end coding",
            ]
        );
    }

    #[test]
    fn visit_false_prunes_children_but_closes_node() {
        let mut trace = Trace {
            prune: Some("Coding"),
            ..Default::default()
        };
        coding().accept("coding", None, &mut trace);
        assert_eq!(trace.events, vec!["start coding", "end coding"]);
    }

    #[test]
    fn pre_visit_false_skips_node() {
        let mut trace = Trace {
            skip: Some("uri"),
            ..Default::default()
        };
        coding().accept("coding", None, &mut trace);
        assert_eq!(
            trace.events,
            vec!["start coding", "start code", "value=1234-5", "end code", "end coding"]
        );
    }

    #[test]
    fn node_classification() {
        let code = Code::of("x");
        let node = Node::Code(&code);
        assert!(node.is_primitive());
        assert!(!node.is_resource());
        assert_eq!(node.type_name(), "code");
        assert!(node.as_element().is_some());
        assert!(node.as_resource().is_none());
    }
}
