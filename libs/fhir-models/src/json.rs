//! FHIR JSON rendering.
//!
//! [`JsonWriter`] is a [`Visitor`] that rebuilds the walked tree as a
//! `serde_json::Value`. Keys follow the visitor order, so objects come out in
//! declaration order with `resourceType` first. Primitive `id`/`extension`
//! go to the `_name` companion key, and repeated primitives get a companion
//! array aligned with the values (`null` where an entry has neither).

use crate::error::Result;
use crate::resources::DomainResource;
use crate::visitor::{Node, PrimitiveValue, Visitable, Visitor};
use serde_json::{Map, Number, Value};

#[derive(Debug)]
enum Frame {
    Object(Map<String, Value>),
    Primitive {
        value: Option<Value>,
        extras: Map<String, Value>,
    },
    Array {
        values: Vec<Value>,
        companions: Vec<Value>,
        primitive: bool,
    },
}

/// A finished frame, ready to be attached to its parent.
struct Rendered {
    value: Value,
    companion: Option<Value>,
    primitive: bool,
}

impl Frame {
    fn finish(self) -> Rendered {
        match self {
            Frame::Object(map) => Rendered {
                value: Value::Object(map),
                companion: None,
                primitive: false,
            },
            Frame::Primitive { value, extras } => Rendered {
                value: value.unwrap_or(Value::Null),
                companion: (!extras.is_empty()).then_some(Value::Object(extras)),
                primitive: true,
            },
            Frame::Array {
                values,
                companions,
                primitive,
            } => {
                let companion = (primitive && companions.iter().any(|c| !c.is_null()))
                    .then_some(Value::Array(companions));
                Rendered {
                    value: Value::Array(values),
                    companion,
                    primitive: false,
                }
            }
        }
    }
}

/// Renders a visited model tree as FHIR JSON.
#[derive(Debug, Default)]
pub struct JsonWriter {
    stack: Vec<Frame>,
    root: Option<Value>,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rendered root, or `Value::Null` if nothing was visited.
    pub fn into_value(self) -> Value {
        self.root.unwrap_or(Value::Null)
    }

    fn attach(&mut self, name: &str, rendered: Rendered) {
        let Rendered {
            value,
            companion,
            primitive,
        } = rendered;
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(Frame::Object(map)) => {
                if !value.is_null() {
                    map.insert(name.to_string(), value);
                }
                if let Some(companion) = companion {
                    map.insert(format!("_{}", name), companion);
                }
            }
            Some(Frame::Primitive { extras, .. }) => {
                extras.insert(name.to_string(), value);
            }
            Some(Frame::Array {
                values,
                companions,
                primitive: primitive_list,
            }) => {
                values.push(value);
                companions.push(companion.unwrap_or(Value::Null));
                *primitive_list |= primitive;
            }
        }
    }
}

impl Visitor for JsonWriter {
    fn visit_start(&mut self, _name: &str, _index: Option<usize>, node: Node<'_>) {
        let frame = if node.is_primitive() {
            Frame::Primitive {
                value: None,
                extras: Map::new(),
            }
        } else {
            let mut map = Map::new();
            if let Some(resource) = node.as_resource() {
                map.insert("resourceType".to_string(), resource.resource_type().into());
            }
            Frame::Object(map)
        };
        self.stack.push(frame);
    }

    fn visit_end(&mut self, name: &str, _index: Option<usize>, _node: Node<'_>) {
        if let Some(frame) = self.stack.pop() {
            self.attach(name, frame.finish());
        }
    }

    fn visit_list_start(&mut self, _name: &str, len: usize) {
        self.stack.push(Frame::Array {
            values: Vec::with_capacity(len),
            companions: Vec::with_capacity(len),
            primitive: false,
        });
    }

    fn visit_list_end(&mut self, name: &str, _len: usize) {
        if let Some(frame) = self.stack.pop() {
            self.attach(name, frame.finish());
        }
    }

    fn visit_value(&mut self, name: &str, value: PrimitiveValue<'_>) {
        let rendered = primitive_json(value);
        match self.stack.last_mut() {
            Some(Frame::Primitive { value, .. }) if name == "value" => *value = Some(rendered),
            Some(Frame::Primitive { extras: map, .. }) | Some(Frame::Object(map)) => {
                map.insert(name.to_string(), rendered);
            }
            Some(Frame::Array { .. }) => {
                tracing::debug!(name, "Ignoring bare value inside a list");
            }
            None => self.root = Some(rendered),
        }
    }
}

fn primitive_json(value: PrimitiveValue<'_>) -> Value {
    match value {
        PrimitiveValue::Boolean(value) => Value::Bool(value),
        PrimitiveValue::Integer(value) => Value::from(value),
        PrimitiveValue::Decimal(value) => decimal_json(value),
        other => Value::String(other.to_string()),
    }
}

/// Decimals render with their exact digits, trailing zeros included.
fn decimal_json(value: rust_decimal::Decimal) -> Value {
    let literal = value.to_string();
    match literal.parse::<Number>() {
        Ok(number) => Value::Number(number),
        Err(_) => Value::String(literal),
    }
}

/// Render a resource as a FHIR JSON object.
pub fn to_json_value(resource: &dyn DomainResource) -> Value {
    let mut writer = JsonWriter::new();
    resource.accept_visitor(&mut writer);
    writer.into_value()
}

/// Render a datatype or backbone element. Primitives render as their bare
/// value.
pub fn element_to_json_value(element: &dyn Visitable) -> Value {
    let mut writer = JsonWriter::new();
    element.accept("", None, &mut writer);
    writer.into_value()
}

pub fn to_json_string(resource: &dyn DomainResource) -> Result<String> {
    Ok(serde_json::to_string(&to_json_value(resource))?)
}

pub fn to_json_string_pretty(resource: &dyn DomainResource) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json_value(resource))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::terminology::DATA_ABSENT_REASON_URL;
    use serde_json::json;

    fn paracetamol() -> CodeableConcept {
        CodeableConcept::builder()
            .coding([Coding::builder()
                .system("http://snomed.info/sct")
                .code("373444002")
                .display("Paracetamol")
                .build()
                .unwrap()])
            .build()
            .unwrap()
    }

    #[test]
    fn medication_renders_in_declaration_order() {
        let ingredient = MedicationIngredient::builder()
            .item(Reference::builder().reference("Substance/lactose").build().unwrap())
            .is_active(false)
            .build()
            .unwrap();
        let medication = Medication::builder()
            .id("med0301")
            .code(paracetamol())
            .status(MedicationStatus::Active)
            .ingredient([ingredient])
            .build()
            .unwrap();

        let value = to_json_value(&medication);
        assert_eq!(
            value,
            json!({
                "resourceType": "Medication",
                "id": "med0301",
                "code": {
                    "coding": [{
                        "system": "http://snomed.info/sct",
                        "code": "373444002",
                        "display": "Paracetamol"
                    }]
                },
                "status": "active",
                "ingredient": [{
                    "itemReference": { "reference": "Substance/lactose" },
                    "isActive": false
                }]
            })
        );
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["resourceType", "id", "code", "status", "ingredient"]);
    }

    #[test]
    fn primitive_lists_get_aligned_companions() {
        let absent = Extension::builder()
            .url(DATA_ABSENT_REASON_URL)
            .value(Code::of("unknown"))
            .build()
            .unwrap();
        let name = HumanName::builder()
            .family("Chalmers")
            .given([
                FhirString::of("Peter"),
                FhirString::builder().extension([absent]).build().unwrap(),
            ])
            .build()
            .unwrap();

        assert_eq!(
            element_to_json_value(&name),
            json!({
                "family": "Chalmers",
                "given": ["Peter", null],
                "_given": [null, {
                    "extension": [{
                        "url": DATA_ABSENT_REASON_URL,
                        "valueCode": "unknown"
                    }]
                }]
            })
        );
    }

    #[test]
    fn primitive_ids_go_to_the_companion() {
        let title = FhirString::builder().id("t1").value("Allergies").build().unwrap();
        let list = List::builder()
            .status(ListStatus::Current)
            .mode(ListMode::Working)
            .title(title)
            .build()
            .unwrap();
        let value = to_json_value(&list);
        assert_eq!(value["title"], json!("Allergies"));
        assert_eq!(value["_title"], json!({ "id": "t1" }));
    }

    #[test]
    fn decimals_keep_integers_integral() {
        let quantity = Quantity::builder().value(500).unit("mg").build().unwrap();
        assert_eq!(element_to_json_value(&quantity), json!({ "value": 500, "unit": "mg" }));

        let quantity = Quantity::builder()
            .value(rust_decimal::Decimal::new(5, 1))
            .build()
            .unwrap();
        assert_eq!(element_to_json_value(&quantity), json!({ "value": 0.5 }));
    }

    #[test]
    fn decimals_keep_their_precision() {
        let quantity = Quantity::builder()
            .value(rust_decimal::Decimal::new(150, 2))
            .unit("mg")
            .build()
            .unwrap();
        let value = element_to_json_value(&quantity);
        assert_eq!(
            value,
            json!({ "value": "1.50".parse::<Number>().unwrap(), "unit": "mg" })
        );
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"value":1.50,"unit":"mg"}"#);

        let precise: rust_decimal::Decimal = "0.1000000000000000055511151231".parse().unwrap();
        let quantity = Quantity::builder().value(precise).build().unwrap();
        assert_eq!(
            serde_json::to_string(&element_to_json_value(&quantity)).unwrap(),
            r#"{"value":0.1000000000000000055511151231}"#
        );
    }

    #[test]
    fn contained_resources_carry_their_type() {
        let substance = Substance::builder()
            .id("lactose")
            .code(CodeableConcept::builder().text("Lactose").build().unwrap())
            .build()
            .unwrap();
        let medication = Medication::builder().contained([substance]).build().unwrap();
        assert_eq!(
            to_json_value(&medication),
            json!({
                "resourceType": "Medication",
                "contained": [{
                    "resourceType": "Substance",
                    "id": "lactose",
                    "code": { "text": "Lactose" }
                }]
            })
        );
    }

    #[test]
    fn json_strings() {
        let medication = Medication::builder().id("m1").build().unwrap();
        assert_eq!(
            to_json_string(&medication).unwrap(),
            r#"{"resourceType":"Medication","id":"m1"}"#
        );
        assert!(to_json_string_pretty(&medication).unwrap().contains('\n'));
    }

    #[test]
    fn primitive_root_renders_bare_value() {
        assert_eq!(element_to_json_value(&Boolean::of(true)), json!(true));
    }
}
