use ferrum_models::json::{element_to_json_value, to_json_value};
use ferrum_models::prelude::*;
use serde_json::json;

fn coding(system: &str, code: &str, display: &str) -> Coding {
    Coding::builder()
        .system(system)
        .code(code)
        .display(display)
        .build()
        .unwrap()
}

#[test]
fn related_person_example() {
    let person = RelatedPerson::builder()
        .id("peter")
        .patient(Reference::builder().reference("Patient/animal").build().unwrap())
        .relationship([CodeableConcept::builder()
            .coding([coding(
                "http://terminology.hl7.org/CodeSystem/v3-RoleCode",
                "C",
                "Emergency Contact",
            )])
            .build()
            .unwrap()])
        .name([HumanName::builder()
            .use_(NameUse::Official)
            .family("Chalmers")
            .given(["Peter", "James"])
            .build()
            .unwrap()])
        .telecom([ContactPoint::builder()
            .system(ContactPointSystem::Phone)
            .value("(03) 5555 6473")
            .use_(ContactPointUse::Work)
            .build()
            .unwrap()])
        .gender(AdministrativeGender::Male)
        .birth_date(Date::parse("1980-06").unwrap())
        .period(Period::builder().start(DateTime::parse("2012-03-11").unwrap()).build().unwrap())
        .build()
        .unwrap();

    assert_eq!(
        to_json_value(&person),
        json!({
            "resourceType": "RelatedPerson",
            "id": "peter",
            "patient": { "reference": "Patient/animal" },
            "relationship": [{
                "coding": [{
                    "system": "http://terminology.hl7.org/CodeSystem/v3-RoleCode",
                    "code": "C",
                    "display": "Emergency Contact"
                }]
            }],
            "name": [{
                "use": "official",
                "family": "Chalmers",
                "given": ["Peter", "James"]
            }],
            "telecom": [{
                "system": "phone",
                "value": "(03) 5555 6473",
                "use": "work"
            }],
            "gender": "male",
            "birthDate": "1980-06",
            "period": { "start": "2012-03-11" }
        })
    );
}

#[test]
fn device_metric_with_timing_and_calibration() {
    let metric = DeviceMetric::builder()
        .type_(CodeableConcept::builder()
            .coding([coding("urn:iso:std:iso:11073:10101", "150456", "MDC_PULS_OXIM_SAT_O2")])
            .build()
            .unwrap())
        .source(Reference::builder().reference("Device/dev1").build().unwrap())
        .operational_status(DeviceMetricOperationalStatus::On)
        .category(DeviceMetricCategory::Measurement)
        .measurement_period(Timing::builder()
            .repeat(TimingRepeat::builder()
                .frequency(1)
                .period(1)
                .period_unit(UnitsOfTime::Second)
                .build()
                .unwrap())
            .build()
            .unwrap())
        .calibration([DeviceMetricCalibration::builder()
            .type_(DeviceMetricCalibrationType::TwoPoint)
            .state(DeviceMetricCalibrationState::Calibrated)
            .time(Instant::parse("2016-12-28T09:03:04-05:00").unwrap())
            .build()
            .unwrap()])
        .build()
        .unwrap();

    let value = to_json_value(&metric);
    assert_eq!(value["category"], json!("measurement"));
    assert_eq!(
        value["measurementPeriod"],
        json!({ "repeat": { "frequency": 1, "period": 1, "periodUnit": "s" } })
    );
    assert_eq!(
        value["calibration"],
        json!([{
            "type": "two-point",
            "state": "calibrated",
            "time": "2016-12-28T09:03:04-05:00"
        }])
    );
}

#[test]
fn media_created_choice_uses_suffix() {
    let media = Media::builder()
        .status(EventStatus::Completed)
        .created(Period::builder()
            .start(DateTime::parse("2016-03-15").unwrap())
            .build()
            .unwrap())
        .height(145)
        .width(126)
        .content(Attachment::builder()
            .content_type("image/gif")
            .data(vec![0x47, 0x49, 0x46])
            .build()
            .unwrap())
        .build()
        .unwrap();

    assert_eq!(
        to_json_value(&media),
        json!({
            "resourceType": "Media",
            "status": "completed",
            "createdPeriod": { "start": "2016-03-15" },
            "height": 145,
            "width": 126,
            "content": { "contentType": "image/gif", "data": "R0lG" }
        })
    );
}

#[test]
fn element_extensions_render_before_fields() {
    let extension = Extension::builder()
        .url("http://example.org/fhir/StructureDefinition/note")
        .value(FhirString::of("checked"))
        .build()
        .unwrap();
    let period = Period::builder()
        .id("p1")
        .extension([extension])
        .end(DateTime::parse("2020").unwrap())
        .build()
        .unwrap();

    assert_eq!(
        element_to_json_value(&period),
        json!({
            "id": "p1",
            "extension": [{
                "url": "http://example.org/fhir/StructureDefinition/note",
                "valueString": "checked"
            }],
            "end": "2020"
        })
    );
}

#[test]
fn collecting_visitor_sees_every_reference() {
    let entry = |literal: &str| {
        ListEntry::builder()
            .item(Reference::builder().reference(literal).build().unwrap())
            .build()
            .unwrap()
    };
    let list = List::builder()
        .status(ListStatus::Current)
        .mode(ListMode::Snapshot)
        .subject(Reference::builder().reference("Patient/example").build().unwrap())
        .entry([entry("Condition/1"), entry("Condition/2")])
        .build()
        .unwrap();

    let mut collector = CollectingVisitor::new(|node| match node {
        Node::Reference(reference) => reference.reference_value().map(str::to_string),
        _ => None,
    });
    list.accept_visitor(&mut collector);
    assert_eq!(
        collector.into_results(),
        ["Patient/example", "Condition/1", "Condition/2"]
    );
}
