use ferrum_model::{
    Buildable, Error, Extension, Leaf, LeafKind, ModelConfig, Preset, Reference, ReferenceSource,
    Schema, Validatable, Value,
};
use std::collections::HashSet;

mod test_support;

use test_support::{builder, coding, message_header, organization, reference_to, schema, source};

// ============================================================================
// Message envelope
// ============================================================================

#[test]
fn test_message_header_round_trip() {
    let header = message_header().build().expect("valid message header");

    assert_eq!(header.id(), Some("msg-1"));
    let event = header.child("event").expect("event is a coding");
    assert_eq!(event.type_name(), "Coding");
    assert_eq!(event.text("code"), Some("admin-notify"));
    assert_eq!(
        header.child("source").and_then(|s| s.text("endpoint")),
        Some("http://example.org/fhir/endpoint")
    );

    let rebuilt = header.to_builder().build().unwrap();
    assert_eq!(rebuilt, header);
    assert_eq!(rebuilt.structural_hash(), header.structural_hash());
    // idempotent
    assert_eq!(rebuilt.to_builder().build().unwrap(), header);
}

#[test]
fn test_minimal_message_envelope() {
    let source = builder("MessageHeaderSource")
        .set_text("endpoint", "https://example.org/in")
        .build()
        .unwrap();
    let envelope = builder("MessageHeader")
        .set("event", Leaf::uri("http://example.org/evt"))
        .set("source", source.clone())
        .build()
        .unwrap();

    assert!(envelope.has_children());
    assert!(source.has_children());
    assert_eq!(envelope.to_builder().build().unwrap(), envelope);
    assert_eq!(envelope.get("event").and_then(Value::as_str), Some("http://example.org/evt"));

    let err = builder("MessageHeader")
        .set("event", Leaf::uri("http://example.org/evt"))
        .build()
        .unwrap_err();
    assert_eq!(err, Error::MissingRequiredField { field: "source".to_string() });
}

#[test]
fn test_leaf_payload_checked_under_lenient_preset() {
    let mut lenient = schema().clone();
    lenient.set_config(ModelConfig::preset(Preset::Lenient));

    let err = lenient
        .builder("Organization")
        .unwrap()
        .set("active", Leaf::new(LeafKind::Boolean, "yes"))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidLeafValue { ref field, .. } if field == "active"));

    // the text setter refuses to wrap text into a boolean leaf
    let err = lenient
        .builder("Organization")
        .unwrap()
        .set_text("active", "yes")
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidFieldType { ref field, .. } if field == "active"));

    // lexical rules stay off
    let patient = lenient
        .builder("Patient")
        .unwrap()
        .set_text("birthDate", "someday")
        .set_bool("active", true)
        .build()
        .unwrap();
    assert_eq!(
        patient.get("active").and_then(Value::as_leaf).and_then(Leaf::as_bool),
        Some(true)
    );
}

#[test]
fn test_native_values_on_choice_fields() {
    let patient = builder("Patient")
        .set_bool("deceased", true)
        .build()
        .unwrap();
    assert_eq!(patient.get("deceased").unwrap().type_name(), "boolean");

    let patient = builder("Patient")
        .set_text("deceased", "2024-03-01T08:00:00Z")
        .build()
        .unwrap();
    assert_eq!(patient.get("deceased").unwrap().type_name(), "dateTime");

    let err = builder("MessageHeader")
        .set_integer("event", 7)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidFieldType { ref field, .. } if field == "event"));
}

#[test]
fn test_message_header_event_as_uri() {
    let header = message_header()
        .set("event", Leaf::uri("http://example.org/fhir/message-events/notify"))
        .build()
        .unwrap();
    let event = header.get("event").unwrap();
    assert_eq!(event.type_name(), "uri");
    let def = header.type_def().field("event").unwrap();
    assert_eq!(def.choice_element_name(event), "eventUri");
}

#[test]
fn test_message_header_event_outside_choice() {
    let err = message_header()
        .set("event", Leaf::string("notify"))
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        Error::InvalidChoiceType {
            field: "event".to_string(),
            found: "string".to_string(),
            allowed: "Coding, uri".to_string(),
        }
    );
}

#[test]
fn test_message_header_requires_event_then_source() {
    let err = builder("MessageHeader").build().unwrap_err();
    assert_eq!(err, Error::MissingRequiredField { field: "event".to_string() });

    let err = message_header().clear("source").build().unwrap_err();
    assert_eq!(err, Error::MissingRequiredField { field: "source".to_string() });
    assert_eq!(err.to_string(), "Missing required element: 'source'");
}

#[test]
fn test_message_source_requires_endpoint() {
    let err = builder("MessageHeaderSource")
        .set_text("software", "ferrum")
        .build()
        .unwrap_err();
    assert_eq!(err, Error::MissingRequiredField { field: "endpoint".to_string() });
}

#[test]
fn test_message_header_sender_targets() {
    let err = message_header()
        .set("sender", reference_to("Patient", "p1"))
        .build()
        .unwrap_err();
    match err {
        Error::DisallowedReferenceTargetType {
            field,
            target,
            allowed,
            source_kind,
        } => {
            assert_eq!(field, "sender");
            assert_eq!(target, "Patient");
            assert_eq!(allowed, "Practitioner, Organization");
            assert_eq!(source_kind, ReferenceSource::TypeHint);
        }
        other => panic!("unexpected error: {other}"),
    }

    // focus has no declared targets
    let header = message_header()
        .add("focus", [reference_to("Patient", "p1"), reference_to("Device", "d1")])
        .build()
        .unwrap();
    assert_eq!(header.get_list("focus").len(), 2);
}

// ============================================================================
// Reference constraint
// ============================================================================

#[test]
fn test_reference_allow_list() {
    let accepted = builder("Organization")
        .set(
            "partOf",
            schema().reference().type_hint("Organization").display("Parent").build().unwrap(),
        )
        .build();
    assert!(accepted.is_ok());

    let rejected = builder("Organization")
        .set("partOf", schema().reference().type_hint("Patient").build().unwrap())
        .build()
        .unwrap_err();
    assert!(matches!(
        rejected,
        Error::DisallowedReferenceTargetType { ref target, .. } if target == "Patient"
    ));
}

#[test]
fn test_reference_without_hint_is_not_checked() {
    let org = builder("Organization")
        .set_reference("partOf", "Patient/p1")
        .build();
    assert!(org.is_ok());
}

#[test]
fn test_reference_checks_reach_repeated_and_nested_fields() {
    let err = builder("Patient")
        .add(
            "generalPractitioner",
            [reference_to("Practitioner", "dr1"), reference_to("Device", "d1")],
        )
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::DisallowedReferenceTargetType { ref field, ref target, .. }
            if field == "generalPractitioner" && target == "Device"
    ));

    let err = builder("Identifier")
        .set_text("value", "123")
        .set("assigner", reference_to("Practitioner", "dr1"))
        .build()
        .unwrap_err();
    assert_eq!(err.field(), Some("assigner"));
}

#[test]
fn test_strict_config_parses_locators() {
    let mut strict = schema().clone();
    strict.set_config(ModelConfig::preset(Preset::Strict));

    let partof = strict.reference().reference("Patient/p1").build().unwrap();
    let err = strict
        .builder("Organization")
        .unwrap()
        .set("partOf", partof.clone())
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::DisallowedReferenceTargetType { source_kind: ReferenceSource::Literal, .. }
    ));

    // the same value passes under the default policy
    assert!(builder("Organization").set("partOf", partof).build().is_ok());

    let mismatch = strict
        .reference()
        .reference("Organization/o1")
        .type_hint("Practitioner")
        .build()
        .unwrap();
    let err = strict
        .builder("MessageHeaderDestination")
        .unwrap()
        .set_text("endpoint", "http://example.org/in")
        .set("receiver", mismatch)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidReference { ref field, .. } if field == "receiver"));
}

// ============================================================================
// Choice, required and list rules
// ============================================================================

#[test]
fn test_choice_holds_exactly_one_alternative() {
    let patient = builder("Patient")
        .set("deceased", Leaf::boolean(false))
        .set("deceased", Leaf::date_time("2024-03-01T08:00:00Z"))
        .build()
        .unwrap();
    let deceased = patient.get("deceased").unwrap();
    assert_eq!(deceased.type_name(), "dateTime");
    assert_eq!(patient.get_list("deceased").len(), 1);
}

#[test]
fn test_null_list_entry_rejected_at_build() {
    let staged = builder("Organization").add("alias", [Some(Leaf::string("ACME")), None]);
    let err = staged.build().unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidListElement { ref field, ref reason } if field == "alias" && reason == "entry 1 is null"
    ));
}

#[test]
fn test_wrong_kind_list_entry() {
    let err = builder("Organization")
        .add("telecom", [coding("http://example.org", "x")])
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidListElement { ref field, .. } if field == "telecom"));
}

#[test]
fn test_non_empty_list_required() {
    let mut schema = Schema::new();
    schema
        .declare_all(vec![serde_json::from_value(serde_json::json!({
            "name": "Bundle",
            "kind": "record",
            "fields": [ { "name": "entry", "types": ["Resource"], "cardinality": "1..*" } ]
        }))
        .unwrap()])
        .unwrap();
    let err = schema.builder("Bundle").unwrap().build().unwrap_err();
    assert_eq!(err, Error::EmptyRequiredList { field: "entry".to_string() });

    let bundle = schema
        .builder("Bundle")
        .unwrap()
        .add("entry", [organization("o1", "Acme")])
        .build()
        .unwrap();
    assert!(bundle.get_list("entry")[0].as_node().unwrap().is_record());
}

// ============================================================================
// Empty elements
// ============================================================================

#[test]
fn test_empty_element_rule() {
    let err = builder("Coding").build().unwrap_err();
    assert_eq!(err, Error::EmptyElement { type_name: "Coding".to_string() });

    assert!(builder("Coding").id("c1").build().is_ok());
    let ext = Extension::builder("http://example.org/ext")
        .value(Leaf::boolean(true))
        .build()
        .unwrap();
    assert!(builder("Coding").extension([ext]).build().is_ok());
    assert!(builder("Coding").set_bool("userSelected", true).build().is_ok());

    // records may be empty
    assert!(builder("Organization").build().is_ok());
}

// ============================================================================
// Immutability, equality and hashing
// ============================================================================

#[test]
fn test_list_getters_are_stable() {
    let org = builder("Organization")
        .add_text("alias", ["A", "B"])
        .build()
        .unwrap();
    let first = org.get_list("alias").as_ptr();
    let second = org.get_list("alias").as_ptr();
    assert_eq!(first, second);

    let changed = org.to_builder().add_text("alias", ["C"]).build().unwrap();
    assert_eq!(org.get_list("alias").len(), 2);
    assert_eq!(changed.get_list("alias").len(), 3);
}

#[test]
fn test_structural_equality_ignores_identity() {
    let a = organization("o1", "Acme");
    let b = organization("o1", "Acme");
    let c = organization("o2", "Acme");
    assert_eq!(a, b);
    assert_ne!(a, c);

    let set: HashSet<_> = [a.clone(), b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
    assert!(set.contains(&a));
}

#[test]
fn test_field_order_does_not_matter_for_equality() {
    let a = builder("Coding")
        .set_text("code", "x")
        .set_text("system", "http://example.org")
        .build()
        .unwrap();
    let b = coding("http://example.org", "x");
    assert_eq!(a, b);
}

#[test]
fn test_extension_lookup() {
    let ext = Extension::builder("http://example.org/ext/rank")
        .value(Leaf::positive_int(1))
        .build()
        .unwrap();
    let other = Extension::builder("http://example.org/ext/other")
        .value(Leaf::string("x"))
        .build()
        .unwrap();
    let org = builder("Organization")
        .extension([ext.clone(), other])
        .build()
        .unwrap();
    let found: Vec<_> = org.extensions_by_url("http://example.org/ext/rank").collect();
    assert_eq!(found, vec![&ext]);
}

// ============================================================================
// Builder policy
// ============================================================================

#[test]
fn test_non_validating_builder_skips_schema_checks() {
    let header = builder("MessageHeader").validating(false).build().unwrap();
    assert!(header.get("event").is_none());
    assert!(!header.config().validating);

    // the policy travels with the node
    assert!(header.to_builder().build().is_ok());
    assert!(matches!(
        header.validate(),
        Err(Error::MissingRequiredField { .. })
    ));
    assert!(header.to_builder().validating(true).build().is_err());
}

#[test]
fn test_non_validating_builder_keeps_representability_checks() {
    let err = builder("MessageHeader")
        .validating(false)
        .extension([Value::from(coding("http://example.org", "x"))])
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidListElement { ref field, .. } if field == "extension"));
}

#[test]
fn test_leaf_values_checked_by_default() {
    let err = builder("Patient")
        .set_text("birthDate", "1990-02-30")
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidLeafValue { ref field, .. } if field == "birthDate"));

    let err = builder("ContactPoint")
        .set_integer("rank", 0)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidLeafValue { ref field, .. } if field == "rank"));

    let err = builder("Organization").id("not valid!").build().unwrap_err();
    assert!(matches!(err, Error::InvalidLeafValue { ref field, .. } if field == "id"));
}

#[test]
fn test_typed_reference_view() {
    let header = message_header().build().unwrap();
    let sender = header
        .child("sender")
        .cloned()
        .and_then(Reference::from_node)
        .expect("sender is a reference");
    assert_eq!(sender.reference(), Some("Organization/acme"));
    assert_eq!(sender.type_hint(), Some("Organization"));

    let rebuilt = Buildable::to_builder(&sender).display("Acme").build().unwrap();
    assert_eq!(rebuilt.display(), Some("Acme"));
    assert_eq!(sender.display(), None);
}

#[test]
fn test_nested_builders_compose() {
    let destination = builder("MessageHeaderDestination")
        .set_text("name", "lab")
        .set_text("endpoint", "http://example.org/lab")
        .set("receiver", reference_to("Organization", "lab"))
        .build()
        .unwrap();
    let header = message_header()
        .add("destination", [destination.clone(), destination])
        .set("reason", builder("CodeableConcept").set_text("text", "update").build().unwrap())
        .build()
        .unwrap();
    assert_eq!(header.get_list("destination").len(), 2);
    assert_eq!(
        header.child("reason").and_then(|r| r.text("text")),
        Some("update")
    );
    assert_eq!(
        source("http://example.org/a"),
        source("http://example.org/a")
    );
}
