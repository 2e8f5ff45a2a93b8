#![allow(dead_code)]

use ferrum_model::{Leaf, Node, NodeBuilder, Reference, Schema};
use std::path::PathBuf;
use std::sync::{Once, OnceLock};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn load_fixture(relative: &str) -> String {
    let path = fixtures_root().join(relative);
    assert!(path.exists(), "fixture missing at {:?}", path);
    std::fs::read_to_string(&path).expect("failed to read fixture")
}

static TRACING: Once = Once::new();

/// Route `tracing` output to the test harness; `RUST_LOG=trace` shows it.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

static SCHEMA: OnceLock<Schema> = OnceLock::new();

pub fn schema() -> &'static Schema {
    SCHEMA.get_or_init(|| {
        init_tracing();
        Schema::from_json(&load_fixture("messaging-schema.json"))
            .expect("failed to load messaging schema fixture")
    })
}

pub fn builder(type_name: &str) -> NodeBuilder {
    schema()
        .builder(type_name)
        .unwrap_or_else(|e| panic!("no builder for {type_name}: {e}"))
}

pub fn coding(system: &str, code: &str) -> Node {
    builder("Coding")
        .set_text("system", system)
        .set_text("code", code)
        .build()
        .expect("valid coding")
}

pub fn organization(id: &str, name: &str) -> Node {
    builder("Organization")
        .id(id)
        .set_text("name", name)
        .build()
        .expect("valid organization")
}

pub fn source(endpoint: &str) -> Node {
    builder("MessageHeaderSource")
        .set_text("software", "ferrum")
        .set_text("endpoint", endpoint)
        .build()
        .expect("valid message source")
}

pub fn reference_to(record_type: &str, id: &str) -> Reference {
    schema()
        .reference()
        .reference(format!("{record_type}/{id}"))
        .type_hint(record_type)
        .build()
        .expect("valid reference")
}

/// A message header builder that builds as is.
pub fn message_header() -> NodeBuilder {
    builder("MessageHeader")
        .id("msg-1")
        .set(
            "event",
            coding("http://example.org/fhir/message-events", "admin-notify"),
        )
        .set("source", source("http://example.org/fhir/endpoint"))
        .set("sender", reference_to("Organization", "acme"))
        .set("definition", Leaf::canonical("http://example.org/fhir/MessageDefinition/notify"))
}
