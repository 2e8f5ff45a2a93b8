use ferrum_model::{
    CollectingVisitor, Extension, Leaf, Node, Traversable, ValueRef, VisitFlow, Visitor,
};
use std::ops::ControlFlow;

mod test_support;

use test_support::{builder, coding, message_header, reference_to};

/// Records `field[index]` for every visited value, with list brackets.
#[derive(Default)]
struct Trace {
    events: Vec<String>,
    skip_field: Option<&'static str>,
    stop_at: Option<&'static str>,
}

impl Trace {
    fn label(field: &str, index: Option<usize>) -> String {
        match index {
            Some(i) => format!("{field}[{i}]"),
            None => field.to_string(),
        }
    }
}

impl<'a> Visitor<'a> for Trace {
    fn visit(&mut self, field: &'a str, index: Option<usize>, _value: ValueRef<'a>) -> VisitFlow {
        self.events.push(Self::label(field, index));
        if self.stop_at == Some(field) {
            VisitFlow::StopAll
        } else if self.skip_field == Some(field) {
            VisitFlow::SkipSubtree
        } else {
            VisitFlow::Continue
        }
    }

    fn visit_list_start(&mut self, field: &'a str, len: usize) -> VisitFlow {
        self.events.push(format!("<{field} {len}>"));
        VisitFlow::Continue
    }

    fn visit_list_end(&mut self, field: &'a str, _len: usize) {
        self.events.push(format!("</{field}>"));
    }
}

fn trace(node: &Node) -> Vec<String> {
    let mut visitor = Trace::default();
    assert_eq!(node.accept(&mut visitor), ControlFlow::Continue(()));
    visitor.events
}

#[test]
fn test_traversal_follows_declaration_order() {
    let org = builder("Organization")
        .set_text("name", "Acme")
        .add_text("alias", ["A", "B"])
        .set_bool("active", true)
        .build()
        .unwrap();

    assert_eq!(
        trace(&org),
        vec!["", "active", "name", "<alias 2>", "alias[0]", "alias[1]", "</alias>"]
    );
}

#[test]
fn test_traversal_visits_header_first() {
    let ext = Extension::builder("http://example.org/ext")
        .value(Leaf::string("x"))
        .build()
        .unwrap();
    let org = builder("Organization")
        .id("o1")
        .extension([ext])
        .set_text("name", "Acme")
        .build()
        .unwrap();

    assert_eq!(
        trace(&org),
        vec![
            "",
            "id",
            "<extension 1>",
            "extension[0]",
            "url",
            "value",
            "</extension>",
            "name",
        ]
    );
}

#[test]
fn test_skip_subtree_prunes_one_branch() {
    let header = message_header().build().unwrap();
    let mut visitor = Trace {
        skip_field: Some("source"),
        ..Trace::default()
    };
    let _ = header.accept(&mut visitor);

    assert!(visitor.events.contains(&"source".to_string()));
    assert!(!visitor.events.contains(&"endpoint".to_string()));
    // siblings after the pruned branch are still visited
    assert!(visitor.events.contains(&"definition".to_string()));
}

#[test]
fn test_stop_all_ends_the_walk() {
    let header = message_header().build().unwrap();
    let mut visitor = Trace {
        stop_at: Some("event"),
        ..Trace::default()
    };
    assert_eq!(header.accept(&mut visitor), ControlFlow::Break(()));
    assert_eq!(visitor.events.last().map(String::as_str), Some("event"));
    assert!(!visitor.events.contains(&"source".to_string()));
}

#[test]
fn test_collect_codings_across_tree() {
    let header = message_header()
        .set(
            "reason",
            builder("CodeableConcept")
                .add("coding", [coding("http://example.org", "a"), coding("http://example.org", "b")])
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let codes: Vec<_> = CollectingVisitor::collect(&header, "Coding")
        .into_iter()
        .filter_map(|v| v.as_node())
        .filter_map(|n| n.text("code"))
        .collect();
    assert_eq!(codes, vec!["admin-notify", "a", "b"]);
}

#[test]
fn test_collect_references_and_leaves() {
    let patient = builder("Patient")
        .add(
            "generalPractitioner",
            [reference_to("Practitioner", "dr1"), reference_to("Organization", "o1")],
        )
        .set("managingOrganization", reference_to("Organization", "o1"))
        .set_text("birthDate", "1980-05-17")
        .build()
        .unwrap();

    let mut visitor = CollectingVisitor::new("Reference");
    let _ = patient.accept(&mut visitor);
    assert_eq!(visitor.nodes().count(), 3);

    let dates = CollectingVisitor::collect(&patient, "date");
    assert_eq!(dates.len(), 1);
    assert_eq!(dates[0].as_leaf().and_then(Leaf::as_str), Some("1980-05-17"));
}
