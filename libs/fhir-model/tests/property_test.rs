//! Property-based tests using QuickCheck

use ferrum_model::validation::primitives::check_string;
use ferrum_model::{Node, Traversable, ValueRef, VisitFlow, Visitor};
use quickcheck::{QuickCheck, TestResult};

mod test_support;

use test_support::builder;

fn valid_strings(values: &[String]) -> bool {
    values.iter().all(|s| check_string(s).is_ok())
}

fn organization_with_aliases(name: &str, aliases: &[String]) -> Node {
    builder("Organization")
        .set_text("name", name)
        .add_text("alias", aliases.iter().cloned())
        .build()
        .expect("aliases were pre-checked")
}

/// Counts entries visited under one field.
struct EntryCounter<'f> {
    field: &'f str,
    entries: usize,
    lists: usize,
}

impl<'a> Visitor<'a> for EntryCounter<'_> {
    fn visit(&mut self, field: &'a str, index: Option<usize>, _value: ValueRef<'a>) -> VisitFlow {
        if field == self.field && index.is_some() {
            self.entries += 1;
        }
        VisitFlow::Continue
    }

    fn visit_list_start(&mut self, field: &'a str, _len: usize) -> VisitFlow {
        if field == self.field {
            self.lists += 1;
        }
        VisitFlow::Continue
    }
}

/// Property: rebuilding a node yields an equal node with the same hash
#[test]
fn prop_to_builder_round_trip() {
    fn prop(name: String, aliases: Vec<String>) -> TestResult {
        if !valid_strings(&aliases) || check_string(&name).is_err() {
            return TestResult::discard();
        }
        let org = organization_with_aliases(&name, &aliases);
        let rebuilt = org.to_builder().build().unwrap();
        TestResult::from_bool(
            rebuilt == org && rebuilt.structural_hash() == org.structural_hash(),
        )
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(String, Vec<String>) -> TestResult);
}

/// Property: list entries keep their insertion order
#[test]
fn prop_list_order_preserved() {
    fn prop(aliases: Vec<String>) -> TestResult {
        if !valid_strings(&aliases) {
            return TestResult::discard();
        }
        let org = organization_with_aliases("Acme", &aliases);
        let stored: Vec<&str> = org
            .get_list("alias")
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        TestResult::from_bool(stored == aliases.iter().map(String::as_str).collect::<Vec<_>>())
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(Vec<String>) -> TestResult);
}

/// Property: a walk visits every list entry once, and empty lists produce no hooks
#[test]
fn prop_traversal_visits_each_entry() {
    fn prop(aliases: Vec<String>) -> TestResult {
        if !valid_strings(&aliases) {
            return TestResult::discard();
        }
        let org = organization_with_aliases("Acme", &aliases);
        let mut counter = EntryCounter {
            field: "alias",
            entries: 0,
            lists: 0,
        };
        let _ = org.accept(&mut counter);
        let expected_lists = usize::from(!aliases.is_empty());
        TestResult::from_bool(counter.entries == aliases.len() && counter.lists == expected_lists)
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(Vec<String>) -> TestResult);
}

/// Property: equal inputs give equal nodes; a different name breaks equality
#[test]
fn prop_equality_follows_content() {
    fn prop(a: String, b: String) -> TestResult {
        if check_string(&a).is_err() || check_string(&b).is_err() {
            return TestResult::discard();
        }
        let first = organization_with_aliases(&a, &[]);
        let second = organization_with_aliases(&a, &[]);
        let other = organization_with_aliases(&b, &[]);
        TestResult::from_bool(
            first == second
                && first.structural_hash() == second.structural_hash()
                && (first == other) == (a == b),
        )
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(String, String) -> TestResult);
}

/// Property: a null entry anywhere in a list is rejected at build
#[test]
fn prop_null_entry_rejected() {
    fn prop(len: u8, position: u8) -> TestResult {
        let len = usize::from(len % 8) + 1;
        let position = usize::from(position) % len;
        let entries: Vec<Option<&str>> = (0..len)
            .map(|i| if i == position { None } else { Some("alias") })
            .collect();
        let leaves = entries
            .into_iter()
            .map(|e| e.map(ferrum_model::Leaf::string));
        let result = builder("Organization").add("alias", leaves).build();
        TestResult::from_bool(matches!(
            result,
            Err(ferrum_model::Error::InvalidListElement { ref reason, .. })
                if *reason == format!("entry {position} is null")
        ))
    }

    QuickCheck::new()
        .tests(50)
        .quickcheck(prop as fn(u8, u8) -> TestResult);
}
