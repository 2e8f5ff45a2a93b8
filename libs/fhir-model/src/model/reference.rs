//! Reference view and locator parsing

use super::node::{Buildable, Node};
use crate::builder::{IntoElement, NodeBuilder};
use crate::config::ModelConfig;
use crate::error::Result;
use crate::schema::{reference_type, REFERENCE_TYPE};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};

static RELATIVE_REFERENCE: OnceLock<Regex> = OnceLock::new();

fn relative_reference() -> &'static Regex {
    RELATIVE_REFERENCE.get_or_init(|| {
        Regex::new(
            r"^([A-Za-z][A-Za-z0-9]*)/([A-Za-z0-9\-.]{1,64})(?:/_history/([A-Za-z0-9\-.]{1,64}))?$",
        )
        .expect("valid relative reference regex")
    })
}

/// A parsed `Reference.reference` locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator<'a> {
    /// `#id`, pointing into the enclosing record's contained list
    Contained(&'a str),
    /// A value with a uri scheme (`urn:uuid:...`, `http://...`)
    Absolute(&'a str),
    /// `Type?search-params`
    Conditional { record_type: &'a str, query: &'a str },
    /// `Type/id` or `Type/id/_history/version`
    Relative {
        record_type: &'a str,
        id: &'a str,
        version: Option<&'a str>,
    },
    /// Anything else
    Unrecognized(&'a str),
}

impl<'a> Locator<'a> {
    pub fn parse(value: &'a str) -> Self {
        if let Some(id) = value.strip_prefix('#') {
            return Locator::Contained(id);
        }
        if has_scheme(value) {
            return Locator::Absolute(value);
        }
        if let Some((record_type, query)) = value.split_once('?') {
            return Locator::Conditional { record_type, query };
        }
        match relative_reference().captures(value) {
            Some(caps) => match (caps.get(1), caps.get(2)) {
                (Some(record_type), Some(id)) => Locator::Relative {
                    record_type: record_type.as_str(),
                    id: id.as_str(),
                    version: caps.get(3).map(|m| m.as_str()),
                },
                _ => Locator::Unrecognized(value),
            },
            None => Locator::Unrecognized(value),
        }
    }

    /// The record type the locator names, for relative and conditional forms.
    pub fn record_type(&self) -> Option<&'a str> {
        match self {
            Locator::Conditional { record_type, .. } | Locator::Relative { record_type, .. } => {
                Some(*record_type)
            }
            _ => None,
        }
    }
}

/// A prefix followed by `:` and a non-empty remainder.
fn has_scheme(value: &str) -> bool {
    matches!(value.find(':'), Some(i) if i > 0 && value.len() > i + 1)
}

/// A node of the core `Reference` type.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Reference(Node);

impl Reference {
    pub fn builder() -> ReferenceBuilder {
        ReferenceBuilder::from_builder(
            NodeBuilder::new(Arc::clone(reference_type())).with_config(ModelConfig::default()),
        )
    }

    /// Shorthand for a reference holding only a locator.
    pub fn to(locator: impl Into<String>) -> Result<Self> {
        Self::builder().reference(locator).build()
    }

    /// Wrap `node` if it is a `Reference`.
    pub fn from_node(node: Node) -> Option<Self> {
        node.is_a(REFERENCE_TYPE).then_some(Reference(node))
    }

    pub fn reference(&self) -> Option<&str> {
        self.0.text("reference")
    }

    /// The inline target type hint (`Reference.type`).
    pub fn type_hint(&self) -> Option<&str> {
        self.0.text("type")
    }

    pub fn display(&self) -> Option<&str> {
        self.0.text("display")
    }

    pub fn locator(&self) -> Option<Locator<'_>> {
        self.reference().map(Locator::parse)
    }

    pub fn as_node(&self) -> &Node {
        &self.0
    }

    pub fn into_node(self) -> Node {
        self.0
    }
}

impl Buildable for Reference {
    type Builder = ReferenceBuilder;

    fn to_builder(&self) -> ReferenceBuilder {
        ReferenceBuilder::from_builder(self.0.to_builder())
    }
}

impl TryFrom<Node> for Reference {
    type Error = Node;

    fn try_from(node: Node) -> std::result::Result<Self, Node> {
        if node.is_a(REFERENCE_TYPE) {
            Ok(Reference(node))
        } else {
            Err(node)
        }
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceBuilder {
    inner: NodeBuilder,
}

impl ReferenceBuilder {
    pub(crate) fn from_builder(inner: NodeBuilder) -> Self {
        Self { inner }
    }

    pub fn reference(mut self, locator: impl Into<String>) -> Self {
        self.inner = self.inner.set_text("reference", locator);
        self
    }

    pub fn type_hint(mut self, record_type: impl Into<String>) -> Self {
        self.inner = self.inner.set_text("type", record_type);
        self
    }

    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.inner = self.inner.set_text("display", display);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.inner = self.inner.id(id);
        self
    }

    pub fn extension<I>(mut self, extensions: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoElement,
    {
        self.inner = self.inner.extension(extensions);
        self
    }

    pub fn build(self) -> Result<Reference> {
        self.inner.build().map(Reference)
    }
}
