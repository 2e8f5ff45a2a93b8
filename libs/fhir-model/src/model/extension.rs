//! Extension view

use super::node::{Buildable, Node};
use super::value::Value;
use crate::builder::{IntoElement, NodeBuilder};
use crate::config::ModelConfig;
use crate::error::Result;
use crate::schema::{extension_type, EXTENSION_TYPE};
use std::fmt;
use std::sync::Arc;

/// A node of the core `Extension` type.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Extension(Node);

impl Extension {
    /// Start an extension with its defining url.
    pub fn builder(url: impl Into<String>) -> ExtensionBuilder {
        ExtensionBuilder::new(ModelConfig::default()).url(url)
    }

    /// Wrap `node` if it is an `Extension`.
    pub fn from_node(node: Node) -> Option<Self> {
        node.is_a(EXTENSION_TYPE).then_some(Extension(node))
    }

    pub(crate) fn from_value(value: Value) -> Option<Self> {
        value.into_node().and_then(Self::from_node)
    }

    pub fn url(&self) -> Option<&str> {
        self.0.text("url")
    }

    pub fn value(&self) -> Option<&Value> {
        self.0.get("value")
    }

    pub fn as_node(&self) -> &Node {
        &self.0
    }

    pub fn into_node(self) -> Node {
        self.0
    }
}

impl Buildable for Extension {
    type Builder = ExtensionBuilder;

    fn to_builder(&self) -> ExtensionBuilder {
        ExtensionBuilder {
            inner: self.0.to_builder(),
        }
    }
}

impl TryFrom<Node> for Extension {
    type Error = Node;

    fn try_from(node: Node) -> std::result::Result<Self, Node> {
        if node.is_a(EXTENSION_TYPE) {
            Ok(Extension(node))
        } else {
            Err(node)
        }
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone)]
pub struct ExtensionBuilder {
    inner: NodeBuilder,
}

impl ExtensionBuilder {
    pub(crate) fn new(config: ModelConfig) -> Self {
        Self {
            inner: NodeBuilder::new(Arc::clone(extension_type())).with_config(config),
        }
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.inner = self.inner.set_text("url", url);
        self
    }

    /// Set `value[x]`; any leaf or a reference.
    pub fn value(mut self, value: impl IntoElement) -> Self {
        self.inner = self.inner.set("value", value);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.inner = self.inner.id(id);
        self
    }

    /// Append nested extensions.
    pub fn extension<I>(mut self, extensions: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoElement,
    {
        self.inner = self.inner.extension(extensions);
        self
    }

    pub fn build(self) -> Result<Extension> {
        self.inner.build().map(Extension)
    }
}
