//! Node and Element definitions.
//!
//! The virtual element tree consumed by the walker.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;

use crate::{ComponentClass, Consumer, ContextObject, FunctionComponent, Props};

/// One point in a virtual element tree.
///
/// Nodes are immutable values. Cloning is cheap for elements (the payload is
/// shared behind an `Arc`); identity is structural, never by reference.
///
/// # Example
///
/// ```rust
/// use treewalker_node::{Element, Node};
///
/// let list: Node = Element::host("ul")
///     .with_children([
///         Element::host("li").with_child("one").into(),
///         Element::host("li").with_child("two").into(),
///     ])
///     .into();
///
/// assert_eq!(list.as_element().map(|e| e.element_type().name()), Some("ul"));
/// ```
#[derive(Debug, Clone, Default)]
pub enum Node {
    /// No node (null, undefined or a boolean hole). Skipped by the walker.
    #[default]
    Empty,
    /// A text leaf.
    Text(String),
    /// A numeric leaf.
    Number(f64),
    /// An ordered collection of nodes, possibly nested.
    List(Vec<Node>),
    /// An element: host markup, component, provider, consumer or portal.
    Element(Arc<Element>),
}

impl Node {
    /// Creates a text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates a numeric leaf.
    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    /// Creates a collection.
    pub fn list(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self::List(nodes.into_iter().collect())
    }

    /// Returns `true` for [`Node::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns `true` for text and numeric leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Number(_))
    }

    /// Returns `true` for elements.
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }

    /// Returns the element payload, if any.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the text of a text leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns `true` if both nodes share the same element payload.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Element(a), Self::Element(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(Arc::new(element))
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<Vec<Node>> for Node {
    fn from(nodes: Vec<Node>) -> Self {
        Self::List(nodes)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(node: Option<T>) -> Self {
        node.map(Into::into).unwrap_or_default()
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Empty => serializer.serialize_unit(),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Number(value) => serializer.serialize_f64(*value),
            Self::List(nodes) => nodes.serialize(serializer),
            Self::Element(element) => element.serialize(serializer),
        }
    }
}

/// What an element stands for.
#[derive(Clone)]
pub enum ElementType {
    /// Host markup such as `div`.
    Host(Arc<str>),
    /// A stateless function component.
    Function(FunctionComponent),
    /// A stateful class component.
    Class(ComponentClass),
    /// Supplies a value to consumers of a context object.
    Provider(ContextObject),
    /// Reads the innermost provided value of a context object.
    Consumer(Consumer),
    /// Indirection whose children are walked in place.
    Portal,
}

impl ElementType {
    /// Display name used in logs and serialized descriptions.
    pub fn name(&self) -> &str {
        match self {
            Self::Host(tag) => tag,
            Self::Function(component) => component.name(),
            Self::Class(class) => class.name(),
            Self::Provider(_) => "Context.Provider",
            Self::Consumer(_) => "Context.Consumer",
            Self::Portal => "Portal",
        }
    }

    /// Returns `true` for function and class components.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Function(_) | Self::Class(_))
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(tag) => f.debug_tuple("Host").field(tag).finish(),
            Self::Function(component) => f.debug_tuple("Function").field(&component.name()).finish(),
            Self::Class(class) => f.debug_tuple("Class").field(&class.name()).finish(),
            Self::Provider(_) => f.write_str("Provider"),
            Self::Consumer(_) => f.write_str("Consumer"),
            Self::Portal => f.write_str("Portal"),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An element: a type, a property bag and a nested children attribute.
#[derive(Debug, Clone)]
pub struct Element {
    element_type: ElementType,
    props: Props,
    children: Node,
    key: Option<String>,
}

impl Element {
    /// Creates an element of the given type with no props or children.
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            props: Props::new(),
            children: Node::Empty,
            key: None,
        }
    }

    /// Creates a host (markup) element.
    pub fn host(tag: impl Into<Arc<str>>) -> Self {
        Self::new(ElementType::Host(tag.into()))
    }

    /// Creates a function component element.
    pub fn function(component: FunctionComponent) -> Self {
        Self::new(ElementType::Function(component))
    }

    /// Creates a class component element.
    pub fn class(class: ComponentClass) -> Self {
        Self::new(ElementType::Class(class))
    }

    /// Creates a portal element.
    pub fn portal() -> Self {
        Self::new(ElementType::Portal)
    }

    /// Sets a single property.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Replaces the whole property bag.
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    /// Sets a single child.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children = child.into();
        self
    }

    /// Sets an ordered collection of children.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children = Node::list(children);
        self
    }

    /// Sets the reconciliation key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// The element's type.
    pub fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    /// The element's own properties (without component defaults).
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// The children attribute.
    pub fn children(&self) -> &Node {
        &self.children
    }

    /// The reconciliation key.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

impl Serialize for Element {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut len = 2; // type, props
        if self.key.is_some() {
            len += 1;
        }
        if !self.children.is_empty() {
            len += 1;
        }

        let mut state = serializer.serialize_map(Some(len))?;
        state.serialize_entry("type", self.element_type.name())?;
        if let Some(key) = &self.key {
            state.serialize_entry("key", key)?;
        }
        state.serialize_entry("props", &self.props)?;
        if !self.children.is_empty() {
            state.serialize_entry("children", &self.children)?;
        }
        state.end()
    }
}
