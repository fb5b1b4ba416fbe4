//! Provider/consumer context objects.
//!
//! A [`ContextObject`] is an identity plus a default value. Provider elements
//! bind a value to it for their subtree; consumer elements render their
//! children from the innermost bound value. Bindings live in
//! [`ProvidedValues`], an immutable chain carried by each walk's
//! [`Context`](crate::Context), never in the object itself.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::{BoxError, Element, ElementType, Node};

type ConsumeFn = dyn Fn(&Value) -> Result<Node, BoxError> + Send + Sync;

/// A value-based context-injection object.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use treewalker_node::{ContextObject, Node};
///
/// let theme = ContextObject::new(json!("light"));
/// let tree = theme.provider(
///     json!("dark"),
///     theme.consumer(|value| Ok(Node::text(value.as_str().unwrap_or_default()))),
/// );
///
/// assert!(tree.is_element());
/// assert_eq!(theme.default_value(), &json!("light"));
/// ```
#[derive(Clone)]
pub struct ContextObject {
    default_value: Arc<Value>,
}

impl ContextObject {
    /// Creates a context object; consumers outside any provider see
    /// `default_value`.
    pub fn new(default_value: Value) -> Self {
        Self {
            default_value: Arc::new(default_value),
        }
    }

    /// The value consumers see outside of any provider.
    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// Creates a provider element supplying `value` to `children`.
    pub fn provider(&self, value: Value, children: impl Into<Node>) -> Node {
        Element::new(ElementType::Provider(self.clone()))
            .with_prop("value", value)
            .with_child(children)
            .into()
    }

    /// Creates a consumer element whose children are produced by `render`.
    pub fn consumer<F>(&self, render: F) -> Node
    where
        F: Fn(&Value) -> Result<Node, BoxError> + Send + Sync + 'static,
    {
        Element::new(ElementType::Consumer(Consumer {
            context: self.clone(),
            render: Arc::new(render),
        }))
        .into()
    }

    /// Returns `true` if both handles refer to the same context object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.default_value, &other.default_value)
    }
}

impl fmt::Debug for ContextObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextObject")
            .field("default_value", &self.default_value)
            .finish()
    }
}

/// The render function of a consumer element, bound to its context object.
#[derive(Clone)]
pub struct Consumer {
    context: ContextObject,
    render: Arc<ConsumeFn>,
}

impl Consumer {
    /// The context object this consumer reads.
    pub fn context(&self) -> &ContextObject {
        &self.context
    }

    /// Renders the consumer's children from a value.
    pub fn render(&self, value: &Value) -> Result<Node, BoxError> {
        (self.render)(value)
    }

    /// Renders the consumer's children from the innermost value in `provided`.
    pub fn render_from(&self, provided: &ProvidedValues) -> Result<Node, BoxError> {
        self.render(provided.value_of(&self.context))
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

struct Binding {
    object: ContextObject,
    value: Value,
    parent: Option<Arc<Binding>>,
}

/// Provider bindings active at one point of a walk, innermost first.
///
/// Binding a value returns a new chain that shares its ancestors; nothing is
/// ever mutated, so concurrent walks and sibling branches cannot observe
/// each other's providers.
#[derive(Clone, Default)]
pub struct ProvidedValues {
    head: Option<Arc<Binding>>,
}

impl ProvidedValues {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a chain where `object` is bound to `value`.
    pub fn bind(&self, object: &ContextObject, value: Value) -> Self {
        Self {
            head: Some(Arc::new(Binding {
                object: object.clone(),
                value,
                parent: self.head.clone(),
            })),
        }
    }

    /// The innermost value bound to `object`, if any.
    pub fn get(&self, object: &ContextObject) -> Option<&Value> {
        self.bindings()
            .find(|binding| binding.object.ptr_eq(object))
            .map(|binding| &binding.value)
    }

    /// The innermost value bound to `object`, or its default value.
    pub fn value_of<'a>(&'a self, object: &'a ContextObject) -> &'a Value {
        self.get(object).unwrap_or_else(|| object.default_value())
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn bindings(&self) -> impl Iterator<Item = &Binding> {
        std::iter::successors(self.head.as_deref(), |binding| binding.parent.as_deref())
    }
}

impl PartialEq for ProvidedValues {
    fn eq(&self, other: &Self) -> bool {
        let mut left = self.bindings();
        let mut right = other.bindings();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if a.object.ptr_eq(&b.object) && a.value == b.value => {}
                _ => return false,
            }
        }
    }
}

impl fmt::Debug for ProvidedValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bindings().map(|binding| &binding.value))
            .finish()
    }
}
