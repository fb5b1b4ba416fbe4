//! Node classification.
//!
//! [`classify`] turns a node into a closed [`Kind`] exactly once per visit.
//! The canonical precedence is:
//!
//! 1. empty (skipped, never visited)
//! 2. provider / consumer (context injection)
//! 3. composite (function or class component)
//! 4. collection (flattened before sequencing)
//! 5. leaf (text or number; visited, never recursed into)
//! 6. container (host element or portal; recurse into its children)

use treewalker_node::{
    ComponentClass, Consumer, ContextObject, Element, ElementType, FunctionComponent, Node,
};

/// The category of a node.
#[derive(Debug, Clone, Copy)]
pub enum Kind<'n> {
    /// No node.
    Empty,
    /// A provider element and the context object it supplies.
    Provider(&'n Element, &'n ContextObject),
    /// A consumer element.
    Consumer(&'n Consumer),
    /// A function component element.
    Function(&'n Element, &'n FunctionComponent),
    /// A class component element.
    Class(&'n Element, &'n ComponentClass),
    /// An ordered group of nodes.
    Collection(&'n [Node]),
    /// A text or numeric leaf.
    Leaf,
    /// A host element.
    Container(&'n Element),
    /// A portal-like indirection.
    Portal(&'n Element),
}

impl Kind<'_> {
    /// Short label used in trace logs.
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Empty => "empty",
            Kind::Provider(..) => "provider",
            Kind::Consumer(_) => "consumer",
            Kind::Function(..) => "function",
            Kind::Class(..) => "class",
            Kind::Collection(_) => "collection",
            Kind::Leaf => "leaf",
            Kind::Container(_) => "container",
            Kind::Portal(_) => "portal",
        }
    }

    /// Returns `true` for function and class components.
    pub fn is_composite(&self) -> bool {
        matches!(self, Kind::Function(..) | Kind::Class(..))
    }
}

/// Classifies a node.
pub fn classify(node: &Node) -> Kind<'_> {
    match node {
        Node::Empty => Kind::Empty,
        Node::List(nodes) => Kind::Collection(nodes),
        Node::Text(_) | Node::Number(_) => Kind::Leaf,
        Node::Element(element) => classify_element(element),
    }
}

fn classify_element(element: &Element) -> Kind<'_> {
    match element.element_type() {
        ElementType::Provider(context) => Kind::Provider(element, context),
        ElementType::Consumer(consumer) => Kind::Consumer(consumer),
        ElementType::Function(component) => Kind::Function(element, component),
        ElementType::Class(class) => Kind::Class(element, class),
        ElementType::Host(_) => Kind::Container(element),
        ElementType::Portal => Kind::Portal(element),
    }
}

/// Flattens a collection depth-first, dropping empty holes.
///
/// Nested collections are fully expanded in place, so the result is the exact
/// document order in which siblings must be visited.
pub fn flatten(nodes: &[Node]) -> Vec<&Node> {
    let mut out = Vec::with_capacity(nodes.len());
    flatten_into(nodes, &mut out);
    out
}

fn flatten_into<'n>(nodes: &'n [Node], out: &mut Vec<&'n Node>) {
    for node in nodes {
        match node {
            Node::Empty => {}
            Node::List(inner) => flatten_into(inner, out),
            other => out.push(other),
        }
    }
}
