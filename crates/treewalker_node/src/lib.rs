//! # treewalker_node
//!
//! Element and component model for treewalker.
//!
//! This crate provides the virtual element tree that `treewalker_core` walks:
//! immutable [`Node`] values, [`Element`]s with a property bag and a nested
//! children attribute, function and class components, inherited [`Context`]
//! and provider/consumer [`ContextObject`]s whose values travel with the context.
//!
//! ## Architecture
//!
//! - Nodes are cheap to clone (element payloads live behind an `Arc`)
//! - Nothing in a node is mutated after construction
//! - Component behavior is expressed through [`FunctionComponent`] and the
//!   [`Component`] trait, constructed via a [`ComponentClass`]
//!
//! ## Example
//!
//! ```rust
//! use treewalker_node::{Element, FunctionComponent, Node};
//!
//! let greeting = FunctionComponent::new("Greeting", |scope| {
//!     let name = scope.prop("name").and_then(|v| v.as_str()).unwrap_or("world");
//!     Ok(Element::host("h1").with_child(Node::text(format!("Hello {name}!"))).into())
//! });
//!
//! let tree: Node = Element::host("div")
//!     .with_children([
//!         Element::function(greeting).with_prop("name", "treewalker").into(),
//!         Node::text("footer"),
//!     ])
//!     .into();
//!
//! assert!(tree.is_element());
//! ```

mod component;
mod context;
mod node;
mod props;
mod provider;

pub use component::{BoxError, Component, ComponentClass, FunctionComponent, Init, Lifecycle, Scope};
pub use context::Context;
pub use node::{Element, ElementType, Node};
pub use props::{Props, State, merge_props, merge_shallow};
pub use provider::{Consumer, ContextObject, ProvidedValues};
