//! # treewalker_core
//!
//! Traversal engine for virtual element trees.
//!
//! This crate provides:
//! - The [`walk`] entry point (depth-first, left-to-right, async-aware)
//! - The [`Visitor`] trait and its [`VisitResult`] decisions
//! - Node classification and component instantiation
//! - An ordered asynchronous fold used to sequence siblings
//!
//! ## Example
//!
//! ```rust,ignore
//! use treewalker_core::{Context, VisitResult, WalkOptions, visit_fn, walk};
//!
//! let mut names = Vec::new();
//! let mut visitor = visit_fn(|node, _instance, _context| {
//!     if let Some(element) = node.as_element() {
//!         names.push(element.element_type().name().to_string());
//!     }
//!     Ok(VisitResult::CONTINUE)
//! });
//!
//! walk(&tree, &mut visitor, Context::new(), &WalkOptions::default()).await?;
//! ```

pub mod classify;
mod config;
mod error;
mod instance;
pub mod sequence;
mod visitor;
mod walker;

pub use config::WalkOptions;
pub use error::WalkError;
pub use instance::Instance;
pub use visitor::{Deferred, FnVisitor, VisitResult, Visitor, visit_fn};
pub use walker::{walk, walk_with_defaults};


pub use treewalker_node::{
    BoxError, Component, ComponentClass, Context, ContextObject, Element, ElementType,
    FunctionComponent, Node, Props, State,
};
