//! Visitor trait for walking element trees.
//!
//! A visitor is invoked once per visited node with the node, the class
//! instance built for it (if any) and the context it inherited. Its
//! [`VisitResult`] decides whether the walker descends into the node's
//! children, either right away or once a deferred result settles.
//!
//! # Example
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use treewalker_core::{VisitResult, visit_fn};
//!
//! let mut texts = Vec::new();
//! let _visitor = visit_fn(move |node, _instance, _context| {
//!     if let Some(text) = node.as_text() {
//!         texts.push(text.to_string());
//!     }
//!     Ok(VisitResult::Ready(ControlFlow::Continue(())))
//! });
//! ```

use std::fmt;
use std::future::Future;
use std::ops::ControlFlow;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use treewalker_node::{BoxError, Context, Node};

use crate::Instance;

/// A pending visitor decision.
pub type Deferred = LocalBoxFuture<'static, Result<ControlFlow<()>, BoxError>>;

/// The visitor's decision for one node.
///
/// - `Ready(ControlFlow::Continue(()))` - descend into the children now
/// - `Ready(ControlFlow::Break(()))` - skip the children
/// - `Deferred(_)` - suspend this branch until the decision settles
pub enum VisitResult {
    /// A decision known synchronously.
    Ready(ControlFlow<()>),
    /// A decision that settles later; an error fails the whole walk.
    Deferred(Deferred),
}

impl VisitResult {
    /// Descend into the children.
    pub const CONTINUE: Self = Self::Ready(ControlFlow::Continue(()));

    /// Do not descend into the children.
    pub const STOP: Self = Self::Ready(ControlFlow::Break(()));

    /// Wraps a future resolving to the decision.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<ControlFlow<()>, BoxError>> + 'static,
    {
        Self::Deferred(future.boxed_local())
    }

    /// Returns `true` if the decision is pending.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Returns `true` for a synchronous stop.
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Ready(ControlFlow::Break(())))
    }
}

impl From<ControlFlow<()>> for VisitResult {
    fn from(flow: ControlFlow<()>) -> Self {
        Self::Ready(flow)
    }
}

impl From<()> for VisitResult {
    fn from(_: ()) -> Self {
        Self::CONTINUE
    }
}

/// `false` is the stop signal; `true` continues.
impl From<bool> for VisitResult {
    fn from(descend: bool) -> Self {
        if descend { Self::CONTINUE } else { Self::STOP }
    }
}

impl fmt::Debug for VisitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(flow) => f.debug_tuple("Ready").field(flow).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Visitor invoked once per visited node.
pub trait Visitor {
    /// Visits a node.
    ///
    /// # Arguments
    ///
    /// * `node` - The node being visited
    /// * `instance` - The class instance built for the node, if any
    /// * `context` - The context inherited from ancestors
    ///
    /// # Returns
    ///
    /// The descent decision, or an error that fails the whole walk.
    fn visit(
        &mut self,
        node: &Node,
        instance: Option<&Instance>,
        context: &Context,
    ) -> Result<VisitResult, BoxError>;
}

impl<V: Visitor + ?Sized> Visitor for &mut V {
    fn visit(
        &mut self,
        node: &Node,
        instance: Option<&Instance>,
        context: &Context,
    ) -> Result<VisitResult, BoxError> {
        (**self).visit(node, instance, context)
    }
}

/// A [`Visitor`] backed by a closure. Created by [`visit_fn`].
pub struct FnVisitor<F> {
    visit: F,
}

impl<F> Visitor for FnVisitor<F>
where
    F: FnMut(&Node, Option<&Instance>, &Context) -> Result<VisitResult, BoxError>,
{
    fn visit(
        &mut self,
        node: &Node,
        instance: Option<&Instance>,
        context: &Context,
    ) -> Result<VisitResult, BoxError> {
        (self.visit)(node, instance, context)
    }
}

/// Builds a visitor from a closure.
pub fn visit_fn<F>(visit: F) -> FnVisitor<F>
where
    F: FnMut(&Node, Option<&Instance>, &Context) -> Result<VisitResult, BoxError>,
{
    FnVisitor { visit }
}
