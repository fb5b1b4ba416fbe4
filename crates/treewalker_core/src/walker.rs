//! Tree walking.
//!
//! The walker visits nodes depth-first, left-to-right. A node's children are
//! never started before the node's own visit has settled, and sibling `i + 1`
//! is never started before sibling `i`'s whole subtree has settled, so visit
//! order is exactly document order even when visitors defer their decisions.

use std::ops::ControlFlow;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use tracing::{debug, trace, warn};
use treewalker_node::{Context, Node};

use crate::classify::{Kind, classify, flatten};
use crate::instance::instantiate;
use crate::sequence::try_fold_series;
use crate::{VisitResult, Visitor, WalkError, WalkOptions};

/// Walks `root`, calling `visitor` once per visited node.
///
/// # Arguments
///
/// * `root` - The tree to walk
/// * `visitor` - Decides, per node, whether to descend into its children
/// * `context` - The context the root inherits
/// * `options` - Walk options
///
/// # Returns
///
/// `Ok(())` once every reachable node has settled, or the first failure.
/// After a failure no further visitor calls are made.
pub async fn walk<V>(
    root: &Node,
    visitor: &mut V,
    context: Context,
    options: &WalkOptions,
) -> Result<(), WalkError>
where
    V: Visitor + ?Sized,
{
    debug!("Walking tree (context entries: {})", context.len());

    match walk_node(root, visitor, context, options).await {
        Ok(()) => {
            debug!("Walk finished");
            Ok(())
        }
        Err(e) => {
            debug!("Walk failed: {}", e);
            Err(e)
        }
    }
}

/// Walks `root` with an empty context and default options.
pub async fn walk_with_defaults<V>(root: &Node, visitor: &mut V) -> Result<(), WalkError>
where
    V: Visitor + ?Sized,
{
    walk(root, visitor, Context::new(), &WalkOptions::default()).await
}

fn walk_node<'a, V>(
    node: &'a Node,
    visitor: &'a mut V,
    context: Context,
    options: &'a WalkOptions,
) -> LocalBoxFuture<'a, Result<(), WalkError>>
where
    V: Visitor + ?Sized,
{
    async move {
        let kind = classify(node);
        match kind {
            Kind::Empty => return Ok(()),
            // Collections are never visited as a unit.
            Kind::Collection(nodes) => return walk_siblings(nodes, visitor, &context, options).await,
            _ => {}
        }

        let mut frame = instantiate(kind, &context)?;

        trace!("Visiting {} node", kind.label());
        let result = visitor
            .visit(node, frame.instance.as_ref(), &context)
            .map_err(WalkError::Visitor)?;

        if settle(result).await?.is_break() {
            trace!("Visitor stopped at {} node", kind.label());
            return Ok(());
        }

        let children = frame.render_children()?;
        walk_children(&children, visitor, &frame.next_context, options).await?;

        if options.run_unmount_hook_after_visit
            && let Some(instance) = frame.instance.as_mut()
            && let Err(e) = instance.unmount()
        {
            warn!("Unmount hook of '{}' failed: {}", instance.name(), e);
        }

        Ok(())
    }
    .boxed_local()
}

async fn settle(result: VisitResult) -> Result<ControlFlow<()>, WalkError> {
    match result {
        VisitResult::Ready(flow) => Ok(flow),
        VisitResult::Deferred(pending) => {
            trace!("Waiting for deferred visit result");
            pending.await.map_err(WalkError::Visitor)
        }
    }
}

async fn walk_children<V>(
    children: &Node,
    visitor: &mut V,
    context: &Context,
    options: &WalkOptions,
) -> Result<(), WalkError>
where
    V: Visitor + ?Sized,
{
    match children {
        Node::Empty => Ok(()),
        Node::List(nodes) => walk_siblings(nodes, visitor, context, options).await,
        child => walk_node(child, visitor, context.clone(), options).await,
    }
}

async fn walk_siblings<V>(
    nodes: &[Node],
    visitor: &mut V,
    context: &Context,
    options: &WalkOptions,
) -> Result<(), WalkError>
where
    V: Visitor + ?Sized,
{
    try_fold_series(flatten(nodes), visitor, |visitor, child, _| {
        let context = context.clone();
        async move {
            walk_node(child, &mut *visitor, context, options).await?;
            Ok::<_, WalkError>(visitor)
        }
    })
    .await
    .map(|_| ())
}
