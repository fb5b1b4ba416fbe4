//! Ordered asynchronous folds.
//!
//! These combinators process an ordered sequence one item at a time: the
//! operation for item *i + 1* is not even created until the operation for
//! item *i* has fully settled. The first failure short-circuits every item
//! that has not started yet.
//!
//! This differs from unordered concurrent mapping (`join_all` and friends):
//! here ordering is the contract, not an optimization.

use std::future::Future;

/// Folds `items` in order, awaiting each step before starting the next.
///
/// The accumulator is moved into each step and handed back by it, which lets
/// a step own a mutable borrow (for example `&mut V`) for the duration of its
/// future.
///
/// # Arguments
///
/// * `items` - The ordered items; pulled lazily, one per step
/// * `init` - The initial accumulator
/// * `step` - Called with `(accumulator, item, index)`
///
/// # Returns
///
/// The final accumulator, or the first error.
pub async fn try_fold_series<I, T, E, F, Fut>(items: I, init: T, mut step: F) -> Result<T, E>
where
    I: IntoIterator,
    F: FnMut(T, I::Item, usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut acc = init;
    for (index, item) in items.into_iter().enumerate() {
        acc = step(acc, item, index).await?;
    }
    Ok(acc)
}

/// Maps `items` in order, awaiting each step before starting the next.
///
/// Results are returned in input order.
pub async fn try_map_series<I, T, E, F, Fut>(items: I, mut step: F) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item, usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    try_fold_series(items, Vec::new(), |mut acc, item, index| {
        let pending = step(item, index);
        async move {
            acc.push(pending.await?);
            Ok(acc)
        }
    })
    .await
}
