//! Walk error types.

use thiserror::Error;
use treewalker_node::BoxError;

/// The single terminal failure of a walk.
///
/// Visitor and component failures keep the original error value: `Display`
/// and `source()` are forwarded unchanged, and [`WalkError::downcast_ref`]
/// recovers the concrete type.
#[derive(Debug, Error)]
pub enum WalkError {
    /// The visitor failed, either synchronously or through a deferred result.
    #[error(transparent)]
    Visitor(BoxError),

    /// A component failed while being constructed, mounted or rendered.
    #[error(transparent)]
    Component(BoxError),

    /// Walk options could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WalkError {
    /// Creates a visitor error.
    pub fn visitor(error: impl Into<BoxError>) -> Self {
        Self::Visitor(error.into())
    }

    /// Creates a component error.
    pub fn component(error: impl Into<BoxError>) -> Self {
        Self::Component(error.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// The original error raised by a visitor or component.
    pub fn inner(&self) -> Option<&BoxError> {
        match self {
            Self::Visitor(error) | Self::Component(error) => Some(error),
            Self::Config(_) => None,
        }
    }

    /// Consumes the walk error and returns the original error.
    pub fn into_inner(self) -> Option<BoxError> {
        match self {
            Self::Visitor(error) | Self::Component(error) => Some(error),
            Self::Config(_) => None,
        }
    }

    /// Downcasts the original error to a concrete type.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.inner().and_then(|error| error.downcast_ref::<E>())
    }
}
