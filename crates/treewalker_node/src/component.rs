//! Function and class components.
//!
//! A function component is a plain render function over a [`Scope`].
//! A class component is described by a [`ComponentClass`] that constructs a
//! boxed [`Component`]; the walker owns the resulting instance and drives its
//! lifecycle hooks.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::props::merge_shallow;
use crate::{Context, Node, Props, State};

/// Error type produced by components and visitors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

type RenderFn = dyn Fn(Scope<'_>) -> Result<Node, BoxError> + Send + Sync;
type ConstructFn = dyn Fn(&mut Init<'_>) -> Result<Box<dyn Component>, BoxError> + Send + Sync;
type DeriveStateFn = dyn Fn(&Props, &State) -> Option<State> + Send + Sync;

/// A stateless component: a render function over merged props, children and
/// context. The scope's state is always empty.
#[derive(Clone)]
pub struct FunctionComponent {
    name: Arc<str>,
    default_props: Arc<Props>,
    render: Arc<RenderFn>,
}

impl FunctionComponent {
    /// Creates a function component.
    pub fn new<F>(name: impl Into<Arc<str>>, render: F) -> Self
    where
        F: Fn(Scope<'_>) -> Result<Node, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            default_props: Arc::new(Props::new()),
            render: Arc::new(render),
        }
    }

    /// Sets the default properties merged under each element's own props.
    pub fn with_default_props(mut self, props: Props) -> Self {
        self.default_props = Arc::new(props);
        self
    }

    /// Display name of the component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default properties.
    pub fn default_props(&self) -> &Props {
        &self.default_props
    }

    /// Invokes the render function.
    pub fn call(&self, props: &Props, children: &Node, context: &Context) -> Result<Node, BoxError> {
        let state = State::new();
        (self.render)(Scope::new(props, children, context, &state))
    }

    /// Returns `true` if both values refer to the same component definition.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for FunctionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionComponent")
            .field("name", &self.name)
            .field("default_props", &self.default_props)
            .finish_non_exhaustive()
    }
}

/// Describes a constructible, stateful component.
///
/// This is the analogue of a component class: it knows the display name, the
/// default properties, how to construct an instance and, optionally, how to
/// derive state from properties before the first render.
#[derive(Clone)]
pub struct ComponentClass {
    name: Arc<str>,
    default_props: Arc<Props>,
    construct: Arc<ConstructFn>,
    derive_state_from_props: Option<Arc<DeriveStateFn>>,
}

impl ComponentClass {
    /// Creates a class from a constructor.
    ///
    /// The constructor receives an [`Init`] with the merged props and the
    /// inherited context, and may set the initial state or override the
    /// props/context the instance will see.
    pub fn new<F>(name: impl Into<Arc<str>>, construct: F) -> Self
    where
        F: Fn(&mut Init<'_>) -> Result<Box<dyn Component>, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            default_props: Arc::new(Props::new()),
            construct: Arc::new(construct),
            derive_state_from_props: None,
        }
    }

    /// Creates a class whose constructor is `C::default()`.
    pub fn of<C>(name: impl Into<Arc<str>>) -> Self
    where
        C: Component + Default,
    {
        Self::new(name, |_init| Ok(Box::new(C::default())))
    }

    /// Sets the default properties merged under each element's own props.
    pub fn with_default_props(mut self, props: Props) -> Self {
        self.default_props = Arc::new(props);
        self
    }

    /// Declares a static "derive state from props" capability.
    ///
    /// When declared, it replaces the pre-mount hook: the walker calls it once
    /// before the first render and merges a `Some` result into state.
    pub fn with_derived_state<F>(mut self, derive: F) -> Self
    where
        F: Fn(&Props, &State) -> Option<State> + Send + Sync + 'static,
    {
        self.derive_state_from_props = Some(Arc::new(derive));
        self
    }

    /// Display name of the component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default properties.
    pub fn default_props(&self) -> &Props {
        &self.default_props
    }

    /// Returns `true` if the class declares a derive-state capability.
    pub fn derives_state(&self) -> bool {
        self.derive_state_from_props.is_some()
    }

    /// Runs the constructor.
    pub fn construct(&self, init: &mut Init<'_>) -> Result<Box<dyn Component>, BoxError> {
        (self.construct)(init)
    }

    /// Runs the derive-state capability, if declared.
    pub fn derive_state(&self, props: &Props, state: &State) -> Option<State> {
        self.derive_state_from_props
            .as_ref()
            .and_then(|derive| derive(props, state))
    }

    /// Returns `true` if both values refer to the same class definition.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.construct, &other.construct)
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.name)
            .field("default_props", &self.default_props)
            .field("derives_state", &self.derives_state())
            .finish_non_exhaustive()
    }
}

/// Construction-time view handed to a [`ComponentClass`] constructor.
///
/// Props and context default to the merged values; a constructor only calls
/// the `override_*` methods to replace them.
pub struct Init<'a> {
    props: &'a Props,
    context: &'a Context,
    props_override: Option<Props>,
    context_override: Option<Context>,
    state: State,
}

impl<'a> Init<'a> {
    /// Creates an init view over merged props and the inherited context.
    pub fn new(props: &'a Props, context: &'a Context) -> Self {
        Self {
            props,
            context,
            props_override: None,
            context_override: None,
            state: State::new(),
        }
    }

    /// Merged properties (defaults overridden by the element's own props).
    pub fn props(&self) -> &Props {
        self.props
    }

    /// The context inherited from ancestors.
    pub fn context(&self) -> &Context {
        self.context
    }

    /// Sets the initial state.
    pub fn set_initial_state(&mut self, state: State) {
        self.state = state;
    }

    /// Replaces the props the instance will observe.
    pub fn override_props(&mut self, props: Props) {
        self.props_override = Some(props);
    }

    /// Replaces the context the instance will observe.
    pub fn override_context(&mut self, context: Context) {
        self.context_override = Some(context);
    }

    /// Splits the view into `(props, context, initial state)`.
    ///
    /// Props and context fall back to the merged values when not overridden.
    pub fn into_parts(self) -> (Props, Context, State) {
        let props = self.props_override.unwrap_or_else(|| self.props.clone());
        let context = self
            .context_override
            .unwrap_or_else(|| self.context.clone());
        (props, context, self.state)
    }
}

/// Mutable view of an instance handed to lifecycle hooks.
///
/// State updates apply immediately: there is no batching and no deferred
/// flush, so a later [`Component::render`] in the same visit observes them.
pub struct Lifecycle<'a> {
    props: &'a Props,
    context: &'a Context,
    state: &'a mut State,
}

impl<'a> Lifecycle<'a> {
    /// Creates a lifecycle view.
    pub fn new(props: &'a Props, context: &'a Context, state: &'a mut State) -> Self {
        Self {
            props,
            context,
            state,
        }
    }

    /// Properties of the instance.
    pub fn props(&self) -> &Props {
        self.props
    }

    /// Context of the instance.
    pub fn context(&self) -> &Context {
        self.context
    }

    /// Current state.
    pub fn state(&self) -> &State {
        self.state
    }

    /// Shallowly merges a partial state into the current state.
    pub fn set_state(&mut self, partial: State) {
        merge_shallow(self.state, partial);
    }

    /// Computes a partial state from `(state, props, context)` and merges it.
    pub fn set_state_with<F>(&mut self, update: F)
    where
        F: FnOnce(&State, &Props, &Context) -> State,
    {
        let partial = update(self.state, self.props, self.context);
        merge_shallow(self.state, partial);
    }
}

/// Read-only view of a component used for rendering.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    props: &'a Props,
    children: &'a Node,
    context: &'a Context,
    state: &'a State,
}

impl<'a> Scope<'a> {
    /// Creates a read-only view.
    pub fn new(props: &'a Props, children: &'a Node, context: &'a Context, state: &'a State) -> Self {
        Self {
            props,
            children,
            context,
            state,
        }
    }

    /// Properties of the component.
    pub fn props(&self) -> &'a Props {
        self.props
    }

    /// The children attribute of the component's element.
    pub fn children(&self) -> &'a Node {
        self.children
    }

    /// Context of the component.
    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// Current state.
    pub fn state(&self) -> &'a State {
        self.state
    }

    /// Looks up a single property.
    pub fn prop(&self, key: &str) -> Option<&'a serde_json::Value> {
        self.props.get(key)
    }
}

/// A stateful component instance.
///
/// Only [`Component::render`] is required. The pre-mount hook
/// ([`Component::will_mount`]) covers both the regular and the legacy "unsafe"
/// pre-mount names of other component models.
pub trait Component: Any {
    /// Called once, synchronously, before the first render.
    fn will_mount(&mut self, lifecycle: &mut Lifecycle<'_>) -> Result<(), BoxError> {
        let _ = lifecycle;
        Ok(())
    }

    /// Produces the instance's children.
    fn render(&self, scope: Scope<'_>) -> Result<Node, BoxError>;

    /// Context entries contributed to descendants.
    fn child_context(&self, scope: Scope<'_>) -> Option<Props> {
        let _ = scope;
        None
    }

    /// Teardown hook, only called when the walker is asked to.
    fn will_unmount(&mut self, scope: Scope<'_>) -> Result<(), BoxError> {
        let _ = scope;
        Ok(())
    }
}

impl dyn Component {
    /// Downcasts to the concrete component type.
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}
