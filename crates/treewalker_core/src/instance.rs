//! Component instantiation.
//!
//! For composite nodes this module builds the artifact the walker recurses
//! into. Function components are invoked right away; class components are
//! constructed, given synchronous state updates, mounted (derive-state or the
//! pre-mount hook) and only rendered once the visitor decided to descend.
//!
//! The result is a [`VisitFrame`]: the instance (if any), where the children
//! come from, and the context those children inherit.

use std::borrow::Cow;

use serde_json::Value;
use treewalker_node::{
    BoxError, Component, ComponentClass, Consumer, Context, Init, Lifecycle, Node, Props, Scope,
    State, merge_props, merge_shallow,
};

use crate::WalkError;
use crate::classify::Kind;

/// A constructed class component, owned by exactly one visit.
///
/// Instances are created fresh on every visit and never shared between
/// sibling branches.
pub struct Instance {
    class: ComponentClass,
    props: Props,
    children: Node,
    context: Context,
    state: State,
    component: Box<dyn Component>,
}

impl Instance {
    /// Constructs an instance from merged props, the element's children and
    /// the inherited context.
    pub fn construct(
        class: &ComponentClass,
        props: Props,
        children: Node,
        context: &Context,
    ) -> Result<Self, BoxError> {
        let mut init = Init::new(&props, context);
        let component = class.construct(&mut init)?;
        let (props, context, state) = init.into_parts();

        Ok(Self {
            class: class.clone(),
            props,
            children,
            context,
            state,
            component,
        })
    }

    /// Runs the pre-render phase exactly once.
    ///
    /// A declared derive-state capability takes precedence over the
    /// pre-mount hook; its `Some` result is merged into state.
    pub fn mount(&mut self) -> Result<(), BoxError> {
        if self.class.derives_state() {
            if let Some(derived) = self.class.derive_state(&self.props, &self.state) {
                merge_shallow(&mut self.state, derived);
            }
            return Ok(());
        }

        let mut lifecycle = Lifecycle::new(&self.props, &self.context, &mut self.state);
        self.component.will_mount(&mut lifecycle)
    }

    /// Calls the component's render operation.
    pub fn render(&self) -> Result<Node, BoxError> {
        self.component.render(self.scope())
    }

    /// Context entries the instance contributes to its descendants.
    pub fn child_context(&self) -> Option<Props> {
        self.component.child_context(self.scope())
    }

    /// Calls the component's unmount hook.
    pub fn unmount(&mut self) -> Result<(), BoxError> {
        let scope = Scope::new(&self.props, &self.children, &self.context, &self.state);
        self.component.will_unmount(scope)
    }

    /// Shallowly merges a partial state, immediately.
    pub fn set_state(&mut self, partial: State) {
        merge_shallow(&mut self.state, partial);
    }

    /// Read-only view of props, context and state.
    pub fn scope(&self) -> Scope<'_> {
        Scope::new(&self.props, &self.children, &self.context, &self.state)
    }

    /// Display name of the component class.
    pub fn name(&self) -> &str {
        self.class.name()
    }

    /// Merged properties.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Children attribute of the instance's element.
    pub fn children(&self) -> &Node {
        &self.children
    }

    /// Context the instance received.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Current state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The component object.
    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    /// Downcasts the component object to its concrete type.
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.component.downcast_ref::<T>()
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name())
            .field("props", &self.props)
            .field("context", &self.context)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Where a visited node's children come from.
#[derive(Debug)]
pub(crate) enum ChildSource<'n> {
    /// Nothing to descend into (leaves).
    None,
    /// The element's children attribute.
    Attribute(&'n Node),
    /// Output already computed by a function component.
    Computed(Node),
    /// The instance's render output, produced on demand.
    Render,
    /// A consumer's render function applied to the innermost provided value.
    Consume(&'n Consumer),
}

/// Everything the walker needs to finish one node after the visitor ran.
#[derive(Debug)]
pub(crate) struct VisitFrame<'n> {
    pub(crate) instance: Option<Instance>,
    pub(crate) children: ChildSource<'n>,
    pub(crate) next_context: Context,
}

impl<'n> VisitFrame<'n> {
    fn plain(children: ChildSource<'n>, context: &Context) -> Self {
        Self {
            instance: None,
            children,
            next_context: context.clone(),
        }
    }

    /// Produces the children to walk.
    pub(crate) fn render_children(&self) -> Result<Cow<'n, Node>, WalkError> {
        match &self.children {
            ChildSource::None => Ok(Cow::Owned(Node::Empty)),
            ChildSource::Attribute(children) => Ok(Cow::Borrowed(*children)),
            ChildSource::Computed(node) => Ok(Cow::Owned(node.clone())),
            ChildSource::Render => match &self.instance {
                Some(instance) => instance.render().map(Cow::Owned).map_err(WalkError::Component),
                None => Ok(Cow::Owned(Node::Empty)),
            },
            ChildSource::Consume(consumer) => consumer
                .render_from(self.next_context.provided())
                .map(Cow::Owned)
                .map_err(WalkError::Component),
        }
    }
}

/// Builds the visit frame for a classified node.
///
/// Function components are invoked here; class components are constructed
/// and mounted but not rendered.
pub(crate) fn instantiate<'n>(kind: Kind<'n>, context: &Context) -> Result<VisitFrame<'n>, WalkError> {
    let frame = match kind {
        Kind::Empty | Kind::Leaf | Kind::Collection(_) => VisitFrame::plain(ChildSource::None, context),
        Kind::Container(element) | Kind::Portal(element) => {
            VisitFrame::plain(ChildSource::Attribute(element.children()), context)
        }
        Kind::Provider(element, object) => {
            let value = element.props().get("value").cloned().unwrap_or(Value::Null);
            VisitFrame {
                next_context: context.provide(object, value),
                ..VisitFrame::plain(ChildSource::Attribute(element.children()), context)
            }
        }
        Kind::Consumer(consumer) => VisitFrame::plain(ChildSource::Consume(consumer), context),
        Kind::Function(element, component) => {
            let props = merge_props(component.default_props(), element.props());
            let output = component
                .call(&props, element.children(), context)
                .map_err(WalkError::Component)?;
            VisitFrame::plain(ChildSource::Computed(output), context)
        }
        Kind::Class(element, class) => {
            let props = merge_props(class.default_props(), element.props());
            let mut instance = Instance::construct(class, props, element.children().clone(), context)
                .map_err(WalkError::Component)?;
            instance.mount().map_err(WalkError::Component)?;

            let next_context = match instance.child_context() {
                Some(contribution) => context.extend(contribution),
                None => context.clone(),
            };

            VisitFrame {
                instance: Some(instance),
                children: ChildSource::Render,
                next_context,
            }
        }
    };
    Ok(frame)
}
