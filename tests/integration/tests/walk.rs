//! Integration tests for tree walking
//!
//! Drives whole trees through `walk`: document-order data prefetching,
//! nested re-walks, failures, lifecycle hooks and context injection.

use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, try_join_all};
use parking_lot::Mutex;
use serde_json::{Value, json};
use treewalker_core::{
    BoxError, Component, ComponentClass, Context, ContextObject, Element, FunctionComponent,
    Instance, Node, State, VisitResult, Visitor, WalkError, WalkOptions, visit_fn, walk,
    walk_with_defaults,
};
use treewalker_node::{Lifecycle, Scope};

/// Renders its children inside a `div` and owns one piece of data.
struct Foo {
    something: i64,
}

impl Foo {
    /// Resolves the data after `5ms * something`, so later items settle later.
    fn fetch(&self) -> LocalBoxFuture<'static, Result<i64, BoxError>> {
        let something = self.something;
        async move {
            tokio::time::sleep(Duration::from_millis(5 * something.unsigned_abs())).await;
            Ok(something)
        }
        .boxed_local()
    }
}

impl Component for Foo {
    fn render(&self, scope: Scope<'_>) -> Result<Node, BoxError> {
        Ok(Element::host("div").with_child(scope.children().clone()).into())
    }
}

fn foo(something: i64) -> Element {
    let class = ComponentClass::new("Foo", |init| {
        let something = init.props()["something"].as_i64().unwrap_or_default();
        Ok(Box::new(Foo { something }))
    });
    Element::class(class).with_prop("something", something)
}

fn bob() -> FunctionComponent {
    FunctionComponent::new("Bob", |scope| {
        Ok(Element::host("div").with_child(scope.children().clone()).into())
    })
}

fn create_tree() -> Node {
    Element::host("div")
        .with_children([
            Element::host("h1").with_child("Hello World!").into(),
            foo(1).into(),
            foo(2)
                .with_child(Element::host("div").with_children([
                    Element::function(bob()).with_child(foo(4).with_child(foo(5))).into(),
                    Element::host("div").with_child("hi!").into(),
                ]))
                .into(),
            foo(3).into(),
        ])
        .into()
}

fn foo_of(instance: Option<&Instance>) -> Option<&Foo> {
    instance.and_then(|i| i.downcast_ref::<Foo>())
}

mod document_order {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn visits_data_components_in_document_order() {
        let tree = create_tree();
        let mut actual = Vec::new();

        let mut visitor = visit_fn(|_, instance, _| {
            if let Some(foo) = foo_of(instance) {
                actual.push(foo.something);
            }
            Ok(VisitResult::CONTINUE)
        });
        walk_with_defaults(&tree, &mut visitor).await.unwrap();

        assert_eq!(actual, vec![1, 2, 4, 5, 3]);
    }

    #[tokio::test]
    async fn deferred_visits_settle_in_document_order() {
        let tree = create_tree();
        let actual = Rc::new(RefCell::new(Vec::new()));

        let mut visitor = visit_fn(|_, instance, _| {
            let Some(foo) = foo_of(instance) else {
                return Ok(VisitResult::CONTINUE);
            };
            let fetch = foo.fetch();
            let actual = Rc::clone(&actual);
            Ok(VisitResult::deferred(async move {
                actual.borrow_mut().push(fetch.await?);
                Ok::<_, BoxError>(ControlFlow::Continue(()))
            }))
        });
        walk_with_defaults(&tree, &mut visitor).await.unwrap();

        // Foo(5) takes longest to resolve yet is still recorded before Foo(3).
        assert_eq!(*actual.borrow(), vec![1, 2, 4, 5, 3]);
    }
}

mod nested_rewalk {
    use super::*;
    use pretty_assertions::assert_eq;

    type Pending = (LocalBoxFuture<'static, Result<i64, BoxError>>, Node, Context);

    /// Stops at every data component below the root and queues its fetch.
    struct Prefetcher<'a> {
        root: &'a Node,
        fetch_root: bool,
        pending: Vec<Pending>,
    }

    impl Visitor for Prefetcher<'_> {
        fn visit(
            &mut self,
            node: &Node,
            instance: Option<&Instance>,
            context: &Context,
        ) -> Result<VisitResult, BoxError> {
            let skip_root = !self.fetch_root && node.ptr_eq(self.root);
            match foo_of(instance) {
                Some(foo) if !skip_root => {
                    self.pending.push((foo.fetch(), node.clone(), context.clone()));
                    Ok(VisitResult::STOP)
                }
                _ => Ok(VisitResult::CONTINUE),
            }
        }
    }

    fn fetch_level(
        root: Node,
        context: Context,
        fetch_root: bool,
        actual: Rc<RefCell<Vec<i64>>>,
    ) -> LocalBoxFuture<'static, Result<(), WalkError>> {
        async move {
            let mut prefetcher = Prefetcher {
                root: &root,
                fetch_root,
                pending: Vec::new(),
            };
            walk(&root, &mut prefetcher, context, &WalkOptions::default()).await?;

            let levels = prefetcher.pending.into_iter().map(|(fetch, element, context)| {
                let actual = Rc::clone(&actual);
                async move {
                    actual.borrow_mut().push(fetch.await.map_err(WalkError::Visitor)?);
                    fetch_level(element, context, false, actual).await
                }
            });
            try_join_all(levels).await?;
            Ok(())
        }
        .boxed_local()
    }

    #[tokio::test]
    async fn resolves_each_level_before_descending() {
        let actual = Rc::new(RefCell::new(Vec::new()));

        fetch_level(create_tree(), Context::new(), true, Rc::clone(&actual))
            .await
            .unwrap();

        assert_eq!(*actual.borrow(), vec![1, 2, 3, 4, 5]);
    }
}

mod failures {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, thiserror::Error)]
    #[error("fetch failed for {0}")]
    struct FetchFailed(i64);

    #[tokio::test]
    async fn stop_prunes_only_the_stopped_subtree() {
        let tree = create_tree();
        let mut actual = Vec::new();

        let mut visitor = visit_fn(|_, instance, _| {
            let Some(foo) = foo_of(instance) else {
                return Ok(VisitResult::CONTINUE);
            };
            actual.push(foo.something);
            Ok(VisitResult::from(foo.something != 4))
        });
        walk_with_defaults(&tree, &mut visitor).await.unwrap();

        assert_eq!(actual, vec![1, 2, 4, 3]);
    }

    #[tokio::test]
    async fn first_deferred_failure_wins() {
        let tree = create_tree();
        let visited = Rc::new(RefCell::new(Vec::new()));

        let mut visitor = visit_fn(|_, instance, _| {
            let Some(foo) = foo_of(instance) else {
                return Ok(VisitResult::CONTINUE);
            };
            let something = foo.something;
            visited.borrow_mut().push(something);
            Ok(VisitResult::deferred(async move {
                tokio::task::yield_now().await;
                if something == 2 {
                    return Err(FetchFailed(something).into());
                }
                Ok::<_, BoxError>(ControlFlow::Continue(()))
            }))
        });
        let err = walk_with_defaults(&tree, &mut visitor).await.unwrap_err();

        assert_eq!(err.to_string(), "fetch failed for 2");
        assert!(matches!(err.downcast_ref::<FetchFailed>(), Some(FetchFailed(2))));
        assert_eq!(*visited.borrow(), vec![1, 2]);
    }
}

mod lifecycle {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::{self, Layer};
    use tracing_subscriber::prelude::*;

    /// Collects the messages of captured events.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(Level, String)>>>);

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &Event<'_>, _ctx: layer::Context<'_, S>) {
            let mut message = MessageVisitor(String::new());
            event.record(&mut message);
            self.0.lock().push((*event.metadata().level(), message.0));
        }
    }

    struct Closable {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Component for Closable {
        fn will_mount(&mut self, lifecycle: &mut Lifecycle<'_>) -> Result<(), BoxError> {
            lifecycle.set_state(State::from_iter([("open".to_string(), json!(true))]));
            Ok(())
        }

        fn render(&self, scope: Scope<'_>) -> Result<Node, BoxError> {
            Ok(scope.children().clone())
        }

        fn will_unmount(&mut self, scope: Scope<'_>) -> Result<(), BoxError> {
            self.log.lock().push(format!("unmount {}", self.name));
            if scope.props().contains_key("fail") {
                return Err(format!("{} refused to unmount", self.name).into());
            }
            Ok(())
        }
    }

    fn closable(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Element {
        let log = Arc::clone(log);
        Element::class(ComponentClass::new(name, move |_| {
            Ok(Box::new(Closable {
                name,
                log: Arc::clone(&log),
            }))
        }))
    }

    #[tokio::test]
    async fn unmount_errors_are_logged_not_fatal() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry()
            .with(captured.clone().with_filter(EnvFilter::new("treewalker_core=warn")));
        let _guard = tracing::subscriber::set_default(subscriber);

        let log = Arc::new(Mutex::new(Vec::new()));
        let tree: Node = Element::host("div")
            .with_children([
                closable("outer", &log)
                    .with_child(closable("inner", &log).with_prop("fail", true))
                    .into(),
                closable("after", &log).into(),
            ])
            .into();

        let mut visitor = visit_fn(|_, instance, _| {
            if let Some(instance) = instance {
                log.lock().push(format!("visit {}", instance.name()));
                assert_eq!(instance.state().get("open"), Some(&json!(true)));
            }
            Ok(VisitResult::CONTINUE)
        });
        let options = WalkOptions::from_json(r#"{ "componentWillUnmount": true }"#).unwrap();
        walk(&tree, &mut visitor, Context::new(), &options).await.unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                "visit outer",
                "visit inner",
                "unmount inner",
                "unmount outer",
                "visit after",
                "unmount after",
            ]
        );
        assert_eq!(
            *captured.0.lock(),
            vec![(
                Level::WARN,
                "Unmount hook of 'inner' failed: inner refused to unmount".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn unmount_hook_is_off_by_default() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tree: Node = closable("only", &log).into();

        let mut visitor = visit_fn(|_, _, _| Ok(VisitResult::CONTINUE));
        walk_with_defaults(&tree, &mut visitor).await.unwrap();

        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn derived_state_takes_precedence_over_pre_mount_hook() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for_class = Arc::clone(&log);
        let class = ComponentClass::new("Derived", move |_| {
            Ok(Box::new(Closable {
                name: "derived",
                log: Arc::clone(&log_for_class),
            }))
        })
        .with_derived_state(|props, _| {
            Some(State::from_iter([("open".to_string(), props["open"].clone())]))
        });
        let tree: Node = Element::class(class).with_prop("open", false).into();
        let mut state = None;

        let mut visitor = visit_fn(|_, instance, _| {
            state = instance.map(|i| i.state().clone());
            Ok(VisitResult::CONTINUE)
        });
        walk_with_defaults(&tree, &mut visitor).await.unwrap();

        assert_eq!(state, Some(State::from_iter([("open".to_string(), json!(false))])));
        assert!(log.lock().is_empty());
    }
}

mod context {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use treewalker_core::Props;

    struct Baz;

    impl Component for Baz {
        fn render(&self, scope: Scope<'_>) -> Result<Node, BoxError> {
            Ok(Element::host("div").with_child(scope.children().clone()).into())
        }

        fn child_context(&self, _scope: Scope<'_>) -> Option<Props> {
            Some(Props::from_iter([("foo".to_string(), json!("bar"))]))
        }
    }

    fn recorder(seen: &Arc<Mutex<Vec<Context>>>) -> FunctionComponent {
        let seen = Arc::clone(seen);
        FunctionComponent::new("Qux", move |scope| {
            seen.lock().push(scope.context().clone());
            Ok(Element::host("div").with_child("qux").into())
        })
    }

    #[tokio::test]
    async fn child_context_is_visible_to_descendants() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let baz = ComponentClass::new("Baz", |_| Ok(Box::new(Baz)));
        let tree: Node = Element::host("main")
            .with_children([
                Element::class(baz).with_child(Element::function(recorder(&seen))).into(),
                Element::function(recorder(&seen)).into(),
            ])
            .into();

        let mut visitor = visit_fn(|_, _, _| Ok(VisitResult::CONTINUE));
        walk_with_defaults(&tree, &mut visitor).await.unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].get("foo"), Some(&json!("bar")));
        assert_eq!(seen[1].get("foo"), None);
    }

    #[rstest]
    #[case::outside_any_provider(vec![], "light")]
    #[case::single_provider(vec!["dark"], "dark")]
    #[case::nested_providers(vec!["dark", "sepia"], "sepia")]
    #[tokio::test]
    async fn consumer_sees_innermost_provider(#[case] values: Vec<&str>, #[case] expected: &str) {
        let theme = ContextObject::new(json!("light"));
        let consumer = theme.consumer(|value: &Value| {
            Ok(Element::host("span")
                .with_child(value.as_str().unwrap_or_default().to_string())
                .into())
        });
        let tree = values
            .iter()
            .rev()
            .fold(consumer, |child, value| theme.provider(json!(value), child));

        let mut texts = Vec::new();
        let mut visitor = visit_fn(|node, _, _| {
            if let Some(text) = node.as_text() {
                texts.push(text.to_string());
            }
            Ok(VisitResult::CONTINUE)
        });
        walk_with_defaults(&tree, &mut visitor).await.unwrap();

        assert_eq!(texts, vec![expected]);
    }

    fn request_label(value: &Value) -> Result<Node, BoxError> {
        Ok(Node::text(value.as_str().unwrap_or_default()))
    }

    /// Walks `tree`, sleeping on numeric leaves, and returns the visited texts.
    async fn rendered_texts(tree: Node, context: Context) -> Result<Vec<String>, WalkError> {
        let mut texts = Vec::new();
        let mut visitor = visit_fn(|node, _, _| match node {
            Node::Number(delay) => {
                let delay = Duration::from_millis(*delay as u64);
                Ok(VisitResult::deferred(async move {
                    tokio::time::sleep(delay).await;
                    Ok::<_, BoxError>(ControlFlow::Continue(()))
                }))
            }
            Node::Text(text) => {
                texts.push(text.clone());
                Ok(VisitResult::CONTINUE)
            }
            _ => Ok(VisitResult::CONTINUE),
        });
        walk(&tree, &mut visitor, context, &WalkOptions::default()).await?;
        Ok(texts)
    }

    #[tokio::test]
    async fn joined_walks_do_not_share_provider_values() {
        let request = ContextObject::new(json!("default"));
        let request_tree = |value: &str| {
            request.provider(
                json!(value),
                Node::list([Node::number(20.0), request.consumer(request_label)]),
            )
        };

        let (a, b) = futures_util::future::join(
            rendered_texts(request_tree("request-a"), Context::new()),
            rendered_texts(request_tree("request-b"), Context::new()),
        )
        .await;

        assert_eq!(a.unwrap(), vec!["request-a"]);
        assert_eq!(b.unwrap(), vec!["request-b"]);
    }

    #[tokio::test]
    async fn rewalk_with_captured_context_keeps_provider_values() {
        let request = ContextObject::new(json!("default"));
        let inner: Node = Element::host("section")
            .with_child(request.consumer(request_label))
            .into();
        let tree = request.provider(json!("request-a"), Node::clone(&inner));

        let mut captured = None;
        let mut visitor = visit_fn(|node, _, context| {
            if node.ptr_eq(&inner) {
                captured = Some(context.clone());
                return Ok(VisitResult::STOP);
            }
            Ok(VisitResult::CONTINUE)
        });
        walk_with_defaults(&tree, &mut visitor).await.unwrap();

        let context = captured.unwrap();
        assert_eq!(context.consume(&request), &json!("request-a"));
        assert_eq!(rendered_texts(inner, context).await.unwrap(), vec!["request-a"]);
    }
}
