mod common;

use serde_json::json;
use tether::{
    config::EngineConfig,
    diagnostics::{ExecutorError, GraphError},
    engine::{Loaded, NodeValue},
    graph::{Node, Type, Value, ops},
};

use common::{Harness, record_ab};

fn pick_a() -> Node {
    Node::output(
        ops::PICK,
        Type::Int,
        [("obj", record_ab()), ("key", Node::literal(Value::string("a")))],
    )
}

#[test]
fn literal_projection_resolves_without_subscribing() {
    let h = Harness::new();
    let mut hook = NodeValue::new();

    let loaded = hook.poll(&h.cx, &pick_a()).unwrap();
    assert_eq!(loaded, Loaded::ready(Value::Int(1)));
    assert_eq!(h.executor.subscriptions_opened(), 0);
    assert_eq!(hook.resolved_node().and_then(Node::as_const), Some(&Value::Int(1)));
}

#[test]
fn const_nodes_resolve_on_the_first_render() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    let loaded = hook.poll(&h.cx, &Node::literal(Value::string("hi"))).unwrap();
    assert_eq!(loaded, Loaded::ready(Value::string("hi")));
    assert!(!hook.is_subscribed());
}

#[test]
fn function_literals_resolve_to_themselves() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    let lambda = Node::literal(Value::function(
        vec![("row".into(), Type::Int)],
        Node::var("row", Type::Int),
    ));
    let loaded = hook.poll(&h.cx, &lambda).unwrap();
    assert!(!loaded.loading);
    assert!(loaded.result.is_function());
    assert_eq!(h.executor.subscriptions_opened(), 0);
}

#[test]
fn unbound_variable_is_an_unresolved_reference() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    let err = hook.poll(&h.cx, &Node::var("x", Type::Int)).unwrap_err();
    assert_eq!(err, GraphError::UnresolvedReference { vars: vec!["x".into()] });
    assert!(err.to_string().contains('x'));
}

#[test]
fn every_free_variable_is_named_once() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    let node = Node::output(
        "filter",
        Type::Unknown,
        [
            ("arr", Node::var("x", Type::Unknown)),
            ("pred", Node::var("y", Type::Unknown)),
            ("limit", Node::var("x", Type::Int)),
        ],
    );
    let err = hook.poll(&h.cx, &node).unwrap_err();
    assert_eq!(err, GraphError::UnresolvedReference { vars: vec!["x".into(), "y".into()] });
    assert_eq!(h.executor.subscriptions_opened(), 0);
}

#[test]
fn bound_variables_resolve_locally() {
    let h = Harness::new();
    let cx = h.cx.with_variable("x", Node::literal(Value::Int(3)));
    let mut hook = NodeValue::new();
    let loaded = hook.poll(&cx, &Node::var("x", Type::Int)).unwrap();
    assert_eq!(loaded, Loaded::ready(Value::Int(3)));
}

#[test]
fn void_never_resolves() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    for _ in 0..3 {
        let loaded = hook.poll(&h.cx, &Node::void()).unwrap();
        assert!(loaded.loading);
    }
    assert_eq!(h.executor.subscriptions_opened(), 0);
}

#[test]
fn remote_values_arrive_through_the_subscription() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    let node = ops::get("store://n", Type::Int);

    assert_eq!(hook.poll(&h.cx, &node).unwrap(), Loaded::pending(Value::None));
    assert_eq!(h.executor.active_subscriptions(), 1);
    assert!(!h.rerender_requested());

    assert_eq!(h.executor.emit(&node, json!(5)), 1);
    assert!(h.rerender_requested());
    assert_eq!(hook.poll(&h.cx, &node).unwrap(), Loaded::ready(Value::Int(5)));

    h.executor.emit(&node, json!(6));
    assert_eq!(hook.poll(&h.cx, &node).unwrap(), Loaded::ready(Value::Int(6)));
    assert_eq!(h.executor.subscriptions_opened(), 1);
}

#[test]
fn rebuilt_but_equal_nodes_reuse_the_session() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    for _ in 0..3 {
        hook.poll(&h.cx, &ops::get("store://n", Type::Int)).unwrap();
    }
    assert_eq!(h.executor.subscriptions_opened(), 1);
}

#[test]
fn type_only_changes_do_not_resubscribe() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    hook.poll(&h.cx, &ops::get("store://n", Type::Unknown)).unwrap();
    hook.poll(&h.cx, &ops::get("store://n", Type::Int)).unwrap();
    assert_eq!(h.executor.subscriptions_opened(), 1);
}

#[test]
fn a_new_node_shows_the_old_value_as_loading() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    let first = ops::get("store://a", Type::Int);
    let second = ops::get("store://b", Type::Int);

    hook.poll(&h.cx, &first).unwrap();
    h.executor.emit(&first, json!(1));
    assert_eq!(hook.poll(&h.cx, &first).unwrap(), Loaded::ready(Value::Int(1)));

    assert_eq!(hook.poll(&h.cx, &second).unwrap(), Loaded::pending(Value::Int(1)));
    assert_eq!(h.executor.active_subscriptions(), 1);
    assert_eq!(h.executor.subscriptions_opened(), 2);
    assert_eq!(h.executor.emit(&first, json!(9)), 0);

    h.executor.emit(&second, json!(2));
    assert_eq!(hook.poll(&h.cx, &second).unwrap(), Loaded::ready(Value::Int(2)));
}

#[test]
fn failures_are_rethrown_until_the_node_changes() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    let node = ops::get("store://broken", Type::Int);

    hook.poll(&h.cx, &node).unwrap();
    h.executor.fail(&node, ExecutorError::failed("boom"));
    for _ in 0..2 {
        let err = hook.poll(&h.cx, &node).unwrap_err();
        assert!(matches!(err, GraphError::Remote { .. }));
    }
    assert_eq!(h.executor.subscriptions_opened(), 1);

    let other = ops::get("store://ok", Type::Int);
    assert!(hook.poll(&h.cx, &other).unwrap().loading);
}

#[test]
fn ill_typed_emissions_are_reported() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    let node = ops::get("store://n", Type::Int);
    hook.poll(&h.cx, &node).unwrap();
    h.executor.emit(&node, json!("five"));
    let err = hook.poll(&h.cx, &node).unwrap_err();
    assert_eq!(
        err,
        GraphError::TypeMismatch { expected: Type::Int, found: "string".into() }
    );
}

#[test]
fn ill_typed_literals_are_reported() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    let node = Node::constant(Value::string("five"), Type::Int);
    assert!(matches!(
        hook.poll(&h.cx, &node),
        Err(GraphError::TypeMismatch { .. })
    ));
}

#[test]
fn empty_optional_is_signalled_only_once_loaded() {
    let h = Harness::new();
    let cx = h.cx.optional_scope();
    let mut hook = NodeValue::new();
    let node = ops::get("store://maybe", Type::optional(Type::Int));

    assert!(hook.poll(&cx, &node).unwrap().loading);
    h.executor.emit(&node, json!(null));
    assert_eq!(hook.poll(&cx, &node).unwrap_err(), GraphError::EmptyOptional);

    // Outside the optional scope the absence is an ordinary result.
    assert_eq!(hook.poll(&h.cx, &node).unwrap(), Loaded::ready(Value::None));
}

#[test]
fn stale_absent_values_do_not_signal() {
    let h = Harness::new();
    let cx = h.cx.optional_scope();
    let mut hook = NodeValue::new();
    let first = ops::get("store://a", Type::optional(Type::Int));
    let second = ops::get("store://b", Type::optional(Type::Int));

    hook.poll(&cx, &first).unwrap();
    h.executor.emit(&first, json!(null));
    assert!(hook.poll(&cx, &first).is_err());
    assert!(hook.poll(&cx, &second).unwrap().loading);
}

#[test]
fn unmounting_unsubscribes() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    hook.poll(&h.cx, &ops::get("store://n", Type::Int)).unwrap();
    assert_eq!(h.executor.active_subscriptions(), 1);
    drop(hook);
    assert_eq!(h.executor.active_subscriptions(), 0);
}

#[test]
fn resolving_to_a_literal_closes_the_session() {
    let h = Harness::new();
    let mut hook = NodeValue::new();
    hook.poll(&h.cx, &ops::get("store://n", Type::Int)).unwrap();
    hook.poll(&h.cx, &Node::literal(Value::Int(1))).unwrap();
    assert_eq!(h.executor.active_subscriptions(), 0);
}

#[test]
fn disabling_local_eval_sends_everything_to_the_executor() {
    let h = Harness::with_config(EngineConfig::default().with_local_eval(false));
    let mut hook = NodeValue::new();
    assert!(hook.poll(&h.cx, &pick_a()).unwrap().loading);
    assert_eq!(h.executor.subscribed_nodes(), vec![pick_a()]);

    h.executor.emit(&pick_a(), json!(1));
    assert_eq!(hook.poll(&h.cx, &pick_a()).unwrap(), Loaded::ready(Value::Int(1)));
}

#[test]
fn subscriptions_see_variables_inlined() {
    let h = Harness::new();
    let cx = h.cx.with_variable("doc", ops::get("store://doc", Type::Unknown));
    let mut hook = NodeValue::new();

    hook.poll(&cx, &ops::pick(Node::var("doc", Type::Unknown), "title", Type::String)).unwrap();
    let expected = ops::pick(ops::get("store://doc", Type::Unknown), "title", Type::String);
    assert_eq!(h.executor.subscribed_nodes(), vec![expected]);
}
