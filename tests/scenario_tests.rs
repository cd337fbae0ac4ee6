mod common;

use tether::{
    engine::{Loaded, NodeValue},
    eval::evaluate_locally,
    graph::{Node, Value, contains_output},
    stack::{Stack, dereference_all_vars},
};

use common::Harness;

const PICK_GRAPH: &str = r#"{
    "nodeType": "output", "type": "int",
    "fromOp": {"name": "pick", "inputs": {
        "obj": {"nodeType": "const", "type": {"record": {"a": "int", "b": "int"}}, "val": {"a": 1, "b": 2}},
        "key": {"nodeType": "const", "type": "string", "val": "a"}
    }}
}"#;

const DICT_GRAPH: &str = r#"{
    "nodeType": "output", "type": "unknown",
    "fromOp": {"name": "getattr", "inputs": {
        "self": {"nodeType": "output", "type": "unknown", "fromOp": {"name": "dict", "inputs": {
            "title": {"nodeType": "const", "type": "string", "val": "report"},
            "rows": {"nodeType": "var", "type": "unknown", "varName": "rows"}
        }}},
        "name": {"nodeType": "const", "type": "string", "val": "title"}
    }}
}"#;

fn parse(json: &str) -> Node {
    serde_json::from_str(json).unwrap()
}

#[test]
fn pick_over_a_literal_record() {
    let node = parse(PICK_GRAPH);
    let reduced = evaluate_locally(&node, &Stack::empty());
    assert_eq!(reduced.as_const(), Some(&Value::Int(1)));

    let h = Harness::new();
    let mut hook = NodeValue::new();
    assert_eq!(hook.poll(&h.cx, &node).unwrap(), Loaded::ready(Value::Int(1)));
    assert_eq!(h.executor.subscriptions_opened(), 0);
}

#[test]
fn projection_of_a_constructed_record_is_the_field() {
    let stack = Stack::empty().bind("rows", Node::literal(Value::list([Value::Int(1)])));
    let reduced = evaluate_locally(&parse(DICT_GRAPH), &stack);
    assert!(!contains_output(&reduced));
    insta::assert_snapshot!(format!("{:?}", reduced), @r#""report": string"#);
}

#[test]
fn dereferencing_is_idempotent() {
    let stack = Stack::empty().bind("rows", Node::literal(Value::list([Value::Int(1)])));
    let once = dereference_all_vars(&parse(DICT_GRAPH), &stack);
    let twice = dereference_all_vars(&once.node, &stack);
    assert!(twice.node.ptr_eq(&once.node));
    assert!(twice.used.is_empty());
    assert_eq!(once.used.names(), vec!["rows"]);
}

#[test]
fn wire_format_round_trips_through_json() {
    let node = parse(DICT_GRAPH);
    let encoded = serde_json::to_string(&node).unwrap();
    let decoded: Node = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, node);
}
