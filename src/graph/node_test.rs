use crate::graph::{node::Node, ops, types::Type, value::Value};

fn sample_record() -> Node {
    Node::literal(Value::record([("a", Value::Int(1)), ("b", Value::Int(2))]))
}

#[test]
fn renders_output_calls_with_named_arguments() {
    let node = ops::pick(sample_record(), "a", Type::Int);
    insta::assert_snapshot!(node.to_string(), @r#"pick(obj={a: 1, b: 2}, key="a")"#);
}

#[test]
fn debug_includes_the_declared_type() {
    let node = ops::index(Node::var("rows", Type::list(Type::String)), 3);
    insta::assert_snapshot!(format!("{:?}", node), @"index(arr=rows, index=3): string");
}

#[test]
fn same_shape_ignores_type_annotations() {
    let a = ops::pick(Node::var("x", Type::Unknown), "a", Type::Unknown);
    let b = ops::pick(Node::var("x", Type::Int), "a", Type::Int);
    assert!(a.same_shape(&b));
    assert_ne!(a, b);
}

#[test]
fn same_shape_distinguishes_argument_names() {
    let a = Node::output("f", Type::Int, [("x", sample_record())]);
    let b = Node::output("f", Type::Int, [("y", sample_record())]);
    assert!(!a.same_shape(&b));
}

#[test]
fn same_shape_compares_arguments_by_name() {
    let a = Node::output(
        "f",
        Type::Unknown,
        [("x", sample_record()), ("y", Node::literal(Value::Int(1)))],
    );
    let b = Node::output(
        "f",
        Type::Int,
        [("y", Node::literal(Value::Int(1))), ("x", sample_record())],
    );
    assert!(a.same_shape(&b));
    assert!(b.same_shape(&a));
    let c = Node::output("f", Type::Int, [("y", Node::literal(Value::Int(2))), ("x", sample_record())]);
    assert!(!a.same_shape(&c));
}

#[test]
fn with_type_keeps_identity_when_type_is_unchanged() {
    let node = ops::count(Node::var("rows", Type::Unknown));
    assert!(node.with_type(Type::Int).ptr_eq(&node));
    assert_eq!(node.with_type(Type::Number).ty(), &Type::Number);
}

#[test]
fn receiver_is_the_first_input() {
    let node = ops::getattr(sample_record(), "a", Type::Int);
    let call = node.as_output().unwrap();
    assert_eq!(call.receiver(), Some(&sample_record()));
    assert!(node.is_call(ops::GETATTR));
}
