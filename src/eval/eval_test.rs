use crate::eval::evaluate_locally;
use crate::graph::{NodeKind, node::Node, ops, types::Type, value::Value, visit::contains_output};
use crate::stack::Stack;

fn record_ab() -> Node {
    Node::literal(Value::record([("a", Value::Int(1)), ("b", Value::Int(2))]))
}

#[test]
fn pick_over_literal_record_reduces_to_the_field() {
    let node = Node::output(
        ops::PICK,
        Type::Int,
        [("obj", record_ab()), ("key", Node::literal(Value::string("a")))],
    );
    let result = evaluate_locally(&node, &Stack::empty());
    assert_eq!(result, Node::constant(Value::Int(1), Type::Int));
}

#[test]
fn field_of_constructed_record_leaves_no_output() {
    let dict = Node::output(
        ops::DICT,
        Type::Unknown,
        [
            ("name", Node::literal(Value::string("ada"))),
            ("age", Node::literal(Value::Int(36))),
        ],
    );
    let node = ops::getattr(dict, "name", Type::String);
    let result = evaluate_locally(&node, &Stack::empty());
    assert!(!contains_output(&result));
    assert_eq!(result.as_const(), Some(&Value::string("ada")));
}

#[test]
fn unknown_ops_keep_their_shape_with_reduced_arguments() {
    let node = Node::output(
        "filter",
        Type::list(Type::Int),
        [
            ("arr", Node::var("rows", Type::list(Type::Int))),
            ("limit", ops::pick(record_ab(), "b", Type::Int)),
        ],
    );
    let stack = Stack::empty().bind("rows", Node::output("fetch", Type::list(Type::Int), [("uri", Node::literal(Value::string("u")))]));

    let result = evaluate_locally(&node, &stack);
    let call = result.as_output().expect("filter stays an output");
    assert_eq!(&*call.name, "filter");
    assert!(call.input("arr").unwrap().is_call("fetch"));
    assert_eq!(call.input("limit").unwrap().as_const(), Some(&Value::Int(2)));
}

#[test]
fn function_valued_arguments_block_reduction() {
    let lambda = Node::literal(Value::function(vec![], Node::literal(Value::Int(1))));
    let node = ops::list(Type::Unknown, [lambda, Node::literal(Value::Int(2))]);
    let result = evaluate_locally(&node, &Stack::empty());
    assert!(result.is_call(ops::LIST));
}

#[test]
fn variables_evaluate_through_their_bindings() {
    let stack = Stack::empty()
        .bind("obj", record_ab())
        .bind("key", Node::literal(Value::string("b")));
    let node = Node::output(
        ops::PICK,
        Type::Int,
        [("obj", Node::var("obj", Type::Unknown)), ("key", Node::var("key", Type::String))],
    );
    assert_eq!(evaluate_locally(&node, &stack).as_const(), Some(&Value::Int(2)));
}

#[test]
fn function_bodies_see_parameters_as_unbound() {
    // `row` is bound outside, but the lambda's own parameter shadows it.
    let stack = Stack::empty().bind("row", record_ab());
    let body = ops::pick(Node::var("row", Type::Unknown), "a", Type::Int);
    let lambda = Node::constant(
        Value::function(vec![("row".into(), Type::Unknown)], body),
        Type::function(vec![("row".into(), Type::Unknown)], Type::Int),
    );

    let result = evaluate_locally(&lambda, &stack);
    let Some(Value::Function(lit)) = result.as_const() else {
        panic!("expected a function literal, got {:?}", result);
    };
    assert!(lit.body.is_call(ops::PICK));
    assert_eq!(result.ty(), lambda.ty());
}

#[test]
fn execute_inlines_a_thunk() {
    let thunk = Node::literal(Value::function(vec![], ops::index(Node::literal(Value::list([Value::Int(4), Value::Int(5)])), 1)));
    let node = Node::output(ops::EXECUTE, Type::Unknown, [("node", thunk)]);
    let result = evaluate_locally(&node, &Stack::empty());
    assert_eq!(result.as_const(), Some(&Value::Int(5)));
}

#[test]
fn out_of_range_index_is_none() {
    let node = ops::index(Node::literal(Value::list([Value::Int(4)])), 3);
    let result = evaluate_locally(&node, &Stack::empty());
    assert_eq!(result.as_const(), Some(&Value::None));
}

#[test]
fn timestamp_construction_reduces() {
    let node = ops::list(Type::list(Type::Timestamp), [ops::timestamp(10), ops::timestamp(20)]);
    let result = evaluate_locally(&node, &Stack::empty());
    assert_eq!(result.ty(), &Type::list(Type::Timestamp));
    assert_eq!(
        result.as_const(),
        Some(&Value::list([Value::Timestamp(10), Value::Timestamp(20)]))
    );
}

#[test]
fn partial_declared_types_are_inferred_from_the_value() {
    let node = ops::pick(record_ab(), "a", Type::Unknown);
    let result = evaluate_locally(&node, &Stack::empty());
    assert_eq!(result.ty(), &Type::Int);
}

#[test]
fn untouched_graphs_keep_identity() {
    let node = Node::output("fetch", Type::Unknown, [("uri", Node::literal(Value::string("u")))]);
    assert!(evaluate_locally(&node, &Stack::empty()).ptr_eq(&node));
    assert!(matches!(evaluate_locally(&Node::void(), &Stack::empty()).kind(), NodeKind::Void));
}
