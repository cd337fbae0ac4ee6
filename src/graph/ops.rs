//! Operation names the engine itself understands.
//!
//! Everything else is opaque and resolved by the remote executor.

use crate::graph::{node::Node, types::Type, value::Value};

pub const GETATTR: &str = "getattr";
pub const PICK: &str = "pick";
pub const INDEX: &str = "index";
pub const DICT: &str = "dict";
pub const LIST: &str = "list";
pub const TIMESTAMP: &str = "timestamp";
pub const EXECUTE: &str = "execute";
/// Dereference an object-store reference by URI.
pub const GET: &str = "get";
pub const COUNT: &str = "count";
pub const SET: &str = "set";

/// Ops that project part of their receiver (first input) by a key.
pub const ACCESSORS: &[&str] = &[GETATTR, PICK, INDEX];

/// Cheap, pure, total ops the client may reduce when all inputs are literals.
pub const LOCALLY_REDUCIBLE: &[&str] = &[GETATTR, PICK, INDEX, DICT, LIST, TIMESTAMP, EXECUTE];

pub fn is_accessor(op: &str) -> bool {
    ACCESSORS.contains(&op)
}

pub fn is_locally_reducible(op: &str) -> bool {
    LOCALLY_REDUCIBLE.contains(&op)
}

pub fn pick(obj: Node, key: &str, ty: Type) -> Node {
    Node::output(PICK, ty, [("obj", obj), ("key", Node::literal(Value::string(key)))])
}

pub fn getattr(receiver: Node, name: &str, ty: Type) -> Node {
    Node::output(
        GETATTR,
        ty,
        [("self", receiver), ("name", Node::literal(Value::string(name)))],
    )
}

pub fn index(arr: Node, index: i64) -> Node {
    let ty = arr.ty().element().cloned().unwrap_or(Type::Unknown);
    Node::output(INDEX, ty, [("arr", arr), ("index", Node::literal(Value::Int(index)))])
}

pub fn count(arr: Node) -> Node {
    Node::output(COUNT, Type::Int, [("arr", arr)])
}

pub fn timestamp(ms: i64) -> Node {
    Node::output(
        TIMESTAMP,
        Type::Timestamp,
        [("ms", Node::literal(Value::Int(ms)))],
    )
}

pub fn list(ty: Type, items: impl IntoIterator<Item = Node>) -> Node {
    Node::output(
        LIST,
        ty,
        items.into_iter().enumerate().map(|(i, n)| (i.to_string(), n)),
    )
}

pub fn get(uri: &str, ty: Type) -> Node {
    Node::output(GET, ty, [("uri", Node::literal(Value::string(uri)))])
}
