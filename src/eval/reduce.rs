use std::rc::Rc;

use crate::graph::{
    node::{Node, OpCall},
    ops,
    value::Value,
};

/// Reduces a single `Output` whose arguments are already reduced.
///
/// Returns `None` when the op is not on the allow-list or an argument is
/// not a usable literal. The result keeps the node's declared type unless
/// that type is still partial, in which case it is inferred from the value.
pub fn reduce(node: &Node) -> Option<Node> {
    let call = node.as_output()?;
    if !ops::is_locally_reducible(&call.name) {
        return None;
    }

    if &*call.name == ops::EXECUTE {
        return execute(call);
    }

    let args = literal_args(call)?;
    let value = match &*call.name {
        ops::GETATTR | ops::PICK => match args.as_slice() {
            [receiver, Value::String(key)] => project(receiver, key)?,
            _ => return None,
        },
        ops::INDEX => match args.as_slice() {
            [Value::List(items), Value::Int(index)] => usize::try_from(*index)
                .ok()
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(Value::None),
            _ => return None,
        },
        ops::DICT => Value::Record(Rc::new(
            call.inputs
                .keys()
                .cloned()
                .zip(args.iter().cloned())
                .collect(),
        )),
        ops::LIST => Value::list(args.iter().cloned()),
        ops::TIMESTAMP => match args.as_slice() {
            [Value::Int(ms)] | [Value::Timestamp(ms)] => Value::Timestamp(*ms),
            [Value::Float(ms)] => Value::Timestamp(ms.round() as i64),
            _ => return None,
        },
        _ => return None,
    };

    let ty = if node.ty().is_partial() {
        value.infer_type()
    } else {
        node.ty().clone()
    };
    Some(Node::constant(value, ty))
}

/// Every argument as a non-function literal, in input order.
fn literal_args(call: &OpCall) -> Option<Vec<Value>> {
    call.inputs
        .values()
        .map(|input| match input.as_const() {
            Some(value) if !value.is_function() => Some(value.clone()),
            _ => None,
        })
        .collect()
}

/// Field projection. Projecting a list of records projects each element.
fn project(receiver: &Value, key: &str) -> Option<Value> {
    match receiver {
        Value::Record(fields) => Some(fields.get(key).cloned().unwrap_or(Value::None)),
        Value::List(items) => items
            .iter()
            .map(|item| project(item, key))
            .collect::<Option<Vec<_>>>()
            .map(Value::list),
        Value::None => Some(Value::None),
        _ => None,
    }
}

/// `execute` of a zero-parameter function literal is its body.
fn execute(call: &OpCall) -> Option<Node> {
    let function = call.receiver()?.as_const()?;
    match function {
        Value::Function(lit) if lit.params.is_empty() => Some(lit.body.clone()),
        _ => None,
    }
}
