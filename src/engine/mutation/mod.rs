//! Mutation propagation.
//!
//! A mutation edits a node somewhere inside the graph. The engine finds the
//! root the node is reached from ([`MutationTarget::resolve`]), runs the
//! edit, and hands the new root to whatever held the old one. When the root
//! is reached through a variable with an update channel, that variable's
//! binding is rebuilt around the new root and sent through the channel;
//! otherwise the new root goes to the caller's callback.
//!
//! ## Local `set`
//!
//! A `set` on a client-held literal root is applied on the client, with no
//! executor call, when every path key and the new value reduce to literals.
//! The splice uses the same field and index semantics the partial evaluator
//! uses to read those paths, so reading the target after the edit yields
//! the value that was set. Any other edit goes to the executor's `action`.
use std::rc::Rc;

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value as Json;

use crate::diagnostics::{GraphError, error_code};
use crate::eval::evaluate_locally;
use crate::executor::Promise;
use crate::graph::{
    node::Node,
    ops,
    types::Type,
    value::Value,
};
use crate::render::RenderContext;
use crate::stack::{Stack, dereference_all_vars};

pub mod path;
pub mod target;

pub use path::{Accessor, Key, Path, splice};
pub use target::{MutationStyle, MutationTarget, Owner};

/// Receives the new root when the target is not reached through a variable
/// with an update channel.
pub type RootUpdate = Rc<dyn Fn(Node)>;

/// A mutation bound to one target and action.
#[derive(Clone)]
pub struct Mutation {
    cx: RenderContext,
    target: Node,
    action: Rc<str>,
    on_root_update: Option<RootUpdate>,
}

pub fn use_mutation(
    cx: &RenderContext,
    target: &Node,
    action: &str,
    on_root_update: Option<RootUpdate>,
) -> Mutation {
    Mutation {
        cx: cx.clone(),
        target: target.clone(),
        action: Rc::from(action),
        on_root_update,
    }
}

impl Mutation {
    pub fn call(&self, inputs: IndexMap<String, Node>) -> Promise<(), GraphError> {
        mutate(
            &self.cx,
            &self.target,
            &self.action,
            inputs,
            self.on_root_update.clone(),
        )
    }
}

/// Mutations whose target and action are chosen per call.
#[derive(Clone)]
pub struct MakeMutation {
    cx: RenderContext,
}

pub fn use_make_mutation(cx: &RenderContext) -> MakeMutation {
    MakeMutation { cx: cx.clone() }
}

impl MakeMutation {
    pub fn mutate(
        &self,
        target: &Node,
        action: &str,
        inputs: IndexMap<String, Node>,
        on_root_update: Option<RootUpdate>,
    ) -> Promise<(), GraphError> {
        mutate(&self.cx, target, action, inputs, on_root_update)
    }
}

fn mutate(
    cx: &RenderContext,
    target: &Node,
    action: &str,
    inputs: IndexMap<String, Node>,
    on_root_update: Option<RootUpdate>,
) -> Promise<(), GraphError> {
    let Some(resolved) = MutationTarget::resolve(target, cx.stack()) else {
        warn!(
            "{}",
            error_code::INVALID_MUTATION_TARGET.render(&[target.to_string().as_str()])
        );
        return Promise::settled(Ok(()));
    };
    let inputs: IndexMap<String, Node> = inputs
        .into_iter()
        .map(|(name, input)| (name, dereference_all_vars(&input, cx.stack()).node))
        .collect();
    let delivery = Delivery {
        owner: resolved.owner().cloned(),
        on_root_update,
        label: target.to_string(),
    };

    if action == ops::SET && cx.config().local_eval {
        if let Some(root) = splice_locally(&resolved, inputs.get("val")) {
            debug!("applied set on {} locally", delivery.label);
            delivery.deliver(root);
            return Promise::settled(Ok(()));
        }
    }

    let call = action_call(&resolved, action, inputs);
    debug!("running {} ({}) on {}", action, resolved.style, delivery.label);
    let action = action.to_string();
    cx.executor().action(&call).map(move |outcome| -> Result<(), GraphError> {
        let json = outcome.map_err(|err| GraphError::remote(&call, err))?;
        let root = rebuild_root(&resolved, &action, &json)?;
        delivery.deliver(root);
        Ok(())
    })
}

/// The new root for a `set` that needs no executor, if there is one.
fn splice_locally(target: &MutationTarget, value: Option<&Node>) -> Option<Node> {
    if target.style != MutationStyle::ClientRef {
        return None;
    }
    let root = target.root.as_const().filter(|v| !v.is_function())?;
    let keys = target.path.literal_keys()?;
    let reduced = evaluate_locally(value?, &Stack::empty());
    let value = reduced.as_const().filter(|v| !v.is_function())?;

    let spliced = splice(root, &keys, value.clone())?;
    if !spliced.conforms_to(&target.root_type) {
        return None;
    }
    Some(Node::constant(spliced, target.root_type.clone()))
}

/// `action(self=<target as a thunk>, ...inputs, root_args=...)`.
fn action_call(target: &MutationTarget, action: &str, inputs: IndexMap<String, Node>) -> Node {
    // Passed as a literal so the executor does not evaluate it.
    let thunk = Node::constant(
        Value::function(vec![], target.absolute.clone()),
        Type::function(vec![], target.absolute.ty().clone()),
    );
    let mut args: Vec<(String, Node)> = Vec::with_capacity(inputs.len() + 2);
    args.push(("self".to_string(), thunk));
    args.extend(inputs);
    args.push(("root_args".to_string(), Node::literal(target.root_args.clone())));
    Node::output(action, Type::Any, args)
}

fn rebuild_root(target: &MutationTarget, action: &str, json: &Json) -> Result<Node, GraphError> {
    match target.style {
        MutationStyle::ClientRef => {
            let value = Value::from_json(json, &target.root_type)?;
            if action == ops::SET && is_timestamp_list(&target.root_type) {
                if let Value::List(items) = &value {
                    // JSON loses the timestamp tag; rebuild through constructors.
                    let items = items.iter().map(|item| match item {
                        Value::Timestamp(ms) => ops::timestamp(*ms),
                        other => Node::literal(other.clone()),
                    });
                    return Ok(ops::list(target.root_type.clone(), items));
                }
            }
            Ok(Node::constant(value, target.root_type.clone()))
        }
        MutationStyle::ServerRef => match Value::from_json(json, &Type::String)? {
            Value::String(uri) => Ok(ops::get(&uri, target.root_type.clone())),
            other => Err(GraphError::TypeMismatch {
                expected: Type::String,
                found: other.type_name().to_string(),
            }),
        },
    }
}

fn is_timestamp_list(ty: &Type) -> bool {
    matches!(ty.non_optional().element(), Some(Type::Timestamp))
}

struct Delivery {
    owner: Option<Owner>,
    on_root_update: Option<RootUpdate>,
    label: String,
}

impl Delivery {
    fn deliver(&self, root: Node) {
        if self.owner.as_ref().is_some_and(|owner| owner.send(root.clone())) {
            return;
        }
        match &self.on_root_update {
            Some(on_root_update) => on_root_update(root),
            None => warn!(
                "{}",
                error_code::UNDELIVERED_ROOT.render(&[self.label.as_str()])
            ),
        }
    }
}
