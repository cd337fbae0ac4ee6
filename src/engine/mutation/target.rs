use std::{fmt, rc::Rc};

use indexmap::IndexMap;

use crate::engine::mutation::path::{Accessor, Path};
use crate::graph::{
    node::{Node, NodeKind},
    ops,
    types::Type,
    value::Value,
};
use crate::stack::{Stack, UpdateChannel, dereference_all_vars};

/// How a root's new value is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStyle {
    /// The root is a plain value held by the client.
    ClientRef,
    /// The root is an object-store reference fetched by URI.
    ServerRef,
}

impl fmt::Display for MutationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationStyle::ClientRef => write!(f, "clientRef"),
            MutationStyle::ServerRef => write!(f, "serverRef"),
        }
    }
}

/// A variable the walk from the target to the root passed through.
#[derive(Debug, Clone)]
pub struct Owner {
    pub name: String,
    /// The variable's setter, if it has one.
    pub channel: Option<UpdateChannel>,
    /// Accessors between the variable's binding and the root, outermost
    /// first. Empty when the binding reduces to the root itself.
    route: Vec<Accessor>,
    /// The stack the binding closed over.
    home: Stack,
}

impl Owner {
    /// `true` when the variable is bound to the root, not to a part of it.
    pub fn holds_root(&self) -> bool {
        self.route.is_empty()
    }

    /// The variable's binding with `root` in place of the old root.
    ///
    /// Keys written under a nested binding are inlined, since the rebuilt
    /// expression is read in this variable's scope.
    pub fn rebuild(&self, root: Node) -> Node {
        self.route
            .iter()
            .rev()
            .fold(root, |receiver, step| with_receiver(step, receiver, &self.home))
    }

    /// Sends the rebuilt binding through the channel. Returns `false` when
    /// the variable has no channel.
    pub fn send(&self, root: Node) -> bool {
        match &self.channel {
            Some(channel) => {
                channel.send(self.rebuild(root));
                true
            }
            None => false,
        }
    }
}

fn with_receiver(step: &Accessor, receiver: Node, home: &Stack) -> Node {
    let Some(call) = step.node.as_output() else {
        return receiver;
    };
    let mut inputs = Vec::with_capacity(call.inputs.len());
    let mut rest = call.inputs.iter();
    if let Some((name, _)) = rest.next() {
        inputs.push((name.clone(), receiver));
    }
    for (name, input) in rest {
        let input = if step.stack.ptr_eq(home) {
            input.clone()
        } else {
            dereference_all_vars(input, &step.stack).node
        };
        inputs.push((name.clone(), input));
    }
    Node::output(&call.name, step.node.ty().clone(), inputs)
}

struct Entered {
    name: String,
    channel: Option<UpdateChannel>,
    home: Stack,
    from: usize,
}

/// Where an edit to a target lands and how to persist it.
#[derive(Debug, Clone)]
pub struct MutationTarget {
    /// The target with every variable inlined.
    pub absolute: Node,
    /// The root with every variable inlined.
    pub root: Node,
    pub style: MutationStyle,
    pub root_args: Value,
    pub root_type: Type,
    pub path: Path,
    /// Variables passed on the way to the root, outermost first.
    pub owners: Vec<Owner>,
}

impl MutationTarget {
    /// Walks from `target` through accessor ops and variable bindings to the
    /// outermost root. Returns `None` when no root can be found: the walk
    /// reaches an unbound variable or a parameter, or the root is `Void`.
    pub fn resolve(target: &Node, stack: &Stack) -> Option<MutationTarget> {
        let absolute = dereference_all_vars(target, stack).node;

        let mut steps = Vec::new();
        let mut entered: Vec<Entered> = Vec::new();
        let mut node = target.clone();
        let mut stack = stack.clone();
        loop {
            match node.kind() {
                NodeKind::Output(call) if ops::is_accessor(&call.name) => {
                    let receiver = call.receiver()?.clone();
                    let (_, key) = call.inputs.get_index(1)?;
                    steps.push(Accessor {
                        node: node.clone(),
                        op: call.name.clone(),
                        key: key.clone(),
                        stack: stack.clone(),
                    });
                    node = receiver;
                }
                NodeKind::Var(name) => {
                    let binding = stack.resolve_binding(name)?;
                    if binding.is_unbound_param() {
                        return None;
                    }
                    entered.push(Entered {
                        name: name.to_string(),
                        channel: binding.channel.clone(),
                        home: binding.stack.clone(),
                        from: steps.len(),
                    });
                    let next = (binding.value.clone(), binding.stack.clone());
                    (node, stack) = next;
                }
                _ => break,
            }
        }

        let root = dereference_all_vars(&node, &stack).node;
        let (style, root_args) = classify(&root)?;
        let owners = entered
            .into_iter()
            .map(|entry| Owner {
                name: entry.name,
                channel: entry.channel,
                route: steps[entry.from..].to_vec(),
                home: entry.home,
            })
            .collect();
        Some(MutationTarget {
            absolute,
            root_type: root.ty().clone(),
            root,
            style,
            root_args,
            path: Path::from_target_walk(steps),
            owners,
        })
    }

    /// The variable the new root is written back through: the one nearest
    /// the root that has a channel.
    pub fn owner(&self) -> Option<&Owner> {
        self.owners.iter().rev().find(|owner| owner.channel.is_some())
    }

    pub fn has_channel(&self) -> bool {
        self.owner().is_some()
    }
}

fn no_args() -> Value {
    Value::Record(Rc::new(IndexMap::new()))
}

fn classify(root: &Node) -> Option<(MutationStyle, Value)> {
    match root.kind() {
        NodeKind::Void | NodeKind::Var(_) => None,
        NodeKind::Output(call) if &*call.name == ops::GET => {
            match call.input("uri").and_then(Node::as_const) {
                Some(uri @ Value::String(_)) => Some((
                    MutationStyle::ServerRef,
                    Value::record([("uri", uri.clone())]),
                )),
                _ => Some((MutationStyle::ClientRef, no_args())),
            }
        }
        NodeKind::Const(_) | NodeKind::Output(_) => {
            Some((MutationStyle::ClientRef, no_args()))
        }
    }
}
