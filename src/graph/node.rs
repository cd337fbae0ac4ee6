use std::{
    fmt,
    rc::{Rc, Weak},
};

use indexmap::IndexMap;

use crate::graph::{types::Type, value::Value};

/// An element of the expression graph.
///
/// Nodes are immutable and cheaply cloneable; a graph edit always builds a
/// new node and shares every untouched child. Reference identity
/// (`ptr_eq`) is what the engine uses to decide "same request", so
/// structurally equal nodes are canonicalized through
/// [`NodeInterner`](crate::memo::NodeInterner) before identity matters.
#[derive(Clone)]
pub struct Node(Rc<NodeData>);

/// Non-owning handle to a node, used by the interner so canonical nodes
/// are released once no render holds them.
#[derive(Clone)]
pub struct WeakNode(Weak<NodeData>);

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }
}

#[derive(Debug, PartialEq)]
pub struct NodeData {
    ty: Type,
    kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// No expression. Never resolves.
    Void,
    /// Literal already known on the client.
    Const(Value),
    /// Reference to a stack binding.
    Var(Rc<str>),
    /// Operation applied to named child nodes.
    Output(OpCall),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpCall {
    pub name: Rc<str>,
    pub inputs: IndexMap<String, Node>,
}

impl OpCall {
    pub fn input(&self, name: &str) -> Option<&Node> {
        self.inputs.get(name)
    }

    /// The receiver of the call: its first input, by convention.
    pub fn receiver(&self) -> Option<&Node> {
        self.inputs.get_index(0).map(|(_, node)| node)
    }
}

impl Node {
    pub fn new(ty: Type, kind: NodeKind) -> Self {
        Node(Rc::new(NodeData { ty, kind }))
    }

    pub fn void() -> Self {
        Node::new(Type::Unknown, NodeKind::Void)
    }

    pub fn constant(value: Value, ty: Type) -> Self {
        Node::new(ty, NodeKind::Const(value))
    }

    /// A `Const` whose type is inferred from the value.
    pub fn literal(value: Value) -> Self {
        let ty = value.infer_type();
        Node::constant(value, ty)
    }

    pub fn var(name: &str, ty: Type) -> Self {
        Node::new(ty, NodeKind::Var(Rc::from(name)))
    }

    pub fn output<K: Into<String>>(
        name: &str,
        ty: Type,
        inputs: impl IntoIterator<Item = (K, Node)>,
    ) -> Self {
        Node::new(
            ty,
            NodeKind::Output(OpCall {
                name: Rc::from(name),
                inputs: inputs.into_iter().map(|(k, n)| (k.into(), n)).collect(),
            }),
        )
    }

    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind(), NodeKind::Void)
    }

    pub fn as_const(&self) -> Option<&Value> {
        match self.kind() {
            NodeKind::Const(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&str> {
        match self.kind() {
            NodeKind::Var(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_output(&self) -> Option<&OpCall> {
        match self.kind() {
            NodeKind::Output(call) => Some(call),
            _ => None,
        }
    }

    /// True for an `Output` calling `op`.
    pub fn is_call(&self, op: &str) -> bool {
        self.as_output().is_some_and(|call| &*call.name == op)
    }

    /// Reference identity.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    /// Same node with a different type annotation.
    pub fn with_type(&self, ty: Type) -> Node {
        if *self.ty() == ty {
            return self.clone();
        }
        Node::new(ty, self.kind().clone())
    }

    /// Structural equality that ignores type annotations on `Output` and
    /// `Var` nodes.
    ///
    /// Used to keep a subscription alive when a refinement round trip only
    /// filled in types.
    pub fn same_shape(&self, other: &Node) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.kind(), other.kind()) {
            (NodeKind::Void, NodeKind::Void) => true,
            (NodeKind::Const(a), NodeKind::Const(b)) => a == b,
            (NodeKind::Var(a), NodeKind::Var(b)) => a == b,
            (NodeKind::Output(a), NodeKind::Output(b)) => {
                a.name == b.name
                    && a.inputs.len() == b.inputs.len()
                    && a.inputs.iter().all(|(name, na)| {
                        b.inputs.get(name).is_some_and(|nb| na.same_shape(nb))
                    })
            }
            _ => false,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self, self.ty())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Void => write!(f, "void"),
            NodeKind::Const(value) => write!(f, "{}", value),
            NodeKind::Var(name) => write!(f, "{}", name),
            NodeKind::Output(call) => {
                let args: Vec<String> = call
                    .inputs
                    .iter()
                    .map(|(k, n)| format!("{}={}", k, n))
                    .collect();
                write!(f, "{}({})", call.name, args.join(", "))
            }
        }
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
