use crate::graph::{
    node::{Node, NodeKind, OpCall},
    value::{FunctionLiteral, Value},
};

/// Read-only graph visitor.
///
/// Every `visit_*` method has a default that calls the corresponding `walk_*`
/// free function, which recurses into child nodes. Override a method to
/// intercept a node; call `walk_*` from within your override to continue
/// the traversal.
pub trait NodeVisitor<'g> {
    fn visit_node(&mut self, node: &'g Node) {
        walk_node(self, node);
    }

    fn visit_var(&mut self, _node: &'g Node, _name: &'g str) {}

    fn visit_function(&mut self, lit: &'g FunctionLiteral) {
        walk_function(self, lit);
    }

    fn visit_output(&mut self, call: &'g OpCall) {
        walk_output(self, call);
    }
}

pub fn walk_node<'g, V: NodeVisitor<'g> + ?Sized>(visitor: &mut V, node: &'g Node) {
    match node.kind() {
        NodeKind::Void => {}
        NodeKind::Const(Value::Function(lit)) => visitor.visit_function(lit),
        NodeKind::Const(_) => {}
        NodeKind::Var(name) => visitor.visit_var(node, name),
        NodeKind::Output(call) => visitor.visit_output(call),
    }
}

pub fn walk_function<'g, V: NodeVisitor<'g> + ?Sized>(visitor: &mut V, lit: &'g FunctionLiteral) {
    visitor.visit_node(&lit.body);
}

pub fn walk_output<'g, V: NodeVisitor<'g> + ?Sized>(visitor: &mut V, call: &'g OpCall) {
    for input in call.inputs.values() {
        visitor.visit_node(input);
    }
}

struct OutputFinder {
    found: bool,
}

impl<'g> NodeVisitor<'g> for OutputFinder {
    fn visit_output(&mut self, _call: &'g OpCall) {
        self.found = true;
    }
}

/// True when the graph contains at least one `Output`, including inside
/// function literal bodies.
pub fn contains_output(node: &Node) -> bool {
    let mut finder = OutputFinder { found: false };
    finder.visit_node(node);
    finder.found
}
