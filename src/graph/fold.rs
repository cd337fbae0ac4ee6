use crate::graph::{
    node::{Node, NodeKind, OpCall},
    value::{FunctionLiteral, Value},
};

/// Graph folder (rewriter).
///
/// Every `fold_*` method receives a node and returns a (possibly rewritten)
/// node. Defaults call the corresponding `fold_*` free function, which
/// rebuilds the node after folding its children. A subtree that folds to
/// identical children is returned as the same `Rc`, so identity survives
/// no-op passes.
pub trait NodeFolder {
    fn fold_node(&mut self, node: &Node) -> Node {
        fold_node(self, node)
    }

    fn fold_var(&mut self, node: &Node, _name: &str) -> Node {
        node.clone()
    }

    fn fold_const(&mut self, node: &Node, value: &Value) -> Node {
        fold_const(self, node, value)
    }

    /// Folds the body of a function literal. Override to manage parameter
    /// scopes.
    fn fold_function_body(&mut self, lit: &FunctionLiteral) -> Node {
        self.fold_node(&lit.body)
    }

    fn fold_output(&mut self, node: &Node, call: &OpCall) -> Node {
        fold_output(self, node, call)
    }
}

// ---------------------------------------------------------------------------
// fold_* free functions – exhaustive matching so that adding a new node kind
// causes a compile error until this code is updated.
// ---------------------------------------------------------------------------

pub fn fold_node<F: NodeFolder + ?Sized>(folder: &mut F, node: &Node) -> Node {
    match node.kind() {
        NodeKind::Void => node.clone(),
        NodeKind::Const(value) => folder.fold_const(node, value),
        NodeKind::Var(name) => folder.fold_var(node, name),
        NodeKind::Output(call) => folder.fold_output(node, call),
    }
}

pub fn fold_const<F: NodeFolder + ?Sized>(folder: &mut F, node: &Node, value: &Value) -> Node {
    match value {
        Value::Function(lit) => {
            let body = folder.fold_function_body(lit);
            if body.ptr_eq(&lit.body) {
                node.clone()
            } else {
                Node::constant(Value::function(lit.params.clone(), body), node.ty().clone())
            }
        }
        _ => node.clone(),
    }
}

pub fn fold_output<F: NodeFolder + ?Sized>(folder: &mut F, node: &Node, call: &OpCall) -> Node {
    let mut changed = false;
    let inputs: Vec<(String, Node)> = call
        .inputs
        .iter()
        .map(|(name, input)| {
            let folded = folder.fold_node(input);
            changed |= !folded.ptr_eq(input);
            (name.clone(), folded)
        })
        .collect();

    if !changed {
        return node.clone();
    }
    Node::output(&call.name, node.ty().clone(), inputs)
}
