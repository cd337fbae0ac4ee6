//! The lexical environment used to resolve `Var` nodes.
//!
//! A stack is an immutable linked list of frames with parent pointers.
//! Extending it allocates one frame and never copies the parent, so every
//! rendering scope can cheaply derive a child scope while its own view
//! stays untouched.
use std::{fmt, rc::Rc};

use crate::graph::{node::Node, types::Type};

pub mod deref;

pub use deref::{Dereferenced, dereference_all_vars};

/// Name of the sentinel variable a function parameter is bound to while its
/// body is being rewritten. A `Var` resolving to this sentinel is left in
/// place rather than followed.
pub const UNBOUND_PARAM: &str = "__unbound_param__";

/// Reactive setter owning a bound variable. Mutations deliver a new root
/// value through it.
#[derive(Clone)]
pub struct UpdateChannel(Rc<dyn Fn(Node)>);

impl UpdateChannel {
    pub fn new(f: impl Fn(Node) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn send(&self, node: Node) {
        (self.0)(node)
    }
}

impl fmt::Debug for UpdateChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UpdateChannel")
    }
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Node,
    /// The stack `value` was written in.
    pub stack: Stack,
    pub channel: Option<UpdateChannel>,
}

impl Binding {
    pub fn new(value: Node, stack: Stack) -> Self {
        Self {
            value,
            stack,
            channel: None,
        }
    }

    pub fn with_channel(mut self, channel: UpdateChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn is_unbound_param(&self) -> bool {
        self.value.as_var() == Some(UNBOUND_PARAM)
    }
}

#[derive(Debug)]
struct Frame {
    name: Rc<str>,
    binding: Binding,
    parent: Stack,
}

#[derive(Clone, Default)]
pub struct Stack(Option<Rc<Frame>>);

impl Stack {
    pub fn empty() -> Self {
        Stack(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn push(&self, name: &str, binding: Binding) -> Stack {
        Stack(Some(Rc::new(Frame {
            name: Rc::from(name),
            binding,
            parent: self.clone(),
        })))
    }

    /// Binds `name` to `value`, closing over this stack.
    pub fn bind(&self, name: &str, value: Node) -> Stack {
        self.push(name, Binding::new(value, self.clone()))
    }

    /// Binds `name` to the unbound-parameter sentinel.
    pub fn bind_param(&self, name: &str, ty: Type) -> Stack {
        self.push(name, Binding::new(Node::var(UNBOUND_PARAM, ty), Stack::empty()))
    }

    /// The nearest binding for `name`.
    pub fn resolve_binding(&self, name: &str) -> Option<&Binding> {
        self.frames()
            .find(|(frame_name, _)| *frame_name == name)
            .map(|(_, binding)| binding)
    }

    /// Frames from innermost to outermost.
    pub fn frames(&self) -> impl Iterator<Item = (&str, &Binding)> {
        let mut cursor = self.0.as_deref();
        std::iter::from_fn(move || {
            let frame = cursor?;
            cursor = frame.parent.0.as_deref();
            Some((&*frame.name, &frame.binding))
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.frames().map(|(name, _)| name).collect()
    }

    pub fn len(&self) -> usize {
        self.frames().count()
    }

    pub fn ptr_eq(&self, other: &Stack) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Resolves `name` to the nearest binding's value and the stack that value
/// closed over.
pub fn resolve_var(stack: &Stack, name: &str) -> Option<(Node, Stack)> {
    stack
        .resolve_binding(name)
        .map(|binding| (binding.value.clone(), binding.stack.clone()))
}
