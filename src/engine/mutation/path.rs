use std::{fmt, rc::Rc};

use crate::eval::evaluate_locally;
use crate::graph::{node::Node, value::Value};
use crate::stack::Stack;

/// One accessor op between the root and the target.
#[derive(Debug, Clone)]
pub struct Accessor {
    /// The accessor node as written.
    pub node: Node,
    pub op: Rc<str>,
    /// The key argument as written, before evaluation.
    pub key: Node,
    /// The stack `key` was written in.
    pub stack: Stack,
}

/// A key evaluated to a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Field(String),
    Index(i64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Field(name) => write!(f, ".{}", name),
            Key::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Lens from a root to a target, root first.
#[derive(Debug, Clone, Default)]
pub struct Path {
    steps: Vec<Accessor>,
}

impl Path {
    /// Builds a path from accessors collected while walking from the target
    /// up to the root.
    pub fn from_target_walk(mut steps: Vec<Accessor>) -> Self {
        steps.reverse();
        Self { steps }
    }

    pub fn steps(&self) -> &[Accessor] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Every key reduced to a literal field name or index, or `None` if some
    /// key needs the executor.
    pub fn literal_keys(&self) -> Option<Vec<Key>> {
        self.steps
            .iter()
            .map(|step| match evaluate_locally(&step.key, &step.stack).as_const()? {
                Value::String(name) => Some(Key::Field(name.to_string())),
                Value::Int(i) => Some(Key::Index(*i)),
                _ => None,
            })
            .collect()
    }
}

/// Replaces the value at `keys` inside `root`, sharing everything else.
///
/// Uses the read semantics of the accessor ops: a missing record field reads
/// as none and may be set, while an out-of-range index cannot be.
pub fn splice(root: &Value, keys: &[Key], value: Value) -> Option<Value> {
    let Some((key, rest)) = keys.split_first() else {
        return Some(value);
    };
    match key {
        Key::Field(name) => {
            let child = root.field(name).cloned().unwrap_or(Value::None);
            root.with_field(name, splice(&child, rest, value)?)
        }
        Key::Index(i) => {
            let child = root.element(*i)?;
            root.with_element(*i, splice(child, rest, value)?)
        }
    }
}
