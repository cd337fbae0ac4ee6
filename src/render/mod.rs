//! Host rendering model.
//!
//! A [`RenderContext`] is what a mount point sees while rendering: the
//! executor, engine config, shared interner, the scheduler used to ask for
//! another render, and the lexical stack of the enclosing scopes. Child
//! scopes are derived by value, never by mutating the parent.
use std::{cell::RefCell, fmt, rc::Rc};

use crate::config::EngineConfig;
use crate::executor::Executor;
use crate::graph::node::Node;
use crate::memo::NodeInterner;
use crate::stack::{Binding, Stack, UpdateChannel};

pub mod scheduler;

pub use scheduler::RenderScheduler;

#[derive(Clone)]
pub struct RenderContext {
    executor: Rc<dyn Executor>,
    config: Rc<EngineConfig>,
    interner: Rc<RefCell<NodeInterner>>,
    scheduler: RenderScheduler,
    stack: Stack,
    optional: bool,
}

impl RenderContext {
    pub fn new(executor: Rc<dyn Executor>) -> Self {
        Self {
            executor,
            config: Rc::new(EngineConfig::default()),
            interner: Rc::new(RefCell::new(NodeInterner::new())),
            scheduler: RenderScheduler::new(),
            stack: Stack::empty(),
            optional: false,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Rc::new(config);
        self
    }

    pub fn with_scheduler(mut self, scheduler: RenderScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn executor(&self) -> &dyn Executor {
        &*self.executor
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn in_optional_scope(&self) -> bool {
        self.optional
    }

    /// Canonical node structurally equal to `node`.
    pub fn intern(&self, node: &Node) -> Node {
        self.interner.borrow_mut().intern(node)
    }

    /// Child scope with `name` bound to `value`.
    pub fn with_variable(&self, name: &str, value: Node) -> Self {
        self.with_stack(self.stack.bind(name, value))
    }

    /// Child scope with `name` bound to the current value of `variable`.
    /// Mutations rooted at `name` are written back through it.
    pub fn with_reactive_variable(&self, name: &str, variable: &Variable) -> Self {
        let binding = Binding::new(variable.get(), self.stack.clone()).with_channel(variable.channel());
        self.with_stack(self.stack.push(name, binding))
    }

    pub fn with_stack(&self, stack: Stack) -> Self {
        Self {
            stack,
            ..self.clone()
        }
    }

    /// Child scope whose absent values raise the empty-optional signal.
    pub fn optional_scope(&self) -> Self {
        Self {
            optional: true,
            ..self.clone()
        }
    }

    /// Child scope that reports absent values normally.
    pub fn required_scope(&self) -> Self {
        Self {
            optional: false,
            ..self.clone()
        }
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("config", &self.config)
            .field("stack", &self.stack)
            .field("optional", &self.optional)
            .finish()
    }
}

/// A node-valued piece of host state that owns a variable binding.
///
/// Writing through its [`channel`](Variable::channel) replaces the value and
/// requests a render, the way a component's own state setter would.
#[derive(Clone)]
pub struct Variable {
    value: Rc<RefCell<Node>>,
    scheduler: RenderScheduler,
}

impl Variable {
    pub fn new(value: Node, scheduler: &RenderScheduler) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            scheduler: scheduler.clone(),
        }
    }

    pub fn get(&self) -> Node {
        self.value.borrow().clone()
    }

    pub fn set(&self, value: Node) {
        *self.value.borrow_mut() = value;
        self.scheduler.request();
    }

    pub fn channel(&self) -> UpdateChannel {
        let variable = self.clone();
        UpdateChannel::new(move |node| variable.set(node))
    }
}
