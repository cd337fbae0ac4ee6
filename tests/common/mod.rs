#![allow(dead_code)]

use std::rc::Rc;

use tether::{
    config::EngineConfig,
    executor::ManualExecutor,
    graph::{Node, Value},
    render::RenderContext,
};

/// A render context backed by a hand-driven executor.
pub struct Harness {
    pub executor: ManualExecutor,
    pub cx: RenderContext,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let executor = ManualExecutor::new();
        let cx = RenderContext::new(Rc::new(executor.clone())).with_config(config);
        Self { executor, cx }
    }

    /// Whether anything asked for a render since the last call.
    pub fn rerender_requested(&self) -> bool {
        self.cx.scheduler().take()
    }
}

pub fn record_ab() -> Node {
    Node::literal(Value::record([("a", Value::Int(1)), ("b", Value::Int(2))]))
}
