pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod eval;
pub mod executor;
pub mod graph;
pub mod memo;
pub mod render;
pub mod stack;
