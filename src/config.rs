use std::env;

use log::warn;
use serde::{Deserialize, Serialize};

pub const LOCAL_EVAL_ENV: &str = "TETHER_LOCAL_EVAL";
pub const EACH_PREFETCH_ENV: &str = "TETHER_EACH_PREFETCH";

pub const DEFAULT_EACH_PREFETCH: usize = 10;

/// Engine feature switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run the client-side partial evaluator before subscribing.
    pub local_eval: bool,
    /// Index nodes `Each` yields while the real length is still loading.
    pub each_prefetch: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            local_eval: true,
            each_prefetch: DEFAULT_EACH_PREFETCH,
        }
    }
}

impl EngineConfig {
    pub fn with_local_eval(mut self, enabled: bool) -> Self {
        self.local_eval = enabled;
        self
    }

    pub fn with_each_prefetch(mut self, count: usize) -> Self {
        self.each_prefetch = count;
        self
    }

    /// Defaults overridden by `TETHER_LOCAL_EVAL` and `TETHER_EACH_PREFETCH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(LOCAL_EVAL_ENV) {
            match parse_flag(&raw) {
                Some(enabled) => config.local_eval = enabled,
                None => warn!("ignoring {}={:?}: expected a boolean", LOCAL_EVAL_ENV, raw),
            }
        }
        if let Some(raw) = lookup(EACH_PREFETCH_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(count) => config.each_prefetch = count,
                Err(_) => warn!(
                    "ignoring {}={:?}: expected a non-negative integer",
                    EACH_PREFETCH_ENV, raw
                ),
            }
        }
        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
