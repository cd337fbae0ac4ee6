//! Error code types and the registry of every code the engine reports.

/// Distinguishes programmer errors from failures reported by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The graph itself is wrong (free variables, ill-typed values).
    Graph,
    /// The remote executor failed or returned something unusable.
    Remote,
    /// Not an error; a control-flow signal for a designated wrapper.
    Signal,
}

impl ErrorKind {
    /// Returns the prefix string used in error headers
    pub fn prefix(&self) -> &'static str {
        match self {
            ErrorKind::Graph => "Graph error",
            ErrorKind::Remote => "Remote error",
            ErrorKind::Signal => "Signal",
        }
    }
}

/// Error code with message template and optional hint
#[derive(Debug, Clone, Copy)]
pub struct ErrorCode {
    pub code: &'static str,
    pub title: &'static str,
    pub kind: ErrorKind,
    pub message: &'static str,
    pub hint: Option<&'static str>,
}

pub const UNRESOLVED_REFERENCE: ErrorCode = ErrorCode {
    code: "E3001",
    title: "UNRESOLVED GRAPH REFERENCE",
    kind: ErrorKind::Graph,
    message: "The graph still refers to unbound variables: {}.",
    hint: Some(
        "Bind the variable in an enclosing scope before rendering this node, or pass a node that does not depend on it.",
    ),
};

pub const REMOTE_FAILURE: ErrorCode = ErrorCode {
    code: "E3002",
    title: "REMOTE EXECUTION FAILED",
    kind: ErrorKind::Remote,
    message: "The executor failed to resolve `{}`: {}.",
    hint: Some("Failures are not retried. Change the node or refresh to try again."),
};

pub const EMPTY_OPTIONAL: ErrorCode = ErrorCode {
    code: "E3003",
    title: "EMPTY OPTIONAL",
    kind: ErrorKind::Signal,
    message: "The optional value resolved to none.",
    hint: None,
};

pub const TYPE_MISMATCH: ErrorCode = ErrorCode {
    code: "E3004",
    title: "TYPE MISMATCH",
    kind: ErrorKind::Graph,
    message: "Expected a value of type `{}`, found `{}`.",
    hint: Some("The node's declared type must match what it resolves to. Refine the type first if it is only partially known."),
};

pub const DECODE_FAILURE: ErrorCode = ErrorCode {
    code: "E3005",
    title: "UNDECODABLE RESULT",
    kind: ErrorKind::Remote,
    message: "Could not decode the executor's result: {}.",
    hint: None,
};

pub const INVALID_MUTATION_TARGET: ErrorCode = ErrorCode {
    code: "E3006",
    title: "INVALID MUTATION TARGET",
    kind: ErrorKind::Graph,
    message: "No mutable root can be found for `{}`.",
    hint: Some("The target may have been reloaded since the mutation was created; the edit was skipped."),
};

pub const UNDELIVERED_ROOT: ErrorCode = ErrorCode {
    code: "E3007",
    title: "UNDELIVERED ROOT UPDATE",
    kind: ErrorKind::Graph,
    message: "The new root value for `{}` has no owner to receive it.",
    hint: Some("Bind the root with an update channel, or pass an on-root-update callback."),
};

/// Central registry of all error codes
pub const ERROR_CODES: &[ErrorCode] = &[
    UNRESOLVED_REFERENCE,
    REMOTE_FAILURE,
    EMPTY_OPTIONAL,
    TYPE_MISMATCH,
    DECODE_FAILURE,
    INVALID_MUTATION_TARGET,
    UNDELIVERED_ROOT,
];

/// Look up error code by code string (e.g., "E3001")
pub fn lookup(code: &str) -> Option<&'static ErrorCode> {
    ERROR_CODES.iter().find(|item| item.code == code)
}

/// Format error message by replacing {} placeholders with values
pub fn format_message(template: &str, values: &[&str]) -> String {
    let mut result = template.to_string();
    for value in values {
        result = result.replacen("{}", value, 1);
    }
    result
}

impl ErrorCode {
    /// `Graph error [E3001] UNRESOLVED GRAPH REFERENCE: <message>`
    pub fn render(&self, values: &[&str]) -> String {
        format!(
            "{} [{}] {}: {}",
            self.kind.prefix(),
            self.code,
            self.title,
            format_message(self.message, values)
        )
    }
}
