//! Error taxonomy.
//!
//! Every failure the engine surfaces is a [`GraphError`]. Errors are `Clone`
//! because a stored failure is rethrown on every render until the node
//! changes.
use thiserror::Error;

use crate::graph::{types::Type, value::DecodeError};

pub mod error_code;

pub use error_code::{ERROR_CODES, ErrorCode, ErrorKind, format_message, lookup};

/// Failure reported by the remote executor itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutorError {
    #[error("{0}")]
    Failed(String),
    /// The executor dropped a request without settling it.
    #[error("request was dropped before it settled")]
    Dropped,
}

impl ExecutorError {
    pub fn failed(message: impl Into<String>) -> Self {
        ExecutorError::Failed(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("unresolved graph reference: {}", vars.join(", "))]
    UnresolvedReference { vars: Vec<String> },

    #[error("remote execution of `{node}` failed: {source}")]
    Remote {
        node: String,
        #[source]
        source: ExecutorError,
    },

    #[error("optional value is empty")]
    EmptyOptional,

    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: Type, found: String },

    #[error(transparent)]
    Decode(DecodeError),
}

impl From<DecodeError> for GraphError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Mismatch { expected, found } => GraphError::TypeMismatch { expected, found },
            other => GraphError::Decode(other),
        }
    }
}

impl GraphError {
    pub fn remote(node: impl ToString, source: ExecutorError) -> Self {
        GraphError::Remote {
            node: node.to_string(),
            source,
        }
    }

    pub fn code(&self) -> &'static ErrorCode {
        match self {
            GraphError::UnresolvedReference { .. } => &error_code::UNRESOLVED_REFERENCE,
            GraphError::Remote { .. } => &error_code::REMOTE_FAILURE,
            GraphError::EmptyOptional => &error_code::EMPTY_OPTIONAL,
            GraphError::TypeMismatch { .. } => &error_code::TYPE_MISMATCH,
            GraphError::Decode(_) => &error_code::DECODE_FAILURE,
        }
    }

    /// `true` for the empty-optional control-flow signal.
    pub fn is_signal(&self) -> bool {
        self.code().kind == ErrorKind::Signal
    }

    /// Renders the error with its code, title and hint, for display at a
    /// recovery boundary.
    pub fn render(&self) -> String {
        let code = self.code();
        let detail = self.to_string();
        let mut out = match self {
            GraphError::UnresolvedReference { vars } => code.render(&[vars.join(", ").as_str()]),
            GraphError::Remote { node, source } => code.render(&[node.as_str(), source.to_string().as_str()]),
            GraphError::TypeMismatch { expected, found } => {
                code.render(&[expected.to_string().as_str(), found.as_str()])
            }
            GraphError::Decode(_) => code.render(&[detail.as_str()]),
            GraphError::EmptyOptional => code.render(&[]),
        };
        if let Some(hint) = code.hint {
            out.push_str("\n  hint: ");
            out.push_str(hint);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::{ERROR_CODES, ExecutorError, GraphError, lookup};

    #[test]
    fn codes_are_unique() {
        for (i, a) in ERROR_CODES.iter().enumerate() {
            for b in &ERROR_CODES[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
        assert_eq!(lookup("E3001").map(|c| c.title), Some("UNRESOLVED GRAPH REFERENCE"));
        assert!(lookup("E9999").is_none());
    }

    #[test]
    fn unresolved_reference_names_every_variable() {
        let err = GraphError::UnresolvedReference {
            vars: vec!["x".into(), "row".into()],
        };
        assert_eq!(err.to_string(), "unresolved graph reference: x, row");
        insta::assert_snapshot!(err.render(), @r"
        Graph error [E3001] UNRESOLVED GRAPH REFERENCE: The graph still refers to unbound variables: x, row.
          hint: Bind the variable in an enclosing scope before rendering this node, or pass a node that does not depend on it.
        ");
    }

    #[test]
    fn remote_errors_keep_their_source() {
        let err = GraphError::remote("fetch(uri=\"a\")", ExecutorError::failed("timeout"));
        assert_eq!(err.code().code, "E3002");
        assert!(err.render().starts_with("Remote error [E3002] REMOTE"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_signal());
        assert!(GraphError::EmptyOptional.is_signal());
    }
}
