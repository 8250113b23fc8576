use thiserror::Error;

/// Errors raised while parsing or evaluating a potential expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The expression text is not well formed.
    #[error("failed to parse expression '{expression}' (near offset {offset})")]
    Parse {
        /// The full expression text.
        expression: String,
        /// Byte offset at which parsing stopped.
        offset: usize,
    },

    /// A symbol had no value bound during evaluation.
    #[error("no value bound for symbol '{0}'")]
    UnboundSymbol(String),

    /// A function name or arity is not supported.
    #[error("unsupported function '{name}' with {arity} argument(s)")]
    UnknownFunction {
        /// The function name as written.
        name: String,
        /// Number of arguments supplied.
        arity: usize,
    },
}

impl Error {
    pub(crate) fn parse(expression: &str, remaining: &str) -> Self {
        Self::Parse {
            expression: expression.to_string(),
            offset: expression.len().saturating_sub(remaining.len()),
        }
    }
}
