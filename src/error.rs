use thiserror::Error;

/// Errors surfaced by the pretty printer
///
/// Best-effort fallbacks (malformed JSON, unknown content types) never show up
/// here; they degrade to less-formatted output instead.
#[derive(Debug, Error)]
pub enum PrettyError {
    /// The requested style is neither built in nor registered
    #[error("style not found: {0}")]
    StyleNotFound(String),

    /// A grammar had no rule for the input at `offset`
    #[error("{grammar} grammar cannot classify input at byte {offset}: {snippet:?}")]
    UnrecognizedInput {
        grammar: &'static str,
        offset: usize,
        snippet: String,
    },

    /// The syntax engine could not parse a body line
    #[error("syntax highlighting failed: {0}")]
    Syntax(String),

    /// Content identified as XML failed to parse
    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("render failed: {0}")]
    Render(#[from] std::fmt::Error),
}

pub type Result<T, E = PrettyError> = std::result::Result<T, E>;
