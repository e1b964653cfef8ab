//! Error types for pg2sybase.

use thiserror::Error;

/// The main error type for translation and its surroundings.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// A single-quoted string literal is never closed.
    #[error("Unterminated string literal at line {line}, column {column}")]
    MalformedLiteral {
        /// Byte offset of the opening quote.
        position: usize,
        line: usize,
        column: usize,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranslateError {
    /// Create a malformed-literal error for the quote at `position` in `source`.
    pub fn malformed_literal(source: &str, position: usize) -> Self {
        let before = &source[..position];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Self::MalformedLiteral {
            position,
            line,
            column,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for pg2sybase operations.
pub type TranslateResult<T> = Result<T, TranslateError>;
