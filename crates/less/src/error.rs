//! Error types for LESS compilation.
//!
//! Every failure is fatal to the compilation that raised it. Errors that come
//! from source text carry the [`Position`] of the offending token or node so
//! diagnostics can point at `file:line:column`.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A location in a source file.
///
/// Lines and columns are 1-based; `offset` is the byte offset into the file.
/// A position with line `0` is used for failures that have no source location
/// (for example, a missing root file).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub file: Arc<str>,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(file: Arc<str>, line: usize, column: usize, offset: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset,
        }
    }

    /// A position inside `file` with no known line.
    pub fn unknown(file: &str) -> Self {
        Self {
            file: Arc::from(file),
            line: 0,
            column: 0,
            offset: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

/// Errors that can occur while compiling a stylesheet.
///
/// # Examples
///
/// ```rust
/// use less::{Compiler, LessError, Options};
///
/// let err = Compiler::new(Options::default())
///     .parse_str(".a { width: 1px + 1em; }", "input.less")
///     .unwrap_err();
/// assert!(matches!(err, LessError::UnitMismatch { .. }));
/// ```
#[derive(Error, Debug)]
pub enum LessError {
    /// A malformed token: unterminated string or comment, bad number.
    #[error("{position}: unexpected character {found:?}: {message}")]
    Lex {
        position: Position,
        found: char,
        message: String,
    },

    /// The token stream does not match the grammar.
    #[error("{position}: expected {expected}, found {found}")]
    Parse {
        position: Position,
        expected: String,
        found: String,
    },

    /// An `@import` re-entered a file that is still being imported.
    #[error("{position}: import cycle detected: {}", chain.join(" -> "))]
    ImportCycle {
        position: Position,
        chain: Vec<String>,
    },

    /// The importer could not find the requested file.
    #[error("{position}: import not found: {path}")]
    ImportNotFound { position: Position, path: String },

    /// A variable reference has no binding in any enclosing frame.
    #[error("{position}: variable @{name} is undefined")]
    VariableNotFound { position: Position, name: String },

    /// A variable whose value refers back to itself.
    #[error("{position}: recursive variable definition for @{name}")]
    RecursiveVariable { position: Position, name: String },

    /// Operands of an operation have units that cannot be combined.
    #[error("{position}: incompatible units {left} and {right}")]
    UnitMismatch {
        position: Position,
        left: String,
        right: String,
    },

    /// A mixin call found no definition, or no definition whose guard passed.
    #[error("{position}: no matching definition was found for {call}: {reason}")]
    NoMatchingMixin {
        position: Position,
        call: String,
        reason: String,
    },

    /// A mixin call supplied arguments no definition can accept.
    #[error("{position}: wrong arguments for {call}: {message}")]
    MixinArgument {
        position: Position,
        call: String,
        message: String,
    },

    /// Mixin, import or variable nesting exceeded `Options::max_depth`, or
    /// source nesting exceeded [`MAX_NESTING`](crate::parser::MAX_NESTING).
    #[error("{position}: maximum nesting depth of {limit} exceeded")]
    RecursionLimit { position: Position, limit: usize },

    /// Operands that cannot be combined at all (string arithmetic, division by zero).
    #[error("{position}: {message}")]
    InvalidOperation { position: Position, message: String },

    /// A built-in function rejected its arguments.
    #[error("{position}: error evaluating function {name}: {message}")]
    Function {
        position: Position,
        name: String,
        message: String,
    },

    /// A stylesheet file was found but could not be read.
    #[error("{position}: cannot read {path}: {source}")]
    Io {
        position: Position,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl LessError {
    /// The source position the error refers to.
    pub fn position(&self) -> &Position {
        match self {
            LessError::Lex { position, .. }
            | LessError::Parse { position, .. }
            | LessError::ImportCycle { position, .. }
            | LessError::ImportNotFound { position, .. }
            | LessError::VariableNotFound { position, .. }
            | LessError::RecursiveVariable { position, .. }
            | LessError::UnitMismatch { position, .. }
            | LessError::NoMatchingMixin { position, .. }
            | LessError::MixinArgument { position, .. }
            | LessError::RecursionLimit { position, .. }
            | LessError::InvalidOperation { position, .. }
            | LessError::Function { position, .. }
            | LessError::Io { position, .. } => position,
        }
    }
}

pub type Result<T> = std::result::Result<T, LessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_display_includes_line_and_column() {
        let pos = Position::new(Arc::from("input.less"), 5, 3, 42);
        assert_eq!(pos.to_string(), "input.less:5:3");
    }

    #[test]
    fn unknown_position_displays_file_only() {
        assert_eq!(Position::unknown("a.less").to_string(), "a.less");
    }

    #[test]
    fn errors_expose_their_position() {
        let err = LessError::VariableNotFound {
            position: Position::new(Arc::from("x.less"), 2, 9, 10),
            name: "color".into(),
        };
        assert_eq!(err.position().line, 2);
        assert_eq!(err.to_string(), "x.less:2:9: variable @color is undefined");
    }

    #[test]
    fn io_errors_name_the_file_and_import() {
        let err = LessError::Io {
            position: Position::new(Arc::from("main.less"), 3, 1, 20),
            path: "locked.less".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.position().line, 3);
        assert_eq!(err.to_string(), "main.less:3:1: cannot read locked.less: denied");
        assert!(std::error::Error::source(&err).is_some());
    }
}
