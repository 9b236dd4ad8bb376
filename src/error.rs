//! Error types for compiling and walking magic rules.

use thiserror::Error;

/// Problems with a single magic definition line.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule line has no type field")]
    MissingType,

    #[error("unknown pattern type `{0}`")]
    UnknownType(String),

    #[error("cannot parse offset `{0}`")]
    BadOffset(String),

    #[error("unsupported indirect offset type `{0}`")]
    UnsupportedIndirectType(char),

    #[error("cannot parse type expression `{0}`")]
    BadTypeOperator(String),

    #[error("modulo by zero in `{0}`")]
    ZeroModulo(String),

    #[error("cannot parse comparison `{0}`")]
    BadComparison(String),

    #[error("malformed continuation line `{0}`")]
    BadContinuation(String),

    /// A `!:key value` line came before any rule in its source.
    #[error("continuation line without an open rule")]
    OrphanContinuation,

    #[error("invalid regex `{pattern}`: {source}")]
    BadRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum MagicError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A definition line could not be compiled. The whole source is rejected.
    #[error("{origin}:{line}: {source}")]
    Rule {
        origin: String,
        line: usize,
        #[source]
        source: RuleError,
    },

    /// A `use` rule named a rule that no loaded source defines.
    #[error("no rule named `{0}`")]
    UnknownName(String),

    #[error("`use`/`indirect` nesting exceeded {0} levels")]
    RecursionLimit(usize),

    #[error("no magic source named `{0}`")]
    NoSuchSource(String),
}

/// A convenience `Result` type alias using the crate's `MagicError` type.
pub type Result<T> = std::result::Result<T, MagicError>;
