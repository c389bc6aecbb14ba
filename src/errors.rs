use thiserror::Error;

/// The result type for the `lexgram` crate.
pub type Result<T> = std::result::Result<T, LexgramError>;

/// The error type for the `lexgram` crate.
#[derive(Error, Debug)]
pub struct LexgramError {
    /// The source of the error.
    pub source: Box<LexgramErrorKind>,
}

impl LexgramError {
    /// Create a new `LexgramError`.
    pub fn new(kind: LexgramErrorKind) -> Self {
        LexgramError {
            source: Box::new(kind),
        }
    }

    /// Get the byte offset the error points at, if the error carries one.
    /// Compiler errors refer to rule text, not to the scanned source, and have no offset.
    pub fn offset(&self) -> Option<usize> {
        match self.source.as_ref() {
            LexgramErrorKind::Lexical { at, .. }
            | LexgramErrorKind::Grouping { at, .. }
            | LexgramErrorKind::Grammar { at, .. } => Some(*at),
            LexgramErrorKind::Compiler { .. } => None,
        }
    }

    /// Get the length of the affected source span, if the error carries one.
    pub fn len(&self) -> Option<usize> {
        match self.source.as_ref() {
            LexgramErrorKind::Lexical { len, .. }
            | LexgramErrorKind::Grouping { len, .. }
            | LexgramErrorKind::Grammar { len, .. } => Some(*len),
            LexgramErrorKind::Compiler { .. } => None,
        }
    }
}

impl std::fmt::Display for LexgramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
///
/// All four kinds are terminal for the call that raised them. The crate surfaces the first
/// error encountered and stops; callers decide whether to abort or render a diagnostic.
#[derive(Error, Debug)]
pub enum LexgramErrorKind {
    /// No tokenizer claimed the input at the given offset, or a delimited run hit one of its
    /// configured throw conditions.
    #[error("lexical error at offset {at}: {message}")]
    Lexical {
        /// Byte offset of the offending input.
        at: usize,
        /// Length of the affected span in bytes.
        len: usize,
        /// Human readable message.
        message: String,
    },

    /// A bracket was still open when the input ended.
    #[error("unfinished bracket at offset {at}")]
    Grouping {
        /// Byte offset of the still-open opening bracket.
        at: usize,
        /// Length of the affected span in bytes.
        len: usize,
    },

    /// No rule of the active rule set matched at a stream position, or matching ran into a
    /// configuration problem such as an unknown rule set id.
    #[error("syntax error at offset {at}: {message}")]
    Grammar {
        /// Byte offset of the first unmatched token.
        at: usize,
        /// Length of the affected span in bytes.
        len: usize,
        /// Human readable message.
        message: String,
    },

    /// A rule definition could not be compiled.
    #[error("rule compile error: {message}")]
    Compiler {
        /// Message naming the offending clause or directive.
        message: String,
    },
}

impl LexgramErrorKind {
    /// Shorthand for a lexical error.
    pub(crate) fn lexical(at: usize, len: usize, message: impl Into<String>) -> LexgramError {
        LexgramError::new(LexgramErrorKind::Lexical {
            at,
            len,
            message: message.into(),
        })
    }

    /// Shorthand for a grouping error.
    pub(crate) fn grouping(at: usize, len: usize) -> LexgramError {
        LexgramError::new(LexgramErrorKind::Grouping { at, len })
    }

    /// Shorthand for a grammar error.
    pub(crate) fn grammar(at: usize, len: usize, message: impl Into<String>) -> LexgramError {
        LexgramError::new(LexgramErrorKind::Grammar {
            at,
            len,
            message: message.into(),
        })
    }

    /// Shorthand for a compiler error.
    pub(crate) fn compiler(message: impl Into<String>) -> LexgramError {
        LexgramError::new(LexgramErrorKind::Compiler {
            message: message.into(),
        })
    }
}
