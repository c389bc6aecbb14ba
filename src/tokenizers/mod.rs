//! The builders for reusable tokenizer functions.
//!
//! Each builder produces one value implementing [`Tokenize`](crate::Tokenize) that can be
//! registered with a [`PipelineBuilder`](crate::PipelineBuilder). Registration order matters;
//! see the pipeline documentation.

/// Module with the basic character-class run tokenizer.
mod char_run;
pub use char_run::{CharRunTokenizer, INTEGER_CHARS, WORD_AND_INTEGER_CHARS, WORD_CHARS};

/// Module with the comment skipping tokenizer.
mod comment;
pub use comment::CommentTokenizer;

/// Module with the generic delimited-run tokenizer.
mod delimited;
pub use delimited::{DelimitedOptions, DelimitedTokenizer, Throw, START_PLACEHOLDER};

/// Module with the ignore/whitespace tokenizer.
mod ignore;
pub use ignore::IgnoreTokenizer;

/// Module with the multi-character symbol tokenizer.
mod symbol;
pub use symbol::SymbolTokenizer;
