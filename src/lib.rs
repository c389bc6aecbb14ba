#![forbid(missing_docs)]
//! # lexgram
//!
//! A lexing and grammar toolkit.
//!
//! The crate is built from three stages that compose but also stand alone:
//!
//! 1. A **tokenizer pipeline** ([`Pipeline`]) turns source text into a flat stream of tagged
//!    [`Token`]s. The pipeline is an ordered list of [`Tokenize`] implementations; at every
//!    position the first tokenizer that claims the input wins. The [`tokenizers`] module ships
//!    builders for the common shapes: symbols, character runs, comments, delimited regions with
//!    escapes and nested injections, and ignorable characters.
//! 2. A **grouper** ([`Grouper`]) nests the flat stream inside matching bracket pairs,
//!    producing group tokens that carry their children.
//! 3. A **matcher** ([`Matcher`]) runs a [`Grammar`] of quantified rules over the (grouped)
//!    stream and produces labeled [`Statement`]s with named captures. Grammars are built either
//!    through the typed builders ([`Rule`], [`Step`]) or compiled from the textual rule
//!    language ([`compile_program`]).
//!
//! ```rust
//! use lexgram::tokenizers::{CharRunTokenizer, IgnoreTokenizer, SymbolTokenizer, INTEGER_CHARS, WORD_CHARS};
//! use lexgram::{compile_program, Grouper, Matcher, PipelineBuilder};
//!
//! let pipeline = PipelineBuilder::new()
//!     .add_tokenizer(SymbolTokenizer::new([
//!         ("=", "assign"),
//!         ("+", "add"),
//!         (";", "semicolon"),
//!     ]))
//!     .add_tokenizer(CharRunTokenizer::new("word", WORD_CHARS))
//!     .add_tokenizer(CharRunTokenizer::new("integer", INTEGER_CHARS))
//!     .add_tokenizer(IgnoreTokenizer::new(" \t\n"))
//!     .build();
//!
//! let grammar = compile_program(
//!     "@set statement\n\
//!      define l:name,:word = l:value,:*,>:1,<:inf ;,!:\n",
//! )
//! .unwrap();
//!
//! let source = "x = 1 + 2;";
//! let tokens = pipeline.scan(source).unwrap();
//! let grouped = Grouper::default().group(source, tokens).unwrap();
//! let statements = Matcher::new(&grammar)
//!     .match_tokens(source, &grouped, grammar.set_id("statement").unwrap())
//!     .unwrap();
//!
//! assert_eq!(statements.len(), 1);
//! assert_eq!(statements[0].label, "define");
//! assert_eq!(statements[0].field("name").unwrap().single().unwrap().value(), "x");
//! ```

/// Module with the textual rule language compiler
mod compiler;
pub use compiler::compile_program;

/// Module with error definitions
mod errors;
pub use errors::{LexgramError, LexgramErrorKind, Result};

/// Module with the grammar arena and rule set handles
mod grammar;
pub use grammar::{Grammar, RuleSet, RuleSetId};

/// Module with the bracket grouper
mod grouper;
pub use grouper::{BracketPair, Grouper};

/// Module with the grammar matching engine
mod matcher;
pub use matcher::{Capture, Matcher, Node, Statement};

/// Module with the tokenizer pipeline
mod pipeline;
pub use pipeline::{Pipeline, Tokenize};

/// Module with the builder for tokenizer pipelines
mod pipeline_builder;
pub use pipeline_builder::PipelineBuilder;

/// Module that provides a position type
mod position;
pub use position::{position_at, Position};

/// Module with the grammar rule model
mod rule;
pub use rule::{MatchMode, Predicate, Rule, Step, Subject};

/// Module that provides a Span type
mod span;
pub use span::Span;

/// Module that provides the Token type
mod token;
pub use token::Token;

/// Module with the stock tokenizer builders
pub mod tokenizers;
