use rustc_hash::FxHashSet;

use crate::{Pipeline, Result, Token, Tokenize};

/// A tokenizer that claims single characters without emitting anything.
///
/// Used for whitespace and other input that should simply disappear from the token stream.
#[derive(Debug, Clone)]
pub struct IgnoreTokenizer {
    chars: FxHashSet<char>,
}

impl IgnoreTokenizer {
    /// Create a new ignore tokenizer claiming exactly the characters of `chars`.
    pub fn new(chars: &str) -> Self {
        Self {
            chars: chars.chars().collect(),
        }
    }
}

impl Tokenize for IgnoreTokenizer {
    fn claim(
        &self,
        source: &str,
        at: usize,
        _pipeline: &Pipeline,
        _out: &mut Vec<Token>,
    ) -> Result<Option<usize>> {
        match source[at..].chars().next() {
            Some(c) if self.chars.contains(&c) => Ok(Some(at + c.len_utf8())),
            _ => Ok(None),
        }
    }
}
