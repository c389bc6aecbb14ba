use rustc_hash::FxHashSet;

use crate::{Pipeline, Result, Token, Tokenize};

/// The decimal digits.
pub const INTEGER_CHARS: &str = "0123456789";

/// The stock word characters: ASCII letters, a handful of Turkish letters, and `_ $ # @`,
/// which sometimes count as words too.
pub const WORD_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzçğüşıABCDEFGHIJKLMNOPQRSTUVWXYZÇĞÜŞİ_$#@";

/// The stock word characters followed by the decimal digits, for identifiers that may contain
/// digits after the first character.
pub const WORD_AND_INTEGER_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzçğüşıABCDEFGHIJKLMNOPQRSTUVWXYZÇĞÜŞİ_$#@0123456789";

/// A tokenizer for runs of characters from a character class.
///
/// It claims input whose first character belongs to the start set, greedily consumes further
/// characters belonging to the continuation set, and always emits exactly one token.
#[derive(Debug, Clone)]
pub struct CharRunTokenizer {
    tag: String,
    start: FxHashSet<char>,
    continuation: FxHashSet<char>,
}

impl CharRunTokenizer {
    /// Create a new run tokenizer whose start and continuation sets are the characters of
    /// `chars`.
    pub fn new(tag: impl Into<String>, chars: &str) -> Self {
        let set: FxHashSet<char> = chars.chars().collect();
        Self {
            tag: tag.into(),
            start: set.clone(),
            continuation: set,
        }
    }

    /// Create a new run tokenizer with distinct start and continuation sets. An identifier
    /// tokenizer typically starts on [`WORD_CHARS`] and continues on
    /// [`WORD_AND_INTEGER_CHARS`].
    pub fn with_continuation(tag: impl Into<String>, start: &str, continuation: &str) -> Self {
        Self {
            tag: tag.into(),
            start: start.chars().collect(),
            continuation: continuation.chars().collect(),
        }
    }
}

impl Tokenize for CharRunTokenizer {
    fn claim(
        &self,
        source: &str,
        at: usize,
        _pipeline: &Pipeline,
        out: &mut Vec<Token>,
    ) -> Result<Option<usize>> {
        let mut chars = source[at..].char_indices();
        match chars.next() {
            Some((_, c)) if self.start.contains(&c) => {}
            _ => return Ok(None),
        }
        let mut end = source.len();
        for (i, c) in chars {
            if !self.continuation.contains(&c) {
                end = at + i;
                break;
            }
        }
        out.push(Token::plain(&self.tag, at, &source[at..end]));
        Ok(Some(end))
    }
}
