use log::trace;

use crate::{errors::LexgramErrorKind, Result, Token};

/// A tokenizer function that can be registered with a [`Pipeline`].
///
/// At each scan position the pipeline offers the input to its tokenizers in registration order.
/// A tokenizer either declines by returning `Ok(None)`, or claims the position by appending zero
/// or more tokens to `out` and returning the byte position just past everything it consumed. A
/// claiming tokenizer must consume at least one character so the scan always makes progress.
///
/// The pipeline itself is passed back in so that re-entrant tokenizers (see
/// [`DelimitedTokenizer`](crate::tokenizers::DelimitedTokenizer)'s injector mode) can hand
/// control back to the full pipeline for a stretch of input.
pub trait Tokenize {
    /// Offer the input at byte position `at` to this tokenizer.
    fn claim(
        &self,
        source: &str,
        at: usize,
        pipeline: &Pipeline,
        out: &mut Vec<Token>,
    ) -> Result<Option<usize>>;
}

/// An ordered pipeline of tokenizer functions driving one left-to-right scan.
///
/// The pipeline is order sensitive: earlier registrants have priority, which enables deliberate
/// shadowing. A comment tokenizer registered before the symbol tokenizer keeps `//` from being
/// scanned as two `divide` symbols.
pub struct Pipeline {
    pub(crate) tokenizers: Vec<Box<dyn Tokenize>>,
}

impl Pipeline {
    /// Scan the whole source text into a flat token stream.
    ///
    /// Fails with a lexical error carrying the offending byte offset when no registered
    /// tokenizer claims a position.
    pub fn scan(&self, source: &str) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut at = 0;
        while at < source.len() {
            at = self.scan_at(source, at, &mut tokens)?;
        }
        trace!("scanned {} tokens from {} bytes", tokens.len(), source.len());
        Ok(tokens)
    }

    /// Scan a single position: offer `at` to every tokenizer in registration order and return
    /// the position just past what the first claiming tokenizer consumed.
    ///
    /// This is the step the full scan loop is built from; re-entrant tokenizers call it to
    /// recurse into the pipeline.
    pub fn scan_at(&self, source: &str, at: usize, out: &mut Vec<Token>) -> Result<usize> {
        for tokenizer in &self.tokenizers {
            if let Some(next) = tokenizer.claim(source, at, self, out)? {
                debug_assert!(next > at, "a claiming tokenizer must advance the scan");
                return Ok(next);
            }
        }
        let len = source[at..].chars().next().map_or(1, |c| c.len_utf8());
        Err(LexgramErrorKind::lexical(at, len, "unexpected character"))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("tokenizers", &self.tokenizers.len())
            .finish()
    }
}
