use crate::{Pipeline, Result, Token, Tokenize};

/// A tokenizer for literal symbols.
///
/// Configured with a mapping of literal substrings to type tags, e.g. `==` → `equals`.
/// Candidates are tried longest first so that maximal munch is guaranteed: with `=`, `==` and
/// `===` registered, the source `===` yields one token, not three.
#[derive(Debug, Clone)]
pub struct SymbolTokenizer {
    // (literal, tag), sorted by descending literal length.
    symbols: Vec<(String, String)>,
}

impl SymbolTokenizer {
    /// Create a new symbol tokenizer from (literal, tag) pairs.
    pub fn new<L, T>(symbols: impl IntoIterator<Item = (L, T)>) -> Self
    where
        L: Into<String>,
        T: Into<String>,
    {
        let mut symbols: Vec<(String, String)> = symbols
            .into_iter()
            .map(|(l, t)| (l.into(), t.into()))
            .collect();
        symbols.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { symbols }
    }
}

impl Tokenize for SymbolTokenizer {
    fn claim(
        &self,
        source: &str,
        at: usize,
        _pipeline: &Pipeline,
        out: &mut Vec<Token>,
    ) -> Result<Option<usize>> {
        for (literal, tag) in &self.symbols {
            if source[at..].starts_with(literal.as_str()) {
                out.push(Token::plain(tag, at, literal));
                return Ok(Some(at + literal.len()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipelineBuilder;

    fn pipeline() -> Pipeline {
        PipelineBuilder::new()
            .add_tokenizer(SymbolTokenizer::new([
                ("=", "set"),
                ("==", "equals"),
                ("===", "exactly-equals"),
                (";", "semicolon"),
            ]))
            .add_tokenizer(crate::tokenizers::IgnoreTokenizer::new(" "))
            .build()
    }

    #[test]
    fn test_longest_munch() {
        let tokens = pipeline().scan("===").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].tag(), "exactly-equals");
        assert_eq!(tokens[0].value(), "===");
    }

    #[test]
    fn test_one_token_per_marker() {
        let tokens = pipeline().scan("== = ;").unwrap();
        let tags: Vec<_> = tokens.iter().map(|t| t.tag()).collect();
        assert_eq!(tags, vec!["equals", "set", "semicolon"]);
    }
}
