use crate::{Pipeline, Result, Token, Tokenize};

/// A tokenizer that discards comments.
///
/// Configured with a mapping of opening marker to closing marker, e.g. `//` → `\n` and
/// `/*` → `*/`. It claims input whose prefix equals one of the opening markers and advances the
/// scan past the matching closing marker without emitting a token. A comment that is still open
/// when the source ends simply ends the scan; that is deliberately not an error.
#[derive(Debug, Clone)]
pub struct CommentTokenizer {
    markers: Vec<(String, String)>,
}

impl CommentTokenizer {
    /// Create a new comment tokenizer from (opening marker, closing marker) pairs.
    pub fn new<O, C>(markers: impl IntoIterator<Item = (O, C)>) -> Self
    where
        O: Into<String>,
        C: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|(o, c)| (o.into(), c.into()))
                .collect(),
        }
    }
}

impl Tokenize for CommentTokenizer {
    fn claim(
        &self,
        source: &str,
        at: usize,
        _pipeline: &Pipeline,
        _out: &mut Vec<Token>,
    ) -> Result<Option<usize>> {
        for (opener, closer) in &self.markers {
            if !source[at..].starts_with(opener.as_str()) {
                continue;
            }
            let body = at + opener.len();
            let next = match source[body..].find(closer.as_str()) {
                Some(pos) => body + pos + closer.len(),
                // Unterminated comment: consume the rest of the source.
                None => source.len(),
            };
            return Ok(Some(next));
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
            .add_tokenizer(CommentTokenizer::new([("//", "\n"), ("/*", "*/")]))
            .add_tokenizer(crate::tokenizers::CharRunTokenizer::new("word", "ab"))
            .add_tokenizer(crate::tokenizers::IgnoreTokenizer::new(" \n"))
            .build()
    }

    #[test]
    fn test_comments_are_discarded() {
        let tokens = pipeline().scan("a // comment\nb /* block */ a").unwrap();
        let values: Vec<_> = tokens.iter().map(|t| t.value()).collect();
        assert_eq!(values, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_unterminated_comment_is_not_fatal() {
        let tokens = pipeline().scan("a /* never closed").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value(), "a");
    }

    #[test]
    fn test_line_comment_consumes_through_newline() {
        let tokens = pipeline().scan("// only a comment\na").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].index(), 18);
    }
}
